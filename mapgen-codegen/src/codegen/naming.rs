//! Naming utilities for code generation

use heck::{ToLowerCamelCase, ToPascalCase};

use crate::dom::java::FullyQualifiedJavaType;

/// Convert a table name to a model class name (PascalCase)
/// e.g., "order_items" -> "OrderItems"
pub fn to_model_name(table_name: &str) -> String {
    table_name.to_pascal_case()
}

/// Mapper interface name for a table, e.g. "users" -> "UsersMapper"
pub fn to_mapper_name(table_name: &str) -> String {
    format!("{}Mapper", to_model_name(table_name))
}

/// Convert a column name to a JavaBeans property name (lower camel case),
/// escaping Java keywords
pub fn to_property_name(column_name: &str) -> String {
    escape_property_name(&column_name.to_lower_camel_case())
}

/// Capitalize a property the way JavaBeans accessors do. A property whose
/// second letter is upper case (`xCoordinate`) keeps its first letter as is.
fn accessor_suffix(property: &str) -> String {
    let mut chars = property.chars();
    match (chars.next(), chars.next()) {
        (Some(first), second)
            if first.is_lowercase() && !second.is_some_and(char::is_uppercase) =>
        {
            let mut out: String = first.to_uppercase().collect();
            out.push_str(&property[first.len_utf8()..]);
            out
        }
        _ => property.to_string(),
    }
}

/// Getter name: `is` prefix for primitive booleans, `get` otherwise
pub fn getter_name(property: &str, ty: &FullyQualifiedJavaType) -> String {
    let prefix = if *ty == FullyQualifiedJavaType::boolean_primitive_instance() {
        "is"
    } else {
        "get"
    };
    format!("{}{}", prefix, accessor_suffix(property))
}

/// Setter name, e.g. "firstName" -> "setFirstName"
pub fn setter_name(property: &str) -> String {
    format!("set{}", accessor_suffix(property))
}

/// Check if a name is a Java reserved word
pub fn is_java_keyword(name: &str) -> bool {
    matches!(
        name,
        "abstract"
            | "assert"
            | "boolean"
            | "break"
            | "byte"
            | "case"
            | "catch"
            | "char"
            | "class"
            | "const"
            | "continue"
            | "default"
            | "do"
            | "double"
            | "else"
            | "enum"
            | "extends"
            | "final"
            | "finally"
            | "float"
            | "for"
            | "goto"
            | "if"
            | "implements"
            | "import"
            | "instanceof"
            | "int"
            | "interface"
            | "long"
            | "native"
            | "new"
            | "package"
            | "private"
            | "protected"
            | "public"
            | "return"
            | "short"
            | "static"
            | "strictfp"
            | "super"
            | "switch"
            | "synchronized"
            | "this"
            | "throw"
            | "throws"
            | "transient"
            | "try"
            | "void"
            | "volatile"
            | "while"
            | "true"
            | "false"
            | "null"
            | "var"
            | "record"
            | "yield"
    )
}

/// Escape a property name if it's a Java keyword
pub fn escape_property_name(name: &str) -> String {
    if is_java_keyword(name) {
        format!("{}_", name)
    } else {
        name.to_string()
    }
}

/// Method name for a query keyed by columns
/// e.g., ["order_id", "product_id"] -> "selectByOrderIdAndProductId"
pub fn by_columns_method_name(prefix: &str, columns: &[String]) -> String {
    let parts: Vec<String> = columns.iter().map(|c| c.to_pascal_case()).collect();
    format!("{}By{}", prefix, parts.join("And"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_model_name() {
        assert_eq!(to_model_name("users"), "Users");
        assert_eq!(to_model_name("user_settings"), "UserSettings");
        assert_eq!(to_mapper_name("order_items"), "OrderItemsMapper");
    }

    #[test]
    fn test_to_property_name() {
        assert_eq!(to_property_name("user_id"), "userId");
        assert_eq!(to_property_name("FIRST_NAME"), "firstName");
        assert_eq!(to_property_name("createdAt"), "createdAt");
        assert_eq!(to_property_name("class"), "class_");
    }

    #[test]
    fn test_accessor_names() {
        let string = FullyQualifiedJavaType::string_instance();
        assert_eq!(getter_name("firstName", &string), "getFirstName");
        assert_eq!(setter_name("firstName"), "setFirstName");
        assert_eq!(getter_name("xCoordinate", &string), "getxCoordinate");

        let primitive = FullyQualifiedJavaType::boolean_primitive_instance();
        assert_eq!(getter_name("active", &primitive), "isActive");
        let wrapper = FullyQualifiedJavaType::new("java.lang.Boolean");
        assert_eq!(getter_name("active", &wrapper), "getActive");
    }

    #[test]
    fn test_by_columns_method_name() {
        assert_eq!(
            by_columns_method_name("select", &["id".to_string()]),
            "selectById"
        );
        assert_eq!(
            by_columns_method_name(
                "delete",
                &["order_id".to_string(), "product_id".to_string()]
            ),
            "deleteByOrderIdAndProductId"
        );
    }

    #[test]
    fn test_escape_property_name() {
        assert_eq!(escape_property_name("default"), "default_");
        assert_eq!(escape_property_name("name"), "name");
        assert!(is_java_keyword("synchronized"));
        assert!(!is_java_keyword("Class"));
    }
}
