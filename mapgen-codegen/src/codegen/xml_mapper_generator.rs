//! XML mapper generator - result map, column list and CRUD statements per table

use tracing::debug;

use crate::dom::xml::{Document, XmlElement};
use crate::merge::GeneratedMarker;

use super::introspected::{IntrospectedColumn, IntrospectedTable};
use super::mapper_generator::method_names;
use super::naming::by_columns_method_name;

pub const MAPPER_PUBLIC_ID: &str = "-//mybatis.org//DTD Mapper 3.0//EN";
pub const MAPPER_SYSTEM_ID: &str = "http://mybatis.org/dtd/mybatis-3-mapper.dtd";

const BASE_RESULT_MAP: &str = "BaseResultMap";
const BASE_COLUMN_LIST: &str = "Base_Column_List";

/// Build the XML mapper for a table; statement ids match the mapper interface methods.
pub fn build_xml_mapper(table: &IntrospectedTable, marker: &GeneratedMarker) -> Document {
    debug!("Building XML mapper for {}", table.name());

    let mut root =
        XmlElement::new("mapper").with_attribute("namespace", table.mapper_type.full_name());
    let key = table.primary_key_columns();

    let mut statements = vec![result_map(table), column_list(table)];
    if !key.is_empty() {
        statements.push(select_by(table, method_names::SELECT_BY_PRIMARY_KEY, &key));
    }
    for columns in table.unique_keys() {
        let names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();
        statements.push(select_by(table, &by_columns_method_name("select", &names), &columns));
    }
    statements.push(select_all(table));
    if !key.is_empty() {
        statements.push(delete_by_primary_key(table, &key));
    }
    statements.push(insert(table));
    if !key.is_empty() && !table.non_primary_key_columns().is_empty() {
        statements.push(update_by_primary_key(table, &key));
    }

    for mut statement in statements {
        marker.tag_xml_element(&mut statement);
        root.add_element(statement);
    }

    Document::with_doctype(root, MAPPER_PUBLIC_ID, MAPPER_SYSTEM_ID)
}

fn result_map(table: &IntrospectedTable) -> XmlElement {
    let mut element = XmlElement::new("resultMap")
        .with_attribute("id", BASE_RESULT_MAP)
        .with_attribute("type", table.model_type.full_name());
    for column in &table.columns {
        let tag = if table.table.is_primary_key_column(column.name()) {
            "id"
        } else {
            "result"
        };
        element.add_element(
            XmlElement::new(tag)
                .with_attribute("column", column.name())
                .with_attribute("jdbcType", column.jdbc_type.name())
                .with_attribute("property", &column.property),
        );
    }
    element
}

fn column_list(table: &IntrospectedTable) -> XmlElement {
    let mut element = XmlElement::new("sql").with_attribute("id", BASE_COLUMN_LIST);
    element.add_text(table.column_list());
    element
}

fn include_column_list() -> XmlElement {
    XmlElement::new("include").with_attribute("refid", BASE_COLUMN_LIST)
}

/// `where a = #{a,...}` followed by `and b = #{b,...}` lines
fn add_where_clause(element: &mut XmlElement, columns: &[&IntrospectedColumn]) {
    for (i, column) in columns.iter().enumerate() {
        let keyword = if i == 0 { "where" } else { "  and" };
        element.add_text(format!("{} {}", keyword, column.equals_clause()));
    }
}

/// Single parameters are typed; several go through `@Param` names
fn parameter_type(columns: &[&IntrospectedColumn]) -> String {
    match columns {
        [column] => column.java_type.full_name(),
        _ => "map".to_string(),
    }
}

fn select_by(table: &IntrospectedTable, id: &str, columns: &[&IntrospectedColumn]) -> XmlElement {
    let mut element = XmlElement::new("select")
        .with_attribute("id", id)
        .with_attribute("parameterType", parameter_type(columns))
        .with_attribute("resultMap", BASE_RESULT_MAP);
    element.add_text("select");
    element.add_element(include_column_list());
    element.add_text(format!("from {}", table.name()));
    add_where_clause(&mut element, columns);
    element
}

fn select_all(table: &IntrospectedTable) -> XmlElement {
    let mut element = XmlElement::new("select")
        .with_attribute("id", method_names::SELECT_ALL)
        .with_attribute("resultMap", BASE_RESULT_MAP);
    element.add_text("select");
    element.add_element(include_column_list());
    element.add_text(format!("from {}", table.name()));
    element
}

fn delete_by_primary_key(table: &IntrospectedTable, key: &[&IntrospectedColumn]) -> XmlElement {
    let mut element = XmlElement::new("delete")
        .with_attribute("id", method_names::DELETE_BY_PRIMARY_KEY)
        .with_attribute("parameterType", parameter_type(key));
    element.add_text(format!("delete from {}", table.name()));
    add_where_clause(&mut element, key);
    element
}

/// Insert every column except a generated key, which is read back instead
fn insert(table: &IntrospectedTable) -> XmlElement {
    let mut element = XmlElement::new("insert")
        .with_attribute("id", method_names::INSERT)
        .with_attribute("parameterType", table.model_type.full_name());

    let generated = table.generated_key_column();
    if let Some(column) = generated {
        element = element
            .with_attribute("keyColumn", column.name())
            .with_attribute("keyProperty", &column.property)
            .with_attribute("useGeneratedKeys", "true");
    }

    let columns: Vec<&IntrospectedColumn> = table
        .columns
        .iter()
        .filter(|c| generated.map_or(true, |g| g.name() != c.name()))
        .collect();
    let names: Vec<&str> = columns.iter().map(|c| c.name()).collect();
    let values: Vec<String> = columns.iter().map(|c| c.parameter_clause()).collect();

    element.add_text(format!("insert into {} ({})", table.name(), names.join(", ")));
    element.add_text(format!("values ({})", values.join(", ")));
    element
}

fn update_by_primary_key(table: &IntrospectedTable, key: &[&IntrospectedColumn]) -> XmlElement {
    let mut element = XmlElement::new("update")
        .with_attribute("id", method_names::UPDATE_BY_PRIMARY_KEY)
        .with_attribute("parameterType", table.model_type.full_name());
    element.add_text(format!("update {}", table.name()));

    let columns = table.non_primary_key_columns();
    for (i, column) in columns.iter().enumerate() {
        let keyword = if i == 0 { "set" } else { "   " };
        let separator = if i + 1 < columns.len() { "," } else { "" };
        element.add_text(format!("{} {}{}", keyword, column.equals_clause(), separator));
    }
    add_where_clause(&mut element, key);
    element
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CodegenConfig, SqlDialect};
    use crate::merge::ProvenanceTags;
    use crate::parser::parse_schema;

    fn users_document() -> Document {
        let tables = parse_schema(
            r#"
            CREATE TABLE users (
                id BIGINT AUTO_INCREMENT PRIMARY KEY,
                name VARCHAR(64) NOT NULL,
                active TINYINT(1) NOT NULL
            );
            "#,
            SqlDialect::Mysql,
        )
        .unwrap();
        let config = CodegenConfig::default();
        let table = IntrospectedTable::new(&tables[0], &config);
        build_xml_mapper(&table, &GeneratedMarker::without_date())
    }

    #[test]
    fn test_document_prolog_and_root() {
        let rendered = users_document().formatted_content();
        assert!(rendered.starts_with(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!DOCTYPE mapper PUBLIC \"-//mybatis.org//DTD Mapper 3.0//EN\" \"http://mybatis.org/dtd/mybatis-3-mapper.dtd\">\n<mapper namespace=\"com.example.mapper.UsersMapper\" >\n"
        ));
        assert!(rendered.ends_with("</mapper>\n"));
    }

    #[test]
    fn test_result_map_and_statements() {
        let rendered = users_document().formatted_content();
        assert!(rendered.contains(
            "    <id column=\"id\" jdbcType=\"BIGINT\" property=\"id\" />\n"
        ));
        assert!(rendered.contains(
            "    <result column=\"active\" jdbcType=\"BIT\" property=\"active\" />\n"
        ));
        assert!(rendered.contains("    id, name, active\n"));
        assert!(rendered.contains(
            "  <insert id=\"insert\" parameterType=\"com.example.model.Users\" keyColumn=\"id\" keyProperty=\"id\" useGeneratedKeys=\"true\" >\n"
        ));
        assert!(rendered.contains("    insert into users (name, active)\n"));
        assert!(rendered.contains(
            "    values (#{name,jdbcType=VARCHAR}, #{active,jdbcType=BIT})\n"
        ));
        assert!(rendered.contains(
            "    set name = #{name,jdbcType=VARCHAR},\n        active = #{active,jdbcType=BIT}\n    where id = #{id,jdbcType=BIGINT}\n"
        ));
    }

    #[test]
    fn test_every_statement_tagged() {
        let document = users_document();
        let tags = ProvenanceTags::default();
        for child in document.root.elements() {
            let crate::dom::xml::Element::Xml(element) = child else {
                panic!("unexpected text at mapper level");
            };
            let comment: Vec<String> = element.elements()[..4]
                .iter()
                .map(|e| e.formatted_content_with(0, 100))
                .collect();
            assert!(tags.xml_comment_is_generated(&comment.join("\n")));
        }
        assert_eq!(document.root.elements().len(), 7);
    }
}
