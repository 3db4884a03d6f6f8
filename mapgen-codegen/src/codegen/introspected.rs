//! Table metadata resolved against the configuration: Java names and types per column

use crate::config::CodegenConfig;
use crate::dom::java::FullyQualifiedJavaType;
use crate::parser::{ColumnMetadata, TableMetadata};

use super::naming::{to_mapper_name, to_model_name, to_property_name};
use super::type_resolver::{JdbcType, TypeResolver};

/// A column with its property name and resolved types
#[derive(Debug, Clone)]
pub struct IntrospectedColumn<'a> {
    pub column: &'a ColumnMetadata,
    pub property: String,
    pub jdbc_type: JdbcType,
    pub java_type: FullyQualifiedJavaType,
}

impl IntrospectedColumn<'_> {
    pub fn name(&self) -> &str {
        &self.column.name
    }

    /// MyBatis parameter placeholder, e.g. `#{userId,jdbcType=BIGINT}`
    pub fn parameter_clause(&self) -> String {
        format!("#{{{},jdbcType={}}}", self.property, self.jdbc_type.name())
    }

    /// `column = #{property,jdbcType=...}`
    pub fn equals_clause(&self) -> String {
        format!("{} = {}", self.column.name, self.parameter_clause())
    }
}

/// Everything the generators need to know about one table
#[derive(Debug, Clone)]
pub struct IntrospectedTable<'a> {
    pub table: &'a TableMetadata,
    pub model_type: FullyQualifiedJavaType,
    pub mapper_type: FullyQualifiedJavaType,
    pub columns: Vec<IntrospectedColumn<'a>>,
}

impl<'a> IntrospectedTable<'a> {
    pub fn new(table: &'a TableMetadata, config: &CodegenConfig) -> Self {
        let resolver = TypeResolver::new(config.java_time_types);
        let columns = table
            .columns
            .iter()
            .map(|column| {
                let resolved = resolver.resolve(column);
                IntrospectedColumn {
                    column,
                    property: to_property_name(&column.name),
                    jdbc_type: resolved.jdbc_type,
                    java_type: resolved.java_type,
                }
            })
            .collect();

        Self {
            table,
            model_type: FullyQualifiedJavaType::new(&format!(
                "{}.{}",
                config.model_package,
                to_model_name(&table.name)
            )),
            mapper_type: FullyQualifiedJavaType::new(&format!(
                "{}.{}",
                config.mapper_package,
                to_mapper_name(&table.name)
            )),
            columns,
        }
    }

    pub fn name(&self) -> &str {
        &self.table.name
    }

    pub fn column(&self, name: &str) -> Option<&IntrospectedColumn<'a>> {
        self.columns.iter().find(|c| c.column.name == name)
    }

    /// Primary key columns in key order
    pub fn primary_key_columns(&self) -> Vec<&IntrospectedColumn<'a>> {
        self.table
            .primary_key
            .as_ref()
            .map(|pk| pk.columns.iter().filter_map(|c| self.column(c)).collect())
            .unwrap_or_default()
    }

    /// Columns outside the primary key, in declaration order
    pub fn non_primary_key_columns(&self) -> Vec<&IntrospectedColumn<'a>> {
        self.columns
            .iter()
            .filter(|c| !self.table.is_primary_key_column(&c.column.name))
            .collect()
    }

    /// The single auto-increment key column, if the key is exactly that
    pub fn generated_key_column(&self) -> Option<&IntrospectedColumn<'a>> {
        match self.primary_key_columns().as_slice() {
            [column] if column.column.is_auto_increment => Some(*column),
            _ => None,
        }
    }

    /// Unique indexes other than the primary key, as column lists
    pub fn unique_keys(&self) -> Vec<Vec<&IntrospectedColumn<'a>>> {
        let primary = self.table.primary_key.as_ref().map(|pk| &pk.columns);
        self.table
            .indexes
            .iter()
            .filter(|idx| idx.unique && Some(&idx.columns) != primary)
            .filter_map(|idx| {
                idx.columns
                    .iter()
                    .map(|c| self.column(c))
                    .collect::<Option<Vec<_>>>()
            })
            .collect()
    }

    /// Comma-separated column list in declaration order
    pub fn column_list(&self) -> String {
        self.columns
            .iter()
            .map(|c| c.column.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SqlDialect;
    use crate::parser::parse_schema;

    #[test]
    fn test_introspect_table() {
        let tables = parse_schema(
            r#"
            CREATE TABLE user_accounts (
                id BIGINT AUTO_INCREMENT PRIMARY KEY,
                email VARCHAR(255) NOT NULL,
                display_name VARCHAR(64),
                UNIQUE KEY uk_email (email)
            );
            "#,
            SqlDialect::Mysql,
        )
        .unwrap();
        let config = CodegenConfig::default();
        let table = IntrospectedTable::new(&tables[0], &config);

        assert_eq!(table.model_type.full_name(), "com.example.model.UserAccounts");
        assert_eq!(
            table.mapper_type.full_name(),
            "com.example.mapper.UserAccountsMapper"
        );
        assert_eq!(table.column_list(), "id, email, display_name");
        assert_eq!(table.generated_key_column().unwrap().property, "id");
        assert_eq!(table.non_primary_key_columns().len(), 2);

        let unique = table.unique_keys();
        assert_eq!(unique.len(), 1);
        assert_eq!(unique[0][0].property, "email");

        let name = table.column("display_name").unwrap();
        assert_eq!(name.property, "displayName");
        assert_eq!(
            name.equals_clause(),
            "display_name = #{displayName,jdbcType=VARCHAR}"
        );
    }
}
