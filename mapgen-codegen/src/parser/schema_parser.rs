//! DDL reader: `CREATE TABLE` statements to [`TableMetadata`] via sqlparser-rs

use sqlparser::ast::{
    ColumnDef, ColumnOption, CreateTable, DataType, EnumMember, Expr, ForeignKeyConstraint, Ident,
    IndexColumn, IndexConstraint, ObjectName, PrimaryKeyConstraint, Statement, TableConstraint,
    UniqueConstraint,
};
use sqlparser::dialect::dialect_from_str;
use sqlparser::parser::Parser;
use tracing::debug;

use super::metadata::*;
use crate::config::SqlDialect;
use crate::error::{CodegenError, Result};

/// Parse a SQL schema string into table metadata, in statement order.
/// Statements other than `CREATE TABLE` are ignored.
pub fn parse_schema(sql: &str, dialect: SqlDialect) -> Result<Vec<TableMetadata>> {
    let parser_dialect = dialect_from_str(dialect.as_str()).ok_or_else(|| {
        CodegenError::ConfigError(format!("Unsupported SQL dialect: {}", dialect))
    })?;
    let statements = Parser::parse_sql(parser_dialect.as_ref(), sql)?;
    debug!("Parsed {} statements as {}", statements.len(), dialect);

    Ok(statements
        .iter()
        .filter_map(|statement| match statement {
            Statement::CreateTable(create) => Some(read_table(create)),
            _ => None,
        })
        .collect())
}

fn read_table(create: &CreateTable) -> TableMetadata {
    let mut table = TableBuilder::new(object_name(&create.name));
    for column in &create.columns {
        table.add_column(column);
    }
    for constraint in &create.constraints {
        table.add_constraint(constraint);
    }
    let table = table.build();
    debug!(
        "Table {}: {} columns, {} indexes, {} foreign keys",
        table.name,
        table.columns.len(),
        table.indexes.len(),
        table.foreign_keys.len()
    );
    table
}

/// Accumulates column definitions and constraints; inline `PRIMARY KEY` and
/// `UNIQUE` column options are treated like their table-level forms.
struct TableBuilder {
    name: String,
    columns: Vec<ColumnMetadata>,
    indexes: Vec<IndexMetadata>,
    foreign_keys: Vec<ForeignKeyMetadata>,
    primary_key: Option<PrimaryKey>,
}

impl TableBuilder {
    fn new(name: String) -> Self {
        Self {
            name,
            columns: Vec::new(),
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
            primary_key: None,
        }
    }

    fn add_column(&mut self, definition: &ColumnDef) {
        let (column, inline) = read_column(definition);
        let name = column.name.clone();
        self.columns.push(column);

        if inline.primary_key {
            self.set_primary_key(vec![name.clone()]);
        }
        if inline.unique {
            self.add_index(None, vec![name], true);
        }
    }

    fn add_constraint(&mut self, constraint: &TableConstraint) {
        match constraint {
            TableConstraint::PrimaryKey(PrimaryKeyConstraint { columns, .. }) => {
                self.set_primary_key(columns.iter().map(index_column_name).collect());
            }
            TableConstraint::Unique(UniqueConstraint {
                columns,
                name,
                index_name,
                ..
            }) => {
                let name = name.as_ref().or(index_name.as_ref());
                self.add_index(name, columns.iter().map(index_column_name).collect(), true);
            }
            TableConstraint::Index(IndexConstraint { columns, name, .. }) => {
                self.add_index(name.as_ref(), columns.iter().map(index_column_name).collect(), false);
            }
            TableConstraint::ForeignKey(ForeignKeyConstraint {
                columns,
                foreign_table,
                referred_columns,
                ..
            }) => {
                let referenced_table = object_name(foreign_table);
                self.foreign_keys.extend(columns.iter().zip(referred_columns).map(
                    |(column, referenced)| ForeignKeyMetadata {
                        column_name: column.value.clone(),
                        referenced_table: referenced_table.clone(),
                        referenced_column: referenced.value.clone(),
                    },
                ));
            }
            other => debug!("{}: ignoring constraint {}", self.name, other),
        }
    }

    /// Key columns are never nullable
    fn set_primary_key(&mut self, columns: Vec<String>) {
        for column in self.columns.iter_mut().filter(|c| columns.contains(&c.name)) {
            column.nullable = false;
        }
        self.primary_key = Some(PrimaryKey { columns });
    }

    /// Unnamed indexes are named after their columns: `uk_a_b` / `idx_a_b`
    fn add_index(&mut self, name: Option<&Ident>, columns: Vec<String>, unique: bool) {
        if columns.is_empty() {
            return;
        }
        let name = match name {
            Some(ident) => ident.value.clone(),
            None => format!("{}_{}", if unique { "uk" } else { "idx" }, columns.join("_")),
        };
        self.indexes.push(IndexMetadata {
            name,
            columns,
            unique,
        });
    }

    fn build(self) -> TableMetadata {
        TableMetadata {
            name: self.name,
            comment: None,
            columns: self.columns,
            indexes: self.indexes,
            foreign_keys: self.foreign_keys,
            primary_key: self.primary_key,
        }
    }
}

/// Key constraints declared inline on a column
#[derive(Debug, Default)]
struct InlineKeys {
    primary_key: bool,
    unique: bool,
}

fn read_column(definition: &ColumnDef) -> (ColumnMetadata, InlineKeys) {
    let data_type = definition.data_type.to_string();
    let upper = data_type.to_uppercase();

    let mut column = ColumnMetadata {
        name: definition.name.value.clone(),
        nullable: true,
        default_value: None,
        // SERIAL, BIGSERIAL and SMALLSERIAL are PostgreSQL auto-increment integers
        is_auto_increment: upper.ends_with("SERIAL"),
        is_unsigned: upper.contains("UNSIGNED"),
        enum_values: enum_values(&definition.data_type),
        comment: None,
        data_type,
    };
    let mut inline = InlineKeys::default();

    for option in &definition.options {
        match &option.option {
            ColumnOption::NotNull => column.nullable = false,
            ColumnOption::Null => column.nullable = true,
            ColumnOption::Default(expr) => column.default_value = Some(expr.to_string()),
            ColumnOption::Comment(comment) => column.comment = Some(comment.clone()),
            ColumnOption::PrimaryKey(_) => {
                inline.primary_key = true;
                column.nullable = false;
            }
            ColumnOption::Unique(_) => inline.unique = true,
            // MySQL AUTO_INCREMENT, SQLite AUTOINCREMENT
            ColumnOption::DialectSpecific(tokens) => {
                if tokens.iter().any(|token| {
                    matches!(
                        token.to_string().to_uppercase().as_str(),
                        "AUTO_INCREMENT" | "AUTOINCREMENT"
                    )
                }) {
                    column.is_auto_increment = true;
                }
            }
            _ => {}
        }
    }

    (column, inline)
}

fn enum_values(data_type: &DataType) -> Option<Vec<String>> {
    let DataType::Enum(members, _) = data_type else {
        return None;
    };
    Some(
        members
            .iter()
            .map(|member| match member {
                EnumMember::Name(name) | EnumMember::NamedValue(name, _) => name.clone(),
            })
            .collect(),
    )
}

/// Last part of a possibly schema-qualified name
fn object_name(name: &ObjectName) -> String {
    name.0
        .last()
        .and_then(|part| part.as_ident())
        .map(|ident| ident.value.clone())
        .unwrap_or_default()
}

fn index_column_name(column: &IndexColumn) -> String {
    match &column.column.expr {
        Expr::Identifier(ident) => ident.value.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(sql: &str) -> TableMetadata {
        let mut tables = parse_schema(sql, SqlDialect::Mysql).unwrap();
        assert_eq!(tables.len(), 1);
        tables.remove(0)
    }

    #[test]
    fn test_columns_in_declaration_order() {
        let table = parse_one(
            "CREATE TABLE users (
                id BIGINT AUTO_INCREMENT PRIMARY KEY,
                username VARCHAR(255) NOT NULL,
                email VARCHAR(255)
            );",
        );
        assert_eq!(table.name, "users");
        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "username", "email"]);
        assert_eq!(table.primary_key.unwrap().columns, vec!["id"]);
    }

    #[test]
    fn test_named_indexes() {
        let table = parse_one(
            "CREATE TABLE posts (
                id BIGINT PRIMARY KEY,
                user_id BIGINT NOT NULL,
                title VARCHAR(255) NOT NULL,
                INDEX idx_user (user_id),
                UNIQUE KEY uk_title (title)
            );",
        );
        let user = table.indexes.iter().find(|i| i.name == "idx_user").unwrap();
        assert!(!user.unique);
        assert_eq!(user.columns, vec!["user_id"]);
        let title = table.indexes.iter().find(|i| i.name == "uk_title").unwrap();
        assert!(title.unique);
    }

    #[test]
    fn test_enum_values() {
        let table = parse_one(
            "CREATE TABLE items (
                id BIGINT PRIMARY KEY,
                status ENUM('ACTIVE', 'INACTIVE', 'PENDING') NOT NULL
            );",
        );
        let status = table.get_column("status").unwrap();
        assert!(status.is_enum());
        assert_eq!(
            status.enum_values.as_deref().unwrap(),
            ["ACTIVE", "INACTIVE", "PENDING"]
        );
        assert!(!table.get_column("id").unwrap().is_enum());
    }

    #[test]
    fn test_foreign_keys() {
        let table = parse_one(
            "CREATE TABLE orders (
                id BIGINT PRIMARY KEY,
                user_id BIGINT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id)
            );",
        );
        let fk = table.foreign_key_for("user_id").unwrap();
        assert_eq!(fk.referenced_table, "users");
        assert_eq!(fk.referenced_column, "id");
        assert!(table.foreign_key_for("id").is_none());
    }

    #[test]
    fn test_composite_key_columns_not_null() {
        let table = parse_one(
            "CREATE TABLE order_items (
                order_id BIGINT,
                product_id BIGINT,
                quantity INT,
                PRIMARY KEY (order_id, product_id)
            );",
        );
        let pk = table.primary_key.as_ref().unwrap();
        assert!(pk.is_composite());
        assert_eq!(pk.columns, vec!["order_id", "product_id"]);
        assert!(!table.get_column("order_id").unwrap().nullable);
        assert!(!table.get_column("product_id").unwrap().nullable);
        assert!(table.get_column("quantity").unwrap().nullable);
    }

    #[test]
    fn test_parse_auto_increment_and_comment() {
        let sql = r#"
            CREATE TABLE users (
                id BIGINT NOT NULL AUTO_INCREMENT COMMENT 'surrogate key',
                name VARCHAR(64),
                PRIMARY KEY (id)
            );
        "#;

        let tables = parse_schema(sql, SqlDialect::Mysql).unwrap();
        let id = tables[0].get_column("id").unwrap();
        assert!(id.is_auto_increment);
        assert!(!id.nullable);
        assert_eq!(id.comment.as_deref(), Some("surrogate key"));
        assert!(tables[0].get_column("name").unwrap().nullable);
    }

    #[test]
    fn test_parse_postgres_serial() {
        let sql = r#"
            CREATE TABLE accounts (
                id BIGSERIAL PRIMARY KEY,
                created_at TIMESTAMP NOT NULL DEFAULT now()
            );
        "#;

        let tables = parse_schema(sql, SqlDialect::Postgres).unwrap();
        let id = tables[0].get_column("id").unwrap();
        assert!(id.is_auto_increment);
        assert!(tables[0].is_primary_key_column("id"));
        let created = tables[0].get_column("created_at").unwrap();
        assert!(!created.is_auto_increment);
        assert!(created.default_value.is_some());
    }

    #[test]
    fn test_parse_ignores_other_statements() {
        let sql = r#"
            DROP TABLE IF EXISTS tags;
            CREATE TABLE tags (id INT PRIMARY KEY, label VARCHAR(32) NOT NULL);
            CREATE INDEX idx_label ON tags (label);
        "#;

        let tables = parse_schema(sql, SqlDialect::Generic).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name, "tags");
    }

    #[test]
    fn test_inline_keys_and_generated_index_names() {
        let sql = r#"
            CREATE TABLE tags (
                id INT PRIMARY KEY,
                slug VARCHAR(32) UNIQUE,
                owner_id BIGINT,
                label VARCHAR(32),
                UNIQUE (owner_id, label),
                INDEX (label)
            );
        "#;

        let tables = parse_schema(sql, SqlDialect::Mysql).unwrap();
        let names: Vec<(&str, bool)> = tables[0]
            .indexes
            .iter()
            .map(|i| (i.name.as_str(), i.unique))
            .collect();
        assert_eq!(
            names,
            vec![
                ("uk_slug", true),
                ("uk_owner_id_label", true),
                ("idx_label", false)
            ]
        );
        assert!(!tables[0].get_column("id").unwrap().nullable);
    }

    #[test]
    fn test_schema_qualified_foreign_key() {
        let sql = r#"
            CREATE TABLE shop.order_lines (
                order_id BIGINT NOT NULL,
                FOREIGN KEY (order_id) REFERENCES shop.orders(id)
            );
        "#;

        let tables = parse_schema(sql, SqlDialect::Postgres).unwrap();
        assert_eq!(tables[0].name, "order_lines");
        let fk = tables[0].foreign_key_for("order_id").unwrap();
        assert_eq!(fk.referenced_table, "orders");
        assert_eq!(fk.referenced_column, "id");
    }

    #[test]
    fn test_parse_error() {
        assert!(parse_schema("CREATE TABLE (", SqlDialect::Mysql).is_err());
    }
}
