//! Model generator - builds a JavaBeans class per table

use tracing::debug;

use crate::dom::java::{
    ClassDeclaration, CompilationUnit, Field, FullyQualifiedJavaType, JavaVisibility, Method,
    Parameter, TypeDeclaration,
};
use crate::error::Result;
use crate::merge::GeneratedMarker;

use super::introspected::{IntrospectedColumn, IntrospectedTable};
use super::naming::{getter_name, setter_name};

/// Build the model class for a table. Every declaration carries the generated marker.
pub fn build_model(table: &IntrospectedTable, marker: &GeneratedMarker) -> Result<CompilationUnit> {
    debug!("Building model {}", table.model_type.full_name());

    let mut class = ClassDeclaration::new(table.model_type.clone());
    class.element.javadoc_lines = javadoc(
        &[format!("Table: {}", table.name())],
        table.table.comment.as_deref(),
    );
    marker.tag_as_generated(&mut class.element);

    for column in &table.columns {
        class.add_member(build_field(table, column, marker))?;
    }
    for column in &table.columns {
        class.add_member(build_getter(column, marker))?;
        class.add_member(build_setter(column, marker)?)?;
    }

    Ok(CompilationUnit::new(TypeDeclaration::Class(class)))
}

fn javadoc(summary: &[String], comment: Option<&str>) -> Vec<String> {
    let mut lines = vec!["/**".to_string()];
    lines.extend(summary.iter().map(|l| format!(" * {}", l)));
    if let Some(comment) = comment.filter(|c| !c.trim().is_empty()) {
        lines.push(" *".to_string());
        lines.extend(comment.lines().map(|l| format!(" * {}", l.trim())));
    }
    lines.push(" */".to_string());
    lines
}

fn build_field(
    table: &IntrospectedTable,
    column: &IntrospectedColumn,
    marker: &GeneratedMarker,
) -> Field {
    let mut field = Field::new(&column.property, column.java_type.clone());
    field.element.visibility = JavaVisibility::Private;
    let mut summary = vec![format!("Column: {}.{}", table.name(), column.name())];
    if let Some(fk) = table.table.foreign_key_for(column.name()) {
        summary.push(format!(
            "References: {}.{}",
            fk.referenced_table, fk.referenced_column
        ));
    }
    field.element.javadoc_lines = javadoc(&summary, column.column.comment.as_deref());
    marker.tag_as_generated(&mut field);
    field
}

fn build_getter(column: &IntrospectedColumn, marker: &GeneratedMarker) -> Method {
    let mut method = Method::new(getter_name(&column.property, &column.java_type));
    method.return_type = Some(column.java_type.clone());
    method.add_body_line(format!("return {};", column.property));
    marker.tag_as_generated(&mut method);
    method
}

fn build_setter(column: &IntrospectedColumn, marker: &GeneratedMarker) -> Result<Method> {
    let mut method = Method::new(setter_name(&column.property));
    method.add_parameter(Parameter::new(column.java_type.clone(), &column.property))?;
    if column.java_type == FullyQualifiedJavaType::string_instance() {
        method.add_body_line(format!(
            "this.{0} = {0} == null ? null : {0}.trim();",
            column.property
        ));
    } else {
        method.add_body_line(format!("this.{0} = {0};", column.property));
    }
    marker.tag_as_generated(&mut method);
    Ok(method)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CodegenConfig, SqlDialect};
    use crate::parser::parse_schema;

    fn users_model() -> String {
        let tables = parse_schema(
            r#"
            CREATE TABLE users (
                id BIGINT AUTO_INCREMENT PRIMARY KEY,
                name VARCHAR(64) NOT NULL COMMENT 'display name',
                balance DECIMAL(10,2),
                created_at DATETIME
            );
            "#,
            SqlDialect::Mysql,
        )
        .unwrap();
        let config = CodegenConfig::default();
        let table = IntrospectedTable::new(&tables[0], &config);
        build_model(&table, &GeneratedMarker::without_date())
            .unwrap()
            .render()
    }

    #[test]
    fn test_model_fields_and_accessors() {
        let rendered = users_model();
        assert!(rendered.starts_with("package com.example.model;\n\n"));
        assert!(rendered.contains("import java.math.BigDecimal;\n"));
        assert!(rendered.contains("import java.time.LocalDateTime;\n"));
        assert!(rendered.contains("public class Users {\n"));
        assert!(rendered.contains("    private Long id;\n"));
        assert!(rendered.contains("    private BigDecimal balance;\n"));
        assert!(rendered.contains("    public Long getId() {\n        return id;\n    }\n"));
        assert!(rendered.contains(
            "    public void setName(String name) {\n        this.name = name == null ? null : name.trim();\n    }\n"
        ));
        assert!(rendered.contains("     * display name\n"));
    }

    #[test]
    fn test_foreign_key_column_javadoc() {
        let tables = parse_schema(
            r#"
            CREATE TABLE orders (
                id BIGINT PRIMARY KEY,
                user_id BIGINT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id)
            );
            "#,
            SqlDialect::Mysql,
        )
        .unwrap();
        let config = CodegenConfig::default();
        let table = IntrospectedTable::new(&tables[0], &config);
        let rendered = build_model(&table, &GeneratedMarker::without_date())
            .unwrap()
            .render();

        assert!(rendered.contains(
            "     * Column: orders.user_id\n     * References: users.id\n"
        ));
        assert_eq!(rendered.matches("References:").count(), 1);
    }

    #[test]
    fn test_every_member_tagged() {
        let rendered = users_model();
        // class + 4 fields + 4 getters + 4 setters
        assert_eq!(rendered.matches("@mbg.generated").count(), 13);
    }
}
