//! Mapper generator - builds the MyBatis mapper interface per table

use tracing::debug;

use crate::dom::java::{
    CompilationUnit, FullyQualifiedJavaType, InterfaceDeclaration, Method, Parameter,
    TypeDeclaration,
};
use crate::error::Result;
use crate::merge::GeneratedMarker;

use super::introspected::{IntrospectedColumn, IntrospectedTable};
use super::naming::by_columns_method_name;

const PARAM_ANNOTATION: &str = "org.apache.ibatis.annotations.Param";

/// Build the mapper interface for a table. Statement ids in the XML mapper
/// use the same method names.
pub fn build_mapper(table: &IntrospectedTable, marker: &GeneratedMarker) -> Result<CompilationUnit> {
    debug!("Building mapper {}", table.mapper_type.full_name());

    let mut interface = InterfaceDeclaration::new(table.mapper_type.clone());
    let key = table.primary_key_columns();
    let mut needs_param_import = false;

    if !key.is_empty() {
        let mut delete = Method::new(method_names::DELETE_BY_PRIMARY_KEY);
        delete.return_type = Some(FullyQualifiedJavaType::int_instance());
        needs_param_import |= add_key_parameters(&mut delete, &key)?;
        push(&mut interface, delete, marker)?;
    }

    let mut insert = Method::new(method_names::INSERT);
    insert.return_type = Some(FullyQualifiedJavaType::int_instance());
    insert.add_parameter(Parameter::new(table.model_type.clone(), "row"))?;
    push(&mut interface, insert, marker)?;

    if !key.is_empty() {
        let mut select = Method::new(method_names::SELECT_BY_PRIMARY_KEY);
        select.return_type = Some(table.model_type.clone());
        needs_param_import |= add_key_parameters(&mut select, &key)?;
        push(&mut interface, select, marker)?;
    }

    for columns in table.unique_keys() {
        let names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();
        let mut select = Method::new(by_columns_method_name("select", &names));
        select.return_type = Some(table.model_type.clone());
        needs_param_import |= add_key_parameters(&mut select, &columns)?;
        push(&mut interface, select, marker)?;
    }

    let mut select_all = Method::new(method_names::SELECT_ALL);
    select_all.return_type = Some(FullyQualifiedJavaType::list_of(table.model_type.clone()));
    push(&mut interface, select_all, marker)?;

    if !key.is_empty() && !table.non_primary_key_columns().is_empty() {
        let mut update = Method::new(method_names::UPDATE_BY_PRIMARY_KEY);
        update.return_type = Some(FullyQualifiedJavaType::int_instance());
        update.add_parameter(Parameter::new(table.model_type.clone(), "row"))?;
        push(&mut interface, update, marker)?;
    }

    let mut unit = CompilationUnit::new(TypeDeclaration::Interface(interface));
    if needs_param_import {
        unit.add_import(FullyQualifiedJavaType::new(PARAM_ANNOTATION));
    }
    Ok(unit)
}

/// Statement and method names shared with the XML mapper
pub(crate) mod method_names {
    pub const DELETE_BY_PRIMARY_KEY: &str = "deleteByPrimaryKey";
    pub const INSERT: &str = "insert";
    pub const SELECT_BY_PRIMARY_KEY: &str = "selectByPrimaryKey";
    pub const SELECT_ALL: &str = "selectAll";
    pub const UPDATE_BY_PRIMARY_KEY: &str = "updateByPrimaryKey";
}

fn push(
    interface: &mut InterfaceDeclaration,
    mut method: Method,
    marker: &GeneratedMarker,
) -> Result<()> {
    marker.tag_as_generated(&mut method);
    interface.add_member(method)?;
    Ok(())
}

/// Add one parameter per key column. More than one parameter needs `@Param`
/// names for the XML placeholders; returns whether any were added.
fn add_key_parameters(method: &mut Method, columns: &[&IntrospectedColumn]) -> Result<bool> {
    let annotate = columns.len() > 1;
    for column in columns {
        let mut parameter = Parameter::new(column.java_type.clone(), &column.property);
        if annotate {
            parameter = parameter.with_annotation(format!("@Param(\"{}\")", column.property));
        }
        method.add_parameter(parameter)?;
    }
    Ok(annotate)
}
