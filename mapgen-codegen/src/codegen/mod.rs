//! Code generation module: per-table models, mapper interfaces and XML mappers

mod code_generator;
mod introspected;
mod mapper_generator;
mod model_generator;
mod naming;
mod type_resolver;
mod xml_mapper_generator;

pub use code_generator::*;
pub use introspected::{IntrospectedColumn, IntrospectedTable};
pub use mapper_generator::build_mapper;
pub use model_generator::build_model;
pub use naming::*;
pub use type_resolver::*;
pub use xml_mapper_generator::{build_xml_mapper, MAPPER_PUBLIC_ID, MAPPER_SYSTEM_ID};
