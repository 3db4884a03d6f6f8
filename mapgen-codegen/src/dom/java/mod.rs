//! In-memory model of Java source files

mod compilation_unit;
mod declarations;
mod elements;
pub(crate) mod render;
mod types;

pub use compilation_unit::CompilationUnit;
pub use declarations::{
    ClassDeclaration, Documented, EnumDeclaration, InterfaceDeclaration, Member, TypeDeclaration,
};
pub use elements::{Field, InitializationBlock, JavaElement, JavaVisibility, Method, Parameter};
pub use types::{FullyQualifiedJavaType, Wildcard};
