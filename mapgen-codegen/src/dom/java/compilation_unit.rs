//! Package-level wrapper around a top-level type

use std::collections::BTreeSet;

use super::declarations::{ClassDeclaration, EnumDeclaration, InterfaceDeclaration, TypeDeclaration};
use super::render;
use super::types::FullyQualifiedJavaType;

/// One `.java` file: a top-level type plus the imports and comments around it.
///
/// Imports for every type referenced by the declaration are derived at render
/// time; `imported_types` only needs the types mentioned in annotations or
/// body text.
#[derive(Debug, Clone, PartialEq)]
pub struct CompilationUnit {
    pub file_comment_lines: Vec<String>,
    pub imported_types: BTreeSet<FullyQualifiedJavaType>,
    /// Names after `import static`, e.g. `org.junit.Assert.assertEquals`
    pub static_imports: BTreeSet<String>,
    pub declaration: TypeDeclaration,
}

impl CompilationUnit {
    pub fn new(declaration: TypeDeclaration) -> Self {
        Self {
            file_comment_lines: Vec::new(),
            imported_types: BTreeSet::new(),
            static_imports: BTreeSet::new(),
            declaration,
        }
    }

    pub fn top_level_class(ty: FullyQualifiedJavaType) -> Self {
        Self::new(TypeDeclaration::Class(ClassDeclaration::new(ty)))
    }

    pub fn interface(ty: FullyQualifiedJavaType) -> Self {
        Self::new(TypeDeclaration::Interface(InterfaceDeclaration::new(ty)))
    }

    pub fn top_level_enum(ty: FullyQualifiedJavaType) -> Self {
        Self::new(TypeDeclaration::Enum(EnumDeclaration::new(ty)))
    }

    pub fn ty(&self) -> &FullyQualifiedJavaType {
        self.declaration.ty()
    }

    pub fn package_name(&self) -> &str {
        self.ty().package_name()
    }

    pub fn type_name(&self) -> &str {
        self.declaration.name()
    }

    /// `User.java`
    pub fn file_name(&self) -> String {
        format!("{}.java", self.type_name())
    }

    pub fn add_import(&mut self, ty: FullyQualifiedJavaType) {
        self.imported_types.insert(ty);
    }

    pub fn add_static_import(&mut self, name: impl Into<String>) {
        self.static_imports.insert(name.into());
    }

    pub fn add_file_comment_line(&mut self, line: impl Into<String>) {
        self.file_comment_lines.push(line.into());
    }

    /// Render the whole file
    pub fn render(&self) -> String {
        render::UnitParts::of(self).into_layout().render()
    }
}
