//! Class, interface and enum declarations and their members

use super::elements::{initializer_key, Field, InitializationBlock, JavaElement, Method};
use super::types::FullyQualifiedJavaType;
use crate::error::DomError;

/// Anything that carries a Javadoc block
pub trait Documented {
    fn javadoc_lines(&self) -> &[String];
    fn javadoc_lines_mut(&mut self) -> &mut Vec<String>;
}

/// A member of a type body, kept in insertion order
#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Field(Field),
    Method(Method),
    InitializationBlock(InitializationBlock),
    Type(TypeDeclaration),
}

impl Member {
    /// Identity used for duplicate detection and merge placement.
    /// Initializers have no intrinsic identity and return `None`.
    pub fn signature_key(&self) -> Option<String> {
        match self {
            Member::Field(field) => Some(field.signature_key()),
            Member::Method(method) => Some(method.signature_key()),
            Member::InitializationBlock(_) => None,
            Member::Type(decl) => Some(decl.signature_key()),
        }
    }
}

/// Keys of a member list in order; initializers are numbered among themselves
pub(crate) fn member_keys(members: &[Member]) -> Vec<String> {
    let mut statics = 0;
    let mut instances = 0;
    members
        .iter()
        .map(|member| match member {
            Member::InitializationBlock(block) => {
                let counter = if block.is_static {
                    &mut statics
                } else {
                    &mut instances
                };
                let key = initializer_key(block.is_static, *counter);
                *counter += 1;
                key
            }
            other => other.signature_key().unwrap_or_default(),
        })
        .collect()
}

fn push_member(
    type_name: &str,
    members: &mut Vec<Member>,
    member: Member,
) -> Result<(), DomError> {
    if let Some(key) = member.signature_key() {
        if members.iter().any(|m| m.signature_key().as_deref() == Some(&key)) {
            return Err(DomError::DuplicateMember {
                type_name: type_name.to_string(),
                key,
            });
        }
    }
    members.push(member);
    Ok(())
}

impl From<Field> for Member {
    fn from(field: Field) -> Self {
        Member::Field(field)
    }
}

impl From<Method> for Member {
    fn from(method: Method) -> Self {
        Member::Method(method)
    }
}

impl From<InitializationBlock> for Member {
    fn from(block: InitializationBlock) -> Self {
        Member::InitializationBlock(block)
    }
}

impl From<TypeDeclaration> for Member {
    fn from(decl: TypeDeclaration) -> Self {
        Member::Type(decl)
    }
}

/// A class, top-level or nested
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDeclaration {
    pub element: JavaElement,
    pub ty: FullyQualifiedJavaType,
    pub super_class: Option<FullyQualifiedJavaType>,
    pub super_interfaces: Vec<FullyQualifiedJavaType>,
    pub type_parameters: Vec<String>,
    pub is_abstract: bool,
    members: Vec<Member>,
}

impl ClassDeclaration {
    pub fn new(ty: FullyQualifiedJavaType) -> Self {
        Self {
            element: JavaElement::default(),
            ty,
            super_class: None,
            super_interfaces: Vec::new(),
            type_parameters: Vec::new(),
            is_abstract: false,
            members: Vec::new(),
        }
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn add_member(&mut self, member: impl Into<Member>) -> Result<(), DomError> {
        push_member(&self.ty.full_name(), &mut self.members, member.into())
    }
}

/// An interface, top-level or nested
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDeclaration {
    pub element: JavaElement,
    pub ty: FullyQualifiedJavaType,
    pub super_interfaces: Vec<FullyQualifiedJavaType>,
    pub type_parameters: Vec<String>,
    members: Vec<Member>,
}

impl InterfaceDeclaration {
    pub fn new(ty: FullyQualifiedJavaType) -> Self {
        Self {
            element: JavaElement::default(),
            ty,
            super_interfaces: Vec::new(),
            type_parameters: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn add_member(&mut self, member: impl Into<Member>) -> Result<(), DomError> {
        push_member(&self.ty.full_name(), &mut self.members, member.into())
    }
}

/// An enum, top-level or nested. Constants are raw text (`ACTIVE("a")`).
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDeclaration {
    pub element: JavaElement,
    pub ty: FullyQualifiedJavaType,
    pub super_interfaces: Vec<FullyQualifiedJavaType>,
    pub enum_constants: Vec<String>,
    members: Vec<Member>,
}

impl EnumDeclaration {
    pub fn new(ty: FullyQualifiedJavaType) -> Self {
        Self {
            element: JavaElement::default(),
            ty,
            super_interfaces: Vec::new(),
            enum_constants: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn add_enum_constant(&mut self, constant: impl Into<String>) {
        self.enum_constants.push(constant.into());
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn add_member(&mut self, member: impl Into<Member>) -> Result<(), DomError> {
        push_member(&self.ty.full_name(), &mut self.members, member.into())
    }
}

/// The closed set of type declarations
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDeclaration {
    Class(ClassDeclaration),
    Interface(InterfaceDeclaration),
    Enum(EnumDeclaration),
}

impl TypeDeclaration {
    pub fn ty(&self) -> &FullyQualifiedJavaType {
        match self {
            TypeDeclaration::Class(c) => &c.ty,
            TypeDeclaration::Interface(i) => &i.ty,
            TypeDeclaration::Enum(e) => &e.ty,
        }
    }

    /// Simple name as written in the declaration (innermost segment)
    pub fn name(&self) -> &str {
        let short = self.ty().base_short_name();
        short.rsplit('.').next().unwrap_or(short)
    }

    pub fn element(&self) -> &JavaElement {
        match self {
            TypeDeclaration::Class(c) => &c.element,
            TypeDeclaration::Interface(i) => &i.element,
            TypeDeclaration::Enum(e) => &e.element,
        }
    }

    pub fn members(&self) -> &[Member] {
        match self {
            TypeDeclaration::Class(c) => c.members(),
            TypeDeclaration::Interface(i) => i.members(),
            TypeDeclaration::Enum(e) => e.members(),
        }
    }

    pub fn add_member(&mut self, member: impl Into<Member>) -> Result<(), DomError> {
        match self {
            TypeDeclaration::Class(c) => c.add_member(member),
            TypeDeclaration::Interface(i) => i.add_member(member),
            TypeDeclaration::Enum(e) => e.add_member(member),
        }
    }

    pub fn is_interface(&self) -> bool {
        matches!(self, TypeDeclaration::Interface(_))
    }

    pub fn signature_key(&self) -> String {
        format!("type:{}", self.name())
    }
}

impl Documented for JavaElement {
    fn javadoc_lines(&self) -> &[String] {
        &self.javadoc_lines
    }

    fn javadoc_lines_mut(&mut self) -> &mut Vec<String> {
        &mut self.javadoc_lines
    }
}

impl Documented for Field {
    fn javadoc_lines(&self) -> &[String] {
        &self.element.javadoc_lines
    }

    fn javadoc_lines_mut(&mut self) -> &mut Vec<String> {
        &mut self.element.javadoc_lines
    }
}

impl Documented for Method {
    fn javadoc_lines(&self) -> &[String] {
        &self.element.javadoc_lines
    }

    fn javadoc_lines_mut(&mut self) -> &mut Vec<String> {
        &mut self.element.javadoc_lines
    }
}

impl Documented for InitializationBlock {
    fn javadoc_lines(&self) -> &[String] {
        &self.javadoc_lines
    }

    fn javadoc_lines_mut(&mut self) -> &mut Vec<String> {
        &mut self.javadoc_lines
    }
}

impl Documented for TypeDeclaration {
    fn javadoc_lines(&self) -> &[String] {
        &self.element().javadoc_lines
    }

    fn javadoc_lines_mut(&mut self) -> &mut Vec<String> {
        match self {
            TypeDeclaration::Class(c) => &mut c.element.javadoc_lines,
            TypeDeclaration::Interface(i) => &mut i.element.javadoc_lines,
            TypeDeclaration::Enum(e) => &mut e.element.javadoc_lines,
        }
    }
}

impl Documented for Member {
    fn javadoc_lines(&self) -> &[String] {
        match self {
            Member::Field(f) => f.javadoc_lines(),
            Member::Method(m) => m.javadoc_lines(),
            Member::InitializationBlock(b) => b.javadoc_lines(),
            Member::Type(t) => t.javadoc_lines(),
        }
    }

    fn javadoc_lines_mut(&mut self) -> &mut Vec<String> {
        match self {
            Member::Field(f) => f.javadoc_lines_mut(),
            Member::Method(m) => m.javadoc_lines_mut(),
            Member::InitializationBlock(b) => b.javadoc_lines_mut(),
            Member::Type(t) => t.javadoc_lines_mut(),
        }
    }
}
