//! Fields, methods, parameters and initialization blocks

use super::types::FullyQualifiedJavaType;
use crate::error::DomError;

/// Access modifier of a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JavaVisibility {
    #[default]
    Public,
    Protected,
    Private,
    /// Package-private (no modifier)
    Default,
}

impl JavaVisibility {
    /// Keyword followed by a space, or nothing for package-private
    pub fn keyword(&self) -> &'static str {
        match self {
            JavaVisibility::Public => "public ",
            JavaVisibility::Protected => "protected ",
            JavaVisibility::Private => "private ",
            JavaVisibility::Default => "",
        }
    }
}

/// State shared by every declaration: Javadoc, annotations and modifiers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JavaElement {
    /// Raw Javadoc lines including the `/**` and ` */` delimiters
    pub javadoc_lines: Vec<String>,
    /// Raw annotation text, e.g. `@Override`
    pub annotations: Vec<String>,
    pub visibility: JavaVisibility,
    pub is_static: bool,
    pub is_final: bool,
}

impl JavaElement {
    pub fn add_javadoc_line(&mut self, line: impl Into<String>) {
        self.javadoc_lines.push(line.into());
    }

    pub fn add_annotation(&mut self, annotation: impl Into<String>) {
        self.annotations.push(annotation.into());
    }
}

/// A field declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub element: JavaElement,
    pub name: String,
    pub ty: FullyQualifiedJavaType,
    pub initialization_string: Option<String>,
    pub is_transient: bool,
    pub is_volatile: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: FullyQualifiedJavaType) -> Self {
        Self {
            element: JavaElement::default(),
            name: name.into(),
            ty,
            initialization_string: None,
            is_transient: false,
            is_volatile: false,
        }
    }

    pub fn signature_key(&self) -> String {
        format!("field:{}", self.name)
    }
}

/// A method or constructor parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub ty: FullyQualifiedJavaType,
    pub name: String,
    pub annotations: Vec<String>,
    pub is_varargs: bool,
}

impl Parameter {
    pub fn new(ty: FullyQualifiedJavaType, name: impl Into<String>) -> Self {
        Self {
            ty,
            name: name.into(),
            annotations: Vec::new(),
            is_varargs: false,
        }
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotations.push(annotation.into());
        self
    }

    fn key_part(&self) -> String {
        let mut key = self.ty.erased_key();
        if self.is_varargs {
            key.push_str("[]");
        }
        key
    }
}

/// A method or constructor. Body lines are opaque text; the renderer only re-indents them.
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub element: JavaElement,
    pub name: String,
    /// `None` renders as `void` (or nothing for constructors)
    pub return_type: Option<FullyQualifiedJavaType>,
    parameters: Vec<Parameter>,
    pub exceptions: Vec<FullyQualifiedJavaType>,
    pub type_parameters: Vec<String>,
    pub body_lines: Vec<String>,
    pub is_constructor: bool,
    pub is_abstract: bool,
    pub is_default: bool,
    pub is_synchronized: bool,
    pub is_native: bool,
}

impl Method {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            element: JavaElement::default(),
            name: name.into(),
            return_type: None,
            parameters: Vec::new(),
            exceptions: Vec::new(),
            type_parameters: Vec::new(),
            body_lines: Vec::new(),
            is_constructor: false,
            is_abstract: false,
            is_default: false,
            is_synchronized: false,
            is_native: false,
        }
    }

    pub fn constructor(name: impl Into<String>) -> Self {
        let mut method = Self::new(name);
        method.is_constructor = true;
        method
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Append a parameter; names must be unique within the method
    pub fn add_parameter(&mut self, parameter: Parameter) -> Result<(), DomError> {
        if self.parameters.iter().any(|p| p.name == parameter.name) {
            return Err(DomError::DuplicateParameter {
                method: self.name.clone(),
                parameter: parameter.name,
            });
        }
        self.parameters.push(parameter);
        Ok(())
    }

    pub fn add_body_line(&mut self, line: impl Into<String>) {
        self.body_lines.push(line.into());
    }

    pub fn add_body_lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.body_lines.extend(lines.into_iter().map(Into::into));
    }

    /// `method:name(A,B)` or `ctor(A,B)` using erased parameter type names
    pub fn signature_key(&self) -> String {
        let parameters: Vec<String> = self.parameters.iter().map(Parameter::key_part).collect();
        if self.is_constructor {
            format!("ctor({})", parameters.join(","))
        } else {
            format!("method:{}({})", self.name, parameters.join(","))
        }
    }
}

/// A static or instance initializer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitializationBlock {
    pub is_static: bool,
    pub javadoc_lines: Vec<String>,
    pub body_lines: Vec<String>,
}

impl InitializationBlock {
    pub fn new(is_static: bool) -> Self {
        Self {
            is_static,
            ..Default::default()
        }
    }

    pub fn add_body_line(&mut self, line: impl Into<String>) {
        self.body_lines.push(line.into());
    }
}

/// Signature key of the `ordinal`-th initializer of a type
pub(crate) fn initializer_key(is_static: bool, ordinal: usize) -> String {
    if is_static {
        format!("init:static{}", ordinal)
    } else {
        format!("init:{}", ordinal)
    }
}
