//! Fully qualified Java type names

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

const PRIMITIVES: [(&str, &str); 8] = [
    ("boolean", "java.lang.Boolean"),
    ("byte", "java.lang.Byte"),
    ("char", "java.lang.Character"),
    ("double", "java.lang.Double"),
    ("float", "java.lang.Float"),
    ("int", "java.lang.Integer"),
    ("long", "java.lang.Long"),
    ("short", "java.lang.Short"),
];

/// Wildcard form of a generic type argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wildcard {
    /// `?`
    Unbounded,
    /// `? extends T`
    Extends,
    /// `? super T`
    Super,
}

/// A Java type as it appears in declarations: package, short name, generic
/// type arguments and array dimensions.
///
/// Parsing is lenient and never fails: `java.util.Map<String, java.util.List<Long>>`,
/// `byte[][]`, `? extends Number` and `java.util.Map.Entry` are all accepted.
/// Equality, ordering and hashing follow the fully qualified text.
#[derive(Debug, Clone)]
pub struct FullyQualifiedJavaType {
    base_qualified_name: String,
    base_short_name: String,
    package_name: String,
    is_primitive: bool,
    array_dimensions: usize,
    type_arguments: Vec<FullyQualifiedJavaType>,
    wildcard: Option<Wildcard>,
}

impl FullyQualifiedJavaType {
    /// Parse a type specification
    pub fn new(spec: &str) -> Self {
        let spec = spec.trim();

        if let Some(rest) = spec.strip_prefix('?') {
            let rest = rest.trim_start();
            if rest.is_empty() {
                let mut ty = Self::simple("");
                ty.wildcard = Some(Wildcard::Unbounded);
                return ty;
            }
            if let Some(bound) = rest.strip_prefix("extends ") {
                let mut ty = Self::new(bound);
                ty.wildcard = Some(Wildcard::Extends);
                return ty;
            }
            if let Some(bound) = rest.strip_prefix("super ") {
                let mut ty = Self::new(bound);
                ty.wildcard = Some(Wildcard::Super);
                return ty;
            }
        }

        let (base, array_dimensions) = strip_array_dimensions(spec);
        let mut ty = match base.find('<') {
            Some(open) => {
                let close = base.rfind('>').filter(|c| *c > open).unwrap_or(base.len());
                let mut ty = Self::simple(&base[..open]);
                ty.type_arguments = split_type_arguments(&base[open + 1..close])
                    .into_iter()
                    .map(Self::new)
                    .collect();
                ty
            }
            None => Self::simple(base),
        };
        ty.array_dimensions = array_dimensions;
        ty
    }

    fn simple(name: &str) -> Self {
        let name: String = name.chars().filter(|c| !c.is_whitespace()).collect();

        if PRIMITIVES.iter().any(|(p, _)| *p == name) {
            return Self {
                base_short_name: name.clone(),
                base_qualified_name: name,
                package_name: String::new(),
                is_primitive: true,
                array_dimensions: 0,
                type_arguments: Vec::new(),
                wildcard: None,
            };
        }

        let (package_name, base_short_name) = split_package(&name);
        Self {
            base_qualified_name: name,
            base_short_name,
            package_name,
            is_primitive: false,
            array_dimensions: 0,
            type_arguments: Vec::new(),
            wildcard: None,
        }
    }

    pub fn int_instance() -> Self {
        Self::new("int")
    }

    pub fn boolean_primitive_instance() -> Self {
        Self::new("boolean")
    }

    pub fn string_instance() -> Self {
        Self::new("java.lang.String")
    }

    pub fn new_list_instance() -> Self {
        Self::new("java.util.List")
    }

    /// Add a generic type argument
    pub fn add_type_argument(&mut self, argument: FullyQualifiedJavaType) {
        self.type_arguments.push(argument);
    }

    /// `java.util.List<T>`
    pub fn list_of(element: FullyQualifiedJavaType) -> Self {
        let mut list = Self::new_list_instance();
        list.add_type_argument(element);
        list
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    /// Short name without package, type arguments or array brackets.
    /// Nested types keep their enclosing type (`Map.Entry`).
    pub fn base_short_name(&self) -> &str {
        &self.base_short_name
    }

    pub fn base_qualified_name(&self) -> &str {
        &self.base_qualified_name
    }

    pub fn is_primitive(&self) -> bool {
        self.is_primitive && self.array_dimensions == 0
    }

    pub fn is_array(&self) -> bool {
        self.array_dimensions > 0
    }

    pub fn array_dimensions(&self) -> usize {
        self.array_dimensions
    }

    pub fn type_arguments(&self) -> &[FullyQualifiedJavaType] {
        &self.type_arguments
    }

    pub fn wildcard(&self) -> Option<Wildcard> {
        self.wildcard
    }

    /// Whether referencing this type requires an import statement
    pub fn is_explicitly_imported(&self) -> bool {
        !self.package_name.is_empty() && self.package_name != "java.lang"
    }

    /// Fully qualified text, e.g. `java.util.List<java.lang.String>`
    pub fn full_name(&self) -> String {
        self.render_with(&|_| false)
    }

    /// Short text, e.g. `List<String>`
    pub fn short_name(&self) -> String {
        self.render_with(&|_| true)
    }

    /// Name used in method signature keys: the erased simple name plus array brackets
    pub fn erased_key(&self) -> String {
        let simple = self
            .base_short_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.base_short_name);
        format!("{}{}", simple, "[]".repeat(self.array_dimensions))
    }

    /// Qualified names this type needs imported, including those of its type arguments
    pub fn import_list(&self) -> Vec<String> {
        let mut imports = Vec::new();
        self.collect_imports(&mut imports);
        imports
    }

    fn collect_imports(&self, imports: &mut Vec<String>) {
        if self.is_explicitly_imported() {
            imports.push(self.import_name());
        }
        for argument in &self.type_arguments {
            argument.collect_imports(imports);
        }
    }

    /// The name an import statement for this type names; nested types import their outermost type
    pub(crate) fn import_name(&self) -> String {
        let outer = self
            .base_short_name
            .split('.')
            .next()
            .unwrap_or(&self.base_short_name);
        format!("{}.{}", self.package_name, outer)
    }

    /// Wrapper type of a primitive, `None` for reference types and arrays
    pub fn primitive_wrapper(&self) -> Option<FullyQualifiedJavaType> {
        if !self.is_primitive() {
            return None;
        }
        PRIMITIVES
            .iter()
            .find(|(p, _)| *p == self.base_qualified_name)
            .map(|(_, wrapper)| Self::new(wrapper))
    }

    /// Render, choosing short or qualified spelling per (sub)type
    pub(crate) fn render_with<F>(&self, use_short_name: &F) -> String
    where
        F: Fn(&FullyQualifiedJavaType) -> bool,
    {
        let mut out = String::new();
        match self.wildcard {
            Some(Wildcard::Unbounded) => return "?".to_string(),
            Some(Wildcard::Extends) => out.push_str("? extends "),
            Some(Wildcard::Super) => out.push_str("? super "),
            None => {}
        }

        if use_short_name(self) {
            out.push_str(&self.base_short_name);
        } else {
            out.push_str(&self.base_qualified_name);
        }

        if !self.type_arguments.is_empty() {
            let arguments: Vec<String> = self
                .type_arguments
                .iter()
                .map(|a| a.render_with(use_short_name))
                .collect();
            out.push('<');
            out.push_str(&arguments.join(", "));
            out.push('>');
        }

        for _ in 0..self.array_dimensions {
            out.push_str("[]");
        }
        out
    }
}

fn strip_array_dimensions(spec: &str) -> (&str, usize) {
    let mut base = spec.trim_end();
    let mut dimensions = 0;
    while let Some(rest) = base.strip_suffix(']') {
        match rest.trim_end().strip_suffix('[') {
            Some(rest) => {
                base = rest.trim_end();
                dimensions += 1;
            }
            None => break,
        }
    }
    (base, dimensions)
}

/// Split `A, B<C, D>, E` on top-level commas
fn split_type_arguments(arguments: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in arguments.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(arguments[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    let last = arguments[start..].trim();
    if !last.is_empty() {
        parts.push(last);
    }
    parts
}

/// Package is every segment before the first one starting with an uppercase letter
fn split_package(name: &str) -> (String, String) {
    if !name.contains('.') {
        return (String::new(), name.to_string());
    }
    let segments: Vec<&str> = name.split('.').collect();
    let first_type = segments
        .iter()
        .position(|s| s.chars().next().is_some_and(|c| c.is_uppercase()))
        .unwrap_or(segments.len() - 1);
    (
        segments[..first_type].join("."),
        segments[first_type..].join("."),
    )
}

impl PartialEq for FullyQualifiedJavaType {
    fn eq(&self, other: &Self) -> bool {
        self.full_name() == other.full_name()
    }
}

impl Eq for FullyQualifiedJavaType {}

impl Hash for FullyQualifiedJavaType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.full_name().hash(state);
    }
}

impl PartialOrd for FullyQualifiedJavaType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FullyQualifiedJavaType {
    fn cmp(&self, other: &Self) -> Ordering {
        self.full_name().cmp(&other.full_name())
    }
}

impl fmt::Display for FullyQualifiedJavaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

impl From<&str> for FullyQualifiedJavaType {
    fn from(spec: &str) -> Self {
        Self::new(spec)
    }
}
