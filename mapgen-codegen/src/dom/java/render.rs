//! Text rendering for Java compilation units
//!
//! Conventions are fixed: four-space indentation, `\n` line separators, one
//! blank line between members and a trailing newline at end of file. Fresh
//! renders and merged files are both assembled through [`SourceLayout`] so a
//! unit merged into its own render reproduces it byte for byte.

use std::collections::{BTreeSet, HashMap};

use super::compilation_unit::CompilationUnit;
use super::declarations::{member_keys, Member, TypeDeclaration};
use super::elements::{Field, InitializationBlock, JavaElement, Method, Parameter};
use super::types::FullyQualifiedJavaType;

pub(crate) const JAVA_INDENT: &str = "    ";

/// Final assembly of a Java source file
#[derive(Debug, Clone, Default)]
pub(crate) struct SourceLayout {
    pub file_comment: Option<String>,
    pub package: String,
    pub static_imports: BTreeSet<String>,
    pub imports: BTreeSet<String>,
    /// Javadoc, annotations and declaration line, ending with `{`
    pub header: String,
    /// Indented blocks, joined by a blank line
    pub blocks: Vec<String>,
    /// Verbatim text following the closing brace of the main type
    pub trailer: Option<String>,
}

impl SourceLayout {
    pub fn render(&self) -> String {
        let mut out = String::new();

        if let Some(comment) = &self.file_comment {
            out.push_str(comment);
            out.push('\n');
        }
        if !self.package.is_empty() {
            out.push_str(&format!("package {};\n\n", self.package));
        }
        if !self.static_imports.is_empty() {
            for name in &self.static_imports {
                out.push_str(&format!("import static {};\n", name));
            }
            out.push('\n');
        }
        if !self.imports.is_empty() {
            for name in &self.imports {
                out.push_str(&format!("import {};\n", name));
            }
            out.push('\n');
        }

        out.push_str(&self.header);
        out.push('\n');
        if !self.blocks.is_empty() {
            out.push_str(&self.blocks.join("\n\n"));
            out.push('\n');
        }
        out.push_str("}\n");

        if let Some(trailer) = &self.trailer {
            out.push('\n');
            out.push_str(trailer);
            out.push('\n');
        }
        out
    }
}

/// A unit broken into the pieces the merge engine reconciles
#[derive(Debug, Clone)]
pub(crate) struct UnitParts {
    pub file_comment: Option<String>,
    pub package: String,
    pub static_imports: BTreeSet<String>,
    pub imports: BTreeSet<String>,
    pub header: String,
    pub constants: Option<String>,
    /// `(signature key, indented block)` in insertion order
    pub members: Vec<(String, String)>,
}

impl UnitParts {
    pub fn of(unit: &CompilationUnit) -> Self {
        Self::with_reserved_names(unit, &[])
    }

    /// Render `unit` as if `reserved` (qualified names imported by code outside
    /// the unit) were already imported: a unit type sharing a simple name with
    /// one of them is written fully qualified.
    pub fn with_reserved_names(unit: &CompilationUnit, reserved: &[String]) -> Self {
        let resolver = TypeNameResolver::for_unit(unit, reserved);
        let decl = &unit.declaration;

        let file_comment = if unit.file_comment_lines.is_empty() {
            None
        } else {
            Some(unit.file_comment_lines.join("\n"))
        };

        let members = member_keys(decl.members())
            .into_iter()
            .zip(decl.members())
            .map(|(key, member)| {
                let lines = render_member(member, &resolver, decl.is_interface());
                (key, indent_block(&lines))
            })
            .collect();

        Self {
            file_comment,
            package: unit.package_name().to_string(),
            static_imports: unit.static_imports.clone(),
            imports: resolver.imports.clone(),
            header: render_type_header(decl, &resolver).join("\n"),
            constants: render_enum_constants(decl).map(|lines| indent_block(&lines)),
            members,
        }
    }

    pub fn into_layout(self) -> SourceLayout {
        let mut blocks: Vec<String> = self.constants.into_iter().collect();
        blocks.extend(self.members.into_iter().map(|(_, block)| block));
        SourceLayout {
            file_comment: self.file_comment,
            package: self.package,
            static_imports: self.static_imports,
            imports: self.imports,
            header: self.header,
            blocks,
            trailer: None,
        }
    }
}

/// Decides, per referenced type, between the imported short name and the
/// fully qualified name.
///
/// Simple names are claimed first by the unit's own type, then by reserved
/// names, then by referenced types in sorted order; a later type whose simple
/// name is already claimed is written fully qualified and not imported.
#[derive(Debug, Clone)]
pub(crate) struct TypeNameResolver {
    claimed: HashMap<String, String>,
    imports: BTreeSet<String>,
}

impl TypeNameResolver {
    pub fn for_unit(unit: &CompilationUnit, reserved: &[String]) -> Self {
        let mut referenced = Vec::new();
        collect_declaration_types(&unit.declaration, &mut referenced);
        referenced.extend(unit.imported_types.iter().cloned());

        let mut candidates: BTreeSet<String> = BTreeSet::new();
        for ty in &referenced {
            candidates.extend(ty.import_list());
        }

        let own = unit.ty();
        let own_name = if own.package_name().is_empty() {
            own.base_short_name().to_string()
        } else {
            own.import_name()
        };

        let mut claimed = HashMap::new();
        claimed.insert(simple_name(&own_name).to_string(), own_name);
        for name in reserved {
            claimed
                .entry(simple_name(name).to_string())
                .or_insert_with(|| name.clone());
        }

        let mut imports = BTreeSet::new();
        for candidate in candidates {
            let simple = simple_name(&candidate).to_string();
            match claimed.get(&simple).cloned() {
                Some(existing) if existing != candidate => continue,
                Some(_) => {}
                None => {
                    claimed.insert(simple, candidate.clone());
                }
            }
            if package_of(&candidate) != unit.package_name() {
                imports.insert(candidate);
            }
        }

        Self { claimed, imports }
    }

    fn uses_short_name(&self, ty: &FullyQualifiedJavaType) -> bool {
        if !ty.is_explicitly_imported() {
            return true;
        }
        let name = ty.import_name();
        self.claimed.get(simple_name(&name)) == Some(&name)
    }

    pub fn name(&self, ty: &FullyQualifiedJavaType) -> String {
        ty.render_with(&|t: &FullyQualifiedJavaType| self.uses_short_name(t))
    }
}

fn simple_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

fn package_of(qualified: &str) -> &str {
    qualified.rsplit_once('.').map(|(p, _)| p).unwrap_or("")
}

fn collect_declaration_types(decl: &TypeDeclaration, out: &mut Vec<FullyQualifiedJavaType>) {
    match decl {
        TypeDeclaration::Class(class) => {
            out.extend(class.super_class.iter().cloned());
            out.extend(class.super_interfaces.iter().cloned());
        }
        TypeDeclaration::Interface(interface) => {
            out.extend(interface.super_interfaces.iter().cloned());
        }
        TypeDeclaration::Enum(e) => {
            out.extend(e.super_interfaces.iter().cloned());
        }
    }

    for member in decl.members() {
        match member {
            Member::Field(field) => out.push(field.ty.clone()),
            Member::Method(method) => {
                out.extend(method.return_type.iter().cloned());
                out.extend(method.parameters().iter().map(|p| p.ty.clone()));
                out.extend(method.exceptions.iter().cloned());
            }
            Member::InitializationBlock(_) => {}
            Member::Type(nested) => collect_declaration_types(nested, out),
        }
    }
}

/// Indent every non-empty line one level and join
pub(crate) fn indent_block(lines: &[String]) -> String {
    lines
        .iter()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", JAVA_INDENT, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn push_element_preamble(element: &JavaElement, lines: &mut Vec<String>) {
    lines.extend(element.javadoc_lines.iter().cloned());
    lines.extend(element.annotations.iter().cloned());
}

fn join_types(types: &[FullyQualifiedJavaType], resolver: &TypeNameResolver) -> String {
    types
        .iter()
        .map(|t| resolver.name(t))
        .collect::<Vec<_>>()
        .join(", ")
}

fn type_parameter_clause(type_parameters: &[String]) -> String {
    if type_parameters.is_empty() {
        String::new()
    } else {
        format!("<{}>", type_parameters.join(", "))
    }
}

/// Javadoc, annotations and the declaration line of a type, ending with `{`
pub(crate) fn render_type_header(decl: &TypeDeclaration, resolver: &TypeNameResolver) -> Vec<String> {
    let element = decl.element();
    let mut lines = Vec::new();
    push_element_preamble(element, &mut lines);

    let mut line = String::from(element.visibility.keyword());
    match decl {
        TypeDeclaration::Class(class) => {
            if class.is_abstract {
                line.push_str("abstract ");
            }
            if element.is_static {
                line.push_str("static ");
            }
            if element.is_final {
                line.push_str("final ");
            }
            line.push_str("class ");
            line.push_str(decl.name());
            line.push_str(&type_parameter_clause(&class.type_parameters));
            if let Some(super_class) = &class.super_class {
                line.push_str(" extends ");
                line.push_str(&resolver.name(super_class));
            }
            if !class.super_interfaces.is_empty() {
                line.push_str(" implements ");
                line.push_str(&join_types(&class.super_interfaces, resolver));
            }
        }
        TypeDeclaration::Interface(interface) => {
            if element.is_static {
                line.push_str("static ");
            }
            line.push_str("interface ");
            line.push_str(decl.name());
            line.push_str(&type_parameter_clause(&interface.type_parameters));
            if !interface.super_interfaces.is_empty() {
                line.push_str(" extends ");
                line.push_str(&join_types(&interface.super_interfaces, resolver));
            }
        }
        TypeDeclaration::Enum(e) => {
            if element.is_static {
                line.push_str("static ");
            }
            line.push_str("enum ");
            line.push_str(decl.name());
            if !e.super_interfaces.is_empty() {
                line.push_str(" implements ");
                line.push_str(&join_types(&e.super_interfaces, resolver));
            }
        }
    }
    line.push_str(" {");
    lines.push(line);
    lines
}

/// Enum constant lines, the last terminated by `;`
pub(crate) fn render_enum_constants(decl: &TypeDeclaration) -> Option<Vec<String>> {
    let TypeDeclaration::Enum(e) = decl else {
        return None;
    };
    if e.enum_constants.is_empty() {
        return if e.members().is_empty() {
            None
        } else {
            Some(vec![";".to_string()])
        };
    }
    let last = e.enum_constants.len() - 1;
    Some(
        e.enum_constants
            .iter()
            .enumerate()
            .map(|(i, c)| if i == last { format!("{};", c) } else { format!("{},", c) })
            .collect(),
    )
}

/// Complete lines of a nested type, relative to its own indentation
fn render_type_declaration(decl: &TypeDeclaration, resolver: &TypeNameResolver) -> Vec<String> {
    let mut lines = render_type_header(decl, resolver);
    let mut blocks: Vec<Vec<String>> = render_enum_constants(decl).into_iter().collect();
    blocks.extend(
        decl.members()
            .iter()
            .map(|m| render_member(m, resolver, decl.is_interface())),
    );

    for (i, block) in blocks.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.extend(block.iter().map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", JAVA_INDENT, line)
            }
        }));
    }
    lines.push("}".to_string());
    lines
}

/// Lines of a member, relative to the member's own indentation
pub(crate) fn render_member(member: &Member, resolver: &TypeNameResolver, in_interface: bool) -> Vec<String> {
    match member {
        Member::Field(field) => render_field(field, resolver),
        Member::Method(method) => render_method(method, resolver, in_interface),
        Member::InitializationBlock(block) => render_initialization_block(block),
        Member::Type(decl) => render_type_declaration(decl, resolver),
    }
}

fn render_field(field: &Field, resolver: &TypeNameResolver) -> Vec<String> {
    let element = &field.element;
    let mut lines = Vec::new();
    push_element_preamble(element, &mut lines);

    let mut line = String::from(element.visibility.keyword());
    if element.is_static {
        line.push_str("static ");
    }
    if element.is_final {
        line.push_str("final ");
    }
    if field.is_transient {
        line.push_str("transient ");
    }
    if field.is_volatile {
        line.push_str("volatile ");
    }
    line.push_str(&resolver.name(&field.ty));
    line.push(' ');
    line.push_str(&field.name);
    if let Some(init) = &field.initialization_string {
        line.push_str(" = ");
        line.push_str(init);
    }
    line.push(';');
    lines.push(line);
    lines
}

fn render_parameter(parameter: &Parameter, resolver: &TypeNameResolver) -> String {
    let mut out = String::new();
    for annotation in &parameter.annotations {
        out.push_str(annotation);
        out.push(' ');
    }
    out.push_str(&resolver.name(&parameter.ty));
    if parameter.is_varargs {
        out.push_str("...");
    }
    out.push(' ');
    out.push_str(&parameter.name);
    out
}

fn method_has_body(method: &Method, in_interface: bool) -> bool {
    if in_interface {
        method.is_default
            || method.element.is_static
            || method.element.visibility == super::JavaVisibility::Private
    } else {
        !method.is_abstract && !method.is_native
    }
}

fn render_method(method: &Method, resolver: &TypeNameResolver, in_interface: bool) -> Vec<String> {
    let element = &method.element;
    let mut lines = Vec::new();
    push_element_preamble(element, &mut lines);

    let mut line = String::new();
    if !(in_interface && element.visibility == super::JavaVisibility::Public) {
        line.push_str(element.visibility.keyword());
    }
    if method.is_abstract && !in_interface {
        line.push_str("abstract ");
    }
    if method.is_default {
        line.push_str("default ");
    }
    if element.is_static {
        line.push_str("static ");
    }
    if element.is_final {
        line.push_str("final ");
    }
    if method.is_synchronized {
        line.push_str("synchronized ");
    }
    if method.is_native {
        line.push_str("native ");
    }
    if !method.type_parameters.is_empty() {
        line.push_str(&type_parameter_clause(&method.type_parameters));
        line.push(' ');
    }
    if !method.is_constructor {
        match &method.return_type {
            Some(ty) => line.push_str(&resolver.name(ty)),
            None => line.push_str("void"),
        }
        line.push(' ');
    }
    line.push_str(&method.name);
    line.push('(');
    line.push_str(
        &method
            .parameters()
            .iter()
            .map(|p| render_parameter(p, resolver))
            .collect::<Vec<_>>()
            .join(", "),
    );
    line.push(')');
    if !method.exceptions.is_empty() {
        line.push_str(" throws ");
        line.push_str(&join_types(&method.exceptions, resolver));
    }

    if method_has_body(method, in_interface) {
        line.push_str(" {");
        lines.push(line);
        lines.extend(render_body_lines(&method.body_lines));
        lines.push("}".to_string());
    } else {
        line.push(';');
        lines.push(line);
    }
    lines
}

fn render_initialization_block(block: &InitializationBlock) -> Vec<String> {
    let mut lines = block.javadoc_lines.clone();
    lines.push(if block.is_static { "static {" } else { "{" }.to_string());
    lines.extend(render_body_lines(&block.body_lines));
    lines.push("}".to_string());
    lines
}

/// Re-indent opaque body lines one level inside their enclosing braces.
///
/// A line starting with `}` closes a level before it is written, a line ending
/// with `{` opens one after. `case`/`default:` labels indent the statements that
/// follow until `break;` or the end of the switch.
fn render_body_lines(body_lines: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(body_lines.len());
    let mut depth = 1usize;
    let mut open_cases: Vec<usize> = Vec::new();

    for raw in body_lines {
        let line = raw.trim();
        if line.is_empty() {
            out.push(String::new());
            continue;
        }

        let is_label = (line.starts_with("case ") || line.starts_with("default:")) && line.ends_with(':');

        if line.starts_with('}') {
            if open_cases.last() == Some(&depth) {
                open_cases.pop();
                depth -= 1;
            }
            depth = depth.saturating_sub(1).max(1);
        } else if is_label && open_cases.last() == Some(&depth) {
            // fall-through label: close the previous case first
            open_cases.pop();
            depth -= 1;
        }

        out.push(format!("{}{}", JAVA_INDENT.repeat(depth), line));

        if line.ends_with('{') {
            depth += 1;
        }
        if is_label {
            depth += 1;
            open_cases.push(depth);
        } else if line == "break;" && open_cases.last() == Some(&depth) {
            open_cases.pop();
            depth -= 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::java::{
        ClassDeclaration, EnumDeclaration, Field, InterfaceDeclaration, JavaVisibility, Method,
        Parameter,
    };

    fn user_class() -> CompilationUnit {
        let mut unit = CompilationUnit::top_level_class("com.example.model.User".into());
        let TypeDeclaration::Class(class) = &mut unit.declaration else {
            unreachable!()
        };
        let mut id = Field::new("id", "java.lang.Long".into());
        id.element.visibility = JavaVisibility::Private;
        class.add_member(id).unwrap();

        let mut getter = Method::new("getId");
        getter.return_type = Some("java.lang.Long".into());
        getter.add_body_line("return id;");
        class.add_member(getter).unwrap();
        unit
    }

    #[test]
    fn test_render_simple_class() {
        let expected = "package com.example.model;\n\
                        \n\
                        public class User {\n\
                        \x20   private Long id;\n\
                        \n\
                        \x20   public Long getId() {\n\
                        \x20       return id;\n\
                        \x20   }\n\
                        }\n";
        assert_eq!(user_class().render(), expected);
    }

    #[test]
    fn test_imports_sorted_and_deduplicated() {
        let mut unit = CompilationUnit::top_level_class("com.example.model.Order".into());
        let TypeDeclaration::Class(class) = &mut unit.declaration else {
            unreachable!()
        };
        class
            .add_member(Field::new("items", "java.util.List<com.example.model.Item>".into()))
            .unwrap();
        class
            .add_member(Field::new("tags", "java.util.List<java.lang.String>".into()))
            .unwrap();
        class
            .add_member(Field::new("created", "java.time.LocalDateTime".into()))
            .unwrap();
        class
            .add_member(Field::new("total", "java.math.BigDecimal".into()))
            .unwrap();

        let rendered = unit.render();
        let imports: Vec<&str> = rendered.lines().filter(|l| l.starts_with("import ")).collect();
        assert_eq!(
            imports,
            vec![
                "import java.math.BigDecimal;",
                "import java.time.LocalDateTime;",
                "import java.util.List;",
            ]
        );
        assert!(rendered.contains("public List<Item> items;"));
    }

    #[test]
    fn test_colliding_simple_name_rendered_qualified() {
        let mut unit = CompilationUnit::top_level_class("com.example.model.Date".into());
        let TypeDeclaration::Class(class) = &mut unit.declaration else {
            unreachable!()
        };
        class
            .add_member(Field::new("value", "java.util.Date".into()))
            .unwrap();
        let rendered = unit.render();
        assert!(!rendered.contains("import java.util.Date;"));
        assert!(rendered.contains("public java.util.Date value;"));
    }

    #[test]
    fn test_interface_methods() {
        let mut unit = CompilationUnit::interface("com.example.mapper.UserMapper".into());
        let TypeDeclaration::Interface(interface) = &mut unit.declaration else {
            unreachable!()
        };
        let mut select = Method::new("selectByPrimaryKey");
        select.return_type = Some("com.example.model.User".into());
        select
            .add_parameter(Parameter::new("java.lang.Long".into(), "id"))
            .unwrap();
        interface.add_member(select).unwrap();

        let mut count = Method::new("isEmpty");
        count.is_default = true;
        count.return_type = Some("boolean".into());
        count.add_body_line("return false;");
        interface.add_member(count).unwrap();

        let rendered = unit.render();
        assert!(rendered.contains("import com.example.model.User;\n"));
        assert!(rendered.contains("public interface UserMapper {\n"));
        assert!(rendered.contains("    User selectByPrimaryKey(Long id);\n"));
        assert!(rendered.contains("    default boolean isEmpty() {\n        return false;\n    }\n"));
    }

    #[test]
    fn test_body_lines_reindented() {
        let lines: Vec<String> = [
            "switch (kind) {",
            "case 1:",
            "x = 1;",
            "break;",
            "default:",
            "x = 2;",
            "}",
            "if (x > 1) {",
            "return x;",
            "}",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        assert_eq!(
            render_body_lines(&lines),
            vec![
                "    switch (kind) {",
                "        case 1:",
                "            x = 1;",
                "            break;",
                "        default:",
                "            x = 2;",
                "    }",
                "    if (x > 1) {",
                "        return x;",
                "    }",
            ]
        );
    }

    #[test]
    fn test_nested_enum_member() {
        let mut unit = CompilationUnit::top_level_class("com.example.model.User".into());
        let mut status = EnumDeclaration::new("com.example.model.User.Status".into());
        status.element.is_static = true;
        status.add_enum_constant("ACTIVE");
        status.add_enum_constant("INACTIVE");
        unit.declaration
            .add_member(TypeDeclaration::Enum(status))
            .unwrap();

        let rendered = unit.render();
        assert!(rendered.contains(
            "    public static enum Status {\n        ACTIVE,\n        INACTIVE;\n    }\n"
        ));
    }

    #[test]
    fn test_class_header_with_supertypes() {
        let mut class = ClassDeclaration::new("com.example.model.UserKey".into());
        class.super_class = Some("com.example.base.BaseKey".into());
        class.super_interfaces.push("java.io.Serializable".into());
        let unit = CompilationUnit::new(TypeDeclaration::Class(class));
        let rendered = unit.render();
        assert!(rendered.contains("import com.example.base.BaseKey;\nimport java.io.Serializable;\n"));
        assert!(rendered.contains("public class UserKey extends BaseKey implements Serializable {\n}\n"));

        let interface = InterfaceDeclaration::new("Marker".into());
        let unit = CompilationUnit::new(TypeDeclaration::Interface(interface));
        assert_eq!(unit.render(), "public interface Marker {\n}\n");
    }
}
