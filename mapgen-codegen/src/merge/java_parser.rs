//! Syntactic parse of an existing Java file with tree-sitter-java
//!
//! Only structure is recovered: declaration boundaries, their leading
//! comments and their provenance. Everything is captured as verbatim text so
//! retained declarations are written back exactly as found.

use std::collections::HashSet;

use tree_sitter::{Node, Parser};

use super::provenance::{Provenance, ProvenanceTags};
use crate::error::MergeError;

const TYPE_DECLARATION_KINDS: [&str; 5] = [
    "class_declaration",
    "interface_declaration",
    "enum_declaration",
    "record_declaration",
    "annotation_type_declaration",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImportDeclaration {
    /// Imported name without `import`, `static` or `;`, e.g. `java.util.*`
    pub name: String,
    pub is_static: bool,
}

impl ImportDeclaration {
    pub fn is_wildcard(&self) -> bool {
        self.name.ends_with(".*")
    }

    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

/// A member, or a run of loose comments, of the merged type's body
#[derive(Debug, Clone)]
pub(crate) struct ExistingMember {
    /// Signature keys, one per declarator of a field; empty for loose comments
    /// and unrecognised declarations
    pub keys: Vec<String>,
    /// Verbatim text from the start of the first leading comment's line
    pub text: String,
    pub provenance: Provenance,
    pub identifiers: HashSet<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct VerbatimBlock {
    pub text: String,
    pub identifiers: HashSet<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct ExistingType {
    pub name: String,
    /// Leading comments, annotations and declaration line through the opening `{`
    pub header: VerbatimBlock,
    pub header_provenance: Provenance,
    /// Enum constants through the terminating `;`
    pub constants: Option<VerbatimBlock>,
    pub members: Vec<ExistingMember>,
}

#[derive(Debug, Clone)]
pub(crate) struct ExistingJavaFile {
    pub file_comment: Option<String>,
    pub imports: Vec<ImportDeclaration>,
    pub main_type: ExistingType,
    /// Other top-level declarations, kept verbatim after the main type
    pub trailer: Option<VerbatimBlock>,
}

/// Parse `source` and locate the top-level type named `type_name`
pub(crate) fn parse_java_file(
    source: &str,
    type_name: &str,
    tags: &ProvenanceTags,
) -> Result<ExistingJavaFile, MergeError> {
    let mut parser = Parser::new();
    let language: tree_sitter::Language = tree_sitter_java::LANGUAGE.into();
    parser
        .set_language(&language)
        .map_err(|e| MergeError::Unparseable(e.to_string()))?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| MergeError::Unparseable("parser produced no tree".to_string()))?;

    let root = tree.root_node();
    if root.has_error() {
        let line = first_error(root).map(|n| n.start_position().row + 1).unwrap_or(1);
        return Err(MergeError::Unparseable(format!("syntax error near line {}", line)));
    }

    let mut file_comment = None;
    let mut imports = Vec::new();
    let mut pending_comments: Vec<Node> = Vec::new();
    let mut main_type = None;
    let mut others: Vec<VerbatimBlock> = Vec::new();

    let mut cursor = root.walk();
    let children: Vec<Node> = root.children(&mut cursor).collect();
    for child in children {
        match child.kind() {
            "line_comment" | "block_comment" => pending_comments.push(child),
            "package_declaration" => {
                if let (Some(first), Some(last)) = (pending_comments.first(), pending_comments.last()) {
                    file_comment = Some(source[first.start_byte()..last.end_byte()].to_string());
                }
                pending_comments.clear();
            }
            "import_declaration" => {
                imports.push(parse_import(text_of(child, source)));
                pending_comments.clear();
            }
            kind if TYPE_DECLARATION_KINDS.contains(&kind) => {
                let name = child
                    .child_by_field_name("name")
                    .map(|n| text_of(n, source))
                    .unwrap_or_default();
                if name == type_name && main_type.is_none() {
                    main_type = Some(parse_type(child, &pending_comments, source, tags));
                } else {
                    let start = pending_comments.first().map(|c| c.start_byte()).unwrap_or(child.start_byte());
                    others.push(verbatim(child, start, child.end_byte(), source));
                }
                pending_comments.clear();
            }
            _ => {}
        }
    }

    let main_type = main_type.ok_or_else(|| MergeError::MissingType(type_name.to_string()))?;

    // comments left after the last declaration stay with the trailer
    for comment in pending_comments {
        others.push(VerbatimBlock {
            text: verbatim_text(comment.start_byte(), comment.end_byte(), source),
            identifiers: HashSet::new(),
        });
    }
    let trailer = if others.is_empty() {
        None
    } else {
        let mut identifiers = HashSet::new();
        let mut texts = Vec::new();
        for block in others {
            identifiers.extend(block.identifiers);
            texts.push(block.text.trim_start().to_string());
        }
        Some(VerbatimBlock {
            text: texts.join("\n\n"),
            identifiers,
        })
    };

    Ok(ExistingJavaFile {
        file_comment,
        imports,
        main_type,
        trailer,
    })
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

fn text_of<'s>(node: Node, source: &'s str) -> &'s str {
    &source[node.byte_range()]
}

fn parse_import(text: &str) -> ImportDeclaration {
    let body = text
        .trim()
        .trim_start_matches("import")
        .trim_end_matches(';')
        .trim();
    let (is_static, name) = match body.strip_prefix("static") {
        Some(rest) if rest.starts_with(char::is_whitespace) => (true, rest),
        _ => (false, body),
    };
    ImportDeclaration {
        name: name.chars().filter(|c| !c.is_whitespace()).collect(),
        is_static,
    }
}

/// `source[start..end]` widened to the start of its line when only whitespace precedes it
fn verbatim_text(start: usize, end: usize, source: &str) -> String {
    let line_start = source[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    if source[line_start..start].trim().is_empty() {
        source[line_start..end].trim_end().to_string()
    } else {
        format!("    {}", source[start..end].trim_end())
    }
}

fn verbatim(node: Node, start: usize, end: usize, source: &str) -> VerbatimBlock {
    let mut identifiers = HashSet::new();
    collect_identifiers(node, source, &mut identifiers);
    VerbatimBlock {
        text: verbatim_text(start, end, source),
        identifiers,
    }
}

fn collect_identifiers(node: Node, source: &str, out: &mut HashSet<String>) {
    if matches!(node.kind(), "identifier" | "type_identifier") {
        out.insert(text_of(node, source).to_string());
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_identifiers(child, source, out);
    }
}

fn last_javadoc<'s>(comments: &[Node], source: &'s str) -> Option<&'s str> {
    comments
        .iter()
        .rev()
        .map(|c| text_of(*c, source))
        .find(|text| text.starts_with("/**"))
}

fn annotations<'s>(node: Node, source: &'s str) -> Vec<&'s str> {
    let mut cursor = node.walk();
    let Some(modifiers) = node.children(&mut cursor).find(|c| c.kind() == "modifiers") else {
        return Vec::new();
    };
    let mut cursor = modifiers.walk();
    let found = modifiers
        .children(&mut cursor)
        .filter(|c| matches!(c.kind(), "annotation" | "marker_annotation"))
        .map(|c| text_of(c, source))
        .collect();
    found
}

fn declaration_provenance(node: Node, comments: &[Node], source: &str, tags: &ProvenanceTags) -> Provenance {
    tags.provenance(last_javadoc(comments, source), annotations(node, source))
}

fn parse_type(node: Node, leading: &[Node], source: &str, tags: &ProvenanceTags) -> ExistingType {
    let name = node
        .child_by_field_name("name")
        .map(|n| text_of(n, source).to_string())
        .unwrap_or_default();
    let header_provenance = declaration_provenance(node, leading, source, tags);

    let start = leading.first().map(|c| c.start_byte()).unwrap_or(node.start_byte());
    let body = node.child_by_field_name("body");
    let header_end = body.map(|b| b.start_byte() + 1).unwrap_or(node.end_byte());

    let mut header = VerbatimBlock {
        text: verbatim_text(start, header_end, source),
        identifiers: HashSet::new(),
    };
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if Some(child) != body {
            collect_identifiers(child, source, &mut header.identifiers);
        }
    }

    let (constants, members) = match body {
        Some(body) if body.kind() == "enum_body" => parse_enum_body(body, source, tags),
        Some(body) => (None, parse_members(body, source, tags)),
        None => (None, Vec::new()),
    };

    ExistingType {
        name,
        header,
        header_provenance,
        constants,
        members,
    }
}

fn parse_enum_body(
    body: Node,
    source: &str,
    tags: &ProvenanceTags,
) -> (Option<VerbatimBlock>, Vec<ExistingMember>) {
    let mut cursor = body.walk();
    let children: Vec<Node> = body.children(&mut cursor).collect();
    let declarations = children
        .iter()
        .find(|c| c.kind() == "enum_body_declarations")
        .copied();

    let first_constant = children
        .iter()
        .position(|c| c.kind() == "enum_constant");
    let region_start = match first_constant {
        // leading comments of the first constant belong to the region
        Some(index) => {
            let mut start = index;
            while start > 0 && children[start - 1].kind().ends_with("comment") {
                start -= 1;
            }
            Some(children[start].start_byte())
        }
        None => declarations.map(|d| d.start_byte()),
    };
    let region_end = match declarations {
        Some(decls) => {
            let mut cursor = decls.walk();
            let semicolon = decls.children(&mut cursor).find(|c| c.kind() == ";");
            semicolon.map(|s| s.end_byte())
        }
        None => children
            .iter()
            .rev()
            .find(|c| matches!(c.kind(), "enum_constant" | ","))
            .map(|c| c.end_byte()),
    };

    let constants = match (region_start, region_end) {
        (Some(start), Some(end)) if end > start => {
            let mut block = VerbatimBlock {
                text: verbatim_text(start, end, source),
                identifiers: HashSet::new(),
            };
            for child in &children {
                if child.kind() == "enum_constant" {
                    collect_identifiers(*child, source, &mut block.identifiers);
                }
            }
            Some(block)
        }
        _ => None,
    };

    let members = declarations
        .map(|d| parse_members(d, source, tags))
        .unwrap_or_default();
    (constants, members)
}

struct MemberSpan<'t> {
    node: Option<Node<'t>>,
    keys: Vec<String>,
    start: usize,
    end: usize,
    provenance: Provenance,
}

/// Members of a class, interface or enum body in source order
fn parse_members(body: Node, source: &str, tags: &ProvenanceTags) -> Vec<ExistingMember> {
    let mut spans: Vec<MemberSpan> = Vec::new();
    let mut pending: Vec<Node> = Vec::new();
    let mut last_end_row: Option<usize> = None;
    let mut static_initializers = 0;
    let mut instance_initializers = 0;

    let mut cursor = body.walk();
    let children: Vec<Node> = body.children(&mut cursor).collect();
    for child in children {
        if !child.is_named() {
            continue;
        }
        match child.kind() {
            "line_comment" | "block_comment" => {
                let trails_previous = pending.is_empty()
                    && last_end_row == Some(child.start_position().row);
                match spans.last_mut() {
                    Some(previous) if trails_previous => previous.end = child.end_byte(),
                    _ => pending.push(child),
                }
            }
            kind => {
                let keys = match kind {
                    "static_initializer" => {
                        static_initializers += 1;
                        vec![format!("init:static{}", static_initializers - 1)]
                    }
                    "block" => {
                        instance_initializers += 1;
                        vec![format!("init:{}", instance_initializers - 1)]
                    }
                    _ => member_keys(child, source),
                };
                spans.push(MemberSpan {
                    node: Some(child),
                    keys,
                    start: pending.first().map(|c| c.start_byte()).unwrap_or(child.start_byte()),
                    end: child.end_byte(),
                    provenance: declaration_provenance(child, &pending, source, tags),
                });
                pending.clear();
                last_end_row = Some(child.end_position().row);
            }
        }
    }

    if let (Some(first), Some(last)) = (pending.first(), pending.last()) {
        spans.push(MemberSpan {
            node: None,
            keys: Vec::new(),
            start: first.start_byte(),
            end: last.end_byte(),
            provenance: Provenance::HandWritten,
        });
    }

    spans
        .into_iter()
        .map(|span| {
            let mut identifiers = HashSet::new();
            if let Some(node) = span.node {
                collect_identifiers(node, source, &mut identifiers);
            }
            ExistingMember {
                keys: span.keys,
                text: verbatim_text(span.start, span.end, source),
                provenance: span.provenance,
                identifiers,
            }
        })
        .collect()
}

/// `int a, b;` declares two fields and yields `field:a` and `field:b`
fn member_keys(node: Node, source: &str) -> Vec<String> {
    let name = |n: Node| {
        n.child_by_field_name("name")
            .map(|name| text_of(name, source).to_string())
    };
    match node.kind() {
        "field_declaration" | "constant_declaration" => {
            let mut cursor = node.walk();
            let declarators: Vec<Node> = node
                .children_by_field_name("declarator", &mut cursor)
                .collect();
            declarators
                .into_iter()
                .filter_map(name)
                .map(|n| format!("field:{}", n))
                .collect()
        }
        "method_declaration" => {
            let parameters = parameter_keys(node, source);
            name(node)
                .map(|n| format!("method:{}({})", n, parameters))
                .into_iter()
                .collect()
        }
        "constructor_declaration" => vec![format!("ctor({})", parameter_keys(node, source))],
        kind if TYPE_DECLARATION_KINDS.contains(&kind) => name(node)
            .map(|n| format!("type:{}", n))
            .into_iter()
            .collect(),
        _ => Vec::new(),
    }
}

fn parameter_keys(node: Node, source: &str) -> String {
    let Some(parameters) = node.child_by_field_name("parameters") else {
        return String::new();
    };
    let mut cursor = parameters.walk();
    let keys: Vec<String> = parameters
        .named_children(&mut cursor)
        .filter_map(|p| match p.kind() {
            "formal_parameter" => {
                let ty = p.child_by_field_name("type")?;
                let mut key = erased_type_key(text_of(ty, source));
                if let Some(dimensions) = p.child_by_field_name("dimensions") {
                    key.push_str(&"[]".repeat(text_of(dimensions, source).matches('[').count()));
                }
                Some(key)
            }
            "spread_parameter" => {
                let mut inner = p.walk();
                let ty = p
                    .named_children(&mut inner)
                    .find(|c| c.kind() != "modifiers")?;
                Some(format!("{}[]", erased_type_key(text_of(ty, source))))
            }
            _ => None,
        })
        .collect();
    keys.join(",")
}

/// `java.util.List<String>[]` becomes `List[]`
pub(crate) fn erased_type_key(type_text: &str) -> String {
    let mut erased = String::new();
    let mut depth = 0usize;
    for c in type_text.chars().filter(|c| !c.is_whitespace()) {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            _ if depth == 0 => erased.push(c),
            _ => {}
        }
    }
    let (base, brackets) = match erased.find('[') {
        Some(i) => (&erased[..i], erased[i..].matches('[').count()),
        None => (erased.as_str(), 0),
    };
    let simple = base.rsplit('.').next().unwrap_or(base);
    format!("{}{}", simple, "[]".repeat(brackets))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"/*
 * Copyright header
 */
package com.example.model;

import java.util.List;
import static java.util.Objects.requireNonNull;

/**
 * Users table.
 *
 * @mbg.generated
 */
public class User {
    /**
     * @mbg.generated
     */
    private Long id;

    public int customField; // keep me

    /**
     * @mbg.generated do_not_delete_during_merge
     */
    public String legacy() {
        return "x";
    }

    public void addAll(List<String> names, String... more) {
    }

    static {
        System.loadLibrary("x");
    }

    // trailing note
}

class Helper {
}
"#;

    fn parse(source: &str) -> ExistingJavaFile {
        parse_java_file(source, "User", &ProvenanceTags::default()).unwrap()
    }

    #[test]
    fn test_file_structure() {
        let file = parse(SOURCE);
        assert_eq!(
            file.file_comment.as_deref(),
            Some("/*\n * Copyright header\n */")
        );
        assert_eq!(file.imports.len(), 2);
        assert_eq!(file.imports[0].name, "java.util.List");
        assert!(file.imports[1].is_static);
        assert_eq!(file.imports[1].name, "java.util.Objects.requireNonNull");
        assert_eq!(file.main_type.name, "User");
        assert_eq!(file.main_type.header_provenance, Provenance::Generated);
        assert!(file.main_type.header.text.starts_with("/**\n * Users table."));
        assert!(file.main_type.header.text.ends_with("public class User {"));
        assert_eq!(
            file.trailer.as_ref().map(|t| t.text.as_str()),
            Some("class Helper {\n}")
        );
    }

    #[test]
    fn test_members() {
        let file = parse(SOURCE);
        let members = &file.main_type.members;
        let keys: Vec<&[String]> = members.iter().map(|m| m.keys.as_slice()).collect();
        assert_eq!(
            keys,
            vec![
                &["field:id".to_string()][..],
                &["field:customField".to_string()][..],
                &["method:legacy()".to_string()][..],
                &["method:addAll(List,String[])".to_string()][..],
                &["init:static0".to_string()][..],
                &[][..],
            ]
        );

        assert_eq!(members[0].provenance, Provenance::Generated);
        assert_eq!(
            members[0].text,
            "    /**\n     * @mbg.generated\n     */\n    private Long id;"
        );
        assert_eq!(members[1].provenance, Provenance::HandWritten);
        assert_eq!(members[1].text, "    public int customField; // keep me");
        assert_eq!(members[2].provenance, Provenance::Frozen);
        assert!(members[3].identifiers.contains("List"));
        assert_eq!(members[5].text, "    // trailing note");
    }

    #[test]
    fn test_multi_declarator_field_keys() {
        let source = "package p;\n\npublic class User {\n    public int customField, id = 3, scores[];\n}\n";
        let file = parse(source);
        assert_eq!(file.main_type.members.len(), 1);
        assert_eq!(
            file.main_type.members[0].keys,
            vec![
                "field:customField".to_string(),
                "field:id".to_string(),
                "field:scores".to_string(),
            ]
        );
    }

    #[test]
    fn test_enum_constants() {
        let source = "package p;\n\npublic enum Status {\n    ACTIVE,\n    INACTIVE;\n\n    public int code() {\n        return 1;\n    }\n}\n";
        let file = parse_java_file(source, "Status", &ProvenanceTags::default()).unwrap();
        let constants = file.main_type.constants.unwrap();
        assert_eq!(constants.text, "    ACTIVE,\n    INACTIVE;");
        assert_eq!(file.main_type.members.len(), 1);
        assert_eq!(file.main_type.members[0].keys, vec!["method:code()".to_string()]);
    }

    #[test]
    fn test_syntax_error_is_unparseable() {
        let err = parse_java_file("public class User {\n  int x = ;\n", "User", &ProvenanceTags::default())
            .unwrap_err();
        assert!(matches!(err, MergeError::Unparseable(_)));
    }

    #[test]
    fn test_missing_type() {
        let err = parse_java_file("public class Other {\n}\n", "User", &ProvenanceTags::default())
            .unwrap_err();
        assert_eq!(err, MergeError::MissingType("User".to_string()));
    }

    #[test]
    fn test_erased_type_key() {
        assert_eq!(erased_type_key("java.util.Map<String, List<Long>>"), "Map");
        assert_eq!(erased_type_key("byte [ ] [ ]"), "byte[][]");
        assert_eq!(erased_type_key("Map.Entry<K,V>"), "Entry");
    }
}
