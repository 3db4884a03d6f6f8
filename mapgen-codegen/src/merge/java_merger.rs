//! Reconciles a freshly built compilation unit with the file already on disk

use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use super::java_parser::{parse_java_file, ExistingJavaFile, ImportDeclaration};
use super::provenance::ProvenanceTags;
use super::MergeOutcome;
use crate::dom::java::render::{SourceLayout, UnitParts};
use crate::dom::java::CompilationUnit;

struct FreshMember {
    key: String,
    block: String,
    placed: bool,
}

/// Merge `unit` into `existing`, or render it fresh when there is no existing file.
///
/// Generated members of the existing file are replaced in place by their fresh
/// counterparts or dropped; everything else is kept verbatim. Fresh members
/// with no existing counterpart are appended after the existing content.
/// `\r\n` line endings of the existing file are normalised to `\n`.
pub fn merge_java_file(
    unit: &CompilationUnit,
    existing: Option<&str>,
    tags: &ProvenanceTags,
) -> MergeOutcome {
    let Some(existing) = existing else {
        return MergeOutcome::Rendered {
            content: UnitParts::of(unit).into_layout().render(),
            warnings: Vec::new(),
        };
    };

    let existing = existing.replace("\r\n", "\n");
    let parsed = match parse_java_file(&existing, unit.type_name(), tags) {
        Ok(parsed) => parsed,
        Err(err) => {
            return MergeOutcome::ParseFailed {
                reason: err.to_string(),
            }
        }
    };

    // fresh types must not take a simple name a kept import already uses
    let imports = retained_imports(&parsed, unit.type_name());
    let reserved: Vec<String> = imports
        .iter()
        .filter(|i| !i.is_static && !i.is_wildcard())
        .map(|i| i.name.clone())
        .collect();
    let fresh = UnitParts::with_reserved_names(unit, &reserved);

    let (layout, warnings) = reconcile(fresh, parsed, imports, unit.type_name());
    MergeOutcome::Rendered {
        content: layout.render(),
        warnings,
    }
}

/// Existing imports still referenced by content the merge keeps verbatim.
/// Wildcard imports are always kept.
fn retained_imports(parsed: &ExistingJavaFile, type_name: &str) -> Vec<ImportDeclaration> {
    let existing = &parsed.main_type;
    let mut referenced: HashSet<&str> = HashSet::new();

    for member in existing.members.iter().filter(|m| !m.provenance.is_generated()) {
        referenced.extend(member.identifiers.iter().map(String::as_str));
    }
    if !existing.header_provenance.is_generated() {
        referenced.extend(existing.header.identifiers.iter().map(String::as_str));
        if let Some(constants) = &existing.constants {
            referenced.extend(constants.identifiers.iter().map(String::as_str));
        }
    }
    if let Some(trailer) = &parsed.trailer {
        referenced.extend(trailer.identifiers.iter().map(String::as_str));
    }

    parsed
        .imports
        .iter()
        .filter(|import| {
            let keep = import.is_wildcard() || referenced.contains(import.simple_name());
            if !keep {
                debug!("{}: dropping unused import {}", type_name, import.name);
            }
            keep
        })
        .cloned()
        .collect()
}

fn reconcile(
    fresh: UnitParts,
    parsed: ExistingJavaFile,
    kept_imports: Vec<ImportDeclaration>,
    type_name: &str,
) -> (SourceLayout, Vec<String>) {
    let mut warnings = Vec::new();
    let existing = parsed.main_type;

    let retained_keys: HashSet<&str> = existing
        .members
        .iter()
        .filter(|m| !m.provenance.is_generated())
        .flat_map(|m| m.keys.iter().map(String::as_str))
        .collect();

    let mut fresh_members: Vec<FreshMember> = fresh
        .members
        .into_iter()
        .map(|(key, block)| {
            let shadowed = retained_keys.contains(key.as_str());
            if shadowed {
                warnings.push(format!(
                    "{}: kept existing non-generated `{}`; the generated version was not written",
                    type_name, key
                ));
            }
            FreshMember {
                key,
                block,
                placed: shadowed,
            }
        })
        .collect();

    let header_generated = existing.header_provenance.is_generated();
    let mut blocks = Vec::new();

    if header_generated {
        blocks.extend(fresh.constants);
    } else if let Some(constants) = existing.constants {
        blocks.push(constants.text);
    }

    let mut seen_generated: HashSet<String> = HashSet::new();
    for member in existing.members {
        if !member.provenance.is_generated() {
            blocks.push(member.text);
            continue;
        }

        if member.keys.is_empty() {
            debug!("{}: dropping unidentifiable generated declaration", type_name);
            continue;
        }
        for key in member.keys {
            if !seen_generated.insert(key.clone()) {
                warnings.push(format!(
                    "{}: duplicate generated member `{}`; keeping the first occurrence",
                    type_name, key
                ));
                continue;
            }
            match fresh_members.iter_mut().find(|f| !f.placed && f.key == key) {
                Some(slot) => {
                    slot.placed = true;
                    blocks.push(slot.block.clone());
                }
                None => debug!("{}: dropping generated member `{}`", type_name, key),
            }
        }
    }

    blocks.extend(
        fresh_members
            .into_iter()
            .filter(|f| !f.placed)
            .map(|f| f.block),
    );

    let header = if header_generated {
        fresh.header
    } else {
        existing.header.text
    };

    let mut imports: BTreeSet<String> = fresh.imports;
    let mut static_imports: BTreeSet<String> = fresh.static_imports;
    for import in kept_imports {
        if import.is_static {
            static_imports.insert(import.name);
        } else {
            imports.insert(import.name);
        }
    }

    let layout = SourceLayout {
        file_comment: parsed.file_comment.or(fresh.file_comment),
        package: fresh.package,
        static_imports,
        imports,
        header,
        blocks,
        trailer: parsed.trailer.map(|t| t.text),
    };
    (layout, warnings)
}
