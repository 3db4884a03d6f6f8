//! Reconciles a fresh XML document with the mapper file already on disk

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use super::provenance::ProvenanceTags;
use super::MergeOutcome;
use crate::dom::xml::{Document, Element};
use crate::error::MergeError;

#[derive(Debug)]
struct ExistingChild {
    start: usize,
    end: usize,
    name: Option<String>,
    id: Option<String>,
    generated: bool,
}

#[derive(Debug)]
struct ExistingXml {
    root_name: String,
    children: Vec<ExistingChild>,
}

/// Merge `document` into `existing`, or render it fresh when there is no existing file.
///
/// The fresh prolog and root start tag win. Generated children of the
/// existing root are removed, fresh children come first and the remaining
/// existing children follow verbatim in their original order. `\r\n` line
/// endings of the existing file are normalised to `\n`.
pub fn merge_xml_file(
    document: &Document,
    existing: Option<&str>,
    tags: &ProvenanceTags,
    wrap_width: usize,
) -> MergeOutcome {
    let Some(existing) = existing else {
        return MergeOutcome::Rendered {
            content: document.formatted_content_with(wrap_width),
            warnings: Vec::new(),
        };
    };

    let existing = existing.replace("\r\n", "\n");
    match reconcile(document, &existing, tags, wrap_width) {
        Ok((content, warnings)) => MergeOutcome::Rendered { content, warnings },
        Err(err) => MergeOutcome::ParseFailed {
            reason: err.to_string(),
        },
    }
}

fn reconcile(
    document: &Document,
    existing: &str,
    tags: &ProvenanceTags,
    wrap_width: usize,
) -> Result<(String, Vec<String>), MergeError> {
    let parsed = parse_existing(existing, tags)?;
    let root = &document.root;
    if parsed.root_name != root.name {
        return Err(MergeError::RootMismatch {
            existing: parsed.root_name,
            fresh: root.name.clone(),
        });
    }

    let mut warnings = Vec::new();
    let retained: Vec<&ExistingChild> = parsed.children.iter().filter(|c| !c.generated).collect();

    let mut blocks = Vec::new();
    for child in root.elements() {
        if let Element::Xml(element) = child {
            let shadowed = element.attribute("id").is_some_and(|id| {
                retained
                    .iter()
                    .any(|r| r.name.as_deref() == Some(element.name.as_str()) && r.id.as_deref() == Some(id))
            });
            if shadowed {
                warnings.push(format!(
                    "kept existing non-generated <{} id=\"{}\">; the generated version was not written",
                    element.name,
                    element.attribute("id").unwrap_or_default()
                ));
                continue;
            }
        }
        blocks.push(child.formatted_content_with(1, wrap_width));
    }

    let dropped = parsed.children.len() - retained.len();
    debug!("<{}>: replacing {} generated elements", root.name, dropped);
    blocks.extend(retained.iter().map(|c| verbatim_text(existing, c.start, c.end)));

    let content = format!("{}{}\n", document.prolog(), root.render_with_blocks(0, &blocks));
    Ok((content, warnings))
}

fn verbatim_text(source: &str, start: usize, end: usize) -> String {
    let line_start = source[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    if source[line_start..start].trim().is_empty() {
        source[line_start..end].trim_end().to_string()
    } else {
        format!("  {}", source[start..end].trim_end())
    }
}

fn element_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn id_attribute(e: &BytesStart) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == b"id")
        .and_then(|a| a.unescape_value().ok().map(Cow::into_owned))
}

/// Direct children of the root element with their byte spans
fn parse_existing(source: &str, tags: &ProvenanceTags) -> Result<ExistingXml, MergeError> {
    let mut reader = Reader::from_str(source);
    let mut root_name: Option<String> = None;
    let mut children: Vec<ExistingChild> = Vec::new();
    let mut depth = 0usize;
    // set while the first node inside the current child element is still unseen
    let mut awaiting_first_node = false;

    loop {
        let before = reader.buffer_position() as usize;
        let event = reader.read_event().map_err(|e| {
            MergeError::Unparseable(format!("{} at byte {}", e, reader.error_position()))
        })?;
        let after = reader.buffer_position() as usize;

        match event {
            Event::Start(e) => {
                match depth {
                    0 => root_name = Some(element_name(&e)),
                    1 => {
                        let id = id_attribute(&e);
                        children.push(ExistingChild {
                            start: before,
                            end: after,
                            generated: id.as_deref().is_some_and(|id| tags.xml_id_is_generated(id)),
                            name: Some(element_name(&e)),
                            id,
                        });
                        awaiting_first_node = true;
                    }
                    _ => awaiting_first_node = false,
                }
                depth += 1;
            }
            Event::Empty(e) => match depth {
                0 => root_name = Some(element_name(&e)),
                1 => {
                    let id = id_attribute(&e);
                    children.push(ExistingChild {
                        start: before,
                        end: after,
                        generated: id.as_deref().is_some_and(|id| tags.xml_id_is_generated(id)),
                        name: Some(element_name(&e)),
                        id,
                    });
                }
                _ => awaiting_first_node = false,
            },
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if depth == 1 {
                    if let Some(child) = children.last_mut() {
                        child.end = after;
                    }
                    awaiting_first_node = false;
                }
            }
            Event::Comment(comment) => {
                let text = String::from_utf8_lossy(comment.as_ref());
                if depth == 1 {
                    children.push(ExistingChild {
                        start: before,
                        end: after,
                        name: None,
                        id: None,
                        generated: tags.xml_comment_is_generated(&text),
                    });
                } else if depth == 2 && awaiting_first_node {
                    if let Some(child) = children.last_mut() {
                        child.generated |= tags.xml_comment_is_generated(&text);
                    }
                    awaiting_first_node = false;
                }
            }
            Event::Text(text) => {
                if depth == 2 && !text.iter().all(|b| b.is_ascii_whitespace()) {
                    awaiting_first_node = false;
                }
            }
            Event::CData(_) => awaiting_first_node = false,
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(MergeError::Unparseable(
            "unexpected end of file inside an element".to_string(),
        ));
    }
    let root_name =
        root_name.ok_or_else(|| MergeError::Unparseable("no root element".to_string()))?;
    Ok(ExistingXml {
        root_name,
        children,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::xml::XmlElement;
    use crate::merge::provenance::GeneratedMarker;

    fn mapper_document(statements: &[(&str, &str)]) -> Document {
        let mut root = XmlElement::new("mapper").with_attribute("namespace", "com.example.UserMapper");
        for (id, sql) in statements {
            let mut select = XmlElement::new("select").with_attribute("id", *id);
            select.add_text(*sql);
            GeneratedMarker::without_date().tag_xml_element(&mut select);
            root.add_element(select);
        }
        Document::with_doctype(
            root,
            "-//mybatis.org//DTD Mapper 3.0//EN",
            "http://mybatis.org/dtd/mybatis-3-mapper.dtd",
        )
    }

    fn rendered(outcome: MergeOutcome) -> (String, Vec<String>) {
        match outcome {
            MergeOutcome::Rendered { content, warnings } => (content, warnings),
            MergeOutcome::ParseFailed { reason } => panic!("merge failed: {}", reason),
        }
    }

    #[test]
    fn test_idempotent_on_own_render() {
        let doc = mapper_document(&[("selectAll", "select * from users")]);
        let once = doc.formatted_content();
        let (twice, warnings) = rendered(merge_xml_file(
            &doc,
            Some(&once),
            &ProvenanceTags::default(),
            100,
        ));
        assert_eq!(twice, once);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_hand_written_statement_kept() {
        let old = mapper_document(&[("selectAll", "select * from users"), ("selectGone", "select 1")]);
        let mut existing = old.formatted_content();
        let custom = "  <!-- reporting -->\n  <select id=\"countActive\" resultType=\"long\" >\n    select count(*) from users where active = 1\n  </select>\n";
        let at = existing.rfind("</mapper>").unwrap();
        existing.insert_str(at, custom);

        let new = mapper_document(&[("selectAll", "select id, name from users")]);
        let (content, _) = rendered(merge_xml_file(
            &new,
            Some(&existing),
            &ProvenanceTags::default(),
            100,
        ));

        assert!(content.contains("select id, name from users"));
        assert!(!content.contains("selectGone"));
        assert!(content.contains("  <!-- reporting -->\n  <select id=\"countActive\" resultType=\"long\" >"));
        assert!(content.find("selectAll").unwrap() < content.find("countActive").unwrap());
        assert!(content.ends_with("  </select>\n</mapper>\n"));
    }

    #[test]
    fn test_crlf_existing_file_normalised() {
        let old = mapper_document(&[("selectAll", "select * from users")]);
        let mut existing = old.formatted_content();
        let at = existing.rfind("</mapper>").unwrap();
        existing.insert_str(at, "  <!-- reporting -->\n  <select id=\"countAll\" resultType=\"long\" >\n    select count(*) from users\n  </select>\n");
        let crlf = existing.replace('\n', "\r\n");

        let new = mapper_document(&[("selectAll", "select id from users")]);
        let tags = ProvenanceTags::default();
        let (from_crlf, _) = rendered(merge_xml_file(&new, Some(&crlf), &tags, 100));
        let (from_lf, _) = rendered(merge_xml_file(&new, Some(&existing), &tags, 100));
        assert!(!from_crlf.contains('\r'));
        assert_eq!(from_crlf, from_lf);
        assert!(from_crlf.contains("  <select id=\"countAll\" resultType=\"long\" >\n    select count(*) from users\n  </select>\n"));
    }

    #[test]
    fn test_legacy_id_prefix_is_generated() {
        let existing = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<mapper namespace=\"old\" >\n  <sql id=\"ibatorgenerated_Base_Column_List\" >\n    id\n  </sql>\n</mapper>\n";
        let new = mapper_document(&[]);
        let (content, _) = rendered(merge_xml_file(
            &new,
            Some(existing),
            &ProvenanceTags::default(),
            100,
        ));
        assert!(!content.contains("ibatorgenerated_"));
        assert!(content.contains("<mapper namespace=\"com.example.UserMapper\" />"));
    }

    #[test]
    fn test_hand_written_id_shadows_generated() {
        let existing = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<mapper namespace=\"x\" >\n  <select id=\"selectAll\" >\n    select custom\n  </select>\n</mapper>\n";
        let new = mapper_document(&[("selectAll", "select * from users")]);
        let (content, warnings) = rendered(merge_xml_file(
            &new,
            Some(existing),
            &ProvenanceTags::default(),
            100,
        ));
        assert_eq!(content.matches("id=\"selectAll\"").count(), 1);
        assert!(content.contains("select custom"));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_root_mismatch() {
        let new = mapper_document(&[]);
        let outcome = merge_xml_file(
            &new,
            Some("<configuration />"),
            &ProvenanceTags::default(),
            100,
        );
        assert!(matches!(outcome, MergeOutcome::ParseFailed { ref reason } if reason.contains("<configuration>")));
    }

    #[test]
    fn test_malformed_xml() {
        let new = mapper_document(&[]);
        let outcome = merge_xml_file(
            &new,
            Some("<mapper><select></mapper>"),
            &ProvenanceTags::default(),
            100,
        );
        assert!(matches!(outcome, MergeOutcome::ParseFailed { .. }));
    }
}
