//! Provenance markers that separate generator-owned declarations from hand-written ones

use chrono::Local;

use crate::dom::java::Documented;
use crate::dom::xml::{TextElement, XmlElement};

/// Javadoc tag written on every generated declaration
pub const NEW_ELEMENT_TAG: &str = "@mbg.generated";

/// Tags recognised as generated, including those written by earlier generator generations
pub const OLD_ELEMENT_TAGS: [&str; 4] = [
    "@ibatorgenerated",
    "@abatorgenerated",
    "@mbggenerated",
    "@mbg.generated",
];

/// Follows a tag to keep a generated declaration through merges
pub const DO_NOT_DELETE_DURING_MERGE: &str = "do_not_delete_during_merge";

/// Value written into `@Generated` annotations by this generator
pub const GENERATOR_ID: &str = "mapgen";

const OLD_XML_ID_PREFIXES: [&str; 2] = ["ibatorgenerated_", "abatorgenerated_"];

const GENERATED_ANNOTATION_NAMES: [&str; 4] = [
    "Generated",
    "javax.annotation.Generated",
    "javax.annotation.processing.Generated",
    "jakarta.annotation.Generated",
];

/// Ownership of a declaration found in an existing file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Tagged generated: replaced or dropped on merge
    Generated,
    /// Tagged generated but marked `do_not_delete_during_merge`: kept verbatim
    Frozen,
    /// No recognised marker: kept verbatim
    HandWritten,
}

impl Provenance {
    pub fn is_generated(&self) -> bool {
        matches!(self, Provenance::Generated)
    }
}

/// The recognised marker vocabulary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvenanceTags {
    javadoc_tags: Vec<String>,
    generator_ids: Vec<String>,
}

impl Default for ProvenanceTags {
    fn default() -> Self {
        Self {
            javadoc_tags: OLD_ELEMENT_TAGS.iter().map(|t| t.to_string()).collect(),
            generator_ids: vec![GENERATOR_ID.to_string(), "MyBatis Generator".to_string()],
        }
    }
}

impl ProvenanceTags {
    /// Recognise `extra` tags in addition to the built-in ones
    pub fn with_additional_tags(extra: &[String]) -> Self {
        let mut tags = Self::default();
        for tag in extra {
            if !tags.javadoc_tags.contains(tag) {
                tags.javadoc_tags.push(tag.clone());
            }
        }
        tags
    }

    pub fn javadoc_tags(&self) -> &[String] {
        &self.javadoc_tags
    }

    /// Classify a Javadoc comment by its block tags. A block tag is the first
    /// token of a line and must match a recognised tag exactly: neither
    /// `@mbg.generatedX` nor a tag mentioned inside prose is a marker.
    pub fn javadoc_provenance(&self, javadoc: &str) -> Provenance {
        let mut provenance = Provenance::HandWritten;
        for line in javadoc.lines() {
            let content = line
                .trim_start()
                .trim_start_matches("/**")
                .trim_start()
                .trim_start_matches('*');
            let mut tokens = content
                .split_whitespace()
                .map(|t| t.trim_end_matches("*/"))
                .filter(|t| !t.is_empty());

            let Some(first) = tokens.next() else {
                continue;
            };
            if !self.javadoc_tags.iter().any(|t| t == first) {
                continue;
            }
            if tokens.next() == Some(DO_NOT_DELETE_DURING_MERGE) {
                return Provenance::Frozen;
            }
            provenance = Provenance::Generated;
        }
        provenance
    }

    /// Whether annotation text such as `@Generated("mapgen")` marks generated code
    pub fn annotation_marks_generated(&self, annotation: &str) -> bool {
        let Some(rest) = annotation.trim().strip_prefix('@') else {
            return false;
        };
        let (name, arguments) = match rest.find('(') {
            Some(open) => (rest[..open].trim(), &rest[open..]),
            None => (rest.trim(), ""),
        };
        GENERATED_ANNOTATION_NAMES.contains(&name)
            && self
                .generator_ids
                .iter()
                .any(|id| arguments.contains(&format!("\"{}\"", id)))
    }

    /// Provenance of a declaration given its Javadoc (if any) and annotations
    pub fn provenance<'a, I>(&self, javadoc: Option<&str>, annotations: I) -> Provenance
    where
        I: IntoIterator<Item = &'a str>,
    {
        let from_javadoc = javadoc
            .map(|j| self.javadoc_provenance(j))
            .unwrap_or(Provenance::HandWritten);
        if from_javadoc != Provenance::HandWritten {
            return from_javadoc;
        }
        if annotations
            .into_iter()
            .any(|a| self.annotation_marks_generated(a))
        {
            Provenance::Generated
        } else {
            Provenance::HandWritten
        }
    }

    /// Whether an XML comment carries a recognised marker
    pub fn xml_comment_is_generated(&self, comment: &str) -> bool {
        comment
            .split_whitespace()
            .any(|token| self.javadoc_tags.iter().any(|t| t == token))
    }

    /// Whether an XML `id` uses a legacy generated prefix
    pub fn xml_id_is_generated(&self, id: &str) -> bool {
        OLD_XML_ID_PREFIXES.iter().any(|p| id.starts_with(p))
    }
}

/// Writes markers onto declarations. One marker is created per run so every
/// file of a run carries the same timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMarker {
    timestamp: Option<String>,
}

impl GeneratedMarker {
    pub fn new(suppress_date: bool) -> Self {
        let timestamp = (!suppress_date)
            .then(|| Local::now().format("%Y-%m-%d %H:%M:%S %:z").to_string());
        Self { timestamp }
    }

    pub fn without_date() -> Self {
        Self { timestamp: None }
    }

    fn javadoc_line(&self, frozen: bool) -> String {
        let mut line = format!(" * {}", NEW_ELEMENT_TAG);
        if frozen {
            line.push(' ');
            line.push_str(DO_NOT_DELETE_DURING_MERGE);
        }
        if let Some(timestamp) = &self.timestamp {
            line.push(' ');
            line.push_str(timestamp);
        }
        line
    }

    /// Append the marker to the declaration's Javadoc, creating one if absent
    pub fn tag_as_generated<D: Documented + ?Sized>(&self, declaration: &mut D) {
        self.append(declaration.javadoc_lines_mut(), false);
    }

    /// Like [`tag_as_generated`](Self::tag_as_generated) but the declaration survives merges
    pub fn tag_as_frozen<D: Documented + ?Sized>(&self, declaration: &mut D) {
        self.append(declaration.javadoc_lines_mut(), true);
    }

    fn append(&self, lines: &mut Vec<String>, frozen: bool) {
        let marker = self.javadoc_line(frozen);
        let Some(last) = lines.last().cloned() else {
            lines.extend(["/**".to_string(), marker, " */".to_string()]);
            return;
        };

        if last.trim() == "*/" {
            let at = lines.len() - 1;
            lines.insert(at, marker);
        } else if let Some(open) = last.trim_end().strip_suffix("*/") {
            let at = lines.len() - 1;
            lines[at] = open.trim_end().to_string();
            lines.push(marker);
            lines.push(" */".to_string());
        } else {
            lines.extend(["/**".to_string(), marker, " */".to_string()]);
        }
    }

    /// Insert the marker comment as the first children of an XML element
    pub fn tag_xml_element(&self, element: &mut XmlElement) {
        let mut lines = vec![
            "<!--".to_string(),
            format!("  WARNING - {}", NEW_ELEMENT_TAG),
            format!(
                "  This element is automatically generated by {}, do not modify.",
                GENERATOR_ID
            ),
        ];
        if let Some(timestamp) = &self.timestamp {
            lines.push(format!("  This element was generated on {}.", timestamp));
        }
        lines.push("-->".to_string());

        for (i, line) in lines.into_iter().enumerate() {
            element.add_element_at(i, TextElement::new(line));
        }
    }
}
