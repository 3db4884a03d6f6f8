//! Merging regenerated output into files that already exist on disk
//!
//! Existing declarations are classified by their provenance markers.
//! Generated declarations are replaced or dropped, hand-written and frozen
//! ones are carried over verbatim. A merge never fails the run on its own:
//! an unusable existing file yields [`MergeOutcome::ParseFailed`] and the
//! caller decides what to do with it.

mod java_merger;
pub(crate) mod java_parser;
pub mod provenance;
mod xml_merger;

pub use java_merger::merge_java_file;
pub use provenance::{
    GeneratedMarker, Provenance, ProvenanceTags, DO_NOT_DELETE_DURING_MERGE, GENERATOR_ID,
    NEW_ELEMENT_TAG, OLD_ELEMENT_TAGS,
};
pub use xml_merger::merge_xml_file;

/// Result of merging one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Final file content, plus notes about members that were skipped
    Rendered {
        content: String,
        warnings: Vec<String>,
    },
    /// The existing file could not be used; nothing should be written
    ParseFailed { reason: String },
}
