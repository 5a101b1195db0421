//! # CCDA Core
//!
//! Assembly engine for HL7 C-CDA clinical documents.
//!
//! This crate turns caller-owned clinical records into a document tree and serializes it:
//! - Template registry keyed by document variant, section and entry kind, and release
//! - Header participants (`recordTarget`, `author`, `custodian`, `legalAuthenticator`)
//! - Sections with a human-readable narrative cross-referenced to coded entries
//! - A post-serialization normalizer for elements that must not carry whitespace text
//!
//! **No I/O concerns**: reading encounter files from disk, environment variables and output
//! paths belong in the `ccda` binary. [`EncounterFile::parse`] works on text only.

pub mod config;
pub mod constants;
pub mod document;
pub mod encounter;
pub mod error;
pub mod header;
pub mod node;
pub mod normalizer;
pub mod records;
pub mod sections;
pub mod templates;
pub mod time;
pub mod vocabulary;
pub mod xml;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::AssemblyConfig;
pub use document::variant::DocumentVariant;
pub use document::{assemble, Document, DocumentAssembler, SerializeOptions};
pub use encounter::{EncounterFile, SectionRecords};
pub use error::{CcdaError, CcdaResult};
pub use header::DocumentHeader;
pub use node::{BuildContext, Buildable};
pub use sections::SectionBuilder;
pub use templates::{SectionKind, TemplateIdentifier, TemplateKind, TemplateRegistry, Version};

pub use ccda_types::{NonEmptyText, Oid};
