// src/lib.rs

//! autowix - installer manifests from annotated XML templates
//!
//! Turns a WiX-style XML template into a manifest source document. Two
//! things happen on the way through:
//!
//! - Attribute values of the form `autowix:guid:KEY` are replaced with a
//!   GUID that stays the same for `KEY` from one build to the next. GUIDs
//!   are kept in a side file next to the template.
//! - Each `<autowixfilecomponents from="..."/>` element is replaced with
//!   `Directory`/`Component`/`File` elements mirroring a tree on disk, each
//!   component getting a stable GUID keyed on its install path.
//!
//! # Architecture
//!
//! - [`guid`]: key sanitisation, the GUID map and its persistence file
//! - [`transform`]: single-pass event loop over the template
//! - [`expand`]: recursive filesystem-to-manifest expansion
//! - [`writer`]: balanced, escaped XML output
//! - [`pipeline`]: load, transform and persist as separate stages

pub mod cli;
pub mod element;
mod error;
pub mod expand;
pub mod guid;
pub mod pipeline;
pub mod transform;
pub mod writer;

pub use element::{Attribute, StartElement};
pub use error::{Error, Result};
pub use expand::{ExpansionRequest, ExpansionStats, FileComponentExpander, FsEntry};
pub use guid::GuidMap;
pub use pipeline::{PersistOutcome, RunSummary};
pub use transform::{RESERVED_TAG, TransformOptions, TransformReport, Transformed, Warning, transform};
pub use writer::ManifestWriter;
