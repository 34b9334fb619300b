// src/transform/mod.rs

//! Single-pass template transform
//!
//! Reads the template as a stream of XML events and writes the manifest as
//! it goes. Start tags have their GUID references resolved and are then
//! either copied through or, for `<autowixfilecomponents/>`, replaced by the
//! expansion of a file tree. End tags are copied unconditionally. Comments,
//! text, the XML declaration and other non-element nodes pass through
//! untouched.
//!
//! The transform never looks ahead and never revisits input. A fatal error
//! stops it where it stands; whatever was already written stays written.

mod lines;
mod reference;

use std::fmt;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

use crate::element::{Attribute, StartElement};
use crate::expand::{ExpansionRequest, FileComponentExpander};
use crate::guid::GuidMap;
use crate::writer::ManifestWriter;
use crate::{Error, Result};

pub use lines::LineCounter;

/// Element name that triggers a file-tree expansion
pub const RESERVED_TAG: &str = "autowixfilecomponents";

/// Settings for a transform run
#[derive(Debug, Clone)]
pub struct TransformOptions {
    /// Directory that relative `from` paths are resolved against
    pub source_root: PathBuf,
}

impl TransformOptions {
    pub fn new(source_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
        }
    }

    /// Options for a template at `input`: sources resolve beside it
    pub fn for_input(input: &Path) -> Self {
        let root = input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Self::new(root)
    }
}

/// A non-fatal condition noticed during the transform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A GUID reference contained spaces and was rewritten
    SanitizedGuidKey { line: u64, old: String, new: String },
    /// The reserved element carried an attribute it does not understand
    UnknownAttribute { line: u64, name: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SanitizedGuidKey { line, old, new } => {
                write!(f, "line {line}: spaces in GUID reference replaced: {old} -> {new}")
            }
            Self::UnknownAttribute { line, name } => {
                write!(f, "line {line}: unknown attribute `{name}` on <{RESERVED_TAG}> ignored")
            }
        }
    }
}

/// What a transform run did
#[derive(Debug, Clone, Default)]
pub struct TransformReport {
    /// Warnings in the order they were raised
    pub warnings: Vec<Warning>,
    /// Elements copied through from the template
    pub elements: usize,
    /// Reserved elements expanded
    pub expansions: usize,
    /// Components generated by expansions
    pub components: usize,
}

/// Output of a successful transform
pub struct Transformed<W> {
    pub output: W,
    pub guids: GuidMap,
    pub report: TransformReport,
}

/// Transform the template in `input` into a manifest written to `output`
///
/// Takes ownership of the GUID map and hands it back, extended with every
/// GUID minted during the run.
pub fn transform<R: BufRead, W: Write>(
    input: R,
    output: W,
    guids: GuidMap,
    options: &TransformOptions,
) -> Result<Transformed<W>> {
    ElementTransformer::new(output, guids, options).run(input)
}

/// Drives the event loop and owns the run's mutable state
pub struct ElementTransformer<'a, W: Write> {
    writer: ManifestWriter<W>,
    guids: GuidMap,
    options: &'a TransformOptions,
    report: TransformReport,
    /// Whether the document element has started
    root_seen: bool,
}

impl<'a, W: Write> ElementTransformer<'a, W> {
    pub fn new(output: W, guids: GuidMap, options: &'a TransformOptions) -> Self {
        Self {
            writer: ManifestWriter::new(output),
            guids,
            options,
            report: TransformReport::default(),
            root_seen: false,
        }
    }

    pub fn run<R: BufRead>(mut self, input: R) -> Result<Transformed<W>> {
        let mut reader = Reader::from_reader(LineCounter::new(input));
        let mut buf = Vec::new();

        loop {
            let line = reader.get_ref().line();
            let event = reader
                .read_event_into(&mut buf)
                .map_err(|e| xml_error(e, line))?;

            let top_level = self.writer.depth() == 0;
            match event {
                Event::Start(ref e) | Event::Empty(ref e) if top_level => {
                    self.enter_root(line)?;
                    let is_empty = matches!(event, Event::Empty(_));
                    self.start_element(read_start(e, is_empty, line)?)?
                }
                Event::Start(ref e) => self.start_element(read_start(e, false, line)?)?,
                Event::Empty(ref e) => self.start_element(read_start(e, true, line)?)?,
                Event::End(_) => self.writer.close()?,
                Event::Text(ref t) if top_level && !t.iter().all(u8::is_ascii_whitespace) => {
                    return Err(Error::MalformedXml {
                        line,
                        message: "text outside the document element".to_string(),
                    });
                }
                Event::CData(_) if top_level => {
                    return Err(Error::MalformedXml {
                        line,
                        message: "CDATA outside the document element".to_string(),
                    });
                }
                Event::Eof => {
                    if !self.root_seen {
                        return Err(Error::MalformedXml {
                            line,
                            message: "no document element".to_string(),
                        });
                    }
                    if self.writer.depth() > 0 {
                        return Err(Error::MalformedXml {
                            line,
                            message: format!(
                                "unexpected end of input with {} unclosed element(s)",
                                self.writer.depth()
                            ),
                        });
                    }
                    break;
                }
                other => self.writer.passthrough(other)?,
            }
            buf.clear();
        }

        Ok(Transformed {
            output: self.writer.finish()?,
            guids: self.guids,
            report: self.report,
        })
    }

    /// A well-formed document has exactly one top-level element
    fn enter_root(&mut self, line: u64) -> Result<()> {
        if self.root_seen {
            return Err(Error::MalformedXml {
                line,
                message: "more than one document element".to_string(),
            });
        }
        self.root_seen = true;
        Ok(())
    }

    fn start_element(&mut self, element: StartElement) -> Result<()> {
        let StartElement {
            name,
            attributes,
            is_empty,
            line,
        } = element;

        let attributes = reference::substitute_attributes(
            attributes,
            line,
            &mut self.guids,
            &mut self.report.warnings,
        )?;

        if name == RESERVED_TAG {
            if !is_empty {
                return Err(Error::ExpansionNotEmpty {
                    line,
                    tag: RESERVED_TAG,
                });
            }

            let request = ExpansionRequest::from_attributes(&attributes, line, &mut self.report.warnings)?;
            debug!("line {}: expanding {}", line, request.from);
            let stats = FileComponentExpander::new(
                &mut self.writer,
                &mut self.guids,
                &self.options.source_root,
            )
            .expand(&request)?;

            self.report.expansions += 1;
            self.report.components += stats.components;
            return Ok(());
        }

        self.writer.open(&name, &attributes, is_empty)?;
        self.report.elements += 1;
        Ok(())
    }
}

fn read_start(start: &BytesStart<'_>, is_empty: bool, line: u64) -> Result<StartElement> {
    let malformed = |message: String| Error::MalformedXml { line, message };

    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| malformed(e.to_string()))?
        .to_string();

    let mut attributes = Vec::new();
    for attr in start.attributes().with_checks(false) {
        let attr = attr.map_err(|e| malformed(e.to_string()))?;
        let attr_name = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| malformed(e.to_string()))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| malformed(e.to_string()))?
            .into_owned();
        attributes.push(Attribute::new(attr_name, value));
    }

    Ok(StartElement {
        name,
        attributes,
        is_empty,
        line,
    })
}

fn xml_error(err: quick_xml::Error, line: u64) -> Error {
    match err {
        quick_xml::Error::Io(e) => Error::ReadInput {
            line,
            message: e.to_string(),
        },
        other => Error::MalformedXml {
            line,
            message: other.to_string(),
        },
    }
}
