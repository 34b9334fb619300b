// src/writer.rs

//! Manifest output
//!
//! A thin layer over `quick_xml::Writer` that tracks which elements are
//! open, so callers close elements without repeating their names and the
//! document cannot end up with mismatched tags.

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, Event};

use crate::element::Attribute;
use crate::{Error, Result};

/// Streaming writer for the generated manifest
pub struct ManifestWriter<W: Write> {
    writer: Writer<W>,
    open: Vec<String>,
}

impl<W: Write> ManifestWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: Writer::new(inner),
            open: Vec::new(),
        }
    }

    /// Open `name` with `attributes` in the given order
    ///
    /// With `empty` set the element is written self-closed and nothing is
    /// left open. Attribute values are escaped on output.
    pub fn open(&mut self, name: &str, attributes: &[Attribute], empty: bool) -> Result<()> {
        let mut start = BytesStart::new(name);
        for attr in attributes {
            start.push_attribute((attr.name.as_str(), attr.value.as_str()));
        }

        if empty {
            self.write(Event::Empty(start))
        } else {
            self.write(Event::Start(start))?;
            self.open.push(name.to_string());
            Ok(())
        }
    }

    /// Close the most recently opened element
    pub fn close(&mut self) -> Result<()> {
        let name = self
            .open
            .pop()
            .ok_or_else(|| Error::WriteOutput("close without an open element".to_string()))?;
        self.write(Event::End(BytesEnd::new(name)))
    }

    /// Copy a non-element node (text, comment, declaration, ...) unchanged
    pub fn passthrough(&mut self, event: Event<'_>) -> Result<()> {
        self.write(event)
    }

    /// Number of elements currently open
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Flush and hand back the underlying sink
    pub fn finish(self) -> Result<W> {
        if let Some(name) = self.open.last() {
            return Err(Error::WriteOutput(format!(
                "{} element(s) left open, innermost <{}>",
                self.open.len(),
                name
            )));
        }
        let mut inner = self.writer.into_inner();
        inner
            .flush()
            .map_err(|e| Error::WriteOutput(e.to_string()))?;
        Ok(inner)
    }

    fn write(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| Error::WriteOutput(e.to_string()))
    }
}
