// src/expand/mod.rs

//! File-tree expansion
//!
//! Replaces one `<autowixfilecomponents/>` element with `Directory`,
//! `Component` and `File` elements mirroring a directory tree on disk.
//!
//! Every generated identifier is derived from the accumulated install path,
//! joined with backslashes:
//!
//! ```text
//! <autowixfilecomponents base="INSTALLDIR" from="dist\app"/>
//!
//! Directory  {idbase}:dir:INSTALLDIR
//! Directory  {idbase}:dir:INSTALLDIR\dist
//! Directory  {idbase}:dir:INSTALLDIR\dist\app
//! Component  {idbase}:comp:INSTALLDIR\dist\app\app.exe
//! File       {idbase}:file:INSTALLDIR\dist\app\app.exe
//! ```
//!
//! The component GUID is keyed on the same accumulated path, so the same
//! file in the same place keeps its GUID from one build to the next.

mod entry;

use std::io::Write;
use std::path::Path;

use tracing::{debug, warn};

use crate::element::Attribute;
use crate::guid::{GuidMap, path_key};
use crate::transform::{RESERVED_TAG, Warning};
use crate::writer::ManifestWriter;
use crate::{Error, Result};

pub use entry::{FsEntry, children, resolve_source, segments};

/// Identifier namespace used when `idbase` is not given
pub const DEFAULT_IDBASE: &str = "autowix";

/// Disk identifier written on every generated `File`
pub const DISK_ID: &str = "1";

/// Parsed attributes of a reserved element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionRequest {
    /// Identifier namespace prefix
    pub idbase: String,
    /// Extra directory chain to wrap the expansion in
    pub base: Option<String>,
    /// File or directory to expand
    pub from: String,
    /// Line of the reserved element in the template
    pub line: u64,
}

impl ExpansionRequest {
    /// Read the reserved element's attributes
    ///
    /// Unknown attributes are reported as warnings and otherwise ignored.
    /// When an attribute repeats, its last occurrence wins.
    pub fn from_attributes(
        attributes: &[Attribute],
        line: u64,
        warnings: &mut Vec<Warning>,
    ) -> Result<Self> {
        let mut idbase = None;
        let mut base = None;
        let mut from = None;

        for attr in attributes {
            match attr.name.as_str() {
                "idbase" => idbase = Some(attr.value.clone()),
                "base" => base = Some(attr.value.clone()),
                "from" => from = Some(attr.value.clone()),
                other => {
                    warn!(
                        "line {}: unknown attribute `{}` on <{}> ignored",
                        line, other, RESERVED_TAG
                    );
                    warnings.push(Warning::UnknownAttribute {
                        line,
                        name: other.to_string(),
                    });
                }
            }
        }

        let from = from
            .filter(|f| !segments(f).is_empty())
            .ok_or(Error::ExpansionMissingFrom {
                line,
                tag: RESERVED_TAG,
            })?;

        Ok(Self {
            idbase: idbase.unwrap_or_else(|| DEFAULT_IDBASE.to_string()),
            base,
            from,
            line,
        })
    }
}

/// Counts of what one expansion generated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpansionStats {
    pub directories: usize,
    pub components: usize,
}

/// Writes the expansion of a single reserved element
pub struct FileComponentExpander<'a, W: Write> {
    writer: &'a mut ManifestWriter<W>,
    guids: &'a mut GuidMap,
    source_root: &'a Path,
    stats: ExpansionStats,
}

impl<'a, W: Write> FileComponentExpander<'a, W> {
    pub fn new(
        writer: &'a mut ManifestWriter<W>,
        guids: &'a mut GuidMap,
        source_root: &'a Path,
    ) -> Self {
        Self {
            writer,
            guids,
            source_root,
            stats: ExpansionStats::default(),
        }
    }

    /// Expand `request` completely, leaving no element open
    pub fn expand(mut self, request: &ExpansionRequest) -> Result<ExpansionStats> {
        let base_segments = request.base.as_deref().map(segments).unwrap_or_default();
        let from_segments = segments(&request.from);
        let Some((root_name, parents)) = from_segments.split_last() else {
            return Err(Error::ExpansionMissingFrom {
                line: request.line,
                tag: RESERVED_TAG,
            });
        };

        // Directory chain from `base`, then the parents of the root itself.
        let mut accumulated = String::new();
        let mut opened = 0;
        for segment in base_segments.iter().chain(parents) {
            accumulated = join(&accumulated, segment, request.line)?;
            self.open_directory(&request.idbase, &accumulated, segment)?;
            opened += 1;
        }

        let root = resolve_source(self.source_root, &request.from);
        self.expand_entry(request, &root, root_name, &accumulated)?;

        for _ in 0..opened {
            self.writer.close()?;
        }

        debug!(
            "Expanded {}: {} director(ies), {} component(s)",
            request.from, self.stats.directories, self.stats.components
        );
        Ok(self.stats)
    }

    fn expand_entry(
        &mut self,
        request: &ExpansionRequest,
        path: &Path,
        name: &str,
        parent: &str,
    ) -> Result<()> {
        let accumulated = join(parent, name, request.line)?;

        match FsEntry::classify(path) {
            FsEntry::File => self.emit_component(&request.idbase, path, name, &accumulated),
            FsEntry::Directory => {
                self.open_directory(&request.idbase, &accumulated, name)?;
                for child in children(path) {
                    let child = child.map_err(|e| Error::ListDirectory {
                        line: request.line,
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    })?;
                    let child_name =
                        child.file_name().to_str().ok_or_else(|| Error::NonUtf8Name {
                            line: request.line,
                            path: child.path().to_path_buf(),
                        })?;
                    self.expand_entry(request, child.path(), child_name, &accumulated)?;
                }
                self.writer.close()
            }
            FsEntry::Missing => Err(Error::MissingPath {
                line: request.line,
                path: path.to_path_buf(),
            }),
        }
    }

    fn open_directory(&mut self, idbase: &str, accumulated: &str, name: &str) -> Result<()> {
        let attributes = [
            Attribute::new("Id", format!("{idbase}:dir:{accumulated}")),
            Attribute::new("Name", name),
        ];
        self.writer.open("Directory", &attributes, false)?;
        self.stats.directories += 1;
        Ok(())
    }

    fn emit_component(
        &mut self,
        idbase: &str,
        path: &Path,
        name: &str,
        accumulated: &str,
    ) -> Result<()> {
        let guid = self.guids.resolve(&path_key(accumulated));
        debug!("Component {} -> {}", accumulated, guid);

        let component = [
            Attribute::new("Id", format!("{idbase}:comp:{accumulated}")),
            Attribute::new("Guid", guid),
        ];
        self.writer.open("Component", &component, false)?;

        let file = [
            Attribute::new("Id", format!("{idbase}:file:{accumulated}")),
            Attribute::new("Name", name),
            Attribute::new("DiskId", DISK_ID),
            Attribute::new("Source", path.display().to_string()),
            Attribute::new("KeyPath", "yes"),
        ];
        self.writer.open("File", &file, true)?;
        self.writer.close()?;

        self.stats.components += 1;
        Ok(())
    }
}

/// Append `name` to a backslash-joined install path
///
/// The result becomes a persisted GUID key, which is stored one per line.
fn join(parent: &str, name: &str, line: u64) -> Result<String> {
    let path = if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}\\{name}")
    };
    if name.contains(['\n', '\r']) {
        return Err(Error::PathKeyLineBreak { line, path });
    }
    Ok(path)
}
