// src/pipeline.rs

//! The three stages of a run: load GUIDs, transform, persist GUIDs
//!
//! The GUID map is the only state passed between stages and it moves by
//! value: `load` produces it, `transform` consumes and returns it, `persist`
//! reads the final version. Each stage opens and releases its own files.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, ErrorKind};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::cli::Paths;
use crate::guid::{GuidMap, persistence};
use crate::transform::{self, TransformOptions, TransformReport};
use crate::{Error, Result};

/// Result of the persistence stage
///
/// A failed save does not fail the run: the manifest is already complete.
#[derive(Debug)]
pub enum PersistOutcome {
    Saved { records: usize },
    Failed { path: PathBuf, reason: io::Error },
}

impl PersistOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }

    /// Warning lines to report for this outcome, empty when saved
    pub fn warnings(&self) -> Vec<String> {
        match self {
            Self::Saved { .. } => Vec::new(),
            Self::Failed { path, reason } => vec![
                format!("Could not save {}: {}", path.display(), reason),
                "Newly generated GUIDs were not saved; the next run will generate different ones for them"
                    .to_string(),
            ],
        }
    }
}

/// What a completed run produced
#[derive(Debug)]
pub struct RunSummary {
    pub report: TransformReport,
    /// GUIDs known at the end of the run, persisted or not
    pub guids: usize,
    pub persisted: PersistOutcome,
}

/// Stage 1: read previously assigned GUIDs
pub fn load(paths: &Paths) -> Result<GuidMap> {
    persistence::load(&paths.persistence)
}

/// Stage 2: transform the template into the manifest
pub fn transform(paths: &Paths, guids: GuidMap) -> Result<(GuidMap, TransformReport)> {
    let input = File::open(&paths.input).map_err(|source| Error::OpenInput {
        path: paths.input.clone(),
        source,
    })?;

    if paths.output == paths.input {
        return Err(Error::OpenOutput {
            path: paths.output.clone(),
            source: io::Error::new(ErrorKind::InvalidInput, "output would overwrite the input"),
        });
    }
    let output = File::create(&paths.output).map_err(|source| Error::OpenOutput {
        path: paths.output.clone(),
        source,
    })?;

    let options = TransformOptions::for_input(&paths.input);
    let transformed = transform::transform(
        BufReader::new(input),
        BufWriter::new(output),
        guids,
        &options,
    )?;

    transformed
        .output
        .into_inner()
        .map_err(|e| Error::WriteOutput(e.error().to_string()))?
        .sync_all()
        .map_err(|e| Error::WriteOutput(e.to_string()))?;

    Ok((transformed.guids, transformed.report))
}

/// Stage 3: save the GUID map, downgrading failure to a warning
pub fn persist(path: &Path, guids: &GuidMap) -> PersistOutcome {
    match persistence::save(path, guids) {
        Ok(()) => PersistOutcome::Saved {
            records: guids.len(),
        },
        Err(reason) => {
            let outcome = PersistOutcome::Failed {
                path: path.to_path_buf(),
                reason,
            };
            for message in outcome.warnings() {
                warn!("{}", message);
            }
            outcome
        }
    }
}

/// Run all three stages in order
pub fn run(paths: &Paths) -> Result<RunSummary> {
    let guids = load(paths)?;
    let (guids, report) = transform(paths, guids)?;
    info!(
        "Wrote {} ({} element(s) copied, {} component(s) generated)",
        paths.output.display(),
        report.elements,
        report.components
    );

    let persisted = persist(&paths.persistence, &guids);
    Ok(RunSummary {
        report,
        guids: guids.len(),
        persisted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn paths_in(dir: &Path) -> Paths {
        Paths::derive(&dir.join("product.wxt")).unwrap()
    }

    #[test]
    fn test_run_writes_manifest_and_guids() {
        let dir = TempDir::new().unwrap();
        let paths = paths_in(dir.path());
        fs::write(&paths.input, r#"<Product Id="autowix:guid:product"/>"#).unwrap();

        let summary = run(&paths).unwrap();
        assert!(summary.persisted.is_saved());
        assert_eq!(summary.guids, 1);

        let saved = persistence::load(&paths.persistence).unwrap();
        let guid = saved.get("autowix:guid:product").unwrap();
        assert_eq!(
            fs::read_to_string(&paths.output).unwrap(),
            format!(r#"<Product Id="{guid}"/>"#)
        );
    }

    #[test]
    fn test_missing_input() {
        let dir = TempDir::new().unwrap();
        let err = run(&paths_in(dir.path())).unwrap_err();
        assert!(matches!(err, Error::OpenInput { .. }));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_output_cannot_be_created() {
        let dir = TempDir::new().unwrap();
        let paths = paths_in(dir.path());
        fs::write(&paths.input, "<root/>").unwrap();
        fs::create_dir(&paths.output).unwrap();

        let err = run(&paths).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_failed_transform_leaves_persistence_untouched() {
        let dir = TempDir::new().unwrap();
        let paths = paths_in(dir.path());
        let before = "autowix:guid:kept 11111111-2222-3333-4444-555555555555\n";
        fs::write(&paths.persistence, before).unwrap();
        fs::write(
            &paths.input,
            r#"<root><A Id="autowix:guid:new"/><autowixfilecomponents from="missing_path"/></root>"#,
        )
        .unwrap();

        let err = run(&paths).unwrap_err();
        assert_eq!(err.exit_code(), 8);
        assert_eq!(fs::read_to_string(&paths.persistence).unwrap(), before);
    }

    #[test]
    fn test_persist_failure_is_reported_not_raised() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing-dir").join("product.awxg");
        let mut guids = GuidMap::new();
        guids.resolve("autowix:guid:x");

        let outcome = persist(&path, &guids);
        match &outcome {
            PersistOutcome::Failed { path: failed, .. } => assert_eq!(failed, &path),
            other => panic!("expected failure, got {other:?}"),
        }

        let warnings = outcome.warnings();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].starts_with("Could not save "));
        assert!(warnings[0].contains("product.awxg"));
        assert!(warnings[1].contains("Newly generated GUIDs were not saved"));
    }

    #[test]
    fn test_saved_outcome_has_no_warnings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("product.awxg");
        let mut guids = GuidMap::new();
        guids.resolve("autowix:guid:x");

        let outcome = persist(&path, &guids);
        assert!(matches!(outcome, PersistOutcome::Saved { records: 1 }));
        assert!(outcome.warnings().is_empty());
    }
}
