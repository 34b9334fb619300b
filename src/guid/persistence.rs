// src/guid/persistence.rs

//! Persistence file for assigned GUIDs
//!
//! Format: one record per line, `{key} {guid}`, with exactly one space.
//! Keys are sanitised before they reach the map, so they never contain a
//! space or a line break and need no quoting.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::GuidMap;
use crate::{Error, Result};

/// Load the GUID map from `path`
///
/// A missing file is not an error: the run starts with an empty map and
/// every GUID is minted fresh. Any other read failure, or a line that does
/// not split into exactly two space-separated fields, is fatal.
pub fn load(path: &Path) -> Result<GuidMap> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Note: {} does not exist.", path.display());
            info!("Note: All GUIDs will be newly generated.");
            return Ok(GuidMap::new());
        }
        Err(source) => {
            return Err(Error::ReadPersistence {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let mut map = GuidMap::new();
    for (line_num, line_result) in BufReader::new(file).lines().enumerate() {
        let line = line_result.map_err(|source| Error::ReadPersistence {
            path: path.to_path_buf(),
            source,
        })?;

        let fields: Vec<&str> = line.split(' ').collect();
        let [key, guid] = fields.as_slice() else {
            return Err(Error::MalformedPersistence {
                path: path.to_path_buf(),
                line: line_num + 1,
            });
        };

        map.insert_persisted(key.to_string(), guid.to_string());
    }

    debug!("Loaded {} GUID(s) from {}", map.len(), path.display());
    Ok(map)
}

/// Write the GUID map to `path`
///
/// The records are written to a temporary file beside `path` and moved into
/// place, so a failed save leaves the previous file intact.
pub fn save(path: &Path, map: &GuidMap) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let staged = NamedTempFile::new_in(dir)?;
    {
        let mut out = BufWriter::new(staged.as_file());
        for (key, guid) in map.iter() {
            writeln!(out, "{} {}", key, guid)?;
        }
        out.flush()?;
    }
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| e.error)?;

    debug!("Saved {} GUID(s) to {}", map.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_empty_map() {
        let dir = TempDir::new().unwrap();
        let map = load(&dir.path().join("setup.awxg")).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_load_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("setup.awxg");
        fs::write(
            &path,
            "autowix:guid:product 0D2B41C8-4F65-4C1B-8E1F-0A9F3C7A5B11\n\
             bin\\app.exe 9E2F7C3A-1D44-4B0E-A0C2-6B5D8E1F2A33\n",
        )
        .unwrap();

        let map = load(&path).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(
            map.get("bin\\app.exe"),
            Some("9E2F7C3A-1D44-4B0E-A0C2-6B5D8E1F2A33")
        );
    }

    #[test]
    fn test_single_field_line_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("setup.awxg");
        fs::write(&path, "onlyonefield\n").unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, Error::MalformedPersistence { line: 1, .. }));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_malformed_line_number_is_one_based() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("setup.awxg");
        fs::write(
            &path,
            "a 11111111-1111-1111-1111-111111111111\n\
             b 22222222-2222-2222-2222-222222222222\n\
             c d e\n",
        )
        .unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, Error::MalformedPersistence { line: 3, .. }));
    }

    #[test]
    fn test_unreadable_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        // A directory in place of the file fails to read as text.
        let path = dir.path().join("setup.awxg");
        fs::create_dir(&path).unwrap();

        let err = load(&path).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_save_then_load_is_set_equal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("setup.awxg");

        let mut map = GuidMap::new();
        map.resolve("autowix:guid:product");
        map.resolve("autowix:guid:upgrade_code");
        map.resolve("dist\\Program|Files\\app.exe");

        save(&path, &map).unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(loaded, map);
    }

    #[test]
    fn test_save_replaces_previous_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("setup.awxg");
        fs::write(&path, "stale 00000000-0000-0000-0000-000000000000\n").unwrap();

        let map: GuidMap = [(
            "fresh".to_string(),
            "ABCDEF01-2345-6789-ABCD-EF0123456789".to_string(),
        )]
        .into_iter()
        .collect();
        save(&path, &map).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "fresh ABCDEF01-2345-6789-ABCD-EF0123456789\n"
        );
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("no-such-dir").join("setup.awxg");
        assert!(save(&path, &GuidMap::new()).is_err());
    }
}
