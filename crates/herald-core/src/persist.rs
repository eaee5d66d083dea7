// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON document helpers shared by the rule, task, and account files.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::HeraldError;

/// Serializes `value` with four-space indentation.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}

/// Writes `value` to `path`, replacing the file only once the new content is
/// fully on disk.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), HeraldError> {
    let bytes = to_pretty_json(value).map_err(|e| {
        HeraldError::persistence(format!("failed to encode {}", path.display()), e)
    })?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| {
            HeraldError::persistence(format!("failed to create {}", parent.display()), e)
        })?;
    }

    let tmp = tmp_path(path);
    let write = || -> std::io::Result<()> {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    };
    write().map_err(|e| {
        let _ = fs::remove_file(&tmp);
        HeraldError::persistence(format!("failed to write {}", path.display()), e)
    })
}

/// Reads and decodes `path`. Returns `Ok(None)` when the file does not exist.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, HeraldError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(HeraldError::persistence(
                format!("failed to read {}", path.display()),
                e,
            ));
        }
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| HeraldError::persistence(format!("failed to parse {}", path.display()), e))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn uses_four_space_indent() {
        let mut map = BTreeMap::new();
        map.insert("a", 1);
        let text = String::from_utf8(to_pretty_json(&map).unwrap()).unwrap();
        assert_eq!(text, "{\n    \"a\": 1\n}");
    }

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let value: Option<BTreeMap<String, i32>> = read_json(&dir.path().join("none.json")).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub/doc.json");
        write_json(&path, &vec!["x", "y"]).unwrap();
        let back: Vec<String> = read_json(&path).unwrap().unwrap();
        assert_eq!(back, vec!["x", "y"]);
        assert!(!dir.path().join("sub/doc.json.tmp").exists());
    }

    #[test]
    fn corrupt_file_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();
        let err = read_json::<Vec<String>>(&path).unwrap_err();
        assert!(matches!(err, HeraldError::Persistence { .. }));
    }
}
