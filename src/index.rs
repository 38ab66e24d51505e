use crate::error::IndexError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

const PATH_KEY: &str = "path";
const COMMON_COLOR_KEY: &str = "commonColor";

/// One entry of an image index. Only `path` and `commonColor` are interpreted; every other key is carried through
/// untouched and in its original order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new(path: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(PATH_KEY.to_string(), Value::String(path.into()));
        Self(fields)
    }

    /// The image path relative to the asset root, if the record has a string `path`.
    pub fn path(&self) -> Option<&str> {
        self.0.get(PATH_KEY).and_then(Value::as_str)
    }

    /// `None` both when the key is missing and when it is `null`.
    pub fn common_color(&self) -> Option<&str> {
        self.0.get(COMMON_COLOR_KEY).and_then(Value::as_str)
    }

    pub fn has_common_color(&self) -> bool {
        self.0.contains_key(COMMON_COLOR_KEY)
    }

    /// Sets `commonColor`, replacing an existing value in place or appending the key after the existing ones.
    pub fn set_common_color(&mut self, color: Option<String>) {
        self.0
            .insert(COMMON_COLOR_KEY.to_string(), color.map_or(Value::Null, Value::String));
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// An index file loaded fully into memory.
#[derive(Debug, Clone)]
pub struct ImageIndex {
    path: PathBuf,
    records: Vec<Record>,
}

impl ImageIndex {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, IndexError> {
        let path = path.as_ref().to_path_buf();

        let content = fs::read_to_string(&path).map_err(|source| IndexError::Read {
            path: path.clone(),
            source,
        })?;
        let records = serde_json::from_str(&content).map_err(|source| IndexError::Parse {
            path: path.clone(),
            source,
        })?;

        Ok(Self { path, records })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [Record] {
        &mut self.records
    }

    /// Rewrites the index file with two-space indentation.
    ///
    /// The document goes to a temporary file next to the index first, which is then renamed over it, so a failed
    /// write leaves the previous contents in place.
    pub fn save(&self) -> Result<(), IndexError> {
        let content = serde_json::to_string_pretty(&self.records).map_err(|source| IndexError::Serialize {
            path: self.path.clone(),
            source,
        })?;

        write_atomic(&self.path, content.as_bytes()).map_err(|source| IndexError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

fn write_atomic(path: &Path, content: &[u8]) -> std::io::Result<()> {
    // write through symlinks instead of replacing them
    let resolved = fs::canonicalize(path).ok();
    let path = resolved.as_deref().unwrap_or(path);

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = tempfile::NamedTempFile::new_in(directory)?;
    file.write_all(content)?;
    file.as_file().sync_all()?;

    if let Ok(metadata) = fs::metadata(path) {
        file.as_file().set_permissions(metadata.permissions())?;
    }

    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write_index(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("image-library.json");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_record_accessors() {
        let mut record = Record::new("a.png");
        assert_eq!(record.path(), Some("a.png"));
        assert_eq!(record.common_color(), None);
        assert!(!record.has_common_color());

        record.set_common_color(Some("#aabbcc".to_string()));
        assert_eq!(record.common_color(), Some("#aabbcc"));

        record.set_common_color(None);
        assert!(record.has_common_color());
        assert_eq!(record.fields()["commonColor"], Value::Null);
    }

    #[test]
    fn test_record_without_string_path() {
        let record: Record = serde_json::from_str(r#"{"path": 3}"#).unwrap();
        assert_eq!(record.path(), None);

        let record: Record = serde_json::from_str(r#"{"title": "x"}"#).unwrap();
        assert_eq!(record.path(), None);
    }

    #[test]
    fn test_common_color_keeps_key_order() {
        let mut record: Record =
            serde_json::from_str(r##"{"commonColor": "#000000", "path": "a.png", "alt": "A"}"##).unwrap();
        record.set_common_color(Some("#ffffff".to_string()));

        let keys: Vec<_> = record.fields().keys().map(String::as_str).collect();
        assert_eq!(keys, ["commonColor", "path", "alt"]);

        let mut fresh: Record = serde_json::from_str(r#"{"path": "b.png", "alt": "B"}"#).unwrap();
        fresh.set_common_color(None);

        let keys: Vec<_> = fresh.fields().keys().map(String::as_str).collect();
        assert_eq!(keys, ["path", "alt", "commonColor"]);
    }

    #[test]
    fn test_load_and_save() {
        let dir = TempDir::new().unwrap();
        let path = write_index(&dir, r#"[{"path":"a.png","tags":["x"]},{"path":"b.png"}]"#);

        let mut index = ImageIndex::load(&path).unwrap();
        assert_eq!(index.path(), path.as_path());
        assert_eq!(index.records().len(), 2);

        index.records_mut()[0].set_common_color(Some("#102030".to_string()));
        index.records_mut()[1].set_common_color(None);
        index.save().unwrap();

        let expected = r##"[
  {
    "path": "a.png",
    "tags": [
      "x"
    ],
    "commonColor": "#102030"
  },
  {
    "path": "b.png",
    "commonColor": null
  }
]"##;
        assert_eq!(fs::read_to_string(&path).unwrap(), expected);
    }

    #[test]
    fn test_save_leaves_no_temporary_files() {
        let dir = TempDir::new().unwrap();
        let path = write_index(&dir, "[]");

        ImageIndex::load(&path).unwrap().save().unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[cfg(unix)]
    #[test]
    fn test_save_writes_through_symlink() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("data")).unwrap();
        let target = dir.path().join("data").join("image-library.json");
        fs::write(&target, r#"[{"path":"a.png"}]"#).unwrap();

        let link = dir.path().join("index.json");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let mut index = ImageIndex::load(&link).unwrap();
        index.records_mut()[0].set_common_color(None);
        index.save().unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(
            fs::read_to_string(&target).unwrap(),
            "[\n  {\n    \"path\": \"a.png\",\n    \"commonColor\": null\n  }\n]"
        );
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let error = ImageIndex::load(dir.path().join("missing.json")).unwrap_err();

        assert!(matches!(error, IndexError::Read { .. }));
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = TempDir::new().unwrap();

        let path = write_index(&dir, "[{\"path\": ");
        assert!(matches!(ImageIndex::load(&path), Err(IndexError::Parse { .. })));

        let path = write_index(&dir, r#"{"path": "a.png"}"#);
        assert!(matches!(ImageIndex::load(&path), Err(IndexError::Parse { .. })));

        let path = write_index(&dir, r#"["a.png"]"#);
        assert!(matches!(ImageIndex::load(&path), Err(IndexError::Parse { .. })));
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = write_index(&dir, "[]");
        let mut index = ImageIndex::load(&path).unwrap();
        index.path = dir.path().join("gone").join("index.json");

        assert!(matches!(index.save(), Err(IndexError::Write { .. })));
    }
}
