use std::ops::Range;

use bytes::Bytes;
use chrono::Utc;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// An in-memory file: name, MIME type, modification time and contents.
///
/// This is what `file` and `file?` fields hold. Contents are reference
/// counted, so cloning a blob never copies the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBlob {
    name: String,
    mime_type: String,
    last_modified: i64,
    data: Bytes,
}

impl FileBlob {
    /// Create a blob with an empty MIME type, stamped with the current time.
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime_type: String::new(),
            last_modified: Utc::now().timestamp_millis(),
            data: data.into(),
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// Set the modification time in milliseconds since the Unix epoch.
    pub fn with_last_modified(mut self, millis: i64) -> Self {
        self.last_modified = millis;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn last_modified(&self) -> i64 {
        self.last_modified
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn bytes(&self) -> Bytes {
        self.data.clone()
    }

    /// Contents decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }

    /// A sub-range of the contents. Out-of-range bounds are clamped.
    pub fn slice(&self, range: Range<usize>) -> Bytes {
        let end = range.end.min(self.data.len());
        let start = range.start.min(end);
        self.data.slice(start..end)
    }

    pub(crate) fn metadata_json(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "type": self.mime_type,
            "size": self.data.len(),
            "lastModified": self.last_modified,
        })
    }
}

impl Serialize for FileBlob {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry("type", &self.mime_type)?;
        map.serialize_entry("size", &self.data.len())?;
        map.serialize_entry("lastModified", &self.last_modified)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_report_contents() {
        let blob = FileBlob::new("notes.txt", b"hello world".to_vec())
            .with_mime_type("text/plain")
            .with_last_modified(1_700_000_000_000);

        assert_eq!(blob.name(), "notes.txt");
        assert_eq!(blob.mime_type(), "text/plain");
        assert_eq!(blob.size(), 11);
        assert_eq!(blob.last_modified(), 1_700_000_000_000);
        assert_eq!(blob.text(), "hello world");
        assert_eq!(blob.slice(6..64).as_ref(), b"world");
        assert!(blob.slice(20..30).is_empty());
    }

    #[test]
    fn serializes_metadata_only() {
        let blob = FileBlob::new("a.bin", vec![0u8, 1, 2]).with_last_modified(5);
        assert_eq!(
            serde_json::to_value(&blob).unwrap(),
            serde_json::json!({"name": "a.bin", "type": "", "size": 3, "lastModified": 5})
        );
    }
}
