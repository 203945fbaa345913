//! Request-scoped input views

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Field name to raw value.
pub type Fields = Map<String, Value>;

/// A file part received with the request.
#[derive(Debug, Clone, PartialEq)]
pub struct FileAttachment {
    /// Form field the file was sent under
    pub field_name: String,
    /// Declared MIME type
    pub content_type: String,
    pub size: u64,
    /// Original client-side filename
    pub file_name: String,
    pub data: Bytes,
}

impl FileAttachment {
    pub fn new(
        field_name: impl Into<String>,
        content_type: impl Into<String>,
        file_name: impl Into<String>,
        data: Bytes,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            content_type: content_type.into(),
            size: data.len() as u64,
            file_name: file_name.into(),
            data,
        }
    }
}

/// Query and body fields of a request plus any file parts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputRecord {
    pub query: Fields,
    pub body: Fields,
    pub files: Vec<FileAttachment>,
}

impl InputRecord {
    pub fn new(query: Fields, body: Fields) -> Self {
        Self {
            query,
            body,
            files: Vec::new(),
        }
    }

    pub fn with_files(mut self, files: Vec<FileAttachment>) -> Self {
        self.files = files;
        self
    }

    /// First attachment sent under `field`.
    pub fn file(&self, field: &str) -> Option<&FileAttachment> {
        self.files.iter().find(|f| f.field_name == field)
    }

    /// Deserializes the body fields into a request type.
    pub fn body_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.body.clone()))
    }

    /// Deserializes the query fields into a request type.
    pub fn query_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.query.clone()))
    }
}

/// Collects `key=value` pairs into fields. A key repeated in the input
/// becomes an array of its values, in order of appearance.
pub fn fields_from_pairs<I>(pairs: I) -> Fields
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut fields = Fields::new();
    for (key, value) in pairs {
        push_field(&mut fields, key, Value::String(value));
    }
    fields
}

pub(crate) fn push_field(fields: &mut Fields, key: String, value: Value) {
    match fields.get_mut(&key) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            fields.insert(key, value);
        }
    }
}
