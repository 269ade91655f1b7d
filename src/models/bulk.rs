use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata half of one `_bulk` entry.
#[derive(Debug, Clone, Serialize)]
pub struct ActionMeta<'a> {
    #[serde(rename = "_index")]
    index_name: &'a str,
    #[serde(rename = "_type", skip_serializing_if = "Option::is_none")]
    doc_type: Option<&'a str>,
    #[serde(rename = "_id")]
    id: String,
}

impl<'a> ActionMeta<'a> {
    pub fn new(index_name: &'a str, doc_type: Option<&'a str>, id: u64) -> Self {
        Self {
            index_name,
            doc_type,
            id: id.to_string(),
        }
    }

    /// Renders `{"index":{...}}` without the trailing newline.
    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(&IndexAction { index: self })
    }
}

#[derive(Serialize)]
struct IndexAction<'a> {
    index: &'a ActionMeta<'a>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkResponse {
    took: u64,
    #[serde(default)]
    errors: bool,
    #[serde(default)]
    items: Vec<Value>,
}

impl BulkResponse {
    pub fn get_took(&self) -> u64 {
        self.took
    }
    pub fn has_errors(&self) -> bool {
        self.errors
    }
    pub fn get_items(&self) -> &Vec<Value> {
        &self.items
    }

    /// Items whose operation carries an `error` object.
    pub fn failed_items(&self) -> usize {
        self.items
            .iter()
            .filter_map(|item| item.as_object())
            .filter_map(|item| item.values().next())
            .filter(|op| op.get("error").is_some())
            .count()
    }
}

/// What the driver sees after a flush.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkResult {
    pub took: u64,
    pub errors: bool,
    pub docs: usize,
    pub failed: usize,
}

impl BulkResult {
    /// `docs` is the number of documents that went out in the request.
    pub fn from_response(response: &BulkResponse, docs: usize) -> Self {
        Self {
            took: response.get_took(),
            errors: response.has_errors(),
            docs,
            failed: response.failed_items().min(docs),
        }
    }

    pub fn succeeded(&self) -> usize {
        self.docs - self.failed
    }
}
