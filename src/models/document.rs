use std::collections::BTreeMap;

use rand::Rng;
use serde::Serialize;

use crate::pool::StringPool;

pub const FIELD_KEYS: [char; 26] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r',
    's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// Synthetic source document, one pool value per letter key.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Document {
    fields: BTreeMap<String, String>,
}

impl Document {
    pub fn generate<R: Rng + ?Sized>(pool: &StringPool, rng: &mut R) -> Self {
        let fields = FIELD_KEYS
            .iter()
            .map(|key| (key.to_string(), pool.pick(rng).to_string()))
            .collect();
        Self { fields }
    }

    pub fn get_fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
