use semver::Version as Semver;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Mapping types were removed from the bulk API in this major version.
pub const TYPELESS_SINCE_MAJOR: u64 = 7;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerInfo {
    #[serde(rename = "name")]
    node_name: String,
    cluster_name: String,
    #[serde(default)]
    cluster_uuid: Option<String>,
    version: Version,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Version {
    number: String,
    #[serde(default)]
    lucene_version: Option<String>,
}

impl ServerInfo {
    pub fn get_node_name(&self) -> &String {
        &self.node_name
    }
    pub fn get_cluster_name(&self) -> &String {
        &self.cluster_name
    }
    pub fn get_cluster_uuid(&self) -> &Option<String> {
        &self.cluster_uuid
    }
    pub fn get_version(&self) -> &String {
        &self.version.number
    }
    pub fn get_lucene_version(&self) -> &Option<String> {
        &self.version.lucene_version
    }

    pub fn get_version_major(&self) -> Result<u64> {
        // snapshot builds report e.g. "8.13.0-SNAPSHOT", which semver accepts
        let version = Semver::parse(&self.version.number)?;
        Ok(version.major)
    }

    pub fn accepts_doc_types(&self) -> Result<bool> {
        Ok(self.get_version_major()? < TYPELESS_SINCE_MAJOR)
    }
}
