use std::path::Path;

use human_bytes::human_bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Certificate, Client, RequestBuilder, Response};
use tracing::{debug, info, warn};

use crate::audit_builder::{AuditBuilder, What};
use crate::conf::{BasicAuth, Config};
use crate::error::{BenchError, Result};
use crate::models::bulk::BulkResponse;
use crate::models::server_info::ServerInfo;

const NDJSON: &str = "application/x-ndjson";

pub struct EsClient {
    url: String,
    basic_auth: Option<BasicAuth>,
    http_client: Client,
    audit: AuditBuilder,
}

fn inject_auth(request_builder: RequestBuilder, basic_auth: &Option<BasicAuth>) -> RequestBuilder {
    match basic_auth {
        Some(auth) => request_builder.basic_auth(auth.get_username(), auth.get_password().as_ref()),
        None => request_builder,
    }
}

async fn check_status(url: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(BenchError::Status {
        url: url.to_string(),
        status: status.as_u16(),
        body,
    })
}

impl EsClient {
    pub fn new(url: &str, basic_auth: Option<BasicAuth>, http_client: Client, audit: AuditBuilder) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            basic_auth,
            http_client,
            audit,
        }
    }

    pub async fn from_config(config: &Config) -> Result<Self> {
        let http_client = build_reqwest_client(
            config.get_root_certificates().as_deref(),
            config.is_insecure(),
        )?;
        let audit = match config.get_audit_file() {
            Some(file_name) => AuditBuilder::new(file_name).await?,
            None => AuditBuilder::disabled(),
        };
        Ok(Self::new(
            config.get_url(),
            config.get_basic_auth().clone(),
            http_client,
            audit,
        ))
    }

    pub fn get_url(&self) -> &String {
        &self.url
    }

    async fn call_get(&self, path: &str) -> Result<String> {
        let url = format!("{}{}", self.url, path);
        let request_builder = inject_auth(self.http_client.get(&url), &self.basic_auth);
        let response = check_status(&url, request_builder.send().await?).await?;
        Ok(response.text().await?)
    }

    pub async fn server_info(&self) -> Result<ServerInfo> {
        let body = self.call_get("/").await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn print_server_info(&self, prefix: &str) -> Result<ServerInfo> {
        let server_info = self.server_info().await?;
        info!(
            "{}: hostname={}, name={}, uuid={:?}, version={}, lucene={:?}",
            prefix,
            server_info.get_node_name(),
            server_info.get_cluster_name(),
            server_info.get_cluster_uuid(),
            server_info.get_version(),
            server_info.get_lucene_version()
        );
        Ok(server_info)
    }

    /// Sends one NDJSON body to `_bulk`. `docs` is only used for logging.
    pub async fn bulk(&mut self, body: String, docs: usize) -> Result<BulkResponse> {
        let url = format!("{}/_bulk", self.url);
        debug!("Bulk request with {} docs ({})", docs, human_bytes(body.len() as f64));
        if self.audit.is_enabled() {
            let details = format!("docs={} bytes={}", docs, body.len());
            self.write_audit(What::BulkRequest, &details).await;
        }

        let request_builder = inject_auth(self.http_client.post(&url), &self.basic_auth)
            .header(CONTENT_TYPE, NDJSON)
            .body(body);

        let outcome = self.send_bulk(&url, request_builder).await;
        match &outcome {
            Ok(response) => {
                let details = format!("took={} errors={}", response.get_took(), response.has_errors());
                self.write_audit(What::BulkResponseOk, &details).await;
                if response.has_errors() {
                    warn!(
                        "Bulk response reported {} failed items out of {}",
                        response.failed_items(),
                        response.get_items().len()
                    );
                }
            }
            Err(err) => {
                self.write_audit(What::BulkResponseErr, &err.to_string()).await;
            }
        }
        outcome
    }

    /// Audit trouble is logged and never replaces the bulk outcome.
    async fn write_audit(&mut self, what: What, details: &str) {
        if let Err(e) = self.audit.record(what, details).await {
            warn!("Failed to write audit record: {}", e);
        }
    }

    async fn send_bulk(&self, url: &str, request_builder: RequestBuilder) -> Result<BulkResponse> {
        let response = check_status(url, request_builder.send().await?).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

pub fn build_reqwest_client(ca_path: Option<&Path>, insecure: bool) -> Result<Client> {
    let mut builder = Client::builder();
    if insecure {
        warn!("TLS certificate verification is disabled");
        builder = builder.danger_accept_invalid_certs(true);
    }
    if let Some(path) = ca_path {
        for cert in load_certificates(path)? {
            builder = builder.add_root_certificate(cert);
        }
    }
    Ok(builder.build()?)
}

fn load_certificates(path: &Path) -> Result<Vec<Certificate>> {
    let to_err = |source| BenchError::Certificates {
        path: path.to_path_buf(),
        source,
    };
    let mut certs = Vec::new();
    for entry in std::fs::read_dir(path).map_err(to_err)? {
        let file_path = entry.map_err(to_err)?.path();
        if !file_path.is_file() {
            continue;
        }
        let content = std::fs::read(&file_path).map_err(to_err)?;
        match Certificate::from_pem(&content) {
            Ok(cert) => certs.push(cert),
            Err(e) => warn!("Skipping {:?}, not a PEM certificate: {}", file_path, e),
        }
    }
    Ok(certs)
}
