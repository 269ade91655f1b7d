use tokio::{
    fs::{self, File, OpenOptions},
    io::AsyncWriteExt,
};

pub enum What {
    BulkRequest,
    BulkResponseOk,
    BulkResponseErr,
}

impl What {
    pub fn as_str(&self) -> &'static str {
        match self {
            What::BulkRequest => "BulkRequest",
            What::BulkResponseOk => "BulkResponseOk",
            What::BulkResponseErr => "BulkResponseErr",
        }
    }
}

/// Append-only trail of bulk traffic. Without a file every call is a no-op.
pub struct AuditBuilder {
    file_handler: Option<File>,
}

impl AuditBuilder {
    pub fn disabled() -> Self {
        Self { file_handler: None }
    }

    pub async fn new(file_name: &str) -> std::io::Result<Self> {
        if let Some(parent) = std::path::Path::new(file_name).parent() {
            fs::create_dir_all(parent).await?;
        }

        let file_handler = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_name)
            .await?;

        Ok(Self {
            file_handler: Some(file_handler),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.file_handler.is_some()
    }

    pub async fn record(&mut self, what: What, details: &str) -> std::io::Result<()> {
        if let Some(file) = self.file_handler.as_mut() {
            let line = format!(
                "{} {} {}\n",
                chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ"),
                what.as_str(),
                details
            );
            file.write_all(line.as_bytes()).await?;
            file.flush().await?;
        }
        Ok(())
    }
}
