use tracing::debug;

use crate::error::Result;
use crate::es_client::EsClient;
use crate::models::bulk::{ActionMeta, BulkResult};
use crate::models::document::Document;

/// Anything that accepts documents one at a time and decides on its own when
/// to send them. `Ok(None)` means the document is queued, `Ok(Some(_))` means
/// a batch went out with this call.
#[allow(async_fn_in_trait)]
pub trait IndexingClient {
    async fn index(
        &mut self,
        document: &Document,
        index_name: &str,
        doc_type: &str,
        id: u64,
    ) -> Result<Option<BulkResult>>;

    /// Sends whatever is pending, if anything.
    async fn flush(&mut self) -> Result<Option<BulkResult>>;
}

pub struct BulkIndexer {
    client: EsClient,
    bulk_size: usize,
    with_doc_type: bool,
    body: String,
    pending: usize,
}

impl BulkIndexer {
    pub fn new(client: EsClient, bulk_size: usize, with_doc_type: bool) -> Self {
        Self {
            client,
            bulk_size,
            with_doc_type,
            body: String::new(),
            pending: 0,
        }
    }

    pub fn get_pending(&self) -> usize {
        self.pending
    }
}

impl IndexingClient for BulkIndexer {
    async fn index(
        &mut self,
        document: &Document,
        index_name: &str,
        doc_type: &str,
        id: u64,
    ) -> Result<Option<BulkResult>> {
        let doc_type = if self.with_doc_type { Some(doc_type) } else { None };
        let action = ActionMeta::new(index_name, doc_type, id);
        self.body.push_str(&action.to_line()?);
        self.body.push('\n');
        self.body.push_str(&document.to_json()?);
        self.body.push('\n');
        self.pending += 1;

        if self.pending >= self.bulk_size {
            self.flush().await
        } else {
            Ok(None)
        }
    }

    async fn flush(&mut self) -> Result<Option<BulkResult>> {
        if self.pending == 0 {
            return Ok(None);
        }
        let body = std::mem::take(&mut self.body);
        let docs = std::mem::replace(&mut self.pending, 0);
        let response = self.client.bulk(body, docs).await?;
        debug!("Flushed {} docs, took={}", docs, response.get_took());
        Ok(Some(BulkResult::from_response(&response, docs)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit_builder::AuditBuilder;
    use crate::conf::PoolMode;
    use crate::error::BenchError;
    use crate::pool::StringPool;
    use crate::test_support::FakeEs;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn client(url: &str) -> EsClient {
        EsClient::new(url, None, reqwest::Client::new(), AuditBuilder::disabled())
    }

    #[tokio::test]
    async fn flushes_every_bulk_size_docs() {
        let fake = FakeEs::default();
        let url = fake.spawn("8.13.0").await;
        let mut indexer = BulkIndexer::new(client(&url), 3, false);
        let mut rng = StdRng::seed_from_u64(11);
        let pool = StringPool::new(1000, PoolMode::Replicated, &mut rng);

        let mut flushed = vec![];
        for id in 1..=7 {
            let doc = Document::generate(&pool, &mut rng);
            if let Some(result) = indexer.index(&doc, "pyindex", "pytype", id).await.unwrap() {
                flushed.push((id, result));
            }
        }

        assert_eq!(flushed.len(), 2);
        assert_eq!(flushed[0].0, 3);
        assert_eq!(flushed[1].0, 6);
        assert_eq!(flushed[0].1.took, FakeEs::TOOK);
        assert_eq!(flushed[0].1.docs, 3);
        assert_eq!(flushed[0].1.failed, 0);
        assert_eq!(indexer.get_pending(), 1);

        let last = indexer.flush().await.unwrap().unwrap();
        assert_eq!(last.docs, 1);
        assert!(indexer.flush().await.unwrap().is_none());

        let bodies = fake.bodies();
        assert_eq!(bodies.len(), 3);
        let first_action: serde_json::Value =
            serde_json::from_str(bodies[0].lines().next().unwrap()).unwrap();
        assert_eq!(first_action["index"]["_index"], "pyindex");
        assert_eq!(first_action["index"]["_id"], "1");
        assert!(first_action["index"].get("_type").is_none());
        assert_eq!(fake.docs_received(), 7);
    }

    #[tokio::test]
    async fn old_servers_get_doc_type() {
        let fake = FakeEs::default();
        let url = fake.spawn("6.8.23").await;
        let mut indexer = BulkIndexer::new(client(&url), 1, true);
        let mut rng = StdRng::seed_from_u64(12);
        let pool = StringPool::new(1000, PoolMode::Replicated, &mut rng);

        let doc = Document::generate(&pool, &mut rng);
        let result = indexer.index(&doc, "pyindex", "pytype", 42).await.unwrap();
        assert!(result.is_some());

        let bodies = fake.bodies();
        let action: serde_json::Value =
            serde_json::from_str(bodies[0].lines().next().unwrap()).unwrap();
        assert_eq!(action["index"]["_type"], "pytype");
        assert_eq!(action["index"]["_id"], "42");
        let source: serde_json::Value = serde_json::from_str(bodies[0].lines().nth(1).unwrap()).unwrap();
        assert_eq!(source.as_object().unwrap().len(), 26);
    }

    #[tokio::test]
    async fn rejected_items_are_counted() {
        let fake = FakeEs::rejecting(2);
        let url = fake.spawn("8.13.0").await;
        let mut indexer = BulkIndexer::new(client(&url), 5, false);
        let mut rng = StdRng::seed_from_u64(15);
        let pool = StringPool::new(1000, PoolMode::Replicated, &mut rng);

        let mut results = vec![];
        for id in 1..=5 {
            let doc = Document::generate(&pool, &mut rng);
            if let Some(result) = indexer.index(&doc, "pyindex", "pytype", id).await.unwrap() {
                results.push(result);
            }
        }

        assert_eq!(results.len(), 1);
        assert!(results[0].errors);
        assert_eq!(results[0].docs, 5);
        assert_eq!(results[0].failed, 2);
        assert_eq!(results[0].succeeded(), 3);
    }

    #[tokio::test]
    async fn server_failure_aborts() {
        let fake = FakeEs::failing();
        let url = fake.spawn("8.13.0").await;
        let mut indexer = BulkIndexer::new(client(&url), 1, false);
        let mut rng = StdRng::seed_from_u64(13);
        let pool = StringPool::new(1000, PoolMode::Replicated, &mut rng);

        let doc = Document::generate(&pool, &mut rng);
        let err = indexer.index(&doc, "pyindex", "pytype", 1).await.unwrap_err();
        assert!(matches!(err, BenchError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn connection_refused_is_an_http_error() {
        // nothing listens on the discard port in the test environment
        let mut indexer = BulkIndexer::new(client("http://127.0.0.1:9"), 1, false);
        let mut rng = StdRng::seed_from_u64(14);
        let pool = StringPool::new(1000, PoolMode::Replicated, &mut rng);

        let doc = Document::generate(&pool, &mut rng);
        let err = indexer.index(&doc, "pyindex", "pytype", 1).await.unwrap_err();
        assert!(matches!(err, BenchError::Http(_)));
    }
}
