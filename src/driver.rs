use std::io::Write;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, info};

use crate::conf::Config;
use crate::error::{BenchError, Result};
use crate::indexer::IndexingClient;
use crate::models::document::Document;
use crate::pool::StringPool;
use crate::stats::Counters;

pub const DEFAULT_START: u64 = 1;

/// Absent or empty start offsets fall back to 1, anything else must be a
/// non-negative integer.
pub fn parse_start(value: Option<&str>) -> Result<u64> {
    match value {
        None | Some("") => Ok(DEFAULT_START),
        Some(value) => value.parse().map_err(|source| BenchError::InvalidStart {
            value: value.to_string(),
            source,
        }),
    }
}

#[derive(Debug, Clone)]
pub struct RunPlan {
    pub start: u64,
    pub iterations: u64,
    pub bulk_size: u64,
    pub index_name: String,
    pub doc_type: String,
    pub flush_remaining: bool,
}

impl RunPlan {
    pub fn from_config(config: &Config, start: u64) -> Self {
        Self {
            start,
            iterations: config.get_iterations(),
            bulk_size: config.get_bulk_size(),
            index_name: config.get_index_name().clone(),
            doc_type: config.get_doc_type().clone(),
            flush_remaining: config.is_flush_remaining(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub documents: u64,
    pub flushes: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub total_counter: u64,
    pub elapsed: Duration,
}

pub struct BenchmarkDriver<C, R> {
    client: C,
    pool: StringPool,
    rng: R,
    plan: RunPlan,
}

impl<C: IndexingClient, R: Rng> BenchmarkDriver<C, R> {
    pub fn new(client: C, pool: StringPool, rng: R, plan: RunPlan) -> Self {
        Self {
            client,
            pool,
            rng,
            plan,
        }
    }

    pub fn into_client(self) -> C {
        self.client
    }

    /// Submits every document of the plan, writing one line to `out` per flush.
    pub async fn run<W: Write>(&mut self, out: &mut W) -> Result<RunSummary> {
        let mut counters = Counters::start(self.plan.bulk_size);
        let mut documents = 0;
        let mut flushes = 0;
        let mut succeeded = 0;
        let mut failed = 0;
        let end = self.plan.start.saturating_add(self.plan.iterations);

        info!(
            "Submitting ids {}..{} to {}/{} with bulk size {}",
            self.plan.start, end, self.plan.index_name, self.plan.doc_type, self.plan.bulk_size
        );

        for id in self.plan.start..end {
            let document = Document::generate(&self.pool, &mut self.rng);
            let result = self
                .client
                .index(&document, &self.plan.index_name, &self.plan.doc_type, id)
                .await?;
            documents += 1;
            counters.record();

            if let Some(result) = result {
                if result.errors {
                    debug!("Flush at id {} carried {} failed items", id, result.failed);
                }
                flushes += 1;
                succeeded += result.succeeded() as u64;
                failed += result.failed as u64;
                let line = counters.report(result.took);
                writeln!(out, "{}", line)?;
                out.flush()?;
            }
        }

        if self.plan.flush_remaining {
            if let Some(result) = self.client.flush().await? {
                debug!("Flushed remaining {} docs", result.docs);
                flushes += 1;
                succeeded += result.succeeded() as u64;
                failed += result.failed as u64;
                writeln!(out, "{}", counters.report(result.took))?;
                out.flush()?;
            }
        }

        Ok(RunSummary {
            documents,
            flushes,
            succeeded,
            failed,
            total_counter: counters.get_total(),
            elapsed: counters.elapsed(),
        })
    }
}
