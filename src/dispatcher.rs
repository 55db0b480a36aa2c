// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Runs authentication units and funnels successes into one collector.

use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::errors::NetworkError;
use crate::scanners::ScannerUnit;
use crate::types::ScanResult;

pub const DEFAULT_SINK_CAPACITY: usize = 256;

/// Producer side of the result channel. Cheap to clone, one per worker if needed.
#[derive(Clone)]
pub struct ResultSink {
    tx: mpsc::Sender<ScanResult>,
}

impl ResultSink {
    /// Bounded channel plus the collector that drains it
    pub fn channel(capacity: usize) -> (ResultSink, ResultCollector) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (ResultSink { tx }, ResultCollector { rx })
    }

    /// Returns false once the collector has gone away
    pub async fn push(&self, result: ScanResult) -> bool {
        self.tx.send(result).await.is_ok()
    }
}

/// Single consumer of the result channel
pub struct ResultCollector {
    rx: mpsc::Receiver<ScanResult>,
}

impl ResultCollector {
    /// Drains until every [`ResultSink`] clone is dropped
    pub fn spawn(mut self) -> JoinHandle<Vec<ScanResult>> {
        tokio::spawn(async move {
            let mut results = Vec::new();
            while let Some(result) = self.rx.recv().await {
                results.push(result);
            }
            debug!("[Dispatch] Collector finished with {} results", results.len());
            results
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

enum UnitOutcome {
    Success,
    Rejected,
    Failed,
}

pub struct ScanDispatcher {
    max_concurrency: usize,
}

impl ScanDispatcher {
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Run every unit with bounded concurrency. A unit that fails at the
    /// transport level is logged and counted; its siblings keep running.
    pub async fn dispatch(&self, units: Vec<ScannerUnit>, sink: &ResultSink) -> DispatchStats {
        info!(
            "[Dispatch] Running {} authentication attempts (concurrency {})",
            units.len(),
            self.max_concurrency
        );

        let outcomes: Vec<UnitOutcome> = stream::iter(units)
            .map(|unit| async move { run_unit(&unit, sink).await })
            .buffer_unordered(self.max_concurrency)
            .collect()
            .await;

        let mut stats = DispatchStats {
            attempted: outcomes.len(),
            ..Default::default()
        };
        for outcome in outcomes {
            match outcome {
                UnitOutcome::Success => stats.succeeded += 1,
                UnitOutcome::Failed => stats.failed += 1,
                UnitOutcome::Rejected => {}
            }
        }

        info!(
            "[Dispatch] {} attempts, {} successful logins, {} transport failures",
            stats.attempted, stats.succeeded, stats.failed
        );
        stats
    }
}

async fn run_unit(unit: &ScannerUnit, sink: &ResultSink) -> UnitOutcome {
    match unit.scan().await {
        Ok(Some(result)) => {
            warn!(
                "[Dispatch] Default credentials accepted: {} {} {}:{}",
                result.profile, result.url, result.username, result.password
            );
            if !sink.push(result).await {
                warn!("[Dispatch] Result collector closed, result dropped");
            }
            UnitOutcome::Success
        }
        Ok(None) => UnitOutcome::Rejected,
        Err(e) => {
            log_failure(unit, &e);
            UnitOutcome::Failed
        }
    }
}

fn log_failure(unit: &ScannerUnit, error: &NetworkError) {
    let ctx = unit.context();
    debug!(
        "[Dispatch] {} attempt on {} failed ({}): {}",
        ctx.profile.name,
        ctx.url,
        error.kind(),
        error
    );
}
