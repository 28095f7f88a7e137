//! In-memory target query that records its calls.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use gn2gyp::label::Label;
use gn2gyp::model::{Project, Snapshot};
use gn2gyp::snapshot::{RawTargets, TargetQuery};

/// Answers queries from a stored snapshot.
///
/// Every call is recorded, the peak number of concurrent calls is tracked,
/// and each call can be delayed so that overlapping requests are observable.
#[derive(Debug, Default)]
pub struct RecordingQuery {
    snapshot: Snapshot,
    delay: Option<Duration>,
    failing: Option<String>,
    calls: Mutex<Vec<(String, String)>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl RecordingQuery {
    /// Answer from the targets of `project`.
    pub fn new(project: &Project) -> Self {
        Self {
            snapshot: project.to_snapshot(),
            ..Self::default()
        }
    }

    /// Sleep for `delay` inside every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fail every query for `label`.
    pub fn failing_on(mut self, label: &str) -> Self {
        self.failing = Some(label.to_owned());
        self
    }

    /// Recorded `(build, label)` pairs in call order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().expect("calls lock").clone()
    }

    /// Number of calls made for `label` in `build`.
    pub fn calls_for(&self, build: &str, label: &str) -> usize {
        self.calls()
            .iter()
            .filter(|(b, l)| b == build && l == label)
            .count()
    }

    /// Highest number of calls observed running at once.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn lookup(&self, build: &str, label: &str) -> Result<RawTargets> {
        let targets = self
            .snapshot
            .get(build)
            .ok_or_else(|| anyhow!("unknown build `{build}`"))?;
        let variants: RawTargets = targets
            .iter()
            .filter(|(raw, _)| {
                Label::parse(raw)
                    .map(|parsed| parsed.without_toolchain().to_string() == label)
                    .unwrap_or(false)
            })
            .map(|(raw, target)| (raw.clone(), target.clone()))
            .collect();
        if variants.is_empty() {
            return Err(anyhow!("`{label}` is not defined in `{build}`"));
        }
        Ok(variants)
    }
}

#[async_trait]
impl TargetQuery for RecordingQuery {
    async fn describe(&self, build: &str, label: &str) -> Result<RawTargets> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((build.to_owned(), label.to_owned()));
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        } else {
            tokio::task::yield_now().await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if self.failing.as_deref() == Some(label) {
            return Err(anyhow!("gn desc failed for `{label}`"));
        }
        self.lookup(build, label)
    }
}
