//! Concurrent construction of a [`Project`] from raw target queries.
//!
//! [`SnapshotBuilder`] asks a [`TargetQuery`] for the roots of every build
//! and keeps following dependencies until each referenced label has been
//! described. Requests are keyed by the unqualified label: one answer
//! carries every toolchain variant of that label. Within a build, a label
//! that has been requested is never queried again, whether its answer is
//! still pending or already merged. A semaphore bounds the number of
//! queries running at once across all builds.

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use std::error::Error as StdError;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, try_join_all};
use futures::stream::{FuturesUnordered, StreamExt};
use indexmap::{IndexMap, IndexSet};
use miette::Diagnostic;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, info};

use crate::label::{Label, LabelError};
use crate::model::{DEFAULT_ROOT_TARGET, ModelError, Project, Snapshot, Target};

/// Queries allowed in flight when no limiter is injected.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Targets returned for one query, keyed by raw label.
pub type RawTargets = IndexMap<String, Target>;

/// Source of raw target descriptions, typically a wrapper around `gn desc`.
#[async_trait]
pub trait TargetQuery: Send + Sync {
    /// Describe `label` in the build directory `build`.
    ///
    /// The answer holds every toolchain variant of `label` that the build
    /// defines, keyed by raw label.
    async fn describe(&self, build: &str, label: &str) -> anyhow::Result<RawTargets>;
}

/// Errors raised while constructing a snapshot.
#[derive(Debug, Error, Diagnostic)]
pub enum SnapshotError {
    /// The query collaborator failed.
    #[error("failed to describe `{label}` in build `{build}`")]
    #[diagnostic(code(gn2gyp::snapshot::query))]
    Query {
        /// Build being described.
        build: String,
        /// Label being described.
        label: String,
        /// Failure reported by the query.
        #[source]
        source: Arc<dyn StdError + Send + Sync>,
    },
    /// The concurrency limiter was closed while queries were pending.
    #[error("the query limiter was closed")]
    #[diagnostic(code(gn2gyp::snapshot::limiter_closed))]
    LimiterClosed,
    /// A query answered with a malformed label.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Label(#[from] LabelError),
    /// The fetched targets do not form a valid project.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Model(#[from] ModelError),
}

#[derive(Debug)]
enum FetchFailure {
    Query(Arc<dyn StdError + Send + Sync>),
    LimiterClosed,
}

type FetchResult = Result<RawTargets, FetchFailure>;
type PendingFetch = BoxFuture<'static, (String, FetchResult)>;

/// Builds a [`Project`] by querying targets concurrently.
#[derive(Clone)]
pub struct SnapshotBuilder {
    query: Arc<dyn TargetQuery>,
    limiter: Arc<Semaphore>,
}

impl std::fmt::Debug for SnapshotBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotBuilder")
            .field("available_permits", &self.limiter.available_permits())
            .finish_non_exhaustive()
    }
}

impl SnapshotBuilder {
    /// Builder over `query` allowing [`DEFAULT_CONCURRENCY`] queries at once.
    #[must_use]
    pub fn new(query: Arc<dyn TargetQuery>) -> Self {
        Self {
            query,
            limiter: Arc::new(Semaphore::new(DEFAULT_CONCURRENCY)),
        }
    }

    /// Share `limiter` to bound in-flight queries.
    #[must_use]
    pub fn with_limiter(mut self, limiter: Arc<Semaphore>) -> Self {
        self.limiter = limiter;
        self
    }

    /// Describe the closure of `roots` in each of `builds`.
    ///
    /// [`DEFAULT_ROOT_TARGET`] is always described so every build knows its
    /// default toolchain. Builds are fetched concurrently.
    ///
    /// # Errors
    ///
    /// Returns the first failure; no partial project is produced.
    pub async fn build(&self, builds: &[String], roots: &[Label]) -> Result<Project, SnapshotError> {
        let mut names = IndexSet::new();
        for build in builds {
            if !names.insert(build.as_str()) {
                return Err(ModelError::DuplicateBuild {
                    build: build.clone(),
                }
                .into());
            }
        }

        let fetched = try_join_all(names.iter().map(|build| self.fetch_build(build, roots))).await?;
        let snapshot: Snapshot = names
            .iter()
            .map(|build| (*build).to_owned())
            .zip(fetched)
            .collect();
        info!(
            builds = snapshot.len(),
            targets = snapshot.values().map(IndexMap::len).sum::<usize>(),
            "fetched snapshot"
        );
        Ok(Project::from_snapshot(snapshot)?)
    }

    async fn fetch_build(&self, build: &str, roots: &[Label]) -> Result<RawTargets, SnapshotError> {
        let mut requested: IndexSet<String> = IndexSet::new();
        let mut pending: FuturesUnordered<PendingFetch> = FuturesUnordered::new();

        let seeds = roots
            .iter()
            .map(|root| root.without_toolchain().to_string())
            .chain(std::iter::once(DEFAULT_ROOT_TARGET.to_owned()));
        for label in seeds {
            pending.extend(self.request(&mut requested, build, label));
        }

        let mut targets = RawTargets::new();
        while let Some((label, result)) = pending.next().await {
            let described = result.map_err(|failure| match failure {
                FetchFailure::Query(source) => SnapshotError::Query {
                    build: build.to_owned(),
                    label: label.clone(),
                    source,
                },
                FetchFailure::LimiterClosed => SnapshotError::LimiterClosed,
            })?;
            debug!(build, label = %label, variants = described.len(), "described");
            for (raw, target) in described {
                Label::parse(&raw)?;
                for dep in &target.deps {
                    let bare = dep.without_toolchain().to_string();
                    pending.extend(self.request(&mut requested, build, bare));
                }
                targets.entry(raw).or_insert(target);
            }
        }
        debug!(build, requests = requested.len(), "build fetched");
        Ok(targets)
    }

    /// Start a request for `label` unless it was already requested.
    ///
    /// Returns the future to drive when the request is new.
    fn request(
        &self,
        requested: &mut IndexSet<String>,
        build: &str,
        label: String,
    ) -> Option<PendingFetch> {
        if !requested.insert(label.clone()) {
            return None;
        }
        let query = Arc::clone(&self.query);
        let limiter = Arc::clone(&self.limiter);
        let build_name = build.to_owned();
        Some(
            async move {
                let result = match limiter.acquire_owned().await {
                    Ok(_permit) => query.describe(&build_name, &label).await.map_err(|err| {
                        let source: Box<dyn StdError + Send + Sync> = err.into();
                        FetchFailure::Query(Arc::from(source))
                    }),
                    Err(_) => Err(FetchFailure::LimiterClosed),
                };
                (label, result)
            }
            .boxed(),
        )
    }
}
