// crates/utilmat-build/src/orchestrator.rs
//
// Build orchestration: in-memory or streaming path, then reconciliation.
//
// In-memory path: resolve once, reshape once, append once.
// Streaming path: per batch, resolve -> reshape -> append, in arrival order,
// dropping each batch and fragment after it is appended. Peak memory is the
// scaffold, the rows accumulated so far, and one batch.
//
// Both paths end with exactly one reconciliation pass. Each build starts
// from a fresh scaffold; nothing is shared between builds.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use utilmat_core::{Catalog, EventSource, RatingEvent, UtilityMatrix, UtilmatError};

use crate::accumulator::Accumulator;
use crate::reconcile::{ConflictPolicy, ReconcileReport};
use crate::reshape::reshape_chunk;
use crate::resolver::resolve_events;
use crate::scaffold::Scaffold;

/// Identifier of one matrix build, used to correlate log lines and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildId(pub Uuid);

impl BuildId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for BuildId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which input path a build took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildPath {
    /// Single reshape of a preloaded event collection.
    InMemory,
    /// Fixed-size batches from an event source.
    Streaming,
}

impl fmt::Display for BuildPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildPath::InMemory => write!(f, "in-memory"),
            BuildPath::Streaming => write!(f, "streaming"),
        }
    }
}

/// Counters and timestamps for one build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    pub build_id: BuildId,
    pub path: BuildPath,
    /// Batches processed (1 for the in-memory path).
    pub chunks: usize,
    /// Events received from the input.
    pub events_seen: usize,
    /// Events with a known item id.
    pub events_resolved: usize,
    /// Events dropped because their item id is not in the catalog.
    pub unknown_item_events: usize,
    /// Same-batch repeats of a (user, item) pair that were discarded.
    pub intra_batch_duplicates: usize,
    /// Rows accumulated before reconciliation.
    pub physical_rows: usize,
    pub reconcile: ReconcileReport,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// The final matrix together with its build report.
#[derive(Debug, Clone)]
pub struct BuiltMatrix {
    pub matrix: UtilityMatrix,
    pub report: BuildReport,
}

/// Input of a build: preloaded events, or a source with location and chunk
/// size. Preloaded events take precedence when non-empty.
#[derive(Default)]
pub struct BuildRequest<'a> {
    /// Source location, interpreted only by `source`.
    pub location: Option<String>,
    /// Records per batch on the streaming path.
    pub chunk_size: usize,
    /// Preloaded events for the in-memory path.
    pub in_memory_events: Option<Vec<RatingEvent>>,
    /// Batch producer for the streaming path.
    pub source: Option<&'a dyn EventSource>,
}

impl<'a> BuildRequest<'a> {
    /// Request for the in-memory path.
    pub fn in_memory(events: Vec<RatingEvent>) -> Self {
        Self {
            in_memory_events: Some(events),
            ..Default::default()
        }
    }

    /// Request for the streaming path.
    pub fn streaming(
        source: &'a dyn EventSource,
        location: impl Into<String>,
        chunk_size: usize,
    ) -> Self {
        Self {
            location: Some(location.into()),
            chunk_size,
            source: Some(source),
            ..Default::default()
        }
    }
}

/// Builds utility matrices against one catalog.
#[derive(Debug, Clone, Copy)]
pub struct MatrixBuilder<'c> {
    catalog: &'c Catalog,
    policy: ConflictPolicy,
}

impl<'c> MatrixBuilder<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self {
            catalog,
            policy: ConflictPolicy::default(),
        }
    }

    /// Set how conflicting cross-chunk ratings are handled.
    pub fn with_conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn conflict_policy(&self) -> ConflictPolicy {
        self.policy
    }

    /// Dispatch a request to the in-memory or streaming path.
    ///
    /// Fails with `Usage` if neither non-empty preloaded events nor an event
    /// source with a location were supplied.
    pub fn build(&self, request: BuildRequest<'_>) -> Result<BuiltMatrix, UtilmatError> {
        if let Some(events) = request.in_memory_events {
            if !events.is_empty() {
                return self.build_in_memory(events);
            }
        }

        match (request.source, request.location) {
            (Some(source), Some(location)) => {
                self.build_streaming(source, &location, request.chunk_size)
            }
            (Some(_), None) => Err(UtilmatError::Usage(
                "an event source was supplied without a location".to_string(),
            )),
            (None, _) => Err(UtilmatError::Usage(
                "no in-memory events and no event source supplied".to_string(),
            )),
        }
    }

    /// Build from a preloaded event collection without chunking.
    pub fn build_in_memory(&self, events: Vec<RatingEvent>) -> Result<BuiltMatrix, UtilmatError> {
        if events.is_empty() {
            return Err(UtilmatError::Usage(
                "the in-memory event collection is empty".to_string(),
            ));
        }

        let mut run = BuildRun::start(self.catalog, BuildPath::InMemory);
        let span = tracing::info_span!("build", build_id = %run.build_id);
        let _guard = span.enter();

        run.ingest(events, self.catalog)?;
        self.finish(run)
    }

    /// Build from fixed-size batches of `source` opened at `location`.
    pub fn build_streaming(
        &self,
        source: &dyn EventSource,
        location: &str,
        chunk_size: usize,
    ) -> Result<BuiltMatrix, UtilmatError> {
        if chunk_size == 0 {
            return Err(UtilmatError::Usage("chunk size must be at least 1".to_string()));
        }
        if location.trim().is_empty() {
            return Err(UtilmatError::Usage("event source location is empty".to_string()));
        }

        let mut run = BuildRun::start(self.catalog, BuildPath::Streaming);
        let span = tracing::info_span!("build", build_id = %run.build_id);
        let _guard = span.enter();

        for batch in source.batches(location, chunk_size)? {
            run.ingest(batch?, self.catalog)?;
        }
        self.finish(run)
    }

    fn finish(&self, run: BuildRun) -> Result<BuiltMatrix, UtilmatError> {
        let physical_rows = run.acc.physical_rows();
        let (matrix, reconcile) = run.acc.reconcile(self.policy)?;
        let finished_at = Utc::now();

        tracing::info!(
            "Build finished: {} users x {} items ({} rated cells, {} duplicated users) in {} ms",
            matrix.len(),
            matrix.width(),
            matrix.rated_cells(),
            reconcile.duplicated_users,
            (finished_at - run.started_at).num_milliseconds()
        );

        let report = BuildReport {
            build_id: run.build_id,
            path: run.path,
            chunks: run.chunks,
            events_seen: run.events_seen,
            events_resolved: run.events_resolved,
            unknown_item_events: run.unknown_item_events,
            intra_batch_duplicates: run.intra_batch_duplicates,
            physical_rows,
            reconcile,
            started_at: run.started_at,
            finished_at,
        };
        Ok(BuiltMatrix { matrix, report })
    }
}

/// Build from a request against `catalog` with the default conflict policy.
pub fn build_utility_matrix(
    catalog: &Catalog,
    request: BuildRequest<'_>,
) -> Result<BuiltMatrix, UtilmatError> {
    MatrixBuilder::new(catalog).build(request)
}

/// State of one in-progress build.
struct BuildRun {
    build_id: BuildId,
    path: BuildPath,
    scaffold: Scaffold,
    acc: Accumulator,
    chunks: usize,
    events_seen: usize,
    events_resolved: usize,
    unknown_item_events: usize,
    intra_batch_duplicates: usize,
    started_at: DateTime<Utc>,
}

impl BuildRun {
    fn start(catalog: &Catalog, path: BuildPath) -> Self {
        let build_id = BuildId::new();
        let scaffold = Scaffold::from_catalog(catalog);
        let acc = scaffold.accumulator();

        tracing::info!(
            "Starting {} build {} over {} item columns",
            path,
            build_id,
            scaffold.columns().len()
        );

        Self {
            build_id,
            path,
            scaffold,
            acc,
            chunks: 0,
            events_seen: 0,
            events_resolved: 0,
            unknown_item_events: 0,
            intra_batch_duplicates: 0,
            started_at: Utc::now(),
        }
    }

    /// Resolve, reshape, and append one batch.
    fn ingest(&mut self, batch: Vec<RatingEvent>, catalog: &Catalog) -> Result<(), UtilmatError> {
        self.chunks += 1;
        let events_in = batch.len();

        let resolution = resolve_events(batch, catalog);
        let resolved = resolution.events.len();
        let fragment = reshape_chunk(resolution.events, self.scaffold.columns())?;
        let fragment_rows = fragment.len();
        let duplicates = fragment.duplicates_dropped();
        self.acc.append(fragment)?;

        self.events_seen += events_in;
        self.events_resolved += resolved;
        self.unknown_item_events += resolution.unknown_items;
        self.intra_batch_duplicates += duplicates;

        tracing::info!(
            "processing chunk {}: {} events, {} resolved, {} user rows",
            self.chunks,
            events_in,
            resolved,
            fragment_rows
        );
        if resolution.unknown_items > 0 || duplicates > 0 {
            tracing::debug!(
                "chunk {}: dropped {} unknown-item events and {} duplicate ratings",
                self.chunks,
                resolution.unknown_items,
                duplicates
            );
        }

        Ok(())
    }
}
