//! In-memory list store backed by a record repository.
//!
//! # Responsibility
//! - Hold the authoritative list rendered by the UI.
//! - Apply local changes only after the repository confirms them.
//! - Surface failures as `StoreError` values and diagnostics.
//!
//! # Invariants
//! - `load` replaces the list wholesale; it never merges. Rows are kept as
//!   the backend returns them, duplicate ids included.
//! - `add` and `delete` leave no other entry with the affected id.
//! - A failed operation leaves the list untouched.
//! - Repository calls run outside the list lock; each list mutation is one
//!   critical section, so concurrent callers cannot interleave a mutation.

use crate::model::record::{Record, RecordKind};
use crate::repo::record_repo::{RecordRepository, RepoError};
use crate::store::diagnostics::{Diagnostic, DiagnosticLog};
use log::{debug, info};
use parking_lot::Mutex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;

pub type StoreResult<T> = Result<T, StoreError>;

/// User-visible store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    Load,
    Add,
    Delete,
}

impl StoreOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Add => "add",
            Self::Delete => "delete",
        }
    }
}

impl Display for StoreOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Store operation failure wrapping the repository cause.
#[derive(Debug)]
pub struct StoreError {
    kind: RecordKind,
    operation: StoreOperation,
    source: RepoError,
}

impl StoreError {
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn operation(&self) -> StoreOperation {
        self.operation
    }

    pub fn repo_error(&self) -> &RepoError {
        &self.source
    }

    pub fn into_repo_error(self) -> RepoError {
        self.source
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} failed: {}", self.kind, self.operation, self.source)
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// Lifecycle of the list as seen by the UI.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Nothing fetched yet.
    #[default]
    Idle,
    Loading,
    /// The list reflects the last successful fetch plus confirmed changes.
    Ready,
    /// The last fetch failed; the list keeps its previous content.
    Failed { message: String },
}

impl LoadState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Consistent view of a store taken under one lock.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSnapshot<E> {
    pub records: Vec<E>,
    pub load_state: LoadState,
    pub revision: u64,
}

struct ListState<E> {
    records: Vec<E>,
    load_state: LoadState,
    revision: u64,
}

impl<E: Record> ListState<E> {
    fn touch(&mut self) {
        self.revision += 1;
    }

    /// Drops every entry with `id` and returns how many were removed.
    fn remove_id(&mut self, id: &E::Id) -> usize {
        let before = self.records.len();
        self.records.retain(|record| record.id() != id);
        before - self.records.len()
    }
}

/// View-model store for one record type.
///
/// Shared between threads through `Arc`; all methods take `&self`.
pub struct RecordStore<E: Record> {
    repo: Arc<dyn RecordRepository<E>>,
    state: Mutex<ListState<E>>,
    diagnostics: DiagnosticLog,
}

impl<E: Record> RecordStore<E> {
    pub fn new(repo: Arc<dyn RecordRepository<E>>) -> Self {
        Self {
            repo,
            state: Mutex::new(ListState {
                records: Vec::new(),
                load_state: LoadState::Idle,
                revision: 0,
            }),
            diagnostics: DiagnosticLog::default(),
        }
    }

    pub fn from_repository(repo: impl RecordRepository<E> + 'static) -> Self {
        Self::new(Arc::new(repo))
    }

    /// Fetches the remote collection and replaces the list with it.
    ///
    /// Returns the number of loaded records. On failure the previous list is
    /// kept and the state becomes `LoadState::Failed`.
    pub fn load(&self) -> StoreResult<usize> {
        let started_at = Instant::now();
        self.state.lock().load_state = LoadState::Loading;

        match self.repo.fetch_all() {
            Ok(records) => {
                let count = records.len();
                {
                    let mut state = self.state.lock();
                    state.records = records;
                    state.load_state = LoadState::Ready;
                    state.touch();
                }
                info!(
                    "event=store_load module=store status=ok kind={} count={} duration_ms={}",
                    E::KIND,
                    count,
                    started_at.elapsed().as_millis()
                );
                Ok(count)
            }
            Err(err) => {
                self.state.lock().load_state = LoadState::Failed {
                    message: err.to_string(),
                };
                Err(self.fail(StoreOperation::Load, err))
            }
        }
    }

    /// Creates `record` remotely, then appends it to the list.
    ///
    /// A record whose id is already listed is moved to the end instead of
    /// being duplicated.
    pub fn add(&self, record: E) -> StoreResult<()> {
        if let Err(err) = self.repo.create(&record) {
            return Err(self.fail(StoreOperation::Add, err));
        }

        let mut state = self.state.lock();
        state.remove_id(record.id());
        debug!(
            "event=store_add module=store status=ok kind={} id={}",
            E::KIND,
            record.id()
        );
        state.records.push(record);
        state.touch();
        Ok(())
    }

    /// Deletes `record` remotely, then removes it from the list.
    pub fn delete(&self, record: &E) -> StoreResult<()> {
        self.delete_by_id(record.id())
    }

    /// Deletes by id; succeeds even when the id is not currently listed.
    pub fn delete_by_id(&self, id: &E::Id) -> StoreResult<()> {
        if let Err(err) = self.repo.delete(id) {
            return Err(self.fail(StoreOperation::Delete, err));
        }

        let mut state = self.state.lock();
        if state.remove_id(id) > 0 {
            state.touch();
        }
        debug!(
            "event=store_delete module=store status=ok kind={} id={}",
            E::KIND,
            id
        );
        Ok(())
    }

    pub fn records(&self) -> Vec<E> {
        self.state.lock().records.clone()
    }

    pub fn get(&self, id: &E::Id) -> Option<E> {
        self.state
            .lock()
            .records
            .iter()
            .find(|record| record.id() == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.state.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().records.is_empty()
    }

    pub fn load_state(&self) -> LoadState {
        self.state.lock().load_state.clone()
    }

    /// Counter bumped by every list mutation.
    pub fn revision(&self) -> u64 {
        self.state.lock().revision
    }

    pub fn snapshot(&self) -> StoreSnapshot<E> {
        let state = self.state.lock();
        StoreSnapshot {
            records: state.records.clone(),
            load_state: state.load_state.clone(),
            revision: state.revision,
        }
    }

    /// Recorded failures, oldest first.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.entries()
    }

    pub fn clear_diagnostics(&self) {
        self.diagnostics.clear();
    }

    fn fail(&self, operation: StoreOperation, source: RepoError) -> StoreError {
        self.diagnostics
            .record(E::KIND, operation, source.code(), source.to_string());
        StoreError {
            kind: E::KIND,
            operation,
            source,
        }
    }
}
