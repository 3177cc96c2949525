//! In-memory repository used as a test double and offline stand-in.
//!
//! # Responsibility
//! - Emulate the remote collection with a plain row vector.
//! - Fail scripted operations with caller-provided errors.
//! - Record every call so tests can assert on the traffic a store produced.
//!
//! # Invariants
//! - A scripted failure is consumed by exactly one call of its operation.
//! - Failed calls never touch the stored rows.

use crate::model::record::Record;
use crate::repo::record_repo::{RecordRepository, RepoError, RepoOperation, RepoResult};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};

/// Repository keeping "server" rows in process memory.
pub struct InMemoryRecordRepository<E: Record> {
    rows: Mutex<Vec<E>>,
    failures: Mutex<HashMap<RepoOperation, VecDeque<RepoError>>>,
    calls: Mutex<Vec<RepoOperation>>,
}

impl<E: Record> Default for InMemoryRecordRepository<E> {
    fn default() -> Self {
        Self::with_rows(Vec::new())
    }
}

impl<E: Record> InMemoryRecordRepository<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `rows` already present remotely.
    pub fn with_rows(rows: Vec<E>) -> Self {
        Self {
            rows: Mutex::new(rows),
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Makes the next `operation` call fail with `error`.
    ///
    /// Multiple failures for one operation are returned in FIFO order.
    pub fn fail_next(&self, operation: RepoOperation, error: RepoError) {
        self.failures
            .lock()
            .entry(operation)
            .or_default()
            .push_back(error);
    }

    /// Replaces remote rows, emulating changes made by another client.
    pub fn replace_rows(&self, rows: Vec<E>) {
        *self.rows.lock() = rows;
    }

    pub fn rows(&self) -> Vec<E> {
        self.rows.lock().clone()
    }

    /// Operations received so far, in call order.
    pub fn calls(&self) -> Vec<RepoOperation> {
        self.calls.lock().clone()
    }

    fn begin(&self, operation: RepoOperation) -> RepoResult<()> {
        self.calls.lock().push(operation);
        match self
            .failures
            .lock()
            .get_mut(&operation)
            .and_then(VecDeque::pop_front)
        {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl<E: Record> RecordRepository<E> for InMemoryRecordRepository<E> {
    fn fetch_all(&self) -> RepoResult<Vec<E>> {
        self.begin(RepoOperation::FetchAll)?;
        Ok(self.rows())
    }

    fn create(&self, record: &E) -> RepoResult<()> {
        self.begin(RepoOperation::Create)?;
        record.validate()?;
        self.rows.lock().push(record.clone());
        Ok(())
    }

    fn delete(&self, id: &E::Id) -> RepoResult<()> {
        self.begin(RepoOperation::Delete)?;
        // Deleting an absent id succeeds, as a filtered DELETE does remotely.
        self.rows.lock().retain(|row| row.id() != id);
        Ok(())
    }
}
