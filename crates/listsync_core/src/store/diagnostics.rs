//! Bounded journal of store failures.
//!
//! Every entry is also written to the process log at `warn` level.

use crate::model::record::RecordKind;
use crate::store::record_store::StoreOperation;
use log::warn;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Entries kept per store; older entries are dropped first.
pub const DIAGNOSTIC_CAPACITY: usize = 64;

/// One recorded store failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Monotonic per-store sequence, starting at 1.
    pub sequence: u64,
    pub kind: RecordKind,
    pub operation: StoreOperation,
    /// Short error class (`transport`, `server_rejected`, ...).
    pub code: &'static str,
    pub message: String,
}

#[derive(Default)]
struct Journal {
    entries: VecDeque<Diagnostic>,
    next_sequence: u64,
}

#[derive(Default)]
pub(crate) struct DiagnosticLog {
    journal: Mutex<Journal>,
}

impl DiagnosticLog {
    pub(crate) fn record(
        &self,
        kind: RecordKind,
        operation: StoreOperation,
        code: &'static str,
        message: String,
    ) {
        warn!(
            "event=store_{} module=store status=error kind={} error_code={} error={}",
            operation.as_str(),
            kind.as_str(),
            code,
            message
        );

        let mut journal = self.journal.lock();
        journal.next_sequence += 1;
        let sequence = journal.next_sequence;
        if journal.entries.len() == DIAGNOSTIC_CAPACITY {
            journal.entries.pop_front();
        }
        journal.entries.push_back(Diagnostic {
            sequence,
            kind,
            operation,
            code,
            message,
        });
    }

    pub(crate) fn entries(&self) -> Vec<Diagnostic> {
        self.journal.lock().entries.iter().cloned().collect()
    }

    pub(crate) fn clear(&self) {
        self.journal.lock().entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{DiagnosticLog, DIAGNOSTIC_CAPACITY};
    use crate::model::record::RecordKind;
    use crate::store::record_store::StoreOperation;

    #[test]
    fn journal_is_bounded_and_keeps_newest_entries() {
        let log = DiagnosticLog::default();
        for index in 0..(DIAGNOSTIC_CAPACITY + 3) {
            log.record(
                RecordKind::Song,
                StoreOperation::Add,
                "transport",
                format!("failure {index}"),
            );
        }

        let entries = log.entries();
        assert_eq!(entries.len(), DIAGNOSTIC_CAPACITY);
        assert_eq!(entries[0].sequence, 4);
        assert_eq!(
            entries.last().map(|entry| entry.message.as_str()),
            Some("failure 66")
        );
    }
}
