//! Append-only CPI audit log.
//!
//! Every validation attempt lands here before control leaves the guard,
//! accepted or rejected. Entries live in fixed-capacity chunks: a full
//! chunk is never touched again, and the API hands out no mutable access
//! to stored entries, so the log is a faithful forensic trail.

use openarbiter_types::CpiAuditEntry;
use openarbiter_types::constants::AUDIT_CHUNK_SIZE;

/// Chunked arena of [`CpiAuditEntry`] with a monotonic sequence number.
#[derive(Debug)]
pub struct CpiAuditLog {
    /// Filled chunks plus the currently-filling tail.
    chunks: Vec<Vec<CpiAuditEntry>>,
    /// Next sequence number to assign.
    next_seq: u64,
    /// Running count of rejected entries.
    rejections: u64,
}

impl CpiAuditLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self {
            chunks: vec![Vec::with_capacity(AUDIT_CHUNK_SIZE)],
            next_seq: 0,
            rejections: 0,
        }
    }

    /// Appends an entry, overwriting its `seq` with the next sequence
    /// number. Returns the assigned sequence.
    pub fn append(&mut self, mut entry: CpiAuditEntry) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        entry.seq = seq;
        if !entry.is_accepted() {
            self.rejections += 1;
        }
        if self
            .chunks
            .last()
            .is_none_or(|chunk| chunk.len() >= AUDIT_CHUNK_SIZE)
        {
            self.chunks.push(Vec::with_capacity(AUDIT_CHUNK_SIZE));
        }
        if let Some(tail) = self.chunks.last_mut() {
            tail.push(entry);
        }
        seq
    }

    /// The entry with the given sequence number, if recorded.
    #[must_use]
    pub fn get(&self, seq: u64) -> Option<&CpiAuditEntry> {
        let seq = usize::try_from(seq).ok()?;
        self.chunks
            .get(seq / AUDIT_CHUNK_SIZE)?
            .get(seq % AUDIT_CHUNK_SIZE)
    }

    /// The most recently appended entry.
    #[must_use]
    pub fn last(&self) -> Option<&CpiAuditEntry> {
        self.chunks.last().and_then(|chunk| chunk.last())
    }

    /// All entries in sequence order.
    pub fn iter(&self) -> impl Iterator<Item = &CpiAuditEntry> {
        self.chunks.iter().flatten()
    }

    /// Total entries recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }

    /// Returns `true` if nothing was ever recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.next_seq == 0
    }

    /// Number of rejected attempts recorded.
    #[must_use]
    pub fn rejection_count(&self) -> u64 {
        self.rejections
    }
}

impl Default for CpiAuditLog {
    fn default() -> Self {
        Self::new()
    }
}
