//! Joins per-key `KeyValue::get` responses into one batch.
//!
//! The store answers one key per request. A reconcile or a start attempt
//! needs several keys at once, so each batch gets an id, its requests are
//! answered into numbered slots, and the batch completes once every slot
//! is filled.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::capabilities::{KvError, KvReadResult, PreferenceKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReadId(u64);

/// What a completed batch is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadPurpose {
    /// A reconcile, tagged with the toggle revision it was issued at.
    Status { revision: u64 },
    Configuration,
}

/// Addresses one key's answer within a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadSlot {
    pub read: ReadId,
    pub index: usize,
}

/// Values in key order, or the first error any key reported.
pub type BatchResult = Result<Vec<Option<Vec<u8>>>, KvError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ReadBatch {
    purpose: ReadPurpose,
    slots: Vec<Option<Option<Vec<u8>>>>,
    error: Option<KvError>,
}

impl ReadBatch {
    fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    fn finish(self) -> BatchResult {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.slots.into_iter().flatten().collect()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingReads {
    next_id: u64,
    batches: BTreeMap<ReadId, ReadBatch>,
}

impl PendingReads {
    /// Opens a batch for `keys` and returns the slot for each key.
    pub fn begin(&mut self, purpose: ReadPurpose, keys: &[PreferenceKey]) -> Vec<ReadSlot> {
        let read = ReadId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);

        self.batches.insert(
            read,
            ReadBatch {
                purpose,
                slots: vec![None; keys.len()],
                error: None,
            },
        );

        (0..keys.len()).map(|index| ReadSlot { read, index }).collect()
    }

    /// Records one answer. Returns the batch once its last slot is filled.
    /// Answers for unknown batches or slots are dropped.
    pub fn record(
        &mut self,
        slot: ReadSlot,
        result: KvReadResult,
    ) -> Option<(ReadPurpose, BatchResult)> {
        let batch = self.batches.get_mut(&slot.read)?;
        let entry = batch.slots.get_mut(slot.index)?;
        if entry.is_some() {
            return None;
        }

        match result {
            Ok(value) => *entry = Some(value),
            Err(e) => {
                *entry = Some(None);
                batch.error.get_or_insert(e);
            }
        }

        if !batch.is_complete() {
            return None;
        }

        let batch = self.batches.remove(&slot.read)?;
        Some((batch.purpose, batch.finish()))
    }

    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.batches.len()
    }
}
