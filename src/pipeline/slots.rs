use std::{path::PathBuf, sync::OnceLock};

use crate::{
    decode::quantize::QuantizedImage,
    foundation::error::{ConvertError, ConvertResult},
};

/// Outcome of decoding one work item.
#[derive(Debug)]
pub struct FrameResult {
    pub index: usize,
    pub path: PathBuf,
    pub outcome: ConvertResult<QuantizedImage>,
}

/// Preallocated, index-addressed results of one pool run.
///
/// Every cell is written at most once, by the worker that claimed the matching index from
/// the pool cursor. Indices are disjoint across workers, so writes need no lock; a second
/// write to the same cell is rejected instead of overwriting.
///
/// The table is handed back by value only after every worker has joined, which is what
/// makes reading it race-free.
#[derive(Debug)]
pub struct SlotTable {
    slots: Vec<OnceLock<FrameResult>>,
}

impl SlotTable {
    pub fn with_len(len: usize) -> Self {
        Self {
            slots: (0..len).map(|_| OnceLock::new()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of cells written so far.
    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|s| s.get().is_some()).count()
    }

    pub(crate) fn fill(&self, result: FrameResult) -> ConvertResult<()> {
        let index = result.index;
        let slot = self.slots.get(index).ok_or_else(|| {
            ConvertError::internal(format!(
                "frame slot {index} out of range (table holds {})",
                self.slots.len()
            ))
        })?;
        slot.set(result)
            .map_err(|_| ConvertError::internal(format!("frame slot {index} written twice")))
    }

    /// Cells in index order; `None` marks a slot no worker wrote.
    pub fn into_results(self) -> Vec<Option<FrameResult>> {
        self.slots.into_iter().map(OnceLock::into_inner).collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/slots.rs"]
mod tests;
