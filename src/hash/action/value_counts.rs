use std::cmp::Ordering;
use std::sync::Arc;

use arrow::array::{ArrayRef, Int64Array};

use crate::core::KernelError;
use crate::hash::action::Action;

/// Counts occurrences per memo slot. `counts[i]` is the number of times the
/// value (or null) in slot `i` has been observed.
#[derive(Debug, Default)]
pub struct ValueCountsAction {
    counts: Vec<i64>,
}

impl ValueCountsAction {
    /// Slots arrive densely: a new slot is always `counts.len()`.
    fn bump(&mut self, index: i32) -> Result<(), KernelError> {
        let slot = usize::try_from(index)
            .map_err(|_| KernelError::Internal(format!("negative count slot {index}")))?;
        match slot.cmp(&self.counts.len()) {
            Ordering::Less => self.counts[slot] += 1,
            Ordering::Equal => {
                self.counts.try_reserve(1)?;
                self.counts.push(1);
            }
            Ordering::Greater => {
                return Err(KernelError::Internal(format!(
                    "count slot {slot} skips past {} tracked slots",
                    self.counts.len()
                )));
            }
        }
        Ok(())
    }

    fn bump_null(&mut self, index: Option<i32>) -> Result<(), KernelError> {
        let index = index.ok_or_else(|| {
            KernelError::Internal("value counts observed a null without a memo slot".into())
        })?;
        self.bump(index)
    }
}

impl Action for ValueCountsAction {
    const NAME: &'static str = "value_counts";
    const MEMOIZE_NULLS: bool = true;

    fn reset(&mut self) {
        self.counts.clear();
    }

    // Count size depends on the number of distinct values, not the input.
    fn reserve(&mut self, _length: usize) -> Result<(), KernelError> {
        Ok(())
    }

    fn observe_found(&mut self, index: i32) -> Result<(), KernelError> {
        self.bump(index)
    }

    fn observe_not_found(&mut self, index: i32) -> Result<(), KernelError> {
        self.bump(index)
    }

    fn observe_null_found(&mut self, index: Option<i32>) -> Result<(), KernelError> {
        self.bump_null(index)
    }

    fn observe_null_not_found(&mut self, index: Option<i32>) -> Result<(), KernelError> {
        self.bump_null(index)
    }

    fn flush(&mut self) -> Result<Option<ArrayRef>, KernelError> {
        Ok(None)
    }

    fn flush_final(&mut self) -> Result<Option<ArrayRef>, KernelError> {
        let counts = std::mem::take(&mut self.counts);
        Ok(Some(Arc::new(Int64Array::from(counts))))
    }
}
