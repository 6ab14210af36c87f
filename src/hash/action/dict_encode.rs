use std::sync::Arc;

use arrow::array::{ArrayRef, Int32Array, NullBufferBuilder};

use crate::core::KernelError;
use crate::hash::action::Action;

/// Writes one dictionary index per input position; nulls become null indices.
#[derive(Debug)]
pub struct DictEncodeAction {
    indices: Vec<i32>,
    nulls: NullBufferBuilder,
}

impl Default for DictEncodeAction {
    fn default() -> Self {
        Self {
            indices: Vec::new(),
            nulls: NullBufferBuilder::new(0),
        }
    }
}

impl DictEncodeAction {
    fn append_null(&mut self) -> Result<(), KernelError> {
        self.indices.try_reserve(1)?;
        self.indices.push(0);
        self.nulls.append_null();
        Ok(())
    }

    fn append_index(&mut self, index: i32) -> Result<(), KernelError> {
        self.indices.try_reserve(1)?;
        self.indices.push(index);
        self.nulls.append_non_null();
        Ok(())
    }
}

impl Action for DictEncodeAction {
    const NAME: &'static str = "dictionary_encode";
    const MEMOIZE_NULLS: bool = false;

    fn reset(&mut self) {
        *self = Self::default();
    }

    /// Output length equals input length, so size it exactly.
    fn reserve(&mut self, length: usize) -> Result<(), KernelError> {
        self.indices.try_reserve_exact(length)?;
        Ok(())
    }

    fn observe_found(&mut self, index: i32) -> Result<(), KernelError> {
        self.append_index(index)
    }

    fn observe_not_found(&mut self, index: i32) -> Result<(), KernelError> {
        self.append_index(index)
    }

    fn observe_null_found(&mut self, _index: Option<i32>) -> Result<(), KernelError> {
        self.append_null()
    }

    fn observe_null_not_found(&mut self, _index: Option<i32>) -> Result<(), KernelError> {
        self.append_null()
    }

    fn flush(&mut self) -> Result<Option<ArrayRef>, KernelError> {
        let indices = std::mem::take(&mut self.indices);
        let nulls = self.nulls.finish();
        Ok(Some(Arc::new(Int32Array::try_new(indices.into(), nulls)?)))
    }

    fn flush_final(&mut self) -> Result<Option<ArrayRef>, KernelError> {
        Ok(None)
    }
}
