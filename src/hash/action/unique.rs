use arrow::array::ArrayRef;

use crate::core::KernelError;
use crate::hash::action::Action;

/// The memo table's distinct set is the whole answer, so every hook is a no-op.
#[derive(Debug, Default)]
pub struct UniqueAction;

impl Action for UniqueAction {
    const NAME: &'static str = "unique";
    const MEMOIZE_NULLS: bool = true;

    fn reset(&mut self) {}

    fn reserve(&mut self, _length: usize) -> Result<(), KernelError> {
        Ok(())
    }

    fn observe_found(&mut self, _index: i32) -> Result<(), KernelError> {
        Ok(())
    }

    fn observe_not_found(&mut self, _index: i32) -> Result<(), KernelError> {
        Ok(())
    }

    fn observe_null_found(&mut self, _index: Option<i32>) -> Result<(), KernelError> {
        Ok(())
    }

    fn observe_null_not_found(&mut self, _index: Option<i32>) -> Result<(), KernelError> {
        Ok(())
    }

    fn flush(&mut self) -> Result<Option<ArrayRef>, KernelError> {
        Ok(None)
    }

    fn flush_final(&mut self) -> Result<Option<ArrayRef>, KernelError> {
        Ok(None)
    }
}
