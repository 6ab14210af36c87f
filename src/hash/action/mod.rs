//! Action policies: what a hash kernel pass does with each observation.
//!
//! The driver reports exactly one event per input position:
//!
//! | position | lookup     | hook                       |
//! |----------|------------|----------------------------|
//! | null     | new slot   | `observe_null_not_found`   |
//! | null     | seen slot  | `observe_null_found`       |
//! | value    | new slot   | `observe_not_found`        |
//! | value    | seen slot  | `observe_found`            |
//!
//! Every hook returns a `Result`; an error aborts the pass.

mod dict_encode;
mod unique;
mod value_counts;

pub use dict_encode::DictEncodeAction;
pub use unique::UniqueAction;
pub use value_counts::ValueCountsAction;

use arrow::array::ArrayRef;

use crate::core::KernelError;

pub trait Action: Default + Send + 'static {
    /// Operation name used in errors and logs.
    const NAME: &'static str;

    /// Whether nulls get a slot in the memo table. When false, null hooks
    /// receive `None` and the dictionary never contains a null.
    const MEMOIZE_NULLS: bool;

    /// Drop all accumulated state.
    fn reset(&mut self);

    /// Called once per append with the input length.
    fn reserve(&mut self, length: usize) -> Result<(), KernelError>;

    fn observe_found(&mut self, index: i32) -> Result<(), KernelError>;

    fn observe_not_found(&mut self, index: i32) -> Result<(), KernelError>;

    fn observe_null_found(&mut self, index: Option<i32>) -> Result<(), KernelError>;

    fn observe_null_not_found(&mut self, index: Option<i32>) -> Result<(), KernelError>;

    /// Output produced by the last append, if this action emits per chunk.
    fn flush(&mut self) -> Result<Option<ArrayRef>, KernelError>;

    /// Output accumulated over every append since the last reset.
    fn flush_final(&mut self) -> Result<Option<ArrayRef>, KernelError>;
}
