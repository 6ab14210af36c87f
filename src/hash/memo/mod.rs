//! Memo tables: insertion-ordered maps from a distinct value to its dense index.
//!
//! Every table hands out indices `0, 1, 2, ...` in first-seen order and keeps
//! one optional slot for null. Looking up a value that was already inserted
//! returns the index it was first given.

mod boolean;
mod bytes;
mod fixed_size_binary;
mod primitive;

pub use boolean::BooleanMemoTable;
pub use bytes::ByteMemoTable;
pub use fixed_size_binary::FixedSizeBinaryMemoTable;
pub use primitive::{HashValue, PrimitiveMemoTable};

use arrow::array::{Array, ArrayRef, NullBufferBuilder};
use arrow::buffer::NullBuffer;
use arrow::datatypes::DataType;

use crate::core::KernelError;

/// Outcome of a lookup-or-insert.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lookup {
    /// The value was already present at this index.
    Found(i32),
    /// The value was absent and has just been assigned this index.
    Inserted(i32),
}

impl Lookup {
    pub fn index(self) -> i32 {
        match self {
            Lookup::Found(index) | Lookup::Inserted(index) => index,
        }
    }
}

pub trait MemoTable: Send + Sized {
    /// Concrete arrow array this table reads its values from.
    type Array: Array + 'static;
    /// Borrowed form of one value.
    type Value<'a>: Copy;

    /// Build an empty table for `data_type` with room for `capacity` slots.
    fn try_new(data_type: &DataType, capacity: usize) -> Result<Self, KernelError>;

    /// Value at position `idx` of `array`. The caller has checked it is not null.
    fn value(array: &Self::Array, idx: usize) -> Self::Value<'_>;

    fn get_or_insert(&mut self, value: Self::Value<'_>) -> Result<Lookup, KernelError>;

    fn get_or_insert_null(&mut self) -> Result<Lookup, KernelError>;

    /// Index of the null slot, if a null was inserted.
    fn null_index(&self) -> Option<i32>;

    /// Number of slots handed out, null included.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every value and the null slot.
    fn clear(&mut self);

    /// Materialize the slots, in index order, as an array of `data_type`.
    fn to_array(&self, data_type: &DataType) -> Result<ArrayRef, KernelError>;
}

/// Next dense index for a table currently holding `len` slots.
pub(crate) fn next_index(len: usize) -> Result<i32, KernelError> {
    i32::try_from(len).map_err(|_| {
        KernelError::CapacityError(format!(
            "memo table cannot hold more than {} distinct values",
            i32::MAX
        ))
    })
}

/// Validity for `len` dictionary slots where only `null_index` is null.
pub(crate) fn null_slot_buffer(len: usize, null_index: Option<i32>) -> Option<NullBuffer> {
    let null_index = null_index? as usize;
    let mut nulls = NullBufferBuilder::new(len);
    nulls.append_n_non_nulls(null_index);
    nulls.append_null();
    nulls.append_n_non_nulls(len - null_index - 1);
    nulls.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_slot_buffer() {
        assert!(null_slot_buffer(3, None).is_none());

        let nulls = null_slot_buffer(3, Some(1)).unwrap();
        assert!(nulls.is_valid(0));
        assert!(nulls.is_null(1));
        assert!(nulls.is_valid(2));
        assert_eq!(nulls.null_count(), 1);
    }

    #[test]
    fn test_next_index_bounds() {
        assert_eq!(next_index(0), Ok(0));
        assert_eq!(next_index(i32::MAX as usize), Ok(i32::MAX));
        assert!(matches!(
            next_index(i32::MAX as usize + 1),
            Err(KernelError::CapacityError(_))
        ));
    }
}
