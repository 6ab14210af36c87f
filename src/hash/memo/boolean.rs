use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray};
use arrow::datatypes::DataType;

use crate::core::KernelError;
use crate::hash::memo::{Lookup, MemoTable, next_index};

/// Memo table over at most three slots: `false`, `true` and null.
#[derive(Default)]
pub struct BooleanMemoTable {
    /// Slot of `false` and `true`, by `value as usize`.
    slots: [Option<i32>; 2],
    null_index: Option<i32>,
    /// Slot contents in index order; `None` is the null slot.
    order: Vec<Option<bool>>,
}

impl BooleanMemoTable {
    fn push(&mut self, value: Option<bool>) -> Result<i32, KernelError> {
        let index = next_index(self.order.len())?;
        self.order.push(value);
        Ok(index)
    }
}

impl MemoTable for BooleanMemoTable {
    type Array = BooleanArray;
    type Value<'a> = bool;

    fn try_new(data_type: &DataType, _capacity: usize) -> Result<Self, KernelError> {
        if data_type != &DataType::Boolean {
            return Err(KernelError::Internal(format!(
                "boolean memo table built with {data_type}"
            )));
        }
        Ok(Self::default())
    }

    fn value(array: &BooleanArray, idx: usize) -> bool {
        array.value(idx)
    }

    fn get_or_insert(&mut self, value: bool) -> Result<Lookup, KernelError> {
        match self.slots[value as usize] {
            Some(index) => Ok(Lookup::Found(index)),
            None => {
                let index = self.push(Some(value))?;
                self.slots[value as usize] = Some(index);
                Ok(Lookup::Inserted(index))
            }
        }
    }

    fn get_or_insert_null(&mut self) -> Result<Lookup, KernelError> {
        match self.null_index {
            Some(index) => Ok(Lookup::Found(index)),
            None => {
                let index = self.push(None)?;
                self.null_index = Some(index);
                Ok(Lookup::Inserted(index))
            }
        }
    }

    fn null_index(&self) -> Option<i32> {
        self.null_index
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn clear(&mut self) {
        *self = Self::default();
    }

    fn to_array(&self, _data_type: &DataType) -> Result<ArrayRef, KernelError> {
        Ok(Arc::new(self.order.iter().copied().collect::<BooleanArray>()))
    }
}
