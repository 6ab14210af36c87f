use std::sync::Arc;

use ahash::RandomState;
use arrow::array::{ArrayRef, FixedSizeBinaryArray};
use arrow::buffer::Buffer;
use arrow::datatypes::DataType;
use hashbrown::hash_table::{Entry, HashTable};

use crate::core::KernelError;
use crate::hash::memo::{Lookup, MemoTable, next_index, null_slot_buffer};

/// Memo table for `FixedSizeBinary(width)` values.
///
/// Slot `i` occupies `buffer[i * width..(i + 1) * width]`; the null slot is
/// zero-filled.
pub struct FixedSizeBinaryMemoTable {
    width: usize,
    map: HashTable<usize>,
    buffer: Vec<u8>,
    len: usize,
    null_index: Option<usize>,
    random_state: RandomState,
}

fn slot_bytes(buffer: &[u8], width: usize, slot: usize) -> &[u8] {
    &buffer[slot * width..(slot + 1) * width]
}

impl FixedSizeBinaryMemoTable {
    fn push_bytes(&mut self, value: &[u8]) -> Result<usize, KernelError> {
        self.buffer.try_reserve(self.width)?;
        self.buffer.extend_from_slice(value);
        self.len += 1;
        Ok(self.len - 1)
    }
}

impl MemoTable for FixedSizeBinaryMemoTable {
    type Array = FixedSizeBinaryArray;
    type Value<'a> = &'a [u8];

    fn try_new(data_type: &DataType, capacity: usize) -> Result<Self, KernelError> {
        let width = match data_type {
            DataType::FixedSizeBinary(width) if *width >= 0 => *width as usize,
            other => {
                return Err(KernelError::Internal(format!(
                    "fixed size binary memo table built with {other}"
                )));
            }
        };
        let mut map = HashTable::new();
        map.try_reserve(capacity, |_: &usize| 0)?;
        let mut buffer = Vec::new();
        buffer.try_reserve(capacity.saturating_mul(width))?;
        Ok(Self {
            width,
            map,
            buffer,
            len: 0,
            null_index: None,
            random_state: RandomState::new(),
        })
    }

    fn value(array: &FixedSizeBinaryArray, idx: usize) -> &[u8] {
        array.value(idx)
    }

    fn get_or_insert(&mut self, value: &[u8]) -> Result<Lookup, KernelError> {
        let state = &self.random_state;
        let buffer = &self.buffer;
        let width = self.width;
        self.map
            .try_reserve(1, |&slot| state.hash_one(slot_bytes(buffer, width, slot)))?;

        let hash = state.hash_one(value);
        let entry = self.map.entry(
            hash,
            |&slot| slot_bytes(buffer, width, slot) == value,
            |&slot| state.hash_one(slot_bytes(buffer, width, slot)),
        );
        match entry {
            Entry::Occupied(o) => Ok(Lookup::Found(*o.get() as i32)),
            Entry::Vacant(v) => {
                let index = next_index(self.len)?;
                self.buffer.try_reserve(width)?;
                self.buffer.extend_from_slice(value);
                self.len += 1;
                v.insert(index as usize);
                Ok(Lookup::Inserted(index))
            }
        }
    }

    fn get_or_insert_null(&mut self) -> Result<Lookup, KernelError> {
        if let Some(slot) = self.null_index {
            return Ok(Lookup::Found(slot as i32));
        }
        let index = next_index(self.len)?;
        let zeros = vec![0u8; self.width];
        let slot = self.push_bytes(&zeros)?;
        self.null_index = Some(slot);
        Ok(Lookup::Inserted(index))
    }

    fn null_index(&self) -> Option<i32> {
        self.null_index.map(|slot| slot as i32)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn clear(&mut self) {
        self.map.clear();
        self.buffer.clear();
        self.len = 0;
        self.null_index = None;
    }

    fn to_array(&self, _data_type: &DataType) -> Result<ArrayRef, KernelError> {
        let nulls = null_slot_buffer(self.len, self.null_index());
        let array = FixedSizeBinaryArray::try_new(
            self.width as i32,
            Buffer::from(self.buffer.as_slice()),
            nulls,
        )?;
        Ok(Arc::new(array))
    }
}
