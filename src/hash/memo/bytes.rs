use std::marker::PhantomData;
use std::sync::Arc;

use ahash::RandomState;
use arrow::array::{ArrayRef, GenericByteArray};
use arrow::buffer::{Buffer, OffsetBuffer, ScalarBuffer};
use arrow::datatypes::{ArrowNativeType, ByteArrayType, DataType};
use hashbrown::hash_table::{Entry, HashTable};

use crate::core::KernelError;
use crate::hash::memo::{Lookup, MemoTable, next_index, null_slot_buffer};

/// Memo table for variable-length binary and utf8 values.
///
/// Distinct values are copied once into a single byte buffer. Slot `i` spans
/// `offsets[i]..offsets[i + 1]`; the null slot is an empty span.
pub struct ByteMemoTable<B: ByteArrayType> {
    map: HashTable<usize>,
    buffer: Vec<u8>,
    offsets: Vec<usize>,
    null_index: Option<usize>,
    random_state: RandomState,
    phantom: PhantomData<fn() -> B>,
}

fn span<'a>(buffer: &'a [u8], offsets: &[usize], slot: usize) -> &'a [u8] {
    &buffer[offsets[slot]..offsets[slot + 1]]
}

impl<B: ByteArrayType> ByteMemoTable<B> {
    /// Append an empty span for the null slot.
    fn push_empty(&mut self) -> Result<usize, KernelError> {
        self.offsets.try_reserve(1)?;
        self.offsets.push(self.buffer.len());
        Ok(self.offsets.len() - 2)
    }
}

impl<B: ByteArrayType> MemoTable for ByteMemoTable<B> {
    type Array = GenericByteArray<B>;
    type Value<'a> = &'a [u8];

    fn try_new(data_type: &DataType, capacity: usize) -> Result<Self, KernelError> {
        if data_type != &B::DATA_TYPE {
            return Err(KernelError::Internal(format!(
                "{} memo table built with {data_type}",
                B::DATA_TYPE
            )));
        }
        let mut map = HashTable::new();
        map.try_reserve(capacity, |_: &usize| 0)?;
        let mut offsets = Vec::new();
        offsets.try_reserve(capacity + 1)?;
        offsets.push(0);
        Ok(Self {
            map,
            buffer: Vec::new(),
            offsets,
            null_index: None,
            random_state: RandomState::new(),
            phantom: PhantomData,
        })
    }

    fn value(array: &GenericByteArray<B>, idx: usize) -> &[u8] {
        AsRef::<[u8]>::as_ref(array.value(idx))
    }

    fn get_or_insert(&mut self, value: &[u8]) -> Result<Lookup, KernelError> {
        let state = &self.random_state;
        let buffer = &self.buffer;
        let offsets = &self.offsets;
        self.map
            .try_reserve(1, |&slot| state.hash_one(span(buffer, offsets, slot)))?;

        let hash = state.hash_one(value);
        let entry = self.map.entry(
            hash,
            |&slot| span(buffer, offsets, slot) == value,
            |&slot| state.hash_one(span(buffer, offsets, slot)),
        );
        match entry {
            Entry::Occupied(o) => Ok(Lookup::Found(*o.get() as i32)),
            Entry::Vacant(v) => {
                let index = next_index(self.offsets.len() - 1)?;
                self.buffer.try_reserve(value.len())?;
                self.offsets.try_reserve(1)?;
                self.buffer.extend_from_slice(value);
                self.offsets.push(self.buffer.len());
                v.insert(index as usize);
                Ok(Lookup::Inserted(index))
            }
        }
    }

    fn get_or_insert_null(&mut self) -> Result<Lookup, KernelError> {
        if let Some(slot) = self.null_index {
            return Ok(Lookup::Found(slot as i32));
        }
        let index = next_index(self.offsets.len() - 1)?;
        let slot = self.push_empty()?;
        self.null_index = Some(slot);
        Ok(Lookup::Inserted(index))
    }

    fn null_index(&self) -> Option<i32> {
        self.null_index.map(|slot| slot as i32)
    }

    fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    fn clear(&mut self) {
        self.map.clear();
        self.buffer.clear();
        self.offsets.truncate(1);
        self.null_index = None;
    }

    fn to_array(&self, _data_type: &DataType) -> Result<ArrayRef, KernelError> {
        let offsets = self
            .offsets
            .iter()
            .map(|&offset| {
                B::Offset::from_usize(offset).ok_or_else(|| {
                    KernelError::CapacityError(format!(
                        "{} bytes of distinct values overflow {} offsets",
                        self.buffer.len(),
                        B::DATA_TYPE
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let offsets = OffsetBuffer::new(ScalarBuffer::from(offsets));
        let values = Buffer::from(self.buffer.as_slice());
        let nulls = null_slot_buffer(self.len(), self.null_index());
        let array = GenericByteArray::<B>::try_new(offsets, values, nulls)?;
        Ok(Arc::new(array))
    }
}
