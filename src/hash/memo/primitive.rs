use std::sync::Arc;

use ahash::RandomState;
use arrow::array::{ArrayRef, ArrowNativeTypeOp, ArrowPrimitiveType, PrimitiveArray};
use arrow::datatypes::{DataType, i256};
use hashbrown::hash_table::{Entry, HashTable};

use crate::core::KernelError;
use crate::hash::memo::{Lookup, MemoTable, next_index, null_slot_buffer};

/// Hashing over the raw bit pattern of a fixed-width value.
///
/// Floats hash their `to_bits`, and equality goes through
/// [`ArrowNativeTypeOp::is_eq`], which for floats is the IEEE total order:
/// two NaNs with different payloads are different keys, as are `0.0` and
/// `-0.0`.
pub trait HashValue: ArrowNativeTypeOp {
    fn hash_value(&self, state: &RandomState) -> u64;
}

macro_rules! hash_integer {
    ($($t:ty),+) => {
        $(impl HashValue for $t {
            fn hash_value(&self, state: &RandomState) -> u64 {
                state.hash_one(self)
            }
        })+
    };
}
hash_integer!(i8, i16, i32, i64, i128, i256);
hash_integer!(u8, u16, u32, u64);

macro_rules! hash_float {
    ($($t:ty),+) => {
        $(impl HashValue for $t {
            fn hash_value(&self, state: &RandomState) -> u64 {
                state.hash_one(self.to_bits())
            }
        })+
    };
}
hash_float!(f32, f64);

/// Memo table for every arrow primitive type (integers, floats, temporal,
/// decimal).
pub struct PrimitiveMemoTable<T: ArrowPrimitiveType> {
    /// Slot index keyed by the hash of the value it holds.
    map: HashTable<usize>,
    /// Value of every slot; the null slot holds `Default::default()`.
    values: Vec<T::Native>,
    null_index: Option<usize>,
    random_state: RandomState,
}

impl<T: ArrowPrimitiveType> PrimitiveMemoTable<T>
where
    T::Native: HashValue,
{
    fn reserve_one(&mut self) -> Result<(), KernelError> {
        let state = &self.random_state;
        let values = &self.values;
        self.map
            .try_reserve(1, |&slot| values[slot].hash_value(state))?;
        self.values.try_reserve(1)?;
        Ok(())
    }
}

impl<T: ArrowPrimitiveType> MemoTable for PrimitiveMemoTable<T>
where
    T::Native: HashValue,
{
    type Array = PrimitiveArray<T>;
    type Value<'a> = T::Native;

    fn try_new(data_type: &DataType, capacity: usize) -> Result<Self, KernelError> {
        if !PrimitiveArray::<T>::is_compatible(data_type) {
            return Err(KernelError::Internal(format!(
                "primitive memo table for {} built with {data_type}",
                T::DATA_TYPE
            )));
        }
        let mut map = HashTable::new();
        map.try_reserve(capacity, |_: &usize| 0)?;
        let mut values = Vec::new();
        values.try_reserve(capacity)?;
        Ok(Self {
            map,
            values,
            null_index: None,
            random_state: RandomState::new(),
        })
    }

    fn value(array: &PrimitiveArray<T>, idx: usize) -> T::Native {
        array.value(idx)
    }

    fn get_or_insert(&mut self, value: T::Native) -> Result<Lookup, KernelError> {
        self.reserve_one()?;

        let state = &self.random_state;
        let values = &self.values;
        let hash = value.hash_value(state);
        let entry = self.map.entry(
            hash,
            |&slot| values[slot].is_eq(value),
            |&slot| values[slot].hash_value(state),
        );
        match entry {
            Entry::Occupied(o) => Ok(Lookup::Found(*o.get() as i32)),
            Entry::Vacant(v) => {
                let slot = self.values.len();
                let index = next_index(slot)?;
                v.insert(slot);
                self.values.push(value);
                Ok(Lookup::Inserted(index))
            }
        }
    }

    fn get_or_insert_null(&mut self) -> Result<Lookup, KernelError> {
        if let Some(slot) = self.null_index {
            return Ok(Lookup::Found(slot as i32));
        }
        let slot = self.values.len();
        let index = next_index(slot)?;
        self.values.try_reserve(1)?;
        self.values.push(T::Native::default());
        self.null_index = Some(slot);
        Ok(Lookup::Inserted(index))
    }

    fn null_index(&self) -> Option<i32> {
        self.null_index.map(|slot| slot as i32)
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn clear(&mut self) {
        self.map.clear();
        self.values.clear();
        self.null_index = None;
    }

    fn to_array(&self, data_type: &DataType) -> Result<ArrayRef, KernelError> {
        let nulls = null_slot_buffer(self.values.len(), self.null_index());
        let array = PrimitiveArray::<T>::try_new(self.values.clone().into(), nulls)?
            .with_data_type(data_type.clone());
        Ok(Arc::new(array))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, AsArray};
    use arrow::datatypes::{
        Decimal128Type, Float32Type, Float64Type, Int32Type, TimeUnit, TimestampMillisecondType,
    };

    fn int_table() -> PrimitiveMemoTable<Int32Type> {
        PrimitiveMemoTable::try_new(&DataType::Int32, 0).unwrap()
    }

    #[test]
    fn test_lookup_is_idempotent() {
        let mut table = int_table();
        assert_eq!(table.get_or_insert(3), Ok(Lookup::Inserted(0)));
        assert_eq!(table.get_or_insert(1), Ok(Lookup::Inserted(1)));
        assert_eq!(table.get_or_insert(3), Ok(Lookup::Found(0)));
        assert_eq!(table.get_or_insert(1), Ok(Lookup::Found(1)));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_null_takes_one_slot() {
        let mut table = int_table();
        table.get_or_insert(7).unwrap();
        assert_eq!(table.get_or_insert_null(), Ok(Lookup::Inserted(1)));
        assert_eq!(table.get_or_insert(8), Ok(Lookup::Inserted(2)));
        assert_eq!(table.get_or_insert_null(), Ok(Lookup::Found(1)));
        assert_eq!(table.null_index(), Some(1));
        assert_eq!(table.len(), 3);

        let array = table.to_array(&DataType::Int32).unwrap();
        let array = array.as_primitive::<Int32Type>();
        assert_eq!(array.len(), 3);
        assert_eq!(array.value(0), 7);
        assert!(array.is_null(1));
        assert_eq!(array.value(2), 8);
    }

    #[test]
    fn test_nan_payloads_are_distinct() {
        let mut table = PrimitiveMemoTable::<Float64Type>::try_new(&DataType::Float64, 0).unwrap();
        let quiet = f64::NAN;
        let payload = f64::from_bits(f64::NAN.to_bits() | 1);
        assert_eq!(table.get_or_insert(quiet), Ok(Lookup::Inserted(0)));
        assert_eq!(table.get_or_insert(payload), Ok(Lookup::Inserted(1)));
        assert_eq!(table.get_or_insert(quiet), Ok(Lookup::Found(0)));
    }

    #[test]
    fn test_signed_zeros_are_distinct() {
        let mut table = PrimitiveMemoTable::<Float32Type>::try_new(&DataType::Float32, 0).unwrap();
        assert_eq!(table.get_or_insert(0.0), Ok(Lookup::Inserted(0)));
        assert_eq!(table.get_or_insert(-0.0), Ok(Lookup::Inserted(1)));
    }

    #[test]
    fn test_clear_restarts_indices() {
        let mut table = int_table();
        table.get_or_insert(1).unwrap();
        table.get_or_insert_null().unwrap();
        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.null_index(), None);
        assert_eq!(table.get_or_insert(5), Ok(Lookup::Inserted(0)));
    }

    #[test]
    fn test_to_array_keeps_parameterized_type() {
        let ts = DataType::Timestamp(TimeUnit::Millisecond, Some("UTC".into()));
        let mut table = PrimitiveMemoTable::<TimestampMillisecondType>::try_new(&ts, 4).unwrap();
        table.get_or_insert(1_000).unwrap();
        assert_eq!(table.to_array(&ts).unwrap().data_type(), &ts);

        let dec = DataType::Decimal128(10, 2);
        let mut table = PrimitiveMemoTable::<Decimal128Type>::try_new(&dec, 0).unwrap();
        table.get_or_insert(12_345).unwrap();
        assert_eq!(table.to_array(&dec).unwrap().data_type(), &dec);
    }

    #[test]
    fn test_rejects_incompatible_type() {
        assert!(PrimitiveMemoTable::<Int32Type>::try_new(&DataType::Int64, 0).is_err());
    }
}
