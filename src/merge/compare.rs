use std::cmp::Ordering;

use arrow::array::{
    Array, ArrayRef, ArrowNativeTypeOp, ArrowPrimitiveType, AsArray, BooleanArray,
    FixedSizeBinaryArray, GenericByteArray,
};
use arrow::datatypes::ByteArrayType;

use crate::core::KernelError;
use crate::merge::index::ArrayItemIndex;

/// Orders the non-null elements of a fixed list of arrays by value.
pub trait SortValues {
    fn compare(&self, lhs: ArrayItemIndex, rhs: ArrayItemIndex) -> Ordering;
}

fn downcast_error(array: &ArrayRef, expected: &str) -> KernelError {
    KernelError::Internal(format!(
        "expected {expected} array, found {}",
        array.data_type()
    ))
}

/// Fixed-width values compared with [`ArrowNativeTypeOp::compare`]; floats
/// use the IEEE total order.
pub struct PrimitiveValues<'a, T: ArrowPrimitiveType> {
    values: Vec<&'a [T::Native]>,
}

impl<'a, T: ArrowPrimitiveType> PrimitiveValues<'a, T> {
    pub fn try_new(arrays: &'a [ArrayRef]) -> Result<Self, KernelError> {
        let values = arrays
            .iter()
            .map(|array| {
                array
                    .as_primitive_opt::<T>()
                    .map(|typed| typed.values().as_ref())
                    .ok_or_else(|| downcast_error(array, "primitive"))
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { values })
    }
}

impl<T: ArrowPrimitiveType> SortValues for PrimitiveValues<'_, T> {
    fn compare(&self, lhs: ArrayItemIndex, rhs: ArrayItemIndex) -> Ordering {
        let l = self.values[lhs.array_id as usize][lhs.offset as usize];
        let r = self.values[rhs.array_id as usize][rhs.offset as usize];
        l.compare(r)
    }
}

/// Variable-length values compared byte-wise.
pub struct ByteValues<'a, B: ByteArrayType> {
    arrays: Vec<&'a GenericByteArray<B>>,
}

impl<'a, B: ByteArrayType> ByteValues<'a, B> {
    pub fn try_new(arrays: &'a [ArrayRef]) -> Result<Self, KernelError> {
        let arrays = arrays
            .iter()
            .map(|array| {
                array
                    .as_bytes_opt::<B>()
                    .ok_or_else(|| downcast_error(array, "byte"))
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { arrays })
    }

    fn bytes(&self, index: ArrayItemIndex) -> &[u8] {
        AsRef::<[u8]>::as_ref(self.arrays[index.array_id as usize].value(index.offset as usize))
    }
}

impl<B: ByteArrayType> SortValues for ByteValues<'_, B> {
    fn compare(&self, lhs: ArrayItemIndex, rhs: ArrayItemIndex) -> Ordering {
        self.bytes(lhs).cmp(self.bytes(rhs))
    }
}

pub struct FixedSizeBinaryValues<'a> {
    arrays: Vec<&'a FixedSizeBinaryArray>,
}

impl<'a> FixedSizeBinaryValues<'a> {
    pub fn try_new(arrays: &'a [ArrayRef]) -> Result<Self, KernelError> {
        let arrays = arrays
            .iter()
            .map(|array| {
                array
                    .as_fixed_size_binary_opt()
                    .ok_or_else(|| downcast_error(array, "fixed size binary"))
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { arrays })
    }
}

impl SortValues for FixedSizeBinaryValues<'_> {
    fn compare(&self, lhs: ArrayItemIndex, rhs: ArrayItemIndex) -> Ordering {
        let l = self.arrays[lhs.array_id as usize].value(lhs.offset as usize);
        let r = self.arrays[rhs.array_id as usize].value(rhs.offset as usize);
        l.cmp(r)
    }
}

/// `false` sorts before `true`.
pub struct BooleanValues<'a> {
    arrays: Vec<&'a BooleanArray>,
}

impl<'a> BooleanValues<'a> {
    pub fn try_new(arrays: &'a [ArrayRef]) -> Result<Self, KernelError> {
        let arrays = arrays
            .iter()
            .map(|array| {
                array
                    .as_boolean_opt()
                    .ok_or_else(|| downcast_error(array, "boolean"))
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { arrays })
    }
}

impl SortValues for BooleanValues<'_> {
    fn compare(&self, lhs: ArrayItemIndex, rhs: ArrayItemIndex) -> Ordering {
        let l = self.arrays[lhs.array_id as usize].value(lhs.offset as usize);
        let r = self.arrays[rhs.array_id as usize].value(rhs.offset as usize);
        l.cmp(&r)
    }
}

/// The null type has no values; every element lands in the null tail and is
/// never compared.
pub struct NoValues;

impl SortValues for NoValues {
    fn compare(&self, _lhs: ArrayItemIndex, _rhs: ArrayItemIndex) -> Ordering {
        Ordering::Equal
    }
}
