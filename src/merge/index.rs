use std::sync::Arc;

use arrow::array::{Array, ArrayRef, FixedSizeBinaryArray, StructArray, UInt32Array};
use arrow::buffer::Buffer;
use arrow::compute::interleave;
use arrow::datatypes::{DataType, Field, Fields};
use bytemuck::{Pod, Zeroable};

use crate::core::KernelError;

pub const ARRAY_ID_FIELD: &str = "array_id";
pub const OFFSET_FIELD: &str = "offset";

/// Source location of one element: which input array, and where in it.
///
/// Laid out as two native-endian `u32`s, so a slice of these is also the
/// packed `FixedSizeBinary(8)` form.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct ArrayItemIndex {
    pub array_id: u32,
    pub offset: u32,
}

impl ArrayItemIndex {
    pub fn new(array_id: u32, offset: u32) -> Self {
        Self { array_id, offset }
    }
}

/// `(array_id, offset)` pairs as a struct array of two non-null UInt32 columns.
pub fn indices_to_struct(indices: &[ArrayItemIndex]) -> Result<StructArray, KernelError> {
    let array_ids = UInt32Array::from_iter_values(indices.iter().map(|i| i.array_id));
    let offsets = UInt32Array::from_iter_values(indices.iter().map(|i| i.offset));
    let fields = Fields::from(vec![
        Field::new(ARRAY_ID_FIELD, DataType::UInt32, false),
        Field::new(OFFSET_FIELD, DataType::UInt32, false),
    ]);
    Ok(StructArray::try_new(
        fields,
        vec![Arc::new(array_ids), Arc::new(offsets)],
        None,
    )?)
}

/// Pack the pairs into 8-byte fixed-size binary values.
pub fn indices_to_fixed_size_binary(
    indices: &[ArrayItemIndex],
) -> Result<FixedSizeBinaryArray, KernelError> {
    let bytes: &[u8] = bytemuck::cast_slice(indices);
    let width = std::mem::size_of::<ArrayItemIndex>() as i32;
    Ok(FixedSizeBinaryArray::try_new(width, Buffer::from(bytes), None)?)
}

/// Read pairs back from the packed form.
pub fn indices_from_fixed_size_binary(
    array: &FixedSizeBinaryArray,
) -> Result<Vec<ArrayItemIndex>, KernelError> {
    let width = std::mem::size_of::<ArrayItemIndex>();
    if array.value_length() as usize != width {
        return Err(KernelError::InvalidInput(format!(
            "packed merge indices must be {width} bytes wide, got {}",
            array.value_length()
        )));
    }
    if array.null_count() > 0 {
        return Err(KernelError::InvalidInput(
            "packed merge indices cannot contain nulls".into(),
        ));
    }
    let bytes = &array.value_data()[..array.len() * width];
    Ok(bytes
        .chunks_exact(width)
        .map(bytemuck::pod_read_unaligned::<ArrayItemIndex>)
        .collect())
}

/// Gather the elements the pairs point at, in pair order.
pub fn take_indices(
    arrays: &[ArrayRef],
    indices: &[ArrayItemIndex],
) -> Result<ArrayRef, KernelError> {
    let sources: Vec<&dyn Array> = arrays.iter().map(|a| a.as_ref()).collect();
    let pairs: Vec<(usize, usize)> = indices
        .iter()
        .map(|i| (i.array_id as usize, i.offset as usize))
        .collect();
    Ok(interleave(&sources, &pairs)?)
}
