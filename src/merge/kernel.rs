//! Merge of per-array sorted runs into one ascending `(array_id, offset)`
//! ordering, nulls last.

use std::ops::Range;
use std::time::Instant;

use arrow::array::{Array, ArrayRef};
use arrow::datatypes::{
    BinaryType, DataType, Date32Type, Date64Type, Decimal128Type, Float32Type, Float64Type,
    Int8Type, Int16Type, Int32Type, Int64Type, Time32MillisecondType, Time32SecondType,
    Time64MicrosecondType, Time64NanosecondType, TimeUnit, TimestampMicrosecondType,
    TimestampMillisecondType, TimestampNanosecondType, TimestampSecondType, UInt8Type,
    UInt16Type, UInt32Type, UInt64Type, Utf8Type,
};
use log::debug;

use crate::core::KernelError;
use crate::merge::compare::{
    BooleanValues, ByteValues, FixedSizeBinaryValues, NoValues, PrimitiveValues, SortValues,
};
use crate::merge::index::ArrayItemIndex;

const OP: &str = "merge_sorted_indices";

/// Order every element of `arrays` ascending by value, nulls last.
///
/// The result has one entry per input element. Its non-null prefix is the
/// stable merge of each array's locally sorted elements: equal values keep
/// array order, then in-array order. The null suffix is filled back to front
/// in array order.
pub fn merge_sorted_indices(arrays: &[ArrayRef]) -> Result<Vec<ArrayItemIndex>, KernelError> {
    let first = arrays
        .first()
        .ok_or_else(|| KernelError::InvalidInput("input array list is empty".into()))?;
    let data_type = first.data_type();
    if let Some(other) = arrays.iter().find(|a| a.data_type() != data_type) {
        return Err(KernelError::InvalidInput(format!(
            "cannot merge arrays of {data_type} and {}",
            other.data_type()
        )));
    }

    macro_rules! primitive {
        ($t:ty) => {
            merge_with(&PrimitiveValues::<$t>::try_new(arrays)?, arrays)
        };
    }

    match data_type {
        DataType::Null => merge_with(&NoValues, arrays),
        DataType::Boolean => merge_with(&BooleanValues::try_new(arrays)?, arrays),
        DataType::Int8 => primitive!(Int8Type),
        DataType::Int16 => primitive!(Int16Type),
        DataType::Int32 => primitive!(Int32Type),
        DataType::Int64 => primitive!(Int64Type),
        DataType::UInt8 => primitive!(UInt8Type),
        DataType::UInt16 => primitive!(UInt16Type),
        DataType::UInt32 => primitive!(UInt32Type),
        DataType::UInt64 => primitive!(UInt64Type),
        DataType::Float32 => primitive!(Float32Type),
        DataType::Float64 => primitive!(Float64Type),
        DataType::Date32 => primitive!(Date32Type),
        DataType::Date64 => primitive!(Date64Type),
        DataType::Time32(TimeUnit::Second) => primitive!(Time32SecondType),
        DataType::Time32(TimeUnit::Millisecond) => primitive!(Time32MillisecondType),
        DataType::Time64(TimeUnit::Microsecond) => primitive!(Time64MicrosecondType),
        DataType::Time64(TimeUnit::Nanosecond) => primitive!(Time64NanosecondType),
        DataType::Timestamp(TimeUnit::Second, _) => primitive!(TimestampSecondType),
        DataType::Timestamp(TimeUnit::Millisecond, _) => primitive!(TimestampMillisecondType),
        DataType::Timestamp(TimeUnit::Microsecond, _) => primitive!(TimestampMicrosecondType),
        DataType::Timestamp(TimeUnit::Nanosecond, _) => primitive!(TimestampNanosecondType),
        DataType::Decimal128(_, _) => primitive!(Decimal128Type),
        DataType::Binary => merge_with(&ByteValues::<BinaryType>::try_new(arrays)?, arrays),
        DataType::Utf8 => merge_with(&ByteValues::<Utf8Type>::try_new(arrays)?, arrays),
        DataType::FixedSizeBinary(_) => {
            merge_with(&FixedSizeBinaryValues::try_new(arrays)?, arrays)
        }
        other => Err(KernelError::not_implemented(OP, other)),
    }
}

fn merge_with<V: SortValues>(
    values: &V,
    arrays: &[ArrayRef],
) -> Result<Vec<ArrayItemIndex>, KernelError> {
    let total: usize = arrays.iter().map(|a| a.len()).sum();
    let mut indices = Vec::new();
    indices.try_reserve_exact(total)?;
    indices.resize(total, ArrayItemIndex::default());

    let prepare_start = Instant::now();
    let (runs, valid) = partition_and_sort(values, arrays, &mut indices)?;
    let prepared = prepare_start.elapsed();

    let merge_start = Instant::now();
    let mut scratch = Vec::new();
    scratch.try_reserve_exact(valid)?;
    merge_runs(values, &mut indices[..valid], &runs, &mut scratch);
    debug!(
        "{OP}: {} arrays, {total} items ({} null); prepare took {:?}, merge took {:?}",
        arrays.len(),
        total - valid,
        prepared,
        merge_start.elapsed()
    );
    Ok(indices)
}

/// Write each array's non-null positions as one contiguous run from the front
/// of `indices` and its nulls into the tail, then sort each run by value.
///
/// Returns the runs and the total non-null count.
fn partition_and_sort<V: SortValues>(
    values: &V,
    arrays: &[ArrayRef],
    indices: &mut [ArrayItemIndex],
) -> Result<(Vec<Range<usize>>, usize), KernelError> {
    let mut runs = Vec::with_capacity(arrays.len());
    let mut head = 0;
    let mut tail = indices.len();

    for (array_id, array) in arrays.iter().enumerate() {
        let array_id = u32::try_from(array_id).map_err(|_| {
            KernelError::CapacityError(format!("cannot merge more than {} arrays", u32::MAX))
        })?;
        if u32::try_from(array.len()).is_err() {
            return Err(KernelError::CapacityError(format!(
                "array {array_id} has {} elements, more than {} can be addressed",
                array.len(),
                u32::MAX
            )));
        }

        let start = head;
        let nulls = array.logical_nulls();
        for offset in 0..array.len() {
            let item = ArrayItemIndex::new(array_id, offset as u32);
            if nulls.as_ref().is_some_and(|n| n.is_null(offset)) {
                tail -= 1;
                indices[tail] = item;
            } else {
                indices[head] = item;
                head += 1;
            }
        }

        let sort_start = Instant::now();
        indices[start..head].sort_by(|l, r| values.compare(*l, *r));
        debug!(
            "{OP}: sorted {} items of array {array_id} in {:?}",
            head - start,
            sort_start.elapsed()
        );
        runs.push(start..head);
    }

    debug_assert_eq!(head, tail);
    Ok((runs, head))
}

/// Merge adjacent sorted `runs` of `indices` in place, halving the run list
/// at each level. Returns the range the merged run covers.
fn merge_runs<V: SortValues>(
    values: &V,
    indices: &mut [ArrayItemIndex],
    runs: &[Range<usize>],
    scratch: &mut Vec<ArrayItemIndex>,
) -> Range<usize> {
    match runs {
        [] => 0..0,
        [run] => run.clone(),
        _ => {
            let (left, right) = runs.split_at(runs.len() / 2);
            let left = merge_runs(values, indices, left, scratch);
            let right = merge_runs(values, indices, right, scratch);
            debug_assert_eq!(left.end, right.start);
            merge_adjacent(values, &mut indices[left.start..right.end], left.len(), scratch);
            left.start..right.end
        }
    }
}

/// Stable two-way merge of `run[..mid]` and `run[mid..]` through `scratch`.
/// On equal values the left run goes first.
fn merge_adjacent<V: SortValues>(
    values: &V,
    run: &mut [ArrayItemIndex],
    mid: usize,
    scratch: &mut Vec<ArrayItemIndex>,
) {
    let (left, right) = run.split_at(mid);
    if left.is_empty() || right.is_empty() {
        return;
    }
    scratch.clear();
    let (mut l, mut r) = (0, 0);
    while l < left.len() && r < right.len() {
        if values.compare(right[r], left[l]).is_lt() {
            scratch.push(right[r]);
            r += 1;
        } else {
            scratch.push(left[l]);
            l += 1;
        }
    }
    scratch.extend_from_slice(&left[l..]);
    scratch.extend_from_slice(&right[r..]);
    run.copy_from_slice(scratch);
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Int32Array, NullArray, StringArray};
    use std::sync::Arc;

    fn idx(array_id: u32, offset: u32) -> ArrayItemIndex {
        ArrayItemIndex::new(array_id, offset)
    }

    #[test]
    fn test_scenario_with_null_tail() {
        let arrays: Vec<ArrayRef> = vec![
            Arc::new(Int32Array::from(vec![3, 1, 1])),
            Arc::new(Int32Array::from(vec![Some(2), None])),
        ];
        let merged = merge_sorted_indices(&arrays).unwrap();
        assert_eq!(
            merged,
            vec![idx(0, 1), idx(0, 2), idx(1, 0), idx(0, 0), idx(1, 1)]
        );
    }

    #[test]
    fn test_equal_values_keep_array_order() {
        let arrays: Vec<ArrayRef> = vec![
            Arc::new(Int32Array::from(vec![5, 1])),
            Arc::new(Int32Array::from(vec![1, 5])),
            Arc::new(Int32Array::from(vec![5])),
        ];
        let merged = merge_sorted_indices(&arrays).unwrap();
        assert_eq!(
            merged,
            vec![idx(0, 1), idx(1, 0), idx(0, 0), idx(1, 1), idx(2, 0)]
        );
    }

    #[test]
    fn test_null_tail_is_filled_back_to_front() {
        let arrays: Vec<ArrayRef> = vec![
            Arc::new(Int32Array::from(vec![None, Some(4), None])),
            Arc::new(Int32Array::from(vec![None])),
        ];
        let merged = merge_sorted_indices(&arrays).unwrap();
        assert_eq!(merged, vec![idx(0, 1), idx(1, 0), idx(0, 2), idx(0, 0)]);
    }

    #[test]
    fn test_empty_and_all_null_arrays() {
        let arrays: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(Vec::<&str>::new())),
            Arc::new(StringArray::from(vec![None::<&str>, None])),
            Arc::new(StringArray::from(vec!["b", "a"])),
        ];
        let merged = merge_sorted_indices(&arrays).unwrap();
        assert_eq!(merged, vec![idx(2, 1), idx(2, 0), idx(1, 1), idx(1, 0)]);
    }

    #[test]
    fn test_null_type_is_all_tail() {
        let arrays: Vec<ArrayRef> = vec![Arc::new(NullArray::new(2)), Arc::new(NullArray::new(1))];
        let merged = merge_sorted_indices(&arrays).unwrap();
        assert_eq!(merged, vec![idx(1, 0), idx(0, 1), idx(0, 0)]);
    }

    #[test]
    fn test_no_arrays_is_invalid() {
        assert!(matches!(
            merge_sorted_indices(&[]),
            Err(KernelError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_mixed_types_are_invalid() {
        let arrays: Vec<ArrayRef> = vec![
            Arc::new(Int32Array::from(vec![1])),
            Arc::new(StringArray::from(vec!["1"])),
        ];
        assert!(matches!(
            merge_sorted_indices(&arrays),
            Err(KernelError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_unsupported_type() {
        let arrays: Vec<ArrayRef> = vec![Arc::new(arrow::array::LargeStringArray::from(vec!["a"]))];
        assert_eq!(
            merge_sorted_indices(&arrays),
            Err(KernelError::not_implemented(OP, &DataType::LargeUtf8))
        );
    }

    #[test]
    fn test_merge_adjacent_is_stable() {
        let arrays: Vec<ArrayRef> = vec![Arc::new(Int32Array::from(vec![1, 2, 1, 2]))];
        let values = PrimitiveValues::<Int32Type>::try_new(&arrays).unwrap();
        let mut run = vec![idx(0, 0), idx(0, 1), idx(0, 2), idx(0, 3)];
        let mut scratch = Vec::new();
        merge_adjacent(&values, &mut run, 2, &mut scratch);
        assert_eq!(run, vec![idx(0, 0), idx(0, 2), idx(0, 1), idx(0, 3)]);
    }
}
