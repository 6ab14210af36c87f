use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, DictionaryArray, Int64Array, StructArray};
use arrow::datatypes::{DataType, Field, Fields, Int32Type, Int64Type};
use log::debug;

use crate::conf::HashConfig;
use crate::core::KernelError;
use crate::hash::action::{Action, DictEncodeAction, UniqueAction, ValueCountsAction};
use crate::hash::dispatch::make_hash_kernel;
use crate::hash::kernel::HashKernel;

pub const VALUES_FIELD: &str = "values";
pub const COUNTS_FIELD: &str = "counts";

/// A finished hash pass: the kernel, whatever it flushed per chunk, and the
/// dictionary it built.
struct HashRun {
    kernel: Box<dyn HashKernel>,
    chunk_outputs: Vec<ArrayRef>,
    dictionary: ArrayRef,
}

fn invoke_hash<A: Action>(
    data_type: &DataType,
    chunks: &[ArrayRef],
    config: &HashConfig,
) -> Result<HashRun, KernelError> {
    let mut kernel = make_hash_kernel::<A>(data_type, config)?;
    let mut chunk_outputs = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        kernel.append(chunk.as_ref())?;
        if let Some(out) = kernel.flush()? {
            chunk_outputs.push(out);
        }
    }
    let dictionary = kernel.dictionary()?;
    debug!(
        "{} over {} chunks of {data_type}: {} distinct slots",
        A::NAME,
        chunks.len(),
        dictionary.len()
    );
    Ok(HashRun {
        kernel,
        chunk_outputs,
        dictionary,
    })
}

/// Distinct values of `array` in first-occurrence order. A null entry is
/// included, at the position of the first null, iff the array has a null.
pub fn unique(array: &dyn Array) -> Result<ArrayRef, KernelError> {
    let chunk = arrow::array::make_array(array.to_data());
    unique_chunked(array.data_type(), &[chunk], &HashConfig::default())
}

/// [`unique`] over a sequence of chunks of `data_type`.
pub fn unique_chunked(
    data_type: &DataType,
    chunks: &[ArrayRef],
    config: &HashConfig,
) -> Result<ArrayRef, KernelError> {
    Ok(invoke_hash::<UniqueAction>(data_type, chunks, config)?.dictionary)
}

/// Replace every value by its index into the distinct-value dictionary.
/// Nulls become null keys; the dictionary itself holds no null.
pub fn dictionary_encode(array: &dyn Array) -> Result<ArrayRef, KernelError> {
    let chunk = arrow::array::make_array(array.to_data());
    let mut encoded =
        dictionary_encode_chunked(array.data_type(), &[chunk], &HashConfig::default())?;
    encoded
        .pop()
        .ok_or_else(|| KernelError::Internal("dictionary encode produced no indices".into()))
}

/// Encode every chunk against one shared dictionary, returning one
/// `Dictionary(Int32, data_type)` array per chunk.
pub fn dictionary_encode_chunked(
    data_type: &DataType,
    chunks: &[ArrayRef],
    config: &HashConfig,
) -> Result<Vec<ArrayRef>, KernelError> {
    let run = invoke_hash::<DictEncodeAction>(data_type, chunks, config)?;
    if run.chunk_outputs.len() != chunks.len() {
        return Err(KernelError::Internal(format!(
            "dictionary encode flushed {} index arrays for {} chunks",
            run.chunk_outputs.len(),
            chunks.len()
        )));
    }
    run.chunk_outputs
        .iter()
        .map(|indices| {
            let keys = indices.as_primitive_opt::<Int32Type>().ok_or_else(|| {
                KernelError::Internal(format!(
                    "dictionary indices have type {}",
                    indices.data_type()
                ))
            })?;
            let encoded = DictionaryArray::<Int32Type>::try_new(
                keys.clone(),
                Arc::clone(&run.dictionary),
            )?;
            Ok(Arc::new(encoded) as ArrayRef)
        })
        .collect()
}

/// Distinct values with their occurrence counts, as a struct array with a
/// `values` field and a non-null Int64 `counts` field. `counts[i]` is the
/// number of positions equal to `values[i]`; nulls are counted in their slot.
pub fn value_counts(array: &dyn Array) -> Result<StructArray, KernelError> {
    let chunk = arrow::array::make_array(array.to_data());
    value_counts_chunked(array.data_type(), &[chunk], &HashConfig::default())
}

/// [`value_counts`] over a sequence of chunks of `data_type`.
pub fn value_counts_chunked(
    data_type: &DataType,
    chunks: &[ArrayRef],
    config: &HashConfig,
) -> Result<StructArray, KernelError> {
    let mut run = invoke_hash::<ValueCountsAction>(data_type, chunks, config)?;
    let counts = match run.kernel.flush_final()? {
        Some(counts) => counts,
        None => Arc::new(Int64Array::from(Vec::<i64>::new())),
    };
    if counts.len() != run.dictionary.len() {
        return Err(KernelError::Internal(format!(
            "{} counts for {} distinct values",
            counts.len(),
            run.dictionary.len()
        )));
    }
    debug_assert!(counts.as_primitive_opt::<Int64Type>().is_some());

    let fields = Fields::from(vec![
        Field::new(VALUES_FIELD, data_type.clone(), true),
        Field::new(COUNTS_FIELD, DataType::Int64, false),
    ]);
    Ok(StructArray::try_new(
        fields,
        vec![run.dictionary, counts],
        None,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{BooleanArray, Int32Array, NullArray, StringArray};

    #[test]
    fn test_scenario_int32() {
        let a = Int32Array::from(vec![3, 1, 1]);

        let uniques = unique(&a).unwrap();
        assert_eq!(uniques.as_primitive::<Int32Type>().values().as_ref(), &[3, 1]);

        let counts = value_counts(&a).unwrap();
        let values = counts.column_by_name(VALUES_FIELD).unwrap();
        let counts = counts.column_by_name(COUNTS_FIELD).unwrap();
        assert_eq!(values.as_primitive::<Int32Type>().values().as_ref(), &[3, 1]);
        assert_eq!(counts.as_primitive::<Int64Type>().values().as_ref(), &[1, 2]);

        let encoded = dictionary_encode(&a).unwrap();
        let encoded = encoded.as_dictionary::<Int32Type>();
        assert_eq!(encoded.keys().values().as_ref(), &[0, 1, 1]);
        assert_eq!(
            encoded.values().as_primitive::<Int32Type>().values().as_ref(),
            &[3, 1]
        );
    }

    #[test]
    fn test_unique_with_nulls() {
        let a = StringArray::from(vec![Some("b"), None, Some("a"), None, Some("b")]);
        let uniques = unique(&a).unwrap();
        let uniques = uniques.as_string::<i32>();
        assert_eq!(uniques.len(), 3);
        assert_eq!(uniques.value(0), "b");
        assert!(uniques.is_null(1));
        assert_eq!(uniques.value(2), "a");
    }

    #[test]
    fn test_value_counts_boolean_with_nulls() {
        let a = BooleanArray::from(vec![Some(false), None, Some(false), Some(true), None]);
        let result = value_counts(&a).unwrap();
        let values = result.column(0).as_boolean();
        let counts = result.column(1).as_primitive::<Int64Type>();
        assert_eq!(values.len(), 3);
        assert!(!values.value(0));
        assert!(values.is_null(1));
        assert!(values.value(2));
        assert_eq!(counts.values().as_ref(), &[2, 2, 1]);
    }

    #[test]
    fn test_empty_input() {
        let a = Int32Array::from(Vec::<i32>::new());
        assert_eq!(unique(&a).unwrap().len(), 0);
        assert_eq!(value_counts(&a).unwrap().len(), 0);
        assert_eq!(dictionary_encode(&a).unwrap().len(), 0);
    }

    #[test]
    fn test_null_type() {
        let a = NullArray::new(4);
        assert_eq!(unique(&a).unwrap().len(), 1);

        let counts = value_counts(&a).unwrap();
        assert_eq!(counts.len(), 1);
        assert_eq!(
            counts.column(1).as_primitive::<Int64Type>().values().as_ref(),
            &[4]
        );

        let encoded = dictionary_encode(&a).unwrap();
        let encoded = encoded.as_dictionary::<Int32Type>();
        assert_eq!(encoded.len(), 4);
        assert_eq!(encoded.keys().null_count(), 4);
        assert_eq!(encoded.values().len(), 0);
    }

    #[test]
    fn test_chunked_shares_dictionary() {
        let chunks: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(vec!["x", "y"])),
            Arc::new(StringArray::from(vec!["y", "z", "x"])),
        ];
        let encoded =
            dictionary_encode_chunked(&DataType::Utf8, &chunks, &HashConfig::default()).unwrap();
        assert_eq!(encoded.len(), 2);
        let first = encoded[0].as_dictionary::<Int32Type>();
        let second = encoded[1].as_dictionary::<Int32Type>();
        assert_eq!(first.keys().values().as_ref(), &[0, 1]);
        assert_eq!(second.keys().values().as_ref(), &[1, 2, 0]);
        assert!(Arc::ptr_eq(first.values(), second.values()));
        assert_eq!(second.values().len(), 3);
    }

    #[test]
    fn test_chunked_empty_list() {
        let encoded =
            dictionary_encode_chunked(&DataType::Int32, &[], &HashConfig::default()).unwrap();
        assert!(encoded.is_empty());
        let counts = value_counts_chunked(&DataType::Int32, &[], &HashConfig::default()).unwrap();
        assert_eq!(counts.len(), 0);
    }

    #[test]
    fn test_chunk_type_mismatch() {
        let chunks: Vec<ArrayRef> = vec![
            Arc::new(Int32Array::from(vec![1])),
            Arc::new(StringArray::from(vec!["1"])),
        ];
        let err = unique_chunked(&DataType::Int32, &chunks, &HashConfig::default()).unwrap_err();
        assert!(matches!(err, KernelError::InvalidInput(_)));
    }

    #[test]
    fn test_unsupported_type_fails_before_reading() {
        let a = arrow::array::LargeStringArray::from(vec!["a"]);
        assert_eq!(
            unique(&a).unwrap_err(),
            KernelError::not_implemented("unique", &DataType::LargeUtf8)
        );
        assert!(matches!(
            value_counts(&a).unwrap_err(),
            KernelError::NotImplemented { op: "value_counts", .. }
        ));
        assert!(matches!(
            dictionary_encode(&a).unwrap_err(),
            KernelError::NotImplemented { op: "dictionary_encode", .. }
        ));
    }
}
