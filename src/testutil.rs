//! Test and benchmark utilities.
//!
//! This module is only available when the `testutil` feature is enabled.

use std::sync::Arc;

use arrow::array::*;
use arrow::datatypes::{
    ArrowPrimitiveType, DataType, Date32Type, Date64Type, Decimal128Type, Int8Type, TimeUnit,
    Time32SecondType, Time64MicrosecondType, TimestampMillisecondType, UInt8Type, UInt16Type,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const RNG_SEED: u64 = 42;

pub fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(RNG_SEED)
}

/// Int32 values drawn from `0..cardinality`, each null with probability
/// `null_fraction`.
pub fn random_int32_array(
    rng: &mut StdRng,
    len: usize,
    cardinality: i32,
    null_fraction: f64,
) -> Int32Array {
    (0..len)
        .map(|_| {
            if rng.gen_bool(null_fraction) {
                None
            } else {
                Some(rng.gen_range(0..cardinality.max(1)))
            }
        })
        .collect()
}

/// Short strings `"key_<n>"` with `n` drawn from `0..cardinality`.
pub fn random_string_array(
    rng: &mut StdRng,
    len: usize,
    cardinality: usize,
    null_fraction: f64,
) -> StringArray {
    (0..len)
        .map(|_| {
            if rng.gen_bool(null_fraction) {
                None
            } else {
                Some(format!("key_{}", rng.gen_range(0..cardinality.max(1))))
            }
        })
        .collect()
}

/// Float64 values from a small pool that includes NaN and both zeros.
pub fn random_float64_array(rng: &mut StdRng, len: usize, null_fraction: f64) -> Float64Array {
    const POOL: [f64; 6] = [f64::NAN, -0.0, 0.0, 1.5, -2.25, f64::INFINITY];
    (0..len)
        .map(|_| {
            if rng.gen_bool(null_fraction) {
                None
            } else {
                Some(POOL[rng.gen_range(0..POOL.len())])
            }
        })
        .collect()
}

/// Row `i` holds `i % cardinality` cast to `dtype`: strings are stringified,
/// binary values are its little-endian bytes (truncated or zero-padded to the
/// width for fixed-size binary), booleans are `true` for odd values. Every seventh row is null when
/// `with_nulls` is set.
pub fn generate_deterministic_array(
    dtype: &DataType,
    num_rows: usize,
    cardinality: usize,
    with_nulls: bool,
) -> ArrayRef {
    let cardinality = cardinality.max(1);
    let value = |i: usize| (!with_nulls || i % 7 != 6).then_some(i % cardinality);

    // Keeps parameterized types such as time zones and decimal precision.
    macro_rules! typed {
        ($t:ty) => {{
            let arr: PrimitiveArray<$t> = (0..num_rows)
                .map(|i| value(i).map(|v| v as <$t as ArrowPrimitiveType>::Native))
                .collect();
            Arc::new(arr.with_data_type(dtype.clone()))
        }};
    }

    match dtype {
        DataType::Null => Arc::new(NullArray::new(num_rows)),
        DataType::Utf8 => {
            let arr: StringArray = (0..num_rows).map(|i| value(i).map(|v| v.to_string())).collect();
            Arc::new(arr)
        }
        DataType::Binary => {
            let arr: BinaryArray = (0..num_rows)
                .map(|i| value(i).map(|v| v.to_le_bytes().to_vec()))
                .collect();
            Arc::new(arr)
        }
        DataType::Int16 => {
            let arr: Int16Array = (0..num_rows).map(|i| value(i).map(|v| v as i16)).collect();
            Arc::new(arr)
        }
        DataType::Int32 => {
            let arr: Int32Array = (0..num_rows).map(|i| value(i).map(|v| v as i32)).collect();
            Arc::new(arr)
        }
        DataType::Int64 => {
            let arr: Int64Array = (0..num_rows).map(|i| value(i).map(|v| v as i64)).collect();
            Arc::new(arr)
        }
        DataType::UInt32 => {
            let arr: UInt32Array = (0..num_rows).map(|i| value(i).map(|v| v as u32)).collect();
            Arc::new(arr)
        }
        DataType::UInt64 => {
            let arr: UInt64Array = (0..num_rows).map(|i| value(i).map(|v| v as u64)).collect();
            Arc::new(arr)
        }
        DataType::Float32 => {
            let arr: Float32Array = (0..num_rows).map(|i| value(i).map(|v| v as f32)).collect();
            Arc::new(arr)
        }
        DataType::Float64 => {
            let arr: Float64Array = (0..num_rows).map(|i| value(i).map(|v| v as f64)).collect();
            Arc::new(arr)
        }
        DataType::Boolean => {
            let arr: BooleanArray = (0..num_rows).map(|i| value(i).map(|v| v % 2 == 1)).collect();
            Arc::new(arr)
        }
        DataType::FixedSizeBinary(width) => {
            let width = *width as usize;
            let values = (0..num_rows).map(|i| {
                value(i).map(|v| {
                    let le = (v as u64).to_le_bytes();
                    let mut bytes = vec![0u8; width];
                    let n = width.min(le.len());
                    bytes[..n].copy_from_slice(&le[..n]);
                    bytes
                })
            });
            let arr = FixedSizeBinaryArray::try_from_sparse_iter_with_size(values, width as i32)
                .unwrap();
            Arc::new(arr)
        }
        DataType::Int8 => typed!(Int8Type),
        DataType::UInt8 => typed!(UInt8Type),
        DataType::UInt16 => typed!(UInt16Type),
        DataType::Date32 => typed!(Date32Type),
        DataType::Date64 => typed!(Date64Type),
        DataType::Time32(TimeUnit::Second) => typed!(Time32SecondType),
        DataType::Time64(TimeUnit::Microsecond) => typed!(Time64MicrosecondType),
        DataType::Timestamp(TimeUnit::Millisecond, _) => typed!(TimestampMillisecondType),
        DataType::Decimal128(_, _) => typed!(Decimal128Type),
        _ => panic!("Unsupported dtype: {:?}", dtype),
    }
}

/// Split `array` into consecutive slices of at most `chunk_len` rows.
pub fn split_into_chunks(array: &ArrayRef, chunk_len: usize) -> Vec<ArrayRef> {
    let chunk_len = chunk_len.max(1);
    (0..array.len())
        .step_by(chunk_len)
        .map(|offset| array.slice(offset, chunk_len.min(array.len() - offset)))
        .collect()
}
