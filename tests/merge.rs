use std::collections::HashSet;
use std::sync::Arc;

use arrow::array::*;
use arrow::datatypes::{DataType, Float64Type, Int32Type, TimeUnit};
use rstest::rstest;

use colkern::core::KernelError;
use colkern::merge::{
    ArrayItemIndex, indices_from_fixed_size_binary, indices_to_fixed_size_binary,
    indices_to_struct, merge_sorted_indices, take_indices,
};
use colkern::testutil::{
    generate_deterministic_array, random_float64_array, random_int32_array, seeded_rng,
};

/// Every element appears exactly once, and nulls sit after all values.
fn assert_complete(arrays: &[ArrayRef], merged: &[ArrayItemIndex]) {
    let total: usize = arrays.iter().map(|a| a.len()).sum();
    assert_eq!(merged.len(), total);
    let distinct: HashSet<_> = merged.iter().copied().collect();
    assert_eq!(distinct.len(), total);

    let is_null = |i: &ArrayItemIndex| {
        arrays[i.array_id as usize]
            .logical_nulls()
            .is_some_and(|n| n.is_null(i.offset as usize))
    };
    let valid = merged.iter().take_while(|i| !is_null(i)).count();
    assert!(merged[valid..].iter().all(is_null));
}

#[rstest]
#[case::utf8(DataType::Utf8)]
#[case::binary(DataType::Binary)]
#[case::int16(DataType::Int16)]
#[case::int64(DataType::Int64)]
#[case::uint32(DataType::UInt32)]
#[case::float32(DataType::Float32)]
#[case::bool(DataType::Boolean)]
#[case::null(DataType::Null)]
#[case::int8(DataType::Int8)]
#[case::uint8(DataType::UInt8)]
#[case::uint16(DataType::UInt16)]
#[case::date32(DataType::Date32)]
#[case::date64(DataType::Date64)]
#[case::time32(DataType::Time32(TimeUnit::Second))]
#[case::time64(DataType::Time64(TimeUnit::Microsecond))]
#[case::timestamp_tz(DataType::Timestamp(TimeUnit::Millisecond, Some("+02:00".into())))]
#[case::decimal128(DataType::Decimal128(10, 2))]
#[case::fixed_size_binary(DataType::FixedSizeBinary(4))]
fn test_dtype(#[case] dtype: DataType) {
    let arrays: Vec<ArrayRef> = (0..4)
        .map(|i| generate_deterministic_array(&dtype, 50 + i * 7, 11 + i, true))
        .collect();
    let merged = merge_sorted_indices(&arrays).unwrap();
    assert_complete(&arrays, &merged);

    let values = take_indices(&arrays, &merged).unwrap();
    let valid = values.len() - values.logical_null_count();
    if valid == 0 {
        return;
    }
    let sort_options = arrow::compute::SortOptions {
        descending: false,
        nulls_first: false,
    };
    let expected = arrow::compute::sort(values.as_ref(), Some(sort_options)).unwrap();
    assert_eq!(
        values.slice(0, valid).to_data(),
        expected.slice(0, valid).to_data()
    );
}

#[test]
fn test_random_int32_is_stable() {
    let mut rng = seeded_rng();
    let arrays: Vec<ArrayRef> = (0..9)
        .map(|i| Arc::new(random_int32_array(&mut rng, i * 40, 25, 0.1)) as ArrayRef)
        .collect();
    let merged = merge_sorted_indices(&arrays).unwrap();
    assert_complete(&arrays, &merged);

    let value = |i: &ArrayItemIndex| {
        let array = arrays[i.array_id as usize].as_primitive::<Int32Type>();
        array.is_valid(i.offset as usize).then(|| array.value(i.offset as usize))
    };
    for pair in merged.windows(2) {
        let (l, r) = (value(&pair[0]), value(&pair[1]));
        match (l, r) {
            (Some(l), Some(r)) => {
                assert!(l <= r);
                if l == r {
                    assert!((pair[0].array_id, pair[0].offset) < (pair[1].array_id, pair[1].offset));
                }
            }
            (Some(_), None) | (None, None) => {}
            (None, Some(_)) => panic!("value after null tail"),
        }
    }
}

#[test]
fn test_floats_use_total_order() {
    let arrays: Vec<ArrayRef> = vec![
        Arc::new(random_float64_array(&mut seeded_rng(), 64, 0.2)),
        Arc::new(Float64Array::from(vec![f64::NAN, -0.0, 0.0, f64::NEG_INFINITY])),
    ];
    let merged = merge_sorted_indices(&arrays).unwrap();
    assert_complete(&arrays, &merged);

    let values = take_indices(&arrays, &merged).unwrap();
    let values = values.as_primitive::<Float64Type>();
    let valid: Vec<f64> = values.iter().map_while(|v| v).collect();
    assert!(valid.windows(2).all(|w| w[0].total_cmp(&w[1]).is_le()));
    assert_eq!(valid.first().copied(), Some(f64::NEG_INFINITY));
    assert!(valid.last().is_some_and(|v| v.is_nan()));
}

#[test]
fn test_output_forms() {
    let arrays: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(vec!["pear", "apple"])),
        Arc::new(StringArray::from(vec![Some("fig"), None])),
    ];
    let merged = merge_sorted_indices(&arrays).unwrap();

    let packed = indices_to_fixed_size_binary(&merged).unwrap();
    assert_eq!(indices_from_fixed_size_binary(&packed).unwrap(), merged);

    let as_struct = indices_to_struct(&merged).unwrap();
    assert_eq!(as_struct.len(), 4);

    let values = take_indices(&arrays, &merged).unwrap();
    let values: Vec<Option<&str>> = values.as_string::<i32>().iter().collect();
    assert_eq!(values, vec![Some("apple"), Some("fig"), Some("pear"), None]);
}

#[test]
fn test_sliced_inputs() {
    let base: ArrayRef = Arc::new(Int32Array::from(vec![9, 4, 7, 1, 8]));
    let arrays = vec![base.slice(1, 3), base.slice(0, 1)];
    let merged = merge_sorted_indices(&arrays).unwrap();
    let values = take_indices(&arrays, &merged).unwrap();
    assert_eq!(values.as_primitive::<Int32Type>().values().as_ref(), &[1, 4, 7, 9]);
}

#[test]
fn test_rejects_bad_input() {
    assert!(matches!(
        merge_sorted_indices(&[]),
        Err(KernelError::InvalidInput(_))
    ));
    let mixed: Vec<ArrayRef> = vec![
        Arc::new(Int32Array::from(vec![1])),
        Arc::new(Int64Array::from(vec![1])),
    ];
    assert!(matches!(
        merge_sorted_indices(&mixed),
        Err(KernelError::InvalidInput(_))
    ));
}
