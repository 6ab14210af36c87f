use arrow::datatypes::{
    BinaryType, DataType, Date32Type, Date64Type, Decimal128Type, Float32Type, Float64Type,
    Int8Type, Int16Type, Int32Type, Int64Type, Time32MillisecondType, Time32SecondType,
    Time64MicrosecondType, Time64NanosecondType, TimeUnit, TimestampMicrosecondType,
    TimestampMillisecondType, TimestampNanosecondType, TimestampSecondType, UInt8Type,
    UInt16Type, UInt32Type, UInt64Type, Utf8Type,
};
use log::debug;

use crate::conf::HashConfig;
use crate::core::KernelError;
use crate::hash::action::Action;
use crate::hash::kernel::{HashKernel, NullHashKernel, RegularHashKernel};
use crate::hash::memo::{
    BooleanMemoTable, ByteMemoTable, FixedSizeBinaryMemoTable, MemoTable, PrimitiveMemoTable,
};

fn regular<M, A>(data_type: &DataType, config: &HashConfig) -> Result<Box<dyn HashKernel>, KernelError>
where
    M: MemoTable + 'static,
    A: Action,
{
    let kernel = RegularHashKernel::<M, A>::try_new(data_type.clone(), config.memo_capacity)?;
    Ok(Box::new(kernel))
}

/// Build the kernel for action `A` over `data_type`.
///
/// Fails with [`KernelError::NotImplemented`] before any data is read when the
/// type has no memo table.
pub fn make_hash_kernel<A: Action>(
    data_type: &DataType,
    config: &HashConfig,
) -> Result<Box<dyn HashKernel>, KernelError> {
    debug!(
        "building {} kernel for {data_type} (memo capacity {})",
        A::NAME,
        config.memo_capacity
    );
    match data_type {
        DataType::Null => Ok(Box::new(NullHashKernel::<A>::default())),
        DataType::Boolean => regular::<BooleanMemoTable, A>(data_type, config),
        DataType::Int8 => regular::<PrimitiveMemoTable<Int8Type>, A>(data_type, config),
        DataType::Int16 => regular::<PrimitiveMemoTable<Int16Type>, A>(data_type, config),
        DataType::Int32 => regular::<PrimitiveMemoTable<Int32Type>, A>(data_type, config),
        DataType::Int64 => regular::<PrimitiveMemoTable<Int64Type>, A>(data_type, config),
        DataType::UInt8 => regular::<PrimitiveMemoTable<UInt8Type>, A>(data_type, config),
        DataType::UInt16 => regular::<PrimitiveMemoTable<UInt16Type>, A>(data_type, config),
        DataType::UInt32 => regular::<PrimitiveMemoTable<UInt32Type>, A>(data_type, config),
        DataType::UInt64 => regular::<PrimitiveMemoTable<UInt64Type>, A>(data_type, config),
        DataType::Float32 => regular::<PrimitiveMemoTable<Float32Type>, A>(data_type, config),
        DataType::Float64 => regular::<PrimitiveMemoTable<Float64Type>, A>(data_type, config),
        DataType::Date32 => regular::<PrimitiveMemoTable<Date32Type>, A>(data_type, config),
        DataType::Date64 => regular::<PrimitiveMemoTable<Date64Type>, A>(data_type, config),
        DataType::Time32(TimeUnit::Second) => {
            regular::<PrimitiveMemoTable<Time32SecondType>, A>(data_type, config)
        }
        DataType::Time32(TimeUnit::Millisecond) => {
            regular::<PrimitiveMemoTable<Time32MillisecondType>, A>(data_type, config)
        }
        DataType::Time64(TimeUnit::Microsecond) => {
            regular::<PrimitiveMemoTable<Time64MicrosecondType>, A>(data_type, config)
        }
        DataType::Time64(TimeUnit::Nanosecond) => {
            regular::<PrimitiveMemoTable<Time64NanosecondType>, A>(data_type, config)
        }
        DataType::Timestamp(TimeUnit::Second, _) => {
            regular::<PrimitiveMemoTable<TimestampSecondType>, A>(data_type, config)
        }
        DataType::Timestamp(TimeUnit::Millisecond, _) => {
            regular::<PrimitiveMemoTable<TimestampMillisecondType>, A>(data_type, config)
        }
        DataType::Timestamp(TimeUnit::Microsecond, _) => {
            regular::<PrimitiveMemoTable<TimestampMicrosecondType>, A>(data_type, config)
        }
        DataType::Timestamp(TimeUnit::Nanosecond, _) => {
            regular::<PrimitiveMemoTable<TimestampNanosecondType>, A>(data_type, config)
        }
        DataType::Decimal128(_, _) => {
            regular::<PrimitiveMemoTable<Decimal128Type>, A>(data_type, config)
        }
        DataType::Binary => regular::<ByteMemoTable<BinaryType>, A>(data_type, config),
        DataType::Utf8 => regular::<ByteMemoTable<Utf8Type>, A>(data_type, config),
        DataType::FixedSizeBinary(_) => regular::<FixedSizeBinaryMemoTable, A>(data_type, config),
        other => Err(KernelError::not_implemented(A::NAME, other)),
    }
}
