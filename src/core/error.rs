use std::collections::TryReserveError;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum KernelError {
    #[error("{op} not implemented for {data_type}")]
    NotImplemented { op: &'static str, data_type: String },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Capacity exhausted: {0}")]
    CapacityError(String),
    #[error("Arrow error: {0}")]
    ArrowError(String),
    #[error("Cannot parse config: {0}")]
    ConfigParsingError(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl KernelError {
    pub fn not_implemented(op: &'static str, data_type: &arrow::datatypes::DataType) -> Self {
        KernelError::NotImplemented {
            op,
            data_type: data_type.to_string(),
        }
    }
}

impl From<std::io::Error> for KernelError {
    fn from(err: std::io::Error) -> Self {
        KernelError::IoError(err.to_string())
    }
}

impl From<arrow::error::ArrowError> for KernelError {
    fn from(err: arrow::error::ArrowError) -> Self {
        KernelError::ArrowError(err.to_string())
    }
}

impl From<TryReserveError> for KernelError {
    fn from(err: TryReserveError) -> Self {
        KernelError::CapacityError(err.to_string())
    }
}

impl From<hashbrown::TryReserveError> for KernelError {
    fn from(err: hashbrown::TryReserveError) -> Self {
        let msg = match err {
            hashbrown::TryReserveError::CapacityOverflow => "hash table capacity overflow".into(),
            hashbrown::TryReserveError::AllocError { layout } => {
                format!("hash table allocation of {} bytes failed", layout.size())
            }
        };
        KernelError::CapacityError(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::datatypes::DataType;

    #[test]
    fn test_not_implemented_names_op_and_type() {
        let err = KernelError::not_implemented("unique", &DataType::LargeUtf8);
        assert_eq!(err.to_string(), "unique not implemented for LargeUtf8");
    }

    #[test]
    fn test_try_reserve_maps_to_capacity() {
        let mut v: Vec<u64> = Vec::new();
        let err: KernelError = v.try_reserve(usize::MAX).unwrap_err().into();
        assert!(matches!(err, KernelError::CapacityError(_)));
    }
}
