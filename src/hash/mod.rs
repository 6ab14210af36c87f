//! Hash kernels: `unique`, `dictionary_encode` and `value_counts`.
//!
//! Each operation builds one [`HashKernel`] for the input type (a memo table
//! plus an [`Action`] policy), streams every chunk through it, and packages
//! the memo table's dictionary with whatever the action accumulated.

pub mod action;
mod dispatch;
pub mod kernel;
pub mod memo;
mod ops;

pub use action::Action;
pub use dispatch::make_hash_kernel;
pub use kernel::{HashKernel, SharedHashKernel};
pub use ops::{
    COUNTS_FIELD, VALUES_FIELD, dictionary_encode, dictionary_encode_chunked, unique,
    unique_chunked, value_counts, value_counts_chunked,
};
