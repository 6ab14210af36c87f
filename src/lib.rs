pub mod cli;
pub mod conf;
pub mod core;
pub mod hash;
pub mod merge;

#[cfg(feature = "testutil")]
pub mod testutil;
