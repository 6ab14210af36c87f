mod args;
mod error;
mod logger;

pub use args::{CliArgs, Command, HashArgs, MergeArgs};
pub use error::KernelError;
pub use logger::setup_logging;
