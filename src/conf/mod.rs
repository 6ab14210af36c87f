mod config;
mod hash;

pub use config::Config;
pub use hash::HashConfig;
