use env_logger::{Builder, Target};
use log::LevelFilter;

/// Info by default, overridable through `RUST_LOG`. Logs go to stderr so they
/// never mix with the tables the CLI prints.
pub fn setup_logging() {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .target(Target::Stderr)
        .format_timestamp_millis()
        .init();
}
