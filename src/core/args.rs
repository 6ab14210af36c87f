use clap::{Args, Parser, Subcommand};
use log::kv::{ToValue, Value};

#[derive(Parser, Debug, PartialEq)]
#[command(version, about)]
pub struct CliArgs {
    #[arg(short, long)]
    pub config: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Distinct values of a column, in first-seen order.
    Unique(HashArgs),
    /// Distinct values of a column with their occurrence counts.
    ValueCounts(HashArgs),
    /// Dictionary-encode a column against one shared dictionary.
    DictionaryEncode(HashArgs),
    /// Merge one column from several files into a single ascending order.
    Merge(MergeArgs),
}

#[derive(Args, Debug, PartialEq)]
pub struct HashArgs {
    /// Arrow IPC file to read.
    #[arg(short, long)]
    pub file: String,
    #[arg(long)]
    pub column: String,
}

#[derive(Args, Debug, PartialEq)]
pub struct MergeArgs {
    /// Arrow IPC files; each record batch becomes one merge input.
    #[arg(short, long, required = true, num_args = 1..)]
    pub file: Vec<String>,
    #[arg(long)]
    pub column: String,
}

impl ToValue for CliArgs {
    fn to_value(&self) -> Value<'_> {
        Value::from_debug(self)
    }
}
