//! Command-line front end: read a column from Arrow IPC files, run one kernel
//! over it and render the result as a table.

mod ipc;

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::Int32Type;
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::{pretty_format_batches, pretty_format_columns};
use log::info;

use crate::conf::Config;
use crate::core::{CliArgs, Command, HashArgs, KernelError, MergeArgs};
use crate::hash::{dictionary_encode_chunked, unique_chunked, value_counts_chunked};
use crate::merge::{
    ARRAY_ID_FIELD, OFFSET_FIELD, indices_to_struct, merge_sorted_indices, take_indices,
};

pub use ipc::{ColumnChunks, read_column};

/// Run the parsed command and return its printable output.
pub fn run(args: &CliArgs, config: &Config) -> Result<String, KernelError> {
    match &args.command {
        Command::Unique(args) => unique(args, config),
        Command::ValueCounts(args) => value_counts(args, config),
        Command::DictionaryEncode(args) => dictionary_encode(args, config),
        Command::Merge(args) => merge(args),
    }
}

fn unique(args: &HashArgs, config: &Config) -> Result<String, KernelError> {
    let column = read_column(&args.file, &args.column)?;
    let uniques = unique_chunked(&column.data_type, &column.chunks, &config.hash)?;
    info!("{}: {} distinct values", args.column, uniques.len());
    Ok(pretty_format_columns(&args.column, &[uniques])?.to_string())
}

fn value_counts(args: &HashArgs, config: &Config) -> Result<String, KernelError> {
    let column = read_column(&args.file, &args.column)?;
    let counts = value_counts_chunked(&column.data_type, &column.chunks, &config.hash)?;
    info!("{}: {} distinct values", args.column, counts.len());
    Ok(pretty_format_batches(&[RecordBatch::from(counts)])?.to_string())
}

fn dictionary_encode(args: &HashArgs, config: &Config) -> Result<String, KernelError> {
    let column = read_column(&args.file, &args.column)?;
    let encoded = dictionary_encode_chunked(&column.data_type, &column.chunks, &config.hash)?;

    let mut keys: Vec<ArrayRef> = Vec::with_capacity(encoded.len());
    let mut dictionary = None;
    for chunk in &encoded {
        let chunk = chunk.as_dictionary::<Int32Type>();
        dictionary.get_or_insert_with(|| Arc::clone(chunk.values()));
        keys.push(Arc::new(chunk.keys().clone()));
    }
    let Some(dictionary) = dictionary else {
        return Ok(String::new());
    };
    info!(
        "{}: {} chunks encoded against {} dictionary entries",
        args.column,
        keys.len(),
        dictionary.len()
    );
    Ok(format!(
        "{}\n{}",
        pretty_format_columns(&args.column, &[dictionary])?,
        pretty_format_columns("index", &keys)?
    ))
}

fn merge(args: &MergeArgs) -> Result<String, KernelError> {
    let mut arrays = Vec::new();
    for file in &args.file {
        arrays.extend(read_column(file, &args.column)?.chunks);
    }
    let indices = merge_sorted_indices(&arrays)?;
    info!(
        "{}: merged {} items from {} arrays",
        args.column,
        indices.len(),
        arrays.len()
    );

    let (_, columns, _) = indices_to_struct(&indices)?.into_parts();
    let values = take_indices(&arrays, &indices)?;
    let batch = RecordBatch::try_from_iter([
        (ARRAY_ID_FIELD, Arc::clone(&columns[0])),
        (OFFSET_FIELD, Arc::clone(&columns[1])),
        (args.column.as_str(), values),
    ])?;
    Ok(pretty_format_batches(&[batch])?.to_string())
}
