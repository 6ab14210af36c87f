use std::fs::File;
use std::path::Path;

use arrow::array::ArrayRef;
use arrow::datatypes::DataType;
use arrow::ipc::reader::FileReader;
use log::debug;

use crate::core::KernelError;

/// One column of an Arrow IPC file, one chunk per record batch.
#[derive(Debug)]
pub struct ColumnChunks {
    pub data_type: DataType,
    pub chunks: Vec<ArrayRef>,
}

pub fn read_column(path: impl AsRef<Path>, column: &str) -> Result<ColumnChunks, KernelError> {
    let path = path.as_ref();
    let reader = FileReader::try_new(File::open(path)?, None)?;
    let schema = reader.schema();
    let index = schema.index_of(column).map_err(|_| {
        KernelError::InvalidInput(format!(
            "column '{column}' not found in {}",
            path.display()
        ))
    })?;
    let data_type = schema.field(index).data_type().clone();

    let mut chunks = Vec::new();
    for batch in reader {
        chunks.push(batch?.column(index).clone());
    }
    debug!(
        "read {} batches of '{column}' ({data_type}) from {}",
        chunks.len(),
        path.display()
    );
    Ok(ColumnChunks { data_type, chunks })
}
