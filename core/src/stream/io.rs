//! stream/io.rs
//! File helpers that attach the path and operation to I/O errors.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::types::StreamError;

pub fn open_input(path: &Path) -> Result<(File, u64), StreamError> {
    let file = File::open(path).map_err(|e| StreamError::file("open", path, e))?;
    let len = file
        .metadata()
        .map_err(|e| StreamError::file("stat", path, e))?
        .len();
    Ok((file, len))
}

pub fn create_output(path: &Path) -> Result<BufWriter<File>, StreamError> {
    let file = File::create(path).map_err(|e| StreamError::file("create", path, e))?;
    Ok(BufWriter::new(file))
}

pub fn finish_output<W: Write>(mut writer: W, path: &Path) -> Result<(), StreamError> {
    writer.flush().map_err(|e| StreamError::file("flush", path, e))
}
