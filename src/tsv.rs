use csv::{Reader, ReaderBuilder, StringRecord, Terminator};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::errors::ImportError;

// @module: Tab-separated input files

// @returns: Builder for tab-delimited, unquoted, variable-width records
// Only '\n' ends a record; a lone '\r' stays part of the field.
pub fn reader_builder() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder
        .delimiter(b'\t')
        .terminator(Terminator::Any(b'\n'))
        .has_headers(false)
        .quoting(false)
        .flexible(true);
    builder
}

/// Wrap any reader as a TSV record reader
pub fn from_reader<R: Read>(reader: R) -> Reader<R> {
    reader_builder().from_reader(reader)
}

/// Open a TSV file for reading
pub fn open<P: AsRef<Path>>(path: P) -> Result<Reader<File>, ImportError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ImportError::InputFile {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(from_reader(file))
}

/// Iterate records after skipping `ignore_lines` leading ones
///
/// Reader errors (invalid UTF-8, I/O failures) are reported with the line
/// they occurred on.
pub fn records<R: Read>(
    reader: &mut Reader<R>,
    ignore_lines: usize,
) -> impl Iterator<Item = Result<StringRecord, ImportError>> + '_ {
    reader
        .records()
        .filter_map(|result| match result {
            Ok(record) => strip_carriage_return(record).map(Ok),
            Err(e) => Some(Err(ImportError::MalformedInput {
                line: e.position().map(|p| p.line()).unwrap_or(0),
                message: e.to_string(),
            })),
        })
        .skip(ignore_lines)
}

// Drop the '\r' of a CRLF line ending; `None` for a line that was only "\r\n"
fn strip_carriage_return(record: StringRecord) -> Option<StringRecord> {
    let last = record.len().checked_sub(1)?;
    if !record.get(last).is_some_and(|field| field.ends_with('\r')) {
        return Some(record);
    }

    let field = &record[last];
    let trimmed = &field[..field.len() - 1];

    if last == 0 && trimmed.is_empty() {
        return None;
    }

    let mut stripped: StringRecord = record
        .iter()
        .take(last)
        .chain(std::iter::once(trimmed))
        .collect();
    stripped.set_position(record.position().cloned());
    Some(stripped)
}

/// 1-based line number of a record, 0 when unknown
pub fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}
