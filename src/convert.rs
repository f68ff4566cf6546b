//! CSV to Parquet conversion over a directory.
//!
//! Each delimited file is parsed fully into memory with a header row and
//! inferred column types, then written as a Parquet file of the same stem.

use std::{
    fs::{self, File},
    io::{Seek, SeekFrom},
    path::{Path, PathBuf},
    sync::Arc,
};

use arrow_csv::{ReaderBuilder, reader::Format};
use parquet::{arrow::ArrowWriter, file::properties::WriterProperties};

use crate::{
    dataset::ensure_parent_dir,
    error::{Error, Result},
    types::ConvertedFileRow,
    utils, warning,
};

/// Behavior of [`convert_all`] when one file fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConvertPolicy {
    /// Abort the run on the first failing file.
    #[default]
    FailFast,
    /// Record the failure and continue with the next file.
    SkipInvalid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedFile {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub rows: usize,
}

#[derive(Debug)]
pub struct ConvertFailure {
    pub source: PathBuf,
    pub error: Error,
}

#[derive(Debug, Default)]
pub struct ConvertReport {
    pub converted: Vec<ConvertedFile>,
    pub failed: Vec<ConvertFailure>,
}

impl ConvertReport {
    pub fn table_rows(&self) -> Vec<ConvertedFileRow> {
        self.converted
            .iter()
            .map(|c| ConvertedFileRow {
                source: c.source.display().to_string(),
                destination: c.destination.display().to_string(),
                rows: c.rows,
            })
            .collect()
    }
}

/// Lists the CSV files directly inside `source_dir`, sorted by name.
///
/// # Errors
///
/// Returns [`Error::Parse`] if the directory cannot be read.
pub fn csv_files(source_dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let source_dir = source_dir.as_ref();
    let entries = fs::read_dir(source_dir).map_err(|e| Error::parse(source_dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| Error::parse(source_dir, e))?.path();
        if path.is_file() && utils::is_csv(&path) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Converts one CSV file to a Parquet file and returns its row count.
///
/// # Errors
///
/// - [`Error::Parse`] if the source cannot be opened, has no header columns,
///   its schema cannot be inferred, or a row does not match the inferred
///   schema
/// - [`Error::Write`] if the destination directory is missing or the
///   Parquet file cannot be written
pub fn convert_file(source: impl AsRef<Path>, destination: impl AsRef<Path>) -> Result<usize> {
    let (source, destination) = (source.as_ref(), destination.as_ref());

    let mut file = File::open(source).map_err(|e| Error::parse(source, e))?;
    let format = Format::default().with_header(true);
    let (schema, _) = format
        .infer_schema(&mut file, None)
        .map_err(|e| Error::parse(source, e))?;
    if schema.fields().is_empty() {
        return Err(Error::parse(source, "no columns to parse from file"));
    }
    file.seek(SeekFrom::Start(0))
        .map_err(|e| Error::parse(source, e))?;

    let reader = ReaderBuilder::new(Arc::new(schema))
        .with_format(format)
        .build(file)
        .map_err(|e| Error::parse(source, e))?;
    let schema = reader.schema();
    let batches = reader
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::parse(source, e))?;

    ensure_parent_dir(destination)?;
    let output = File::create(destination).map_err(|e| Error::write(destination, e))?;
    let props = WriterProperties::builder().build();
    let mut writer =
        ArrowWriter::try_new(output, schema, Some(props)).map_err(|e| Error::write(destination, e))?;
    for batch in &batches {
        writer.write(batch).map_err(|e| Error::write(destination, e))?;
    }
    writer.close().map_err(|e| Error::write(destination, e))?;

    Ok(batches.iter().map(|b| b.num_rows()).sum())
}

/// Converts every CSV file in `source_dir` into `dest_dir`.
///
/// Output names keep the source stem with a `.parquet` extension.
///
/// # Errors
///
/// With [`ConvertPolicy::FailFast`], the first failing file's error. With
/// [`ConvertPolicy::SkipInvalid`], only a failure to list `source_dir`;
/// per-file failures are collected in the report.
pub fn convert_all(
    source_dir: impl AsRef<Path>,
    dest_dir: impl AsRef<Path>,
    policy: ConvertPolicy,
) -> Result<ConvertReport> {
    let dest_dir = dest_dir.as_ref();
    let mut report = ConvertReport::default();

    for source in csv_files(source_dir)? {
        let Some(destination) = utils::parquet_destination(&source, dest_dir) else {
            continue;
        };

        match convert_file(&source, &destination) {
            Ok(rows) => report.converted.push(ConvertedFile {
                source,
                destination,
                rows,
            }),
            Err(error) if policy == ConvertPolicy::SkipInvalid => {
                warning!("Skipping {}: {}", source.display(), error);
                report.failed.push(ConvertFailure { source, error });
            }
            Err(error) => return Err(error),
        }
    }

    Ok(report)
}
