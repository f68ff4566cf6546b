//! In-memory dataset of track records and its Parquet sink.
//!
//! A [`Dataset`] only grows during a run. It is materialized as a single
//! Arrow record batch and written once, in a single pass, at the end.

use std::{
    collections::HashSet,
    fs::File,
    path::Path,
    sync::{Arc, LazyLock},
};

use arrow::{
    array::{Array, ArrayRef, AsArray, BooleanArray, Float64Array, Int64Array, StringArray},
    datatypes::{DataType, Field, Float64Type, Int64Type, Schema, SchemaRef},
    error::ArrowError,
    record_batch::RecordBatch,
};
use parquet::{
    arrow::{ArrowWriter, arrow_reader::ParquetRecordBatchReaderBuilder},
    basic::Compression,
    file::properties::WriterProperties,
};

use crate::{
    error::{Error, Result},
    types::{CategorySummaryRow, TrackRecord},
};

/// Label used in summaries for rows without a category.
pub const NO_CATEGORY: &str = "(none)";

static SCHEMA: LazyLock<SchemaRef> = LazyLock::new(|| {
    let utf8 = |name: &str| Field::new(name, DataType::Utf8, false);
    let int = |name: &str| Field::new(name, DataType::Int64, false);
    let float = |name: &str| Field::new(name, DataType::Float64, false);

    Arc::new(Schema::new(vec![
        utf8("id"),
        utf8("title"),
        utf8("artists"),
        int("popularity"),
        float("danceability"),
        float("energy"),
        int("key"),
        float("loudness"),
        int("mode"),
        float("speechiness"),
        float("acousticness"),
        float("instrumentalness"),
        float("liveness"),
        float("valence"),
        float("tempo"),
        utf8("type"),
        utf8("uri"),
        utf8("track_href"),
        utf8("analysis_url"),
        int("duration_ms"),
        int("time_signature"),
        Field::new("category", DataType::Utf8, true),
        Field::new("playlist_id", DataType::Utf8, true),
        Field::new("listened", DataType::Boolean, false),
        Field::new("liked", DataType::Boolean, true),
    ]))
});

/// Ordered, append-only sequence of track records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    rows: Vec<TrackRecord>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// The column schema every dataset file is written with.
    pub fn schema() -> SchemaRef {
        Arc::clone(&SCHEMA)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[TrackRecord] {
        &self.rows
    }

    pub fn push(&mut self, record: TrackRecord) {
        self.rows.push(record);
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = TrackRecord>) {
        self.rows.extend(records);
    }

    pub fn into_rows(self) -> Vec<TrackRecord> {
        self.rows
    }

    /// Builds one Arrow record batch holding every row.
    pub fn to_record_batch(&self) -> std::result::Result<RecordBatch, ArrowError> {
        let rows = &self.rows;
        let text = |f: fn(&TrackRecord) -> &str| -> ArrayRef {
            Arc::new(StringArray::from_iter_values(rows.iter().map(f)))
        };
        let int = |f: fn(&TrackRecord) -> i64| -> ArrayRef {
            Arc::new(Int64Array::from_iter_values(rows.iter().map(f)))
        };
        let float = |f: fn(&TrackRecord) -> f64| -> ArrayRef {
            Arc::new(Float64Array::from_iter_values(rows.iter().map(f)))
        };

        let columns: Vec<ArrayRef> = vec![
            text(|r| r.id.as_str()),
            text(|r| r.title.as_str()),
            text(|r| r.artists.as_str()),
            int(|r| r.popularity),
            float(|r| r.danceability),
            float(|r| r.energy),
            int(|r| r.key),
            float(|r| r.loudness),
            int(|r| r.mode),
            float(|r| r.speechiness),
            float(|r| r.acousticness),
            float(|r| r.instrumentalness),
            float(|r| r.liveness),
            float(|r| r.valence),
            float(|r| r.tempo),
            text(|r| r.kind.as_str()),
            text(|r| r.uri.as_str()),
            text(|r| r.track_href.as_str()),
            text(|r| r.analysis_url.as_str()),
            int(|r| r.duration_ms),
            int(|r| r.time_signature),
            Arc::new(rows.iter().map(|r| r.category.as_deref()).collect::<StringArray>()),
            Arc::new(rows.iter().map(|r| r.playlist_id.as_deref()).collect::<StringArray>()),
            Arc::new(rows.iter().map(|r| Some(r.listened)).collect::<BooleanArray>()),
            Arc::new(rows.iter().map(|r| r.liked).collect::<BooleanArray>()),
        ];

        RecordBatch::try_new(Self::schema(), columns)
    }

    /// Writes the whole dataset to a Parquet file at `path`.
    ///
    /// The parent directory must already exist; the sink never creates
    /// directories.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`] if the parent directory is missing or any
    /// step of building or writing the file fails.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        ensure_parent_dir(path)?;

        let batch = self.to_record_batch().map_err(|e| Error::write(path, e))?;
        let file = File::create(path).map_err(|e| Error::write(path, e))?;
        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();

        let mut writer =
            ArrowWriter::try_new(file, batch.schema(), Some(props)).map_err(|e| Error::write(path, e))?;
        writer.write(&batch).map_err(|e| Error::write(path, e))?;
        writer.close().map_err(|e| Error::write(path, e))?;
        Ok(())
    }

    /// Reads a dataset file written by [`Dataset::write`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the file cannot be read or lacks one of
    /// the dataset columns.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let (_, batches) = read_record_batches(path)?;

        let mut dataset = Dataset::new();
        for batch in &batches {
            let records = records_from_batch(batch).map_err(|e| Error::parse(path, e))?;
            dataset.extend(records);
        }
        Ok(dataset)
    }

    /// Row and playlist counts per category, in first-seen category order.
    pub fn summary(&self) -> Vec<CategorySummaryRow> {
        let mut order: Vec<&str> = Vec::new();
        let mut playlists: HashSet<(&str, &str)> = HashSet::new();

        for row in &self.rows {
            let category = row.category.as_deref().unwrap_or(NO_CATEGORY);
            if !order.contains(&category) {
                order.push(category);
            }
            if let Some(playlist) = row.playlist_id.as_deref() {
                playlists.insert((category, playlist));
            }
        }

        order
            .into_iter()
            .map(|category| CategorySummaryRow {
                category: category.to_string(),
                playlists: playlists.iter().filter(|(c, _)| *c == category).count(),
                rows: self
                    .rows
                    .iter()
                    .filter(|r| r.category.as_deref().unwrap_or(NO_CATEGORY) == category)
                    .count(),
            })
            .collect()
    }
}

impl FromIterator<TrackRecord> for Dataset {
    fn from_iter<I: IntoIterator<Item = TrackRecord>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => Err(Error::write(
            path,
            format!("directory {} does not exist", parent.display()),
        )),
        _ => Ok(()),
    }
}

/// Reads every record batch of a Parquet file.
///
/// # Errors
///
/// Returns [`Error::Parse`] if the file cannot be opened or decoded.
pub fn read_record_batches(path: impl AsRef<Path>) -> Result<(SchemaRef, Vec<RecordBatch>)> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::parse(path, e))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| Error::parse(path, e))?;
    let schema = Arc::clone(builder.schema());
    let reader = builder.build().map_err(|e| Error::parse(path, e))?;

    let batches = reader
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::parse(path, e))?;
    Ok((schema, batches))
}

fn records_from_batch(batch: &RecordBatch) -> std::result::Result<Vec<TrackRecord>, String> {
    let column = |name: &str| {
        batch
            .column_by_name(name)
            .ok_or_else(|| format!("missing column {}", name))
    };
    let text = |name: &str| {
        column(name)?
            .as_string_opt::<i32>()
            .ok_or_else(|| format!("column {} is not utf8", name))
    };
    let int = |name: &str| {
        column(name)?
            .as_primitive_opt::<Int64Type>()
            .ok_or_else(|| format!("column {} is not int64", name))
    };
    let float = |name: &str| {
        column(name)?
            .as_primitive_opt::<Float64Type>()
            .ok_or_else(|| format!("column {} is not float64", name))
    };
    let boolean = |name: &str| {
        column(name)?
            .as_boolean_opt()
            .ok_or_else(|| format!("column {} is not boolean", name))
    };

    let (id, title, artists) = (text("id")?, text("title")?, text("artists")?);
    let (kind, uri, track_href, analysis_url) = (
        text("type")?,
        text("uri")?,
        text("track_href")?,
        text("analysis_url")?,
    );
    let (category, playlist_id) = (text("category")?, text("playlist_id")?);
    let (popularity, key, mode, duration_ms, time_signature) = (
        int("popularity")?,
        int("key")?,
        int("mode")?,
        int("duration_ms")?,
        int("time_signature")?,
    );
    let (danceability, energy, loudness, speechiness) = (
        float("danceability")?,
        float("energy")?,
        float("loudness")?,
        float("speechiness")?,
    );
    let (acousticness, instrumentalness, liveness, valence, tempo) = (
        float("acousticness")?,
        float("instrumentalness")?,
        float("liveness")?,
        float("valence")?,
        float("tempo")?,
    );
    let (listened, liked) = (boolean("listened")?, boolean("liked")?);

    let optional_text = |array: &StringArray, i: usize| {
        (!array.is_null(i)).then(|| array.value(i).to_string())
    };

    Ok((0..batch.num_rows())
        .map(|i| TrackRecord {
            id: id.value(i).to_string(),
            title: title.value(i).to_string(),
            artists: artists.value(i).to_string(),
            popularity: popularity.value(i),
            danceability: danceability.value(i),
            energy: energy.value(i),
            key: key.value(i),
            loudness: loudness.value(i),
            mode: mode.value(i),
            speechiness: speechiness.value(i),
            acousticness: acousticness.value(i),
            instrumentalness: instrumentalness.value(i),
            liveness: liveness.value(i),
            valence: valence.value(i),
            tempo: tempo.value(i),
            kind: kind.value(i).to_string(),
            uri: uri.value(i).to_string(),
            track_href: track_href.value(i).to_string(),
            analysis_url: analysis_url.value(i).to_string(),
            duration_ms: duration_ms.value(i),
            time_signature: time_signature.value(i),
            category: optional_text(category, i),
            playlist_id: optional_text(playlist_id, i),
            listened: listened.value(i),
            liked: (!liked.is_null(i)).then(|| liked.value(i)),
        })
        .collect())
}
