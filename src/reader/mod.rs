//! Tabular data sources for series
//!
//! A series names its table with `data`: a file path (dispatched on the
//! extension), or a loader mapping `{path, reader, options}`. Callers of the
//! library can also hand tables in directly at render time, as a single table
//! used by every series or as a name → table map keyed by `series.data`. Data
//! supplied at render time wins over the series' own source.
//!
//! # Example
//!
//! ```rust,ignore
//! use nicefigs::reader::{DataSource, ExternalData};
//!
//! let runs = df! { "latency_ms" => [12.0, 15.5, 9.1] }?;
//! let external = ExternalData::Single(DataSource::Frame(runs));
//! ```

pub mod polars_sql;

pub use polars_sql::filter_rows;

use crate::config::expand::resolve_path;
use crate::config::{DataRef, LoaderSpec, SeriesSpec};
use crate::{DataFrame, NicefigsError, Result};
use polars::prelude::*;
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Zero-argument table producer
pub type Producer = Arc<dyn Fn() -> Result<DataFrame> + Send + Sync>;

/// Where a table comes from
#[derive(Clone)]
pub enum DataSource {
    /// A file, dispatched on its extension
    Path(PathBuf),
    /// An already loaded table
    Frame(DataFrame),
    /// Called on every load
    Producer(Producer),
    Loader(LoaderSpec),
}

impl fmt::Debug for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Path(path) => f.debug_tuple("Path").field(path).finish(),
            DataSource::Frame(df) => f.debug_tuple("Frame").field(&df.shape()).finish(),
            DataSource::Producer(_) => f.write_str("Producer(..)"),
            DataSource::Loader(loader) => f.debug_tuple("Loader").field(loader).finish(),
        }
    }
}

impl From<DataFrame> for DataSource {
    fn from(df: DataFrame) -> Self {
        DataSource::Frame(df)
    }
}

impl From<PathBuf> for DataSource {
    fn from(path: PathBuf) -> Self {
        DataSource::Path(path)
    }
}

impl From<&DataRef> for DataSource {
    fn from(data: &DataRef) -> Self {
        match data {
            DataRef::Path(path) => DataSource::Path(PathBuf::from(path)),
            DataRef::Loader(loader) => DataSource::Loader(loader.clone()),
        }
    }
}

impl DataSource {
    pub fn producer<F>(produce: F) -> Self
    where
        F: Fn() -> Result<DataFrame> + Send + Sync + 'static,
    {
        DataSource::Producer(Arc::new(produce))
    }

    /// Load the table; relative paths resolve against `base_dir`
    pub fn load(&self, base_dir: Option<&Path>) -> Result<DataFrame> {
        match self {
            DataSource::Path(path) => {
                read_table(&resolve(path, base_dir)?, None, &Default::default())
            }
            DataSource::Frame(df) => Ok(df.clone()),
            DataSource::Producer(produce) => produce(),
            DataSource::Loader(loader) => {
                let path = resolve(Path::new(&loader.path), base_dir)?;
                read_table(&path, loader.reader.as_deref(), &loader.options)
            }
        }
    }
}

/// Tables supplied at render time
#[derive(Debug, Clone)]
pub enum ExternalData {
    /// Used by every series
    Single(DataSource),
    /// Keyed by each series' `data` value
    Named(HashMap<String, DataSource>),
}

/// The table for one series, or `None` when it has no source at all
pub fn series_table(
    series: &SeriesSpec,
    base_dir: Option<&Path>,
    external: Option<&ExternalData>,
) -> Result<Option<DataFrame>> {
    match external {
        Some(ExternalData::Single(source)) => return source.load(base_dir).map(Some),
        Some(ExternalData::Named(tables)) => {
            let named = series.data.as_ref().and_then(|data| tables.get(data.key()));
            if let Some(source) = named {
                return source.load(base_dir).map(Some);
            }
        }
        None => {}
    }

    series
        .data
        .as_ref()
        .map(|data| DataSource::from(data).load(base_dir))
        .transpose()
}

fn resolve(path: &Path, base_dir: Option<&Path>) -> Result<PathBuf> {
    let resolved = resolve_path(path, base_dir);
    if !resolved.exists() {
        return Err(NicefigsError::NotFound(format!(
            "Data file not found: {}",
            resolved.display()
        )));
    }
    Ok(resolved)
}

/// Table formats understood by [`read_table`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableFormat {
    Csv,
    Parquet,
    Json,
    NdJson,
}

impl TableFormat {
    fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "csv" | "tsv" | "txt" => Some(TableFormat::Csv),
            "parquet" | "pq" => Some(TableFormat::Parquet),
            "json" => Some(TableFormat::Json),
            "ndjson" | "jsonl" => Some(TableFormat::NdJson),
            _ => None,
        }
    }

    /// Extension dispatch; anything unknown is read as CSV
    fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_name)
            .unwrap_or(TableFormat::Csv)
    }
}

fn data_error(path: &Path, e: impl fmt::Display) -> NicefigsError {
    NicefigsError::Data(format!("Failed to read {}: {}", path.display(), e))
}

/// Read a table from `path`.
///
/// `reader` forces a format instead of the extension. CSV honours the
/// `separator` (single character) and `has_header` options.
pub fn read_table(
    path: &Path,
    reader: Option<&str>,
    options: &std::collections::BTreeMap<String, serde_json::Value>,
) -> Result<DataFrame> {
    let format = match reader {
        Some(name) => TableFormat::from_name(name).ok_or_else(|| {
            NicefigsError::Data(format!("Unknown table reader '{}'", name))
        })?,
        None => TableFormat::from_path(path),
    };
    tracing::debug!(path = %path.display(), ?format, "Loading table");

    match format {
        TableFormat::Csv => {
            let has_header = options
                .get("has_header")
                .and_then(|v| v.as_bool())
                .unwrap_or(true);
            let separator = match options.get("separator").and_then(|v| v.as_str()) {
                Some(sep) if sep.len() == 1 => sep.as_bytes()[0],
                Some(sep) => {
                    return Err(NicefigsError::Data(format!(
                        "CSV separator must be a single byte, got '{}'",
                        sep
                    )))
                }
                None if path.extension().is_some_and(|ext| ext == "tsv") => b'\t',
                None => b',',
            };
            CsvReadOptions::default()
                .with_has_header(has_header)
                .with_parse_options(CsvParseOptions::default().with_separator(separator))
                .try_into_reader_with_file_path(Some(path.to_path_buf()))
                .and_then(|reader| reader.finish())
                .map_err(|e| data_error(path, e))
        }
        TableFormat::Parquet => {
            let file = File::open(path)?;
            ParquetReader::new(file).finish().map_err(|e| data_error(path, e))
        }
        TableFormat::Json => {
            let file = File::open(path)?;
            JsonReader::new(file).finish().map_err(|e| data_error(path, e))
        }
        TableFormat::NdJson => {
            let file = File::open(path)?;
            JsonLineReader::new(file).finish().map_err(|e| data_error(path, e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SeriesKind;
    use std::fs;

    fn series(data: Option<DataRef>) -> SeriesSpec {
        let mut spec = SeriesSpec::new(SeriesKind::Line);
        spec.data = data;
        spec
    }

    #[test]
    fn test_csv_relative_to_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("runs.csv"), "x,y\n1,2\n3,4\n").unwrap();

        let spec = series(Some(DataRef::Path("runs.csv".to_string())));
        let df = series_table(&spec, Some(dir.path()), None).unwrap().unwrap();
        assert_eq!(df.shape(), (2, 2));
    }

    #[test]
    fn test_loader_options() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("runs.dat"), "1;2\n3;4\n5;6\n").unwrap();

        let mut options = std::collections::BTreeMap::new();
        options.insert("separator".to_string(), serde_json::json!(";"));
        options.insert("has_header".to_string(), serde_json::json!(false));
        let loader = LoaderSpec {
            path: "runs.dat".to_string(),
            reader: Some("csv".to_string()),
            options,
        };
        let df = DataSource::Loader(loader).load(Some(dir.path())).unwrap();
        assert_eq!(df.shape(), (3, 2));
    }

    #[test]
    fn test_ndjson_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.jsonl");
        fs::write(&path, "{\"x\": 1}\n{\"x\": 2}\n").unwrap();
        let df = DataSource::Path(path).load(None).unwrap();
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let spec = series(Some(DataRef::Path("nope.csv".to_string())));
        let err = series_table(&spec, Some(dir.path()), None).unwrap_err();
        assert!(matches!(err, NicefigsError::NotFound(_)));
    }

    #[test]
    fn test_no_source_is_none() {
        assert!(series_table(&series(None), None, None).unwrap().is_none());
    }

    #[test]
    fn test_external_single_wins() {
        let df = df! { "x" => [1.0] }.unwrap();
        let external = ExternalData::Single(DataSource::Frame(df));
        let spec = series(Some(DataRef::Path("missing.csv".to_string())));
        let table = series_table(&spec, None, Some(&external)).unwrap().unwrap();
        assert_eq!(table.height(), 1);
    }

    #[test]
    fn test_external_named_by_key() {
        let mut tables = HashMap::new();
        tables.insert(
            "runs".to_string(),
            DataSource::producer(|| Ok(df! { "x" => [1.0, 2.0] }.unwrap())),
        );
        let external = ExternalData::Named(tables);

        let spec = series(Some(DataRef::Path("runs".to_string())));
        let table = series_table(&spec, None, Some(&external)).unwrap().unwrap();
        assert_eq!(table.height(), 2);

        // Keys not in the map fall back to the series' own source
        let other = series(None);
        assert!(series_table(&other, None, Some(&external)).unwrap().is_none());
    }

    #[test]
    fn test_unknown_reader() {
        let loader = LoaderSpec {
            path: "x.csv".to_string(),
            reader: Some("xlsx".to_string()),
            options: Default::default(),
        };
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("x.csv"), "a\n1\n").unwrap();
        assert!(DataSource::Loader(loader).load(Some(dir.path())).is_err());
    }
}
