use std::fmt;
use std::io::Cursor;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, ArrowPrimitiveType, AsArray, PrimitiveArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type,
    UInt32Type, UInt64Type, UInt8Type,
};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use bytes::Bytes;
use calamine::{Data, Reader, Xlsx};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use super::delimiter::{Delimiter, detect_delimiter};
use super::example;
use super::model::{CellValue, Column, Dataset, DatasetError};

// ---------------------------------------------------------------------------
// Input sources and formats
// ---------------------------------------------------------------------------

/// Where a dataset comes from.
#[derive(Debug, Clone)]
pub enum InputSource {
    /// A file picked by the user: its name (for the extension) and raw bytes.
    Upload { name: String, bytes: Vec<u8> },
    /// Free text typed or pasted into the manual-data box.
    Pasted(String),
    /// The bundled tips dataset.
    Example,
}

/// Format declared by an upload's file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// `.csv`, `.tsv` and `.txt`; the delimiter is detected from the content.
    Delimited,
    Xlsx,
    Json,
    Parquet,
}

impl FileFormat {
    /// Extensions accepted by the file dialog.
    pub const EXTENSIONS: &'static [&'static str] = &["csv", "tsv", "txt", "xlsx", "json", "parquet"];

    /// Resolve the format from the text after the last `.` of a file name.
    pub fn from_file_name(name: &str) -> Result<Self, IngestError> {
        let ext = name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" | "tsv" | "txt" => Ok(FileFormat::Delimited),
            "xlsx" => Ok(FileFormat::Xlsx),
            "json" => Ok(FileFormat::Json),
            "parquet" => Ok(FileFormat::Parquet),
            _ => Err(IngestError::UnsupportedFormat { extension: ext }),
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFormat::Delimited => write!(f, "delimited text"),
            FileFormat::Xlsx => write!(f, "Excel workbook"),
            FileFormat::Json => write!(f, "JSON"),
            FileFormat::Parquet => write!(f, "Parquet"),
        }
    }
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unsupported file format '.{extension}'")]
    UnsupportedFormat { extension: String },
    #[error("no data to parse")]
    Empty,
    #[error("file is not valid UTF-8 text: {0}")]
    Decode(#[from] std::str::Utf8Error),
    #[error("could not parse {format}: {cause:#}")]
    Parse {
        format: FileFormat,
        cause: anyhow::Error,
    },
    #[error(transparent)]
    Invalid(#[from] DatasetError),
}

impl IngestError {
    fn parse(format: FileFormat) -> impl FnOnce(anyhow::Error) -> Self {
        move |cause| IngestError::Parse { format, cause }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Turn any input source into a dataset.
pub fn ingest(source: &InputSource) -> Result<Dataset, IngestError> {
    match source {
        InputSource::Upload { name, bytes } => load_bytes(name, bytes),
        InputSource::Pasted(text) => load_text(text),
        InputSource::Example => Ok(example::tips()),
    }
}

/// Load an uploaded file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.tsv` / `.txt` – delimited text, first row is the header
/// * `.xlsx`    – first worksheet, first row is the header
/// * `.json`    – records, columns, or value rows (see [`load_json`])
/// * `.parquet` – any flat schema
pub fn load_bytes(name: &str, bytes: &[u8]) -> Result<Dataset, IngestError> {
    let format = FileFormat::from_file_name(name)?;
    match format {
        FileFormat::Delimited => {
            let text = std::str::from_utf8(bytes)?;
            load_text(text.strip_prefix('\u{feff}').unwrap_or(text))
        }
        FileFormat::Xlsx => load_xlsx(bytes).map_err(IngestError::parse(format)),
        FileFormat::Json => load_json(bytes).map_err(IngestError::parse(format)),
        FileFormat::Parquet => load_parquet(bytes).map_err(IngestError::parse(format)),
    }
}

/// Load delimited text, detecting the delimiter from the content.
pub fn load_text(text: &str) -> Result<Dataset, IngestError> {
    if text.trim().is_empty() {
        return Err(IngestError::Empty);
    }
    let delimiter = detect_delimiter(text);
    log::debug!("Detected {delimiter} delimiter");
    parse_delimited(text, delimiter).map_err(IngestError::parse(FileFormat::Delimited))
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

/// Tokens read as missing values, like a dataframe reader's defaults.
const MISSING_TOKENS: &[&str] = &[
    "", "NA", "N/A", "NaN", "nan", "-NaN", "null", "NULL", "None", "#N/A", "<NA>",
];

fn is_missing(s: &str) -> bool {
    MISSING_TOKENS.contains(&s.trim())
}

/// Parse delimited text whose first record is the header row.
///
/// Rows shorter than the header are padded with nulls; longer rows are an
/// error, except for a leading index column detected on the first data row.
/// Each column is then typed as a whole (see [`infer_cells`]).
pub(crate) fn parse_delimited(text: &str, delimiter: Delimiter) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter.as_byte())
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let names = header_names(reader.headers().context("reading header row")?.iter());
    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); names.len()];
    let mut index_fields: Option<usize> = None;

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("reading row {}", row_no + 1))?;
        // A first data row one field wider than the header starts with an
        // unnamed index column, which is dropped from every row.
        let skip = *index_fields.get_or_insert(usize::from(record.len() == names.len() + 1));
        if record.len() > names.len() + skip {
            let line = record.position().map_or(row_no as u64 + 2, |p| p.line());
            bail!(
                "expected {} fields in line {line}, saw {}",
                names.len() + skip,
                record.len()
            );
        }
        for (idx, cells) in raw.iter_mut().enumerate() {
            cells.push(record.get(idx + skip).map(str::to_string));
        }
    }

    let columns = names
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| Column::new(name, infer_cells(&cells)))
        .collect();
    Ok(Dataset::new(columns)?)
}

/// Normalise header cells: blanks become `Unnamed: {i}` and repeated names
/// get `.1`, `.2`, ... suffixes.
fn header_names<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for (idx, header) in raw.enumerate() {
        let base = if header.trim().is_empty() {
            format!("Unnamed: {idx}")
        } else {
            header.to_string()
        };
        let mut name = base.clone();
        let mut suffix = 1;
        while names.contains(&name) {
            name = format!("{base}.{suffix}");
            suffix += 1;
        }
        names.push(name);
    }
    names
}

/// Type a column of text cells: integer, else float, else boolean, else text.
fn infer_cells(raw: &[Option<String>]) -> Vec<CellValue> {
    let cells: Vec<Option<&str>> = raw
        .iter()
        .map(|c| c.as_deref().filter(|s| !is_missing(s)))
        .collect();

    typed(&cells, |s| s.trim().parse().ok().map(CellValue::Integer))
        .or_else(|| typed(&cells, |s| s.trim().parse().ok().map(CellValue::Float)))
        .or_else(|| typed(&cells, parse_bool))
        .unwrap_or_else(|| {
            cells
                .iter()
                .map(|c| c.map_or(CellValue::Null, |s| CellValue::String(s.to_string())))
                .collect()
        })
}

/// Convert every cell with `parse`, or `None` if any present cell fails.
fn typed(cells: &[Option<&str>], parse: impl Fn(&str) -> Option<CellValue>) -> Option<Vec<CellValue>> {
    cells
        .iter()
        .map(|c| match c {
            Some(s) => parse(s),
            None => Some(CellValue::Null),
        })
        .collect()
}

fn parse_bool(s: &str) -> Option<CellValue> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" => Some(CellValue::Bool(true)),
        "false" => Some(CellValue::Bool(false)),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Excel loader
// ---------------------------------------------------------------------------

/// First worksheet of an `.xlsx` workbook; the first row names the columns.
fn load_xlsx(bytes: &[u8]) -> Result<Dataset> {
    let mut workbook: Xlsx<_> =
        calamine::open_workbook_from_rs(Cursor::new(bytes)).context("opening workbook")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("workbook has no worksheets")?
        .context("reading first worksheet")?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Dataset::default());
    };
    let header_text: Vec<String> = header.iter().map(|cell| cell.to_string()).collect();
    let names = header_names(header_text.iter().map(String::as_str));

    let mut values: Vec<Vec<CellValue>> = vec![Vec::new(); names.len()];
    for row in rows {
        for (idx, cells) in values.iter_mut().enumerate() {
            cells.push(row.get(idx).map_or(CellValue::Null, excel_cell));
        }
    }

    let columns = names
        .into_iter()
        .zip(values)
        .map(|(name, cells)| Column::new(name, cells))
        .collect();
    Ok(Dataset::new(columns)?)
}

fn excel_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Integer(*i),
        // Excel stores every number as a double; whole values read as integers.
        Data::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            CellValue::Integer(*f as i64)
        }
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) if is_missing(s) => CellValue::Null,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Empty | Data::Error(_) => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Accepted top-level shapes:
///
/// ```json
/// [{"a": 1, "b": "x"}, {"a": 2, "b": "y"}]     // records
/// {"a": [1, 2], "b": ["x", "y"]}               // columns
/// {"a": {"0": 1, "1": 2}, "b": {"0": "x"}}     // index-keyed columns
/// [[1, "x"], [2, "y"]]                         // value rows, columns "0", "1"
/// ```
fn load_json(bytes: &[u8]) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_slice(bytes).context("parsing JSON")?;

    match root {
        JsonValue::Array(items) => {
            if items.first().is_some_and(JsonValue::is_object) {
                json_records(&items)
            } else {
                json_value_rows(&items)
            }
        }
        JsonValue::Object(map) => json_columns(&map),
        other => bail!("Expected a top-level JSON array or object, got {other}"),
    }
}

fn json_records(items: &[JsonValue]) -> Result<Dataset> {
    let mut names: Vec<String> = Vec::new();
    for (i, rec) in items.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !names.contains(key) {
                names.push(key.clone());
            }
        }
    }

    let columns = names
        .into_iter()
        .map(|name| {
            let values = items
                .iter()
                .map(|rec| rec.get(&name).map_or(CellValue::Null, json_to_cell))
                .collect();
            Column::new(name, values)
        })
        .collect();
    Ok(Dataset::new(columns)?)
}

fn json_value_rows(items: &[JsonValue]) -> Result<Dataset> {
    let mut rows: Vec<&[JsonValue]> = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match item {
            JsonValue::Array(values) => rows.push(values),
            JsonValue::Object(_) => bail!("Row {i} is an object but earlier rows are not"),
            scalar => rows.push(std::slice::from_ref(scalar)),
        }
    }

    let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
    let columns = (0..width)
        .map(|idx| {
            let values = rows
                .iter()
                .map(|row| row.get(idx).map_or(CellValue::Null, json_to_cell))
                .collect();
            Column::new(idx.to_string(), values)
        })
        .collect();
    Ok(Dataset::new(columns)?)
}

fn json_columns(map: &Map<String, JsonValue>) -> Result<Dataset> {
    // Index-keyed columns are aligned on the union of their keys.
    let mut index: Vec<&str> = Vec::new();
    for (name, col) in map {
        match col {
            JsonValue::Array(_) => {}
            JsonValue::Object(entries) => {
                for key in entries.keys() {
                    if !index.contains(&key.as_str()) {
                        index.push(key);
                    }
                }
            }
            _ => bail!("Column '{name}' is neither an array nor an object"),
        }
    }

    let columns = map
        .iter()
        .map(|(name, col)| {
            let values = match col {
                JsonValue::Object(entries) => index
                    .iter()
                    .map(|key| entries.get(*key).map_or(CellValue::Null, json_to_cell))
                    .collect(),
                JsonValue::Array(values) => values.iter().map(json_to_cell).collect(),
                _ => Vec::new(),
            };
            Column::new(name.clone(), values)
        })
        .collect();
    Dataset::new(columns).context("columns have different lengths")
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet file, one dataset column per top-level field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). Pandas index columns
/// (`__index_level_N__`) are not data and are skipped.
fn load_parquet(bytes: &[u8]) -> Result<Dataset> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(Bytes::copy_from_slice(bytes))
        .context("reading parquet metadata")?;
    let schema = builder.schema().clone();
    let reader = builder.build().context("building parquet reader")?;

    let fields: Vec<(usize, String)> = schema
        .fields()
        .iter()
        .enumerate()
        .filter(|(_, f)| !f.name().starts_with("__index_level_"))
        .map(|(i, f)| (i, f.name().clone()))
        .collect();
    let mut values: Vec<Vec<CellValue>> = vec![Vec::new(); fields.len()];

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for ((col_idx, name), cells) in fields.iter().zip(values.iter_mut()) {
            let array = batch.column(*col_idx);
            cells.extend(arrow_cells(array).with_context(|| format!("reading column '{name}'"))?);
        }
    }

    let columns = fields
        .into_iter()
        .zip(values)
        .map(|((_, name), cells)| Column::new(name, cells))
        .collect();
    Ok(Dataset::new(columns)?)
}

// -- Arrow helpers --

/// Convert a whole Arrow column to cells. Types without a direct mapping
/// (dates, timestamps, dictionaries, nested lists) are rendered as text.
fn arrow_cells(col: &ArrayRef) -> Result<Vec<CellValue>> {
    let cells = match col.data_type() {
        DataType::Boolean => col
            .as_boolean()
            .iter()
            .map(|v| v.map_or(CellValue::Null, CellValue::Bool))
            .collect(),
        DataType::Int8 => integers(col.as_primitive::<Int8Type>()),
        DataType::Int16 => integers(col.as_primitive::<Int16Type>()),
        DataType::Int32 => integers(col.as_primitive::<Int32Type>()),
        DataType::Int64 => integers(col.as_primitive::<Int64Type>()),
        DataType::UInt8 => integers(col.as_primitive::<UInt8Type>()),
        DataType::UInt16 => integers(col.as_primitive::<UInt16Type>()),
        DataType::UInt32 => integers(col.as_primitive::<UInt32Type>()),
        DataType::UInt64 => col
            .as_primitive::<UInt64Type>()
            .iter()
            .map(|v| match v {
                Some(u) => i64::try_from(u).map_or(CellValue::Float(u as f64), CellValue::Integer),
                None => CellValue::Null,
            })
            .collect(),
        DataType::Float32 => floats(col.as_primitive::<Float32Type>()),
        DataType::Float64 => floats(col.as_primitive::<Float64Type>()),
        DataType::Utf8 => col
            .as_string::<i32>()
            .iter()
            .map(|v| v.map_or(CellValue::Null, |s| CellValue::String(s.to_string())))
            .collect(),
        DataType::LargeUtf8 => col
            .as_string::<i64>()
            .iter()
            .map(|v| v.map_or(CellValue::Null, |s| CellValue::String(s.to_string())))
            .collect(),
        other => {
            let options = FormatOptions::default();
            let formatter = ArrayFormatter::try_new(col.as_ref(), &options)
                .with_context(|| format!("cannot display values of type {other:?}"))?;
            (0..col.len())
                .map(|row| {
                    if col.is_null(row) {
                        CellValue::Null
                    } else {
                        CellValue::String(formatter.value(row).to_string())
                    }
                })
                .collect()
        }
    };
    Ok(cells)
}

fn integers<T>(arr: &PrimitiveArray<T>) -> Vec<CellValue>
where
    T: ArrowPrimitiveType,
    T::Native: Into<i64>,
{
    arr.iter()
        .map(|v| v.map_or(CellValue::Null, |n| CellValue::Integer(n.into())))
        .collect()
}

fn floats<T>(arr: &PrimitiveArray<T>) -> Vec<CellValue>
where
    T: ArrowPrimitiveType,
    T::Native: Into<f64>,
{
    arr.iter()
        .map(|v| v.map_or(CellValue::Null, |n| CellValue::Float(n.into())))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;
    use crate::data::model::ColumnKind;

    fn upload(name: &str, bytes: &[u8]) -> Result<Dataset, IngestError> {
        ingest(&InputSource::Upload {
            name: name.to_string(),
            bytes: bytes.to_vec(),
        })
    }

    #[test]
    fn comma_text_with_header_and_two_rows() {
        let ds = load_text("a,b,c\n1,2,3\n4,5,6\n").unwrap();
        assert_eq!(ds.width(), 3);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.column_names(), vec!["a", "b", "c"]);
        assert_eq!(
            ds.column("b").unwrap().values,
            vec![CellValue::Integer(2), CellValue::Integer(5)]
        );
    }

    #[test]
    fn tab_and_space_separated_text() {
        let tsv = load_text("x\ty\n1.5\tfoo\n2.5\tbar\n").unwrap();
        assert_eq!(tsv.column_names(), vec!["x", "y"]);
        assert_eq!(tsv.column("x").unwrap().kind, ColumnKind::Numeric);
        assert_eq!(tsv.column("y").unwrap().kind, ColumnKind::Categorical);

        let ssv = load_text("x y\n1 2\n3 4\n").unwrap();
        assert_eq!(ssv.width(), 2);
        assert_eq!(ssv.len(), 2);
    }

    #[test]
    fn empty_or_whitespace_text_is_rejected() {
        assert!(matches!(load_text(""), Err(IngestError::Empty)));
        assert!(matches!(load_text("  \n\t \n"), Err(IngestError::Empty)));
    }

    #[test]
    fn column_types_are_inferred_per_column() {
        let ds = load_text("i,f,b,s,m\n1,1.5,true,x,NA\n2,2,False,3,\n").unwrap();
        assert_eq!(ds.column("i").unwrap().values, vec![CellValue::Integer(1), CellValue::Integer(2)]);
        assert_eq!(ds.column("f").unwrap().values, vec![CellValue::Float(1.5), CellValue::Float(2.0)]);
        assert_eq!(ds.column("b").unwrap().values, vec![CellValue::Bool(true), CellValue::Bool(false)]);
        assert_eq!(
            ds.column("s").unwrap().values,
            vec![CellValue::String("x".into()), CellValue::String("3".into())]
        );
        assert_eq!(ds.column("m").unwrap().values, vec![CellValue::Null, CellValue::Null]);
        assert!(ds.column("m").unwrap().is_numeric());
    }

    #[test]
    fn short_rows_are_padded_and_long_rows_fail() {
        let ds = load_text("a,b,c\n1,2\n").unwrap();
        assert_eq!(ds.column("c").unwrap().values, vec![CellValue::Null]);

        let err = load_text("a,b\n1,2\n1,2,3\n").unwrap_err();
        assert!(matches!(err, IngestError::Parse { format: FileFormat::Delimited, .. }));
        assert!(err.to_string().contains("expected 2 fields in line 3, saw 3"), "{err}");
    }

    #[test]
    fn extra_leading_field_is_an_index_column() {
        let ds = load_text("a,b\nx,1,2\ny,3,4\n").unwrap();
        assert_eq!(ds.column_names(), vec!["a", "b"]);
        assert_eq!(ds.column("a").unwrap().values, vec![CellValue::Integer(1), CellValue::Integer(3)]);

        let err = load_text("a,b\nx,1,2\ny,3,4,5\n").unwrap_err();
        assert!(err.to_string().contains("expected 3 fields in line 3, saw 4"), "{err}");
    }

    #[test]
    fn trailing_space_on_first_row_shifts_into_index() {
        let ds = load_text("a b c\n1 2 3 \n4 5 6 \n").unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.column("a").unwrap().values, vec![CellValue::Integer(2), CellValue::Integer(5)]);
        assert_eq!(ds.column("c").unwrap().values, vec![CellValue::Null, CellValue::Null]);
    }

    #[test]
    fn header_names_are_made_unique() {
        let ds = load_text("a,a,,a\n1,2,3,4\n").unwrap();
        assert_eq!(ds.column_names(), vec!["a", "a.1", "Unnamed: 2", "a.2"]);
    }

    #[test]
    fn header_only_text_has_no_rows() {
        let ds = load_text("a,b\n").unwrap();
        assert_eq!(ds.width(), 2);
        assert!(ds.is_empty());
    }

    #[test]
    fn uploads_dispatch_by_extension() {
        let ds = upload("DATA.CSV", b"a,b\n1,2\n").unwrap();
        assert_eq!(ds.len(), 1);
        let ds = upload("data.tsv", b"a\tb\n1\t2\n").unwrap();
        assert_eq!(ds.width(), 2);
        let ds = upload("notes.txt", "\u{feff}a b\n1 2\n".as_bytes()).unwrap();
        assert_eq!(ds.column_names(), vec!["a", "b"]);
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = upload("picture.bmp", b"BM....").unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedFormat { ref extension } if extension == "bmp"));
        assert!(matches!(upload("README", b"a,b"), Err(IngestError::UnsupportedFormat { .. })));
    }

    #[test]
    fn invalid_utf8_is_a_decode_error() {
        assert!(matches!(upload("bad.csv", &[0x61, 0xff, 0xfe]), Err(IngestError::Decode(_))));
    }

    #[test]
    fn json_records_keep_key_order() {
        let ds = upload("r.json", br#"[{"z": 1, "a": "x"}, {"z": 2.5, "b": true}]"#).unwrap();
        assert_eq!(ds.column_names(), vec!["z", "a", "b"]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.column("a").unwrap().values[1], CellValue::Null);
        assert!(ds.column("z").unwrap().is_numeric());
    }

    #[test]
    fn json_column_shapes() {
        let ds = upload("c.json", br#"{"a": [1, 2, 3], "b": ["x", "y", "z"]}"#).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.column_names(), vec!["a", "b"]);

        let ds = upload("i.json", br#"{"a": {"0": 1, "1": 2}, "b": {"1": "y"}}"#).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(
            ds.column("b").unwrap().values,
            vec![CellValue::Null, CellValue::String("y".into())]
        );

        let ds = upload("v.json", b"[[1, \"x\"], [2]]").unwrap();
        assert_eq!(ds.column_names(), vec!["0", "1"]);
        assert_eq!(ds.column("1").unwrap().values[1], CellValue::Null);
    }

    #[test]
    fn malformed_json_fails_with_context() {
        let err = upload("bad.json", b"{not json").unwrap_err();
        assert!(matches!(err, IngestError::Parse { format: FileFormat::Json, .. }));
        assert!(err.to_string().contains("parsing JSON"), "{err}");

        assert!(upload("scalar.json", b"42").is_err());
        assert!(upload("ragged.json", br#"{"a": [1, 2], "b": [1]}"#).is_err());
    }

    #[test]
    fn parquet_columns_round_trip() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("total", DataType::Float64, false),
            Field::new("size", DataType::Int64, true),
            Field::new("day", DataType::Utf8, false),
            Field::new("__index_level_0__", DataType::Int64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Float64Array::from(vec![10.5, 20.25])),
                Arc::new(Int64Array::from(vec![Some(2), None])),
                Arc::new(StringArray::from(vec!["Sun", "Sat"])),
                Arc::new(Int64Array::from(vec![0, 1])),
            ],
        )
        .unwrap();

        let mut buf = Vec::new();
        let mut writer = ArrowWriter::try_new(&mut buf, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = upload("t.parquet", &buf).unwrap();
        assert_eq!(ds.column_names(), vec!["total", "size", "day"]);
        assert_eq!(ds.column("size").unwrap().values, vec![CellValue::Integer(2), CellValue::Null]);
        assert_eq!(ds.column("day").unwrap().kind, ColumnKind::Categorical);
        assert_eq!(ds.numeric_column_names(), vec!["total", "size"]);
    }

    #[test]
    fn corrupt_binary_formats_fail() {
        let err = upload("x.parquet", b"definitely not parquet").unwrap_err();
        assert!(matches!(err, IngestError::Parse { format: FileFormat::Parquet, .. }));

        let err = upload("x.xlsx", b"PK but not a workbook").unwrap_err();
        assert!(matches!(err, IngestError::Parse { format: FileFormat::Xlsx, .. }));
    }

    #[test]
    fn xlsx_reads_first_worksheet() {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "day").unwrap();
        sheet.write_string(0, 1, "tip").unwrap();
        sheet.write_string(1, 0, "Sun").unwrap();
        sheet.write_number(1, 1, 1.5).unwrap();
        sheet.write_string(2, 0, "Sat").unwrap();
        sheet.write_number(2, 1, 3.0).unwrap();
        let other = workbook.add_worksheet();
        other.write_string(0, 0, "ignored").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let ds = upload("tips.XLSX", &bytes).unwrap();
        assert_eq!(ds.column_names(), vec!["day", "tip"]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.column("day").unwrap().kind, ColumnKind::Categorical);
        assert_eq!(
            ds.column("tip").unwrap().values,
            vec![CellValue::Float(1.5), CellValue::Integer(3)]
        );
        assert!(ds.column("tip").unwrap().is_numeric());
    }

    #[test]
    fn excel_cells_convert() {
        assert_eq!(excel_cell(&Data::Float(3.0)), CellValue::Integer(3));
        assert_eq!(excel_cell(&Data::Float(3.25)), CellValue::Float(3.25));
        assert_eq!(excel_cell(&Data::String("N/A".into())), CellValue::Null);
        assert_eq!(excel_cell(&Data::Empty), CellValue::Null);
        assert_eq!(excel_cell(&Data::Bool(true)), CellValue::Bool(true));
    }

    #[test]
    fn example_source_loads() {
        let ds = ingest(&InputSource::Example).unwrap();
        assert!(!ds.is_empty());
    }
}
