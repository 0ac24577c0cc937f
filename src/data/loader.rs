use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::Array;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Dataset, Row};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a tabular dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row followed by records; empty cells stay `""`
/// * `.json`    – `[{ "Country": "X", "Year": 2000, ... }, ...]`
/// * `.parquet` – any flat schema; every column is rendered as text
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening CSV {}", path.display()))?;
            load_csv(file)
        }
        "json" => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening JSON {}", path.display()))?;
            load_json(file)
        }
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }?;

    log::info!("loaded {} rows from {}", dataset.len(), path.display());
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per line.
/// Short records are padded with `""` for the trailing columns.
pub fn load_csv<R: Read>(input: R) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut dataset = Dataset::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() > headers.len() {
            bail!(
                "CSV row {row_no}: {} fields but only {} headers",
                record.len(),
                headers.len()
            );
        }
        let row: Row = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.as_str(), record.get(i).unwrap_or("")))
            .collect();
        dataset.push(row);
    }

    Ok(dataset)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented):
///
/// ```json
/// [
///   { "Country": "X", "Year": 2000, "Pop": "10" },
///   { "Country": "Y", "Year": 2001, "Pop": null }
/// ]
/// ```
///
/// Numbers and booleans are kept as their textual form, `null` becomes `""`.
pub fn load_json<R: Read>(input: R) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_reader(input).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut dataset = Dataset::new();

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let row: Row = obj
            .iter()
            .map(|(key, val)| (key.clone(), json_to_text(val)))
            .collect();
        dataset.push(row);
    }

    Ok(dataset)
}

fn json_to_text(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file, rendering every cell with Arrow's display
/// formatter. Null cells become `""`.
pub fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let options = FormatOptions::default();
    let mut dataset = Dataset::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let formatters = batch
            .columns()
            .iter()
            .map(|col| ArrayFormatter::try_new(col.as_ref(), &options))
            .collect::<Result<Vec<_>, _>>()
            .context("preparing column formatters")?;

        for row in 0..batch.num_rows() {
            let mut out = Row::new();
            for (idx, field) in schema.fields().iter().enumerate() {
                let value = if batch.column(idx).is_null(row) {
                    String::new()
                } else {
                    formatters[idx].value(row).to_string()
                };
                out.insert(field.name().clone(), value);
            }
            dataset.push(out);
        }
    }

    Ok(dataset)
}
