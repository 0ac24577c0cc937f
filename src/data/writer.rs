use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use super::model::Dataset;

// ---------------------------------------------------------------------------
// Output formats
// ---------------------------------------------------------------------------

/// File format of one output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Json,
    Arff,
    Parquet,
}

impl Format {
    /// Pick the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Ok(Format::Csv),
            "json" => Ok(Format::Json),
            "arff" => Ok(Format::Arff),
            "parquet" | "pq" => Ok(Format::Parquet),
            other => bail!("Unsupported output extension: .{other}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Write a dataset to a file, dispatching by extension
/// (`.csv`, `.json`, `.arff`, `.parquet`).
pub fn write_file(dataset: &Dataset, path: &Path) -> Result<()> {
    write_as(dataset, Format::from_path(path)?, path)
}

/// Write a dataset in `format`, whatever the file is called.
///
/// Columns are the union of every row's columns, sorted by name. The ARFF
/// relation is named after the file stem.
pub fn write_as(dataset: &Dataset, format: Format, path: &Path) -> Result<()> {
    let columns = dataset.column_names();
    let out = create(path)?;
    let written = match format {
        Format::Csv => write_csv(dataset, &columns, out),
        Format::Json => write_json(dataset, out),
        Format::Arff => {
            let relation = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("merged");
            write_arff(dataset, &columns, relation, out)
        }
        Format::Parquet => write_parquet(dataset, &columns, out),
    };
    written.with_context(|| format!("writing {}", path.display()))?;

    log::info!("wrote {} rows to {}", dataset.len(), path.display());
    Ok(())
}

/// One file to produce: what, in which format, where.
#[derive(Debug, Clone, Copy)]
pub struct Output<'a> {
    pub dataset: &'a Dataset,
    pub format: Format,
    pub path: &'a Path,
}

/// Write every output or none of them.
///
/// Each output goes to a `.partial` sibling first; the final names only
/// appear once all writes succeeded. On failure the partial files are
/// removed and no final file is touched.
pub fn write_all(outputs: &[Output<'_>]) -> Result<()> {
    let mut staged: Vec<(PathBuf, &Path)> = Vec::with_capacity(outputs.len());

    for output in outputs {
        let partial = partial_path(output.path);
        if let Err(e) = write_as(output.dataset, output.format, &partial) {
            std::fs::remove_file(&partial).ok();
            discard(&staged);
            return Err(e);
        }
        staged.push((partial, output.path));
    }

    for (i, (partial, target)) in staged.iter().enumerate() {
        if let Err(e) = std::fs::rename(partial, target) {
            discard(&staged[i..]);
            return Err(e).with_context(|| format!("moving output into {}", target.display()));
        }
    }
    Ok(())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}

fn discard(staged: &[(PathBuf, &Path)]) {
    for (partial, _) in staged {
        std::fs::remove_file(partial).ok();
    }
}

fn create(path: &Path) -> Result<std::io::BufWriter<std::fs::File>> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    Ok(std::io::BufWriter::new(file))
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Header row is `columns`; cells a row lacks are written as `""`.
pub fn write_csv<W: Write>(dataset: &Dataset, columns: &[String], out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(columns).context("writing CSV header")?;
    for (row_no, row) in dataset.iter().enumerate() {
        writer
            .write_record(columns.iter().map(|c| row.get(c).unwrap_or("")))
            .with_context(|| format!("writing CSV row {row_no}"))?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Records-oriented array; each object holds exactly the row's own fields.
pub fn write_json<W: Write>(dataset: &Dataset, mut out: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, dataset).context("serialising JSON")?;
    out.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// ARFF
// ---------------------------------------------------------------------------

/// Weka ARFF.
///
/// A column is `numeric` when every non-missing value parses as a float,
/// otherwise nominal over its distinct values. Missing cells are `?`.
pub fn write_arff<W: Write>(dataset: &Dataset, columns: &[String], relation: &str, mut out: W) -> Result<()> {
    writeln!(out, "@relation {}\n", attribute_name(relation))?;

    let mut numeric = Vec::with_capacity(columns.len());
    for col in columns {
        let values: BTreeSet<&str> = dataset
            .iter()
            .filter_map(|row| row.get(col))
            .filter(|v| !v.is_empty())
            .collect();
        let is_numeric = values.iter().all(|v| v.trim().parse::<f64>().is_ok());
        numeric.push(is_numeric);

        if is_numeric {
            writeln!(out, "@attribute {} numeric", attribute_name(col))?;
        } else {
            let nominal: Vec<String> = values.iter().map(|v| quote(v)).collect();
            writeln!(out, "@attribute {} {{{}}}", attribute_name(col), nominal.join(","))?;
        }
    }

    writeln!(out, "\n@data")?;
    for row in dataset {
        let cells: Vec<String> = columns
            .iter()
            .zip(&numeric)
            .map(|(col, &is_numeric)| match row.get(col) {
                None | Some("") => "?".to_string(),
                Some(v) if is_numeric => v.trim().to_string(),
                Some(v) => quote(v),
            })
            .collect();
        writeln!(out, "{}", cells.join(","))?;
    }
    out.flush()?;
    Ok(())
}

fn attribute_name(name: &str) -> String {
    name.replace(' ', "_")
}

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

/// Every column is written as nullable UTF-8; missing cells become nulls.
pub fn write_parquet<W: Write + Send>(dataset: &Dataset, columns: &[String], out: W) -> Result<()> {
    let schema = Arc::new(Schema::new(
        columns
            .iter()
            .map(|c| Field::new(c, DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ));

    let arrays: Vec<ArrayRef> = columns
        .iter()
        .map(|col| {
            let values: StringArray = dataset
                .iter()
                .map(|row| row.get(col).filter(|v| !v.is_empty()))
                .collect();
            Arc::new(values) as ArrayRef
        })
        .collect();

    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;
    let mut writer = ArrowWriter::try_new(out, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}
