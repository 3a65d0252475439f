//! Python module. Loading spreadsheets and plotting stay on the Python side;
//! these functions take plain lists and dicts and return the same.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;

use crate::aggregate::{Aggregator, CountView, FrequencyTable, WordlistRow};
use crate::classify::{BucketTable, LengthBucket, SortMode};
use crate::config::TokenizerConfig;
use crate::distance::DistanceReport;
use crate::error::Error;
use crate::position::{self, DEFAULT_EXCLUDE};
use crate::tokenizer::Tokenizer;
use crate::{io, wordlist};

fn to_py_err(err: Error) -> PyErr {
    match err {
        Error::Io { .. } => PyIOError::new_err(err.to_string()),
        _ => PyValueError::new_err(err.to_string()),
    }
}

fn load_config(config: Option<&str>) -> PyResult<TokenizerConfig> {
    match config {
        Some(toml) => TokenizerConfig::parse(toml).map_err(to_py_err),
        None => Ok(TokenizerConfig::default()),
    }
}

fn parse_view(view: &str) -> PyResult<CountView> {
    view.parse().map_err(PyValueError::new_err)
}

fn to_table(counts: HashMap<String, f64>) -> FrequencyTable {
    counts.into_iter().collect()
}

/// Split one token into cells: grapheme units and annotation spans.
#[pyfunction]
#[pyo3(signature = (token, config=None))]
fn segment_token(token: &str, config: Option<&str>) -> PyResult<Vec<String>> {
    let tokenizer = Tokenizer::new(load_config(config)?);
    let segmentation = tokenizer.segment(token);
    Ok(segmentation.cells().into_iter().map(str::to_string).collect())
}

/// Count grapheme units over `(token, frequency)` rows.
/// Returns: dict[unit, total] with decorated variants merged
#[pyfunction]
#[pyo3(signature = (rows, view="all", config=None))]
fn count_graphemes(
    rows: Vec<(Option<String>, f64)>,
    view: &str,
    config: Option<&str>,
) -> PyResult<HashMap<String, f64>> {
    let aggregator = Aggregator::new(load_config(config)?, parse_view(view)?);
    let count = aggregator.count_par(&to_rows(rows));
    if !count.anomalies.is_empty() {
        eprintln!("count_graphemes: {}", count.anomalies.summary());
    }
    Ok(count.table.into_map().into_iter().collect())
}

/// Count grapheme units in a CSV/TSV wordlist with Token and Frequency columns.
#[pyfunction]
#[pyo3(signature = (file_path, view="all", config=None))]
fn count_graphemes_file(
    file_path: String,
    view: &str,
    config: Option<&str>,
) -> PyResult<HashMap<String, f64>> {
    let count = io::count_wordlist_file(
        Path::new(&file_path),
        &load_config(config)?,
        parse_view(view)?,
    )
    .map_err(to_py_err)?;
    Ok(count.table.into_map().into_iter().collect())
}

/// Partition counts into monographs..hexagraphs.
/// Returns: six lists of (unit, frequency), sorted by `sort`
#[pyfunction]
#[pyo3(signature = (counts, sort="frequency"))]
fn bucket_table(counts: HashMap<String, f64>, sort: &str) -> PyResult<Vec<Vec<(String, f64)>>> {
    let mode: SortMode = sort.parse().map_err(PyValueError::new_err)?;
    let buckets = BucketTable::from_table(&to_table(counts), mode);
    Ok(LengthBucket::ALL
        .iter()
        .map(|b| buckets.bucket(*b).to_vec())
        .collect())
}

/// One row of a distance report
#[pyclass(name = "DistanceRow")]
#[derive(Clone)]
struct PyDistanceRow {
    #[pyo3(get)]
    grapheme: String,
    #[pyo3(get)]
    frequencies: Vec<f64>,
    #[pyo3(get)]
    distance: f64,
}

fn report_to_py(report: DistanceReport) -> (Vec<PyDistanceRow>, f64, f64) {
    let rows = report
        .rows
        .into_iter()
        .map(|r| PyDistanceRow {
            grapheme: r.grapheme,
            frequencies: r.frequencies,
            distance: r.distance,
        })
        .collect();
    (rows, report.total, report.average)
}

/// Compare frequency tables in order.
/// Returns: (rows, total, average)
#[pyfunction]
fn distance_report(
    tables: Vec<(String, HashMap<String, f64>)>,
) -> PyResult<(Vec<PyDistanceRow>, f64, f64)> {
    let tables: Vec<(String, FrequencyTable)> = tables
        .into_iter()
        .map(|(name, counts)| (name, to_table(counts)))
        .collect();
    let named: Vec<(&str, &FrequencyTable)> =
        tables.iter().map(|(n, t)| (n.as_str(), t)).collect();
    Ok(report_to_py(DistanceReport::compute(&named)))
}

/// Compare `grapheme,frequency` CSV files, optionally writing the report.
#[pyfunction]
#[pyo3(signature = (file_paths, output_path=None))]
fn distance_report_files(
    file_paths: Vec<String>,
    output_path: Option<String>,
) -> PyResult<(Vec<PyDistanceRow>, f64, f64)> {
    let paths: Vec<PathBuf> = file_paths.iter().map(PathBuf::from).collect();
    let refs: Vec<&Path> = paths.iter().map(PathBuf::as_path).collect();
    let report = io::distance_report_files(&refs).map_err(to_py_err)?;
    if let Some(out) = output_path {
        io::write_distance_report(Path::new(&out), &report).map_err(to_py_err)?;
    }
    Ok(report_to_py(report))
}

fn to_rows(rows: Vec<(Option<String>, f64)>) -> Vec<WordlistRow> {
    rows.into_iter()
        .map(|(token, frequency)| WordlistRow { token, frequency })
        .collect()
}

fn exclude_list(exclude: Option<Vec<String>>) -> Vec<String> {
    exclude.unwrap_or_else(|| DEFAULT_EXCLUDE.iter().map(|e| e.to_string()).collect())
}

/// One row per segment of every token.
/// Returns: list of (sound_position, word, frequency) sorted by sound_position
#[pyfunction]
#[pyo3(signature = (rows, exclude=None, config=None))]
fn sound_positions(
    rows: Vec<(Option<String>, f64)>,
    exclude: Option<Vec<String>>,
    config: Option<&str>,
) -> PyResult<Vec<(String, String, f64)>> {
    let result =
        position::sound_positions(&to_rows(rows), &load_config(config)?, &exclude_list(exclude));
    if !result.anomalies.is_empty() {
        eprintln!("sound_positions: {}", result.anomalies.summary());
    }
    Ok(result
        .positions
        .into_iter()
        .map(|p| (p.sound_position, p.word, p.frequency))
        .collect())
}

/// Sound positions of a wordlist file, written as CSV.
/// Returns: number of rows written
#[pyfunction]
#[pyo3(signature = (input_path, output_path, exclude=None, config=None))]
fn sound_positions_file(
    input_path: String,
    output_path: String,
    exclude: Option<Vec<String>>,
    config: Option<&str>,
) -> PyResult<usize> {
    let result = io::sound_positions_file(
        Path::new(&input_path),
        Path::new(&output_path),
        &load_config(config)?,
        &exclude_list(exclude),
    )
    .map_err(to_py_err)?;
    Ok(result.positions.len())
}

/// Build a wordlist from running text.
/// Returns: list of (token, frequency)
#[pyfunction]
fn extract_wordlist(text: String) -> Vec<(String, u64)> {
    wordlist::extract_wordlist(&text)
}

/// Build a wordlist from a text file and write it as CSV.
/// Returns: number of distinct words
#[pyfunction]
fn extract_wordlist_file(input_path: String, output_path: String) -> PyResult<usize> {
    io::extract_wordlist_file(Path::new(&input_path), Path::new(&output_path)).map_err(to_py_err)
}

#[pymodule]
fn rust_grapheme_count(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(segment_token, m)?)?;
    m.add_function(wrap_pyfunction!(count_graphemes, m)?)?;
    m.add_function(wrap_pyfunction!(count_graphemes_file, m)?)?;
    m.add_function(wrap_pyfunction!(bucket_table, m)?)?;
    m.add_function(wrap_pyfunction!(distance_report, m)?)?;
    m.add_function(wrap_pyfunction!(distance_report_files, m)?)?;
    m.add_function(wrap_pyfunction!(sound_positions, m)?)?;
    m.add_function(wrap_pyfunction!(sound_positions_file, m)?)?;
    m.add_function(wrap_pyfunction!(extract_wordlist, m)?)?;
    m.add_function(wrap_pyfunction!(extract_wordlist_file, m)?)?;
    m.add_class::<PyDistanceRow>()?;
    Ok(())
}
