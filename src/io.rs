//! CSV loading and export.
//!
//! The spreadsheet side of the pipeline exchanges plain CSV (or TSV, chosen by
//! file extension). Readers are lenient about column order and header case;
//! writers create missing parent directories.

use std::fs::{self, File};
use std::path::Path;

use crate::aggregate::{Aggregator, CountView, FrequencyTable, WordlistCount, WordlistRow};
use crate::classify::{BucketTable, LengthBucket, SortMode};
use crate::config::TokenizerConfig;
use crate::distance::DistanceReport;
use crate::error::{Error, Result};
use crate::position::{self, SoundPosition, SoundPositions};
use crate::tokenizer::Tokenizer;
use crate::wordlist;

fn delimiter_for(path: &Path) -> u8 {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
        _ => b',',
    }
}

fn open_reader(path: &Path) -> Result<csv::Reader<File>> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    Ok(csv::ReaderBuilder::new()
        .delimiter(delimiter_for(path))
        .flexible(true)
        .from_reader(file))
}

fn create_writer(path: &Path) -> Result<csv::Writer<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    Ok(csv::WriterBuilder::new()
        .delimiter(delimiter_for(path))
        .flexible(true)
        .from_writer(file))
}

fn column(headers: &csv::StringRecord, name: &str, path: &Path) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| Error::MissingColumn {
            path: path.to_path_buf(),
            column: name.to_string(),
        })
}

/// Frequencies arrive as integers or as floats (`5.0`) from spreadsheet
/// exports. Unparseable cells become NaN and are reported by the aggregator.
pub fn parse_frequency(cell: &str) -> f64 {
    cell.trim().parse::<f64>().unwrap_or(f64::NAN)
}

fn format_number(value: f64) -> String {
    format!("{value}")
}

/// Read the `Token` and `Frequency` columns of a wordlist.
pub fn read_wordlist(path: &Path) -> Result<Vec<WordlistRow>> {
    let mut reader = open_reader(path)?;
    let headers = reader.headers()?.clone();
    let token_col = column(&headers, "token", path)?;
    let freq_col = column(&headers, "frequency", path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let token = record
            .get(token_col)
            .map(str::to_string)
            .filter(|t| !t.trim().is_empty());
        let frequency = parse_frequency(record.get(freq_col).unwrap_or(""));
        rows.push(WordlistRow { token, frequency });
    }

    eprintln!("Loaded wordlist {}: {} rows", path.display(), rows.len());
    Ok(rows)
}

/// Load and count a wordlist file.
pub fn count_wordlist_file(
    path: &Path,
    config: &TokenizerConfig,
    view: CountView,
) -> Result<WordlistCount> {
    let rows = read_wordlist(path)?;
    let count = Aggregator::new(config.clone(), view).count_par(&rows);
    eprintln!(
        "Counted {} rows, skipped {} ({})",
        count.counted,
        count.skipped,
        count.anomalies.summary()
    );
    Ok(count)
}

/// Write `Token, Frequency, Label, Translation`; the last two are left empty
/// for annotators.
pub fn write_wordlist(path: &Path, wordlist: &[(String, u64)]) -> Result<()> {
    let mut writer = create_writer(path)?;
    writer.write_record(["Token", "Frequency", "Label", "Translation"])?;
    for (token, frequency) in wordlist {
        let frequency = frequency.to_string();
        writer.write_record([token.as_str(), frequency.as_str(), "", ""])?;
    }
    writer.flush().map_err(|e| Error::io(path, e))?;
    Ok(())
}

/// Extract a wordlist from a text file and write it as CSV.
/// Returns the number of distinct words.
pub fn extract_wordlist_file(input: &Path, output: &Path) -> Result<usize> {
    let content = fs::read_to_string(input).map_err(|e| Error::io(input, e))?;
    let wordlist = wordlist::extract_wordlist(&content);
    write_wordlist(output, &wordlist)?;
    eprintln!(
        "Wordlist for {} saved to {} ({} words)",
        input.display(),
        output.display(),
        wordlist.len()
    );
    Ok(wordlist.len())
}

/// Read a two-column `grapheme,frequency` table. Rows with an empty grapheme
/// or unparseable frequency are ignored.
pub fn read_frequency_table(path: &Path) -> Result<FrequencyTable> {
    let mut reader = open_reader(path)?;
    let mut table = FrequencyTable::new();
    for record in reader.records() {
        let record = record?;
        let (Some(unit), Some(cell)) = (record.get(0), record.get(1)) else {
            continue;
        };
        let frequency = parse_frequency(cell);
        if unit.trim().is_empty() || !frequency.is_finite() {
            continue;
        }
        table.add(unit.trim(), frequency);
    }
    Ok(table)
}

pub fn write_frequency_table(path: &Path, table: &FrequencyTable, mode: SortMode) -> Result<()> {
    let mut writer = create_writer(path)?;
    writer.write_record(["grapheme", "frequency"])?;
    for (unit, frequency) in table.sorted(mode) {
        let frequency = format_number(frequency);
        writer.write_record([unit.as_str(), frequency.as_str()])?;
    }
    writer.flush().map_err(|e| Error::io(path, e))?;
    Ok(())
}

/// Monographs to hexagraphs side by side, shorter columns padded with
/// empty cells.
pub fn write_bucket_table(path: &Path, buckets: &BucketTable) -> Result<()> {
    let mut writer = create_writer(path)?;
    let mut header = Vec::with_capacity(12);
    for bucket in LengthBucket::ALL {
        header.push(bucket.label().to_string());
        header.push(format!("{}_freq", bucket.label()));
    }
    writer.write_record(&header)?;

    for row in buckets.padded_rows() {
        let mut record = Vec::with_capacity(12);
        for cell in row {
            match cell {
                Some((unit, frequency)) => {
                    record.push(unit.to_string());
                    record.push(format_number(frequency));
                }
                None => {
                    record.push(String::new());
                    record.push(String::new());
                }
            }
        }
        writer.write_record(&record)?;
    }
    writer.flush().map_err(|e| Error::io(path, e))?;

    if !buckets.unclassified().is_empty() {
        eprintln!(
            "{} units longer than six letters left out of {}",
            buckets.unclassified().len(),
            path.display()
        );
    }
    Ok(())
}

/// `graphemes, <wordlists...>, distance`, then `Total` and `Average` rows.
pub fn write_distance_report(path: &Path, report: &DistanceReport) -> Result<()> {
    let mut writer = create_writer(path)?;
    let mut header = vec!["graphemes".to_string()];
    header.extend(report.names.iter().cloned());
    header.push("distance".to_string());
    writer.write_record(&header)?;

    for row in &report.rows {
        let mut record = vec![row.grapheme.clone()];
        record.extend(row.frequencies.iter().map(|f| format_number(*f)));
        record.push(format_number(row.distance));
        writer.write_record(&record)?;
    }
    for (label, value) in [("Total", report.total), ("Average", report.average)] {
        let mut record = vec![label.to_string()];
        record.extend(report.names.iter().map(|_| String::new()));
        record.push(format_number(value));
        writer.write_record(&record)?;
    }
    writer.flush().map_err(|e| Error::io(path, e))?;
    Ok(())
}

/// Compare the frequency tables stored at `paths`, named by file stem.
pub fn distance_report_files(paths: &[&Path]) -> Result<DistanceReport> {
    let mut tables = Vec::with_capacity(paths.len());
    for path in paths {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        tables.push((name, read_frequency_table(path)?));
    }
    let named: Vec<(&str, &FrequencyTable)> =
        tables.iter().map(|(n, t)| (n.as_str(), t)).collect();
    Ok(DistanceReport::compute(&named))
}

/// One row per token: the token, its frequency, then one cell per segment.
pub fn write_segmentation(
    path: &Path,
    rows: &[WordlistRow],
    tokenizer: &Tokenizer,
) -> Result<()> {
    let segmented: Vec<(&WordlistRow, Vec<String>)> = rows
        .iter()
        .filter_map(|row| {
            let token = row.token.as_deref()?;
            let segmentation = tokenizer.segment(token);
            let cells = segmentation.cells().into_iter().map(str::to_string).collect();
            Some((row, cells))
        })
        .collect();
    let width = segmented.iter().map(|(_, c)| c.len()).max().unwrap_or(0);

    let mut writer = create_writer(path)?;
    let mut header = vec!["Token".to_string(), "Frequency".to_string()];
    header.extend((0..width).map(|i| format!("Token_{i}")));
    writer.write_record(&header)?;

    for (row, cells) in segmented {
        let mut record = vec![
            row.token.clone().unwrap_or_default(),
            format_number(row.frequency),
        ];
        record.extend(cells);
        record.resize(width + 2, String::new());
        writer.write_record(&record)?;
    }
    writer.flush().map_err(|e| Error::io(path, e))?;
    Ok(())
}

/// `sound_position, word, frequency`, one row per segment.
pub fn write_sound_positions(path: &Path, positions: &[SoundPosition]) -> Result<()> {
    let mut writer = create_writer(path)?;
    writer.write_record(["sound_position", "word", "frequency"])?;
    for p in positions {
        let frequency = format_number(p.frequency);
        writer.write_record([p.sound_position.as_str(), p.word.as_str(), frequency.as_str()])?;
    }
    writer.flush().map_err(|e| Error::io(path, e))?;
    Ok(())
}

/// Load a wordlist, list its sound positions and write them to `output`.
pub fn sound_positions_file<S: AsRef<str>>(
    input: &Path,
    output: &Path,
    config: &TokenizerConfig,
    exclude: &[S],
) -> Result<SoundPositions> {
    let rows = read_wordlist(input)?;
    let result = position::sound_positions(&rows, config, exclude);
    write_sound_positions(output, &result.positions)?;
    eprintln!(
        "Sound positions for {} saved to {} ({} rows, {})",
        input.display(),
        output.display(),
        result.positions.len(),
        result.anomalies.summary()
    );
    Ok(result)
}
