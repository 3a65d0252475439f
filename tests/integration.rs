use std::fs;
use std::path::Path;

use rust_grapheme_count::io::{
    count_wordlist_file, distance_report_files, extract_wordlist_file, read_frequency_table,
    read_wordlist, sound_positions_file, write_bucket_table, write_distance_report,
    write_frequency_table, write_segmentation,
};
use rust_grapheme_count::{
    BarStyle, BucketTable, CountView, DEFAULT_EXCLUDE, Error, FrequencyTable, SortMode, Tokenizer,
    TokenizerConfig,
};

fn write(path: &Path, content: &str) {
    fs::write(path, content).unwrap();
}

fn lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn count_wordlist_csv_skips_bad_rows() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("wordlist.csv");
    write(
        &input,
        "Token,Frequency,Label\nhus,3,\n(i)h,2,\n,4,\n*x*,1,\nab,many,\n",
    );

    let count = count_wordlist_file(&input, &TokenizerConfig::default(), CountView::All).unwrap();
    assert_eq!(count.counted, 2);
    assert_eq!(count.skipped, 3);
    assert_eq!(count.table.get("h"), 3.0);
    assert_eq!(count.table.get("u"), 3.0);
    assert_eq!(count.table.get("ih"), 2.0);
    assert!(count.raw.contains("(i)h"));
    assert!(!count.table.contains("(i)h"));

    let kinds = count.anomalies.counts();
    assert_eq!(kinds.get("empty_or_null_token"), Some(&1));
    assert_eq!(kinds.get("rejected_token"), Some(&1));
    assert_eq!(kinds.get("invalid_frequency"), Some(&1));
}

#[test]
fn tsv_wordlist_with_reordered_columns() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("wordlist.tsv");
    write(&input, "frequency\ttoken\n5\tbaum\n1\tau\n");

    let rows = read_wordlist(&input).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].token.as_deref(), Some("baum"));
    assert_eq!(rows[0].frequency, 5.0);

    let config = TokenizerConfig::default();
    let count = count_wordlist_file(&input, &config, CountView::Vowels).unwrap();
    assert_eq!(count.table.get("au"), 6.0);
    assert!(!count.table.contains("b"));
}

#[test]
fn missing_column_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("wordlist.csv");
    write(&input, "Token,Count\nhus,3\n");

    let err = read_wordlist(&input).unwrap_err();
    assert!(matches!(err, Error::MissingColumn { ref column, .. } if column == "frequency"));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_wordlist(&dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
    assert!(err.to_string().contains("absent.csv"));
}

#[test]
fn bucket_table_export() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("wordlist.csv");
    write(&input, "Token,Frequency\nhus,3\n(i)h,2\n");
    let count = count_wordlist_file(&input, &TokenizerConfig::default(), CountView::All).unwrap();

    let output = dir.path().join("out/buckets.csv");
    let buckets = BucketTable::from_table(&count.table, SortMode::Frequency);
    write_bucket_table(&output, &buckets).unwrap();

    let lines = lines(&output);
    assert_eq!(
        lines[0],
        "Monographs,Monographs_freq,Digraphs,Digraphs_freq,Trigraphs,Trigraphs_freq,\
         Tetragraphs,Tetragraphs_freq,Pentagraphs,Pentagraphs_freq,Hexagraphs,Hexagraphs_freq"
    );
    assert_eq!(lines[1], "h,3,ih,2,,,,,,,,");
    assert_eq!(lines[2], "s,3,,,,,,,,,,");
    assert_eq!(lines[3], "u,3,,,,,,,,,,");
    assert_eq!(lines.len(), 4);
}

#[test]
fn distance_report_between_files() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("older.csv");
    let b = dir.path().join("newer.csv");
    let table_a: FrequencyTable = [("a".to_string(), 10.0), ("e".to_string(), 5.0)]
        .into_iter()
        .collect();
    let table_b: FrequencyTable = [
        ("a".to_string(), 7.0),
        ("e".to_string(), 5.0),
        ("i".to_string(), 2.0),
    ]
    .into_iter()
    .collect();
    write_frequency_table(&a, &table_a, SortMode::Frequency).unwrap();
    write_frequency_table(&b, &table_b, SortMode::Alphabetical).unwrap();
    assert_eq!(read_frequency_table(&a).unwrap(), table_a);

    let report = distance_report_files(&[a.as_path(), b.as_path()]).unwrap();
    assert_eq!(report.names, vec!["older", "newer"]);
    assert_eq!(report.total, 5.0);
    assert_eq!(report.average, 2.5);

    let output = dir.path().join("distance.csv");
    write_distance_report(&output, &report).unwrap();
    let lines = lines(&output);
    assert_eq!(lines[0], "graphemes,older,newer,distance");
    assert_eq!(lines[1], "a,10,7,3");
    assert_eq!(lines[3], "i,0,2,2");
    assert_eq!(lines[4], "Total,,,5");
    assert_eq!(lines[5], "Average,,,2.5");
}

#[test]
fn extract_wordlist_to_csv() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("letter.txt");
    let output = dir.path().join("letter.csv");
    write(&input, "Hus och hus, ok.\n");

    let words = extract_wordlist_file(&input, &output).unwrap();
    assert_eq!(words, 4);
    assert_eq!(
        lines(&output),
        vec![
            "Token,Frequency,Label,Translation",
            "Hus,1,,",
            "hus,2,,",
            "och,1,,",
            "ok,1,,",
        ]
    );

    // The written wordlist feeds straight back into counting.
    let rows = read_wordlist(&output).unwrap();
    assert_eq!(rows.len(), 4);
}

#[test]
fn segmentation_export_pads_rows() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("wordlist.csv");
    write(&input, "Token,Frequency\nhus,3\n<de>ab,1\n");
    let rows = read_wordlist(&input).unwrap();

    let output = dir.path().join("segments.csv");
    write_segmentation(&output, &rows, &Tokenizer::default()).unwrap();
    assert_eq!(
        lines(&output),
        vec![
            "Token,Frequency,Token_0,Token_1,Token_2",
            "hus,3,h,u,s",
            "<de>ab,1,<de>,a,b",
        ]
    );
}

#[test]
fn sound_positions_export() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("wordlist.csv");
    write(&input, "Token,Frequency\nhus,3\n<de>b(ea)t,1\n,2\n");

    let output = dir.path().join("positions/hus.csv");
    let config = TokenizerConfig::default();
    let result = sound_positions_file(&input, &output, &config, DEFAULT_EXCLUDE).unwrap();
    assert_eq!(result.positions.len(), 5);
    assert_eq!(result.anomalies.len(), 1);
    assert_eq!(
        lines(&output),
        vec![
            "sound_position,word,frequency",
            "(ea),<de>b(ea)t,1",
            "b,<de>b(ea)t,1",
            "s,hus,3",
            "t,<de>b(ea)t,1",
            "u,hus,3",
        ]
    );
}

#[test]
fn config_file_selects_pipe_bars() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tokenizer.toml");
    write(&path, "bar_style = \"pipe\"\nglides = [\"h\"]\n");

    let config = TokenizerConfig::from_file(&path).unwrap();
    assert_eq!(config.bar_style, BarStyle::Pipe);
    assert!(config.case_fold);

    let texts = |token: &str| -> Vec<String> {
        rust_grapheme_count::tokenize(token, &config)
            .units
            .into_iter()
            .map(|u| u.text)
            .collect()
    };
    assert_eq!(texts("a|j|e"), vec!["a|j|e"]);
    assert_eq!(texts("eja"), vec!["e", "j", "a"]);
}

#[test]
fn invalid_config_is_reported() {
    let err = TokenizerConfig::parse("bar_style = \"slash\"").unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}
