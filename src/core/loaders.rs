//! CSV loading for sampled sensor/log files.
//!
//! Files have a header row followed by one row per sample. Column 0 is
//! usually a sample counter; every cell must parse as a number. Register
//! dumps with hexadecimal cells are read with [`load_hex_csv`].

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use log::{debug, warn};
use thiserror::Error;

/// Errors that can occur during file loading.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Empty file: {0}")]
    EmptyFile(PathBuf),

    #[error("Invalid number '{value}' in column '{column}' at data row {row}")]
    ParseError {
        value: String,
        column: String,
        row: usize,
    },

    #[error("Column count mismatch between input files: {file1} vs {file2}")]
    ColumnCountMismatch { file1: usize, file2: usize },
}

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;

/// Numeric CSV contents stored column by column.
#[derive(Debug, Clone)]
pub struct DataTable {
    /// Column names in file order.
    pub headers: Vec<String>,
    /// One vector per column, each `num_rows()` long.
    pub columns: Vec<Vec<f64>>,
    /// Source file path.
    pub source_path: Option<PathBuf>,
}

impl DataTable {
    /// Creates a table from headers and equally long columns.
    pub fn new(headers: Vec<String>, columns: Vec<Vec<f64>>) -> Self {
        debug_assert_eq!(headers.len(), columns.len());
        Self {
            headers,
            columns,
            source_path: None,
        }
    }

    /// Returns the number of columns, including the sample column.
    #[inline]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Returns the number of samples (data rows).
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.len())
    }

    /// File stem of the source file, used to name exports.
    pub fn source_stem(&self) -> Option<&str> {
        self.source_path
            .as_deref()
            .and_then(Path::file_stem)
            .and_then(|s| s.to_str())
    }

    /// Replace headers using [`clean_column_names`].
    pub fn clean_headers(&mut self, cleanup_rules: &[String]) {
        self.headers = clean_column_names(&self.headers, cleanup_rules);
    }
}

/// Load a numeric CSV file with a header row.
///
/// # Errors
///
/// Returns an error if the file cannot be read, rows have differing lengths,
/// a cell is not a number, or there are no data rows.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<DataTable> {
    load_with(path.as_ref(), |field| field.parse::<f64>().ok())
}

/// Load a CSV file whose cells are hexadecimal integers.
///
/// Cells may carry a sign and a `0x`/`0X` prefix (`"1F"`, `"0x1f"`, `"-0x10"`).
/// Values are stored as `f64` like any other table.
///
/// # Errors
///
/// Same as [`load_csv`]; a cell that is not a hexadecimal integer yields
/// `ParseError`.
pub fn load_hex_csv<P: AsRef<Path>>(path: P) -> Result<DataTable> {
    load_with(path.as_ref(), |field| parse_hex(field).map(|v| v as f64))
}

/// Parse a signed hexadecimal integer with an optional `0x` prefix.
pub fn parse_hex(field: &str) -> Option<i64> {
    let (negative, digits) = match field.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, field.strip_prefix('+').unwrap_or(field)),
    };
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(digits);

    // from_str_radix would accept a second sign here
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let magnitude = i64::from_str_radix(digits, 16).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

fn load_with(path: &Path, parse: impl Fn(&str) -> Option<f64>) -> Result<DataTable> {
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut columns: Vec<Vec<f64>> = vec![Vec::with_capacity(1024); headers.len()];

    for (row, result) in reader.records().enumerate() {
        let record = result?;

        for (col, field) in record.iter().enumerate() {
            let value = parse(field).ok_or_else(|| LoaderError::ParseError {
                value: field.to_string(),
                column: headers.get(col).cloned().unwrap_or_default(),
                row: row + 1,
            })?;
            columns[col].push(value);
        }
    }

    if headers.is_empty() || columns[0].is_empty() {
        return Err(LoaderError::EmptyFile(path.to_path_buf()));
    }

    debug!(
        "Loaded {} rows x {} columns from {}",
        columns[0].len(),
        headers.len(),
        path.display()
    );

    Ok(DataTable {
        headers,
        columns,
        source_path: Some(path.to_path_buf()),
    })
}

/// Remove every cleanup substring from each column name, then trim whitespace.
///
/// Rules are applied in order, so a longer rule should precede any rule that
/// is a substring of it (e.g. `"Ave. (C)"` before `"(C)"`).
pub fn clean_column_names(columns: &[String], cleanup_rules: &[String]) -> Vec<String> {
    columns
        .iter()
        .map(|col| {
            let mut cleaned = col.clone();
            for rule in cleanup_rules.iter().filter(|r| !r.is_empty()) {
                cleaned = cleaned.replace(rule.as_str(), "");
            }
            cleaned.trim().to_string()
        })
        .collect()
}

/// Check that two files can be compared column by column.
///
/// Differing column counts are an error; differing column names only log a
/// warning.
pub fn validate_structure(table1: &DataTable, table2: &DataTable) -> Result<()> {
    if table1.num_columns() != table2.num_columns() {
        return Err(LoaderError::ColumnCountMismatch {
            file1: table1.num_columns(),
            file2: table2.num_columns(),
        });
    }

    if table1.headers != table2.headers {
        warn!("Column names do not match exactly.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file.flush().unwrap();
        file
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_load_csv() -> Result<()> {
        let file = write_csv(&["Sample,Temp Ave. (C),Pressure", "0,20.5,1.0", "1, 21.0 ,1.5"]);

        let table = load_csv(file.path())?;
        assert_eq!(table.num_columns(), 3);
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.headers[1], "Temp Ave. (C)");
        assert_eq!(table.columns[1], vec![20.5, 21.0]);
        assert_eq!(table.columns[2], vec![1.0, 1.5]);
        assert_eq!(table.source_path.as_deref(), Some(file.path()));
        assert_eq!(
            table.source_stem(),
            file.path().file_stem().and_then(|s| s.to_str())
        );

        Ok(())
    }

    #[test]
    fn test_load_csv_rejects_text_cells() {
        let file = write_csv(&["Sample,Value", "0,1.0", "1,n/a"]);

        match load_csv(file.path()) {
            Err(LoaderError::ParseError { value, column, row }) => {
                assert_eq!(value, "n/a");
                assert_eq!(column, "Value");
                assert_eq!(row, 2);
            }
            other => panic!("Expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_load_csv_header_only_is_empty() {
        let file = write_csv(&["Sample,Value"]);
        assert!(matches!(load_csv(file.path()), Err(LoaderError::EmptyFile(_))));
    }

    #[test]
    fn test_load_csv_ragged_rows_fail() {
        let file = write_csv(&["Sample,Value", "0,1.0", "1,2.0,3.0"]);
        assert!(matches!(load_csv(file.path()), Err(LoaderError::Csv(_))));
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("1F"), Some(31));
        assert_eq!(parse_hex("0x1f"), Some(31));
        assert_eq!(parse_hex("0X00ff"), Some(255));
        assert_eq!(parse_hex("-0x10"), Some(-16));
        assert_eq!(parse_hex("+a"), Some(10));
        assert_eq!(parse_hex("0"), Some(0));
        assert_eq!(parse_hex(""), None);
        assert_eq!(parse_hex("0x"), None);
        assert_eq!(parse_hex("--1"), None);
        assert_eq!(parse_hex("1.5"), None);
        assert_eq!(parse_hex("zz"), None);
    }

    #[test]
    fn test_load_hex_csv() -> Result<()> {
        let file = write_csv(&["Reg A,Reg B", "0x10,ff", " 0x1A ,0"]);

        let table = load_hex_csv(file.path())?;
        assert_eq!(table.headers, strings(&["Reg A", "Reg B"]));
        assert_eq!(table.columns[0], vec![16.0, 26.0]);
        assert_eq!(table.columns[1], vec![255.0, 0.0]);

        Ok(())
    }

    #[test]
    fn test_load_hex_csv_rejects_decimal_fraction() {
        let file = write_csv(&["Reg", "0x10", "2.5"]);

        match load_hex_csv(file.path()) {
            Err(LoaderError::ParseError { value, row, .. }) => {
                assert_eq!(value, "2.5");
                assert_eq!(row, 2);
            }
            other => panic!("Expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_clean_column_names() {
        let columns = strings(&["Sample", "Sensor A Ave. (C)", " Sensor B (C) "]);
        let rules = strings(&["Ave. (C)", "(C)"]);

        let cleaned = clean_column_names(&columns, &rules);
        assert_eq!(cleaned, strings(&["Sample", "Sensor A", "Sensor B"]));
    }

    #[test]
    fn test_clean_headers_without_rules_only_trims() {
        let mut table = DataTable::new(strings(&[" a ", "b"]), vec![vec![0.0], vec![1.0]]);
        table.clean_headers(&[]);
        assert_eq!(table.headers, strings(&["a", "b"]));
    }

    #[test]
    fn test_validate_structure() {
        let t1 = DataTable::new(strings(&["s", "a"]), vec![vec![0.0], vec![1.0]]);
        let t2 = DataTable::new(strings(&["s", "b"]), vec![vec![0.0], vec![2.0]]);
        let t3 = DataTable::new(strings(&["s"]), vec![vec![0.0]]);

        assert!(validate_structure(&t1, &t2).is_ok());
        assert!(matches!(
            validate_structure(&t1, &t3),
            Err(LoaderError::ColumnCountMismatch { file1: 2, file2: 1 })
        ));
    }
}
