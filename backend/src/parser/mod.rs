//! CSV reader with encoding and delimiter auto-detection.
//!
//! Turns an upload into a [`RawTable`] of string cells. Header names are kept
//! exactly as written; normalization happens in [`crate::transform::schema`].

use serde::Serialize;
use std::io::Read;
use std::path::Path;

use crate::error::{CsvError, CsvResult};

/// Candidate delimiters, in tie-break order.
const DELIMITERS: [char; 4] = [',', ';', '\t', '|'];

/// One data row with its position in the source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawRow {
    /// 1-based line number (header is line 1).
    pub line: usize,
    pub cells: Vec<String>,
}

impl RawRow {
    /// Cell at `index`, or `""` when the row is shorter than the header.
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }
}

/// Header plus rows, all cells as text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    /// Build a table from in-memory cells, numbering lines from 2.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(i, cells)| RawRow { line: i + 2, cells })
            .collect();
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Result of parsing with metadata
#[derive(Debug, Clone, Serialize)]
pub struct ParseResult {
    /// Parsed header and rows
    pub table: RawTable,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" | "utf-8-sig" => "utf-8".to_string(),
        "iso-8859-1" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "iso-8859-15" | "latin-9" => "iso-8859-15".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to a string using the given encoding. A UTF-8 BOM is dropped.
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    let decoded = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => match String::from_utf8(bytes.to_vec()) {
            Ok(s) => s,
            Err(_) => String::from_utf8_lossy(bytes).into_owned(),
        },
        // encoding_rs maps the Latin-1 labels to windows-1252, a superset.
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
        }
        other => match encoding_rs::Encoding::for_label(other.as_bytes()) {
            Some(enc) => {
                let (text, _, had_errors) = enc.decode(bytes);
                if had_errors {
                    return Err(CsvError::Encoding(format!("invalid {} content", other)));
                }
                text.into_owned()
            }
            None => String::from_utf8_lossy(bytes).into_owned(),
        },
    };

    Ok(decoded)
}

/// Detect the delimiter by counting occurrences in the header line.
///
/// Falls back to `,` when none of the candidates appear.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().find(|l| !l.trim().is_empty()).unwrap_or("");

    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &DELIMITERS {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV text with an explicit delimiter.
///
/// # Example
/// ```ignore
/// use promoview::parser::parse_str;
///
/// let table = parse_str("cod_canal,cod_ciclo\nA,\"2,024\"", ',').unwrap();
/// assert_eq!(table.rows[0].cells, vec!["A", "2,024"]);
/// ```
pub fn parse_str(content: &str, delimiter: char) -> CsvResult<RawTable> {
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }
    parse_reader(content.as_bytes(), delimiter)
}

/// Parse CSV from a reader with an explicit delimiter.
pub fn parse_reader<R: Read>(reader: R, delimiter: char) -> CsvResult<RawTable> {
    if !delimiter.is_ascii() {
        return Err(CsvError::Malformed {
            line: 1,
            message: format!("delimiter '{}' is not ASCII", delimiter),
        });
    }

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| malformed(1, &e))?
        .iter()
        .map(|h| h.trim_matches('"').to_string())
        .collect();

    if headers.is_empty() {
        return Err(CsvError::EmptyFile);
    }
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(CsvError::NoHeaders);
    }

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let fallback_line = idx + 2;
        let record = result.map_err(|e| {
            let line = e.position().map(|p| p.line() as usize).unwrap_or(fallback_line);
            malformed(line, &e)
        })?;

        if record.iter().all(|c| c.trim().is_empty()) {
            continue;
        }

        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(fallback_line);

        rows.push(RawRow {
            line,
            cells: record.iter().map(str::to_string).collect(),
        });
    }

    Ok(RawTable { headers, rows })
}

fn malformed(line: usize, err: &csv::Error) -> CsvError {
    CsvError::Malformed {
        line,
        message: err.to_string(),
    }
}

/// Parse CSV file with auto-detection of encoding and delimiter.
///
/// # Example
/// ```ignore
/// let result = parse_csv_file_auto("/path/to/promotions.csv")?;
/// println!("Encoding: {}, Delimiter: '{}'", result.encoding, result.delimiter);
/// println!("Rows: {}", result.table.len());
/// ```
pub fn parse_csv_file_auto<P: AsRef<Path>>(path: P) -> CsvResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes)
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> CsvResult<ParseResult> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(CsvError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = detect_delimiter(&content);
    let table = parse_str(&content, delimiter)?;

    Ok(ParseResult {
        table,
        encoding,
        delimiter,
    })
}
