// CSV/TSV table import/export

use std::io::{Read, Write};
use std::path::Path;

use abgrid_assign::Table;

pub fn import(path: &Path) -> Result<Table, String> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    import_from_string(&content, delimiter)
}

pub fn import_tsv(path: &Path) -> Result<Table, String> {
    let content = read_file_as_utf8(path)?;
    import_from_string(&content, b'\t')
}

/// Pick the delimiter from the header row.
///
/// Requirement and cluster exports always start with a header of named
/// columns, so a candidate only qualifies when it splits the header into two or
/// more non-blank names. Among those, the one whose data rows (first 20) keep
/// the header's width most often wins; wider headers break ties. Exports from
/// Spanish-locale Excel are usually semicolon-separated.
fn sniff_delimiter(content: &str) -> u8 {
    let mut lines = content.lines().filter(|l| !l.trim().is_empty());
    let Some(header) = lines.next() else {
        return b',';
    };
    let data: Vec<&str> = lines.take(20).collect();

    let mut best = b',';
    let mut best_score = (0usize, 0usize);

    for delim in [b';', b'\t', b',', b'|'] {
        let Some(names) = split_line(header, delim) else {
            continue;
        };
        if names.len() < 2 || names.iter().any(|n| n.trim().is_empty()) {
            continue;
        }

        let width = names.len();
        let matching = data
            .iter()
            .filter(|line| split_line(line, delim).is_some_and(|f| f.len() == width))
            .count();
        let score = (matching, width);
        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

fn split_line(line: &str, delimiter: u8) -> Option<Vec<String>> {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()?
        .ok()
        .map(|record| record.iter().map(str::to_string).collect())
}

/// Read file and convert to UTF-8 if needed (Excel on Windows writes Windows-1252).
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file =
        std::fs::File::open(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| format!("{}: {}", path.display(), e))?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

/// Parse delimited text. The first record is the header row; blank rows are skipped.
pub fn import_from_string(content: &str, delimiter: u8) -> Result<Table, String> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let headers: Vec<String> = match records.next() {
        Some(record) => record
            .map_err(|e| format!("line 1: {e}"))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect(),
        None => return Ok(Table::default()),
    };

    let mut rows = Vec::new();
    for (idx, record) in records.enumerate() {
        let record = record.map_err(|e| format!("line {}: {e}", idx + 2))?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Table::new(headers, rows))
}

pub fn export(table: &Table, path: &Path) -> Result<(), String> {
    export_with_delimiter(table, path, b',')
}

pub fn export_tsv(table: &Table, path: &Path) -> Result<(), String> {
    export_with_delimiter(table, path, b'\t')
}

fn export_with_delimiter(table: &Table, path: &Path, delimiter: u8) -> Result<(), String> {
    let file =
        std::fs::File::create(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    write_to(table, file, delimiter)
}

/// Write the table (header row first) to any writer.
pub fn write_to<W: Write>(table: &Table, out: W, delimiter: u8) -> Result<(), String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_writer(out);

    writer.write_record(&table.headers).map_err(|e| e.to_string())?;
    for row in &table.rows {
        writer.write_record(row).map_err(|e| e.to_string())?;
    }
    writer.flush().map_err(|e| e.to_string())?;
    Ok(())
}
