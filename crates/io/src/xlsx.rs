// Excel table import (xlsx, xlsm, xls, ods) and export (xlsx only)
//
// Import reads one sheet as text cells; the first non-empty row is the header row.
// Export writes a single sheet with a bold frozen header row.

use std::path::Path;

use abgrid_assign::Table;
use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use rust_xlsxwriter::{Format, Workbook};

/// Sheet name used for exported results.
pub const EXPORT_SHEET_NAME: &str = "resultado";

/// Import a sheet as a table. `sheet` selects by name; the first sheet otherwise.
pub fn import(path: &Path, sheet: Option<&str>) -> Result<Table, String> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open Excel file: {}", e))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err("Excel file contains no sheets".to_string());
    }

    let sheet_name = match sheet {
        Some(wanted) => sheet_names
            .iter()
            .find(|name| name.as_str() == wanted)
            .cloned()
            .ok_or_else(|| {
                format!(
                    "Sheet '{}' not found (available: {})",
                    wanted,
                    sheet_names.join(", ")
                )
            })?,
        None => sheet_names[0].clone(),
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| format!("Failed to read sheet '{}': {}", sheet_name, e))?;

    Ok(range_to_table(&range))
}

fn range_to_table(range: &Range<Data>) -> Table {
    let mut rows = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect::<Vec<String>>())
        .filter(|row| row.iter().any(|c| !c.trim().is_empty()));

    let headers = match rows.next() {
        Some(header) => header.into_iter().map(|h| h.trim().to_string()).collect(),
        None => return Table::default(),
    };

    Table::new(headers, rows.collect())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => {
            // Integers without decimals so cost center 101.0 reads back as "101"
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        Data::Int(n) => format!("{}", n),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::Error(e) => format!("#{:?}", e),
        Data::DateTime(dt) => format!("{}", dt.as_f64()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Export a table to a single-sheet xlsx file.
///
/// Cells that read as plain numbers are written as numbers; codes with leading
/// zeros or other decoration stay text.
pub fn export(table: &Table, path: &Path) -> Result<(), String> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook
        .add_worksheet()
        .set_name(EXPORT_SHEET_NAME)
        .map_err(|e| format!("Failed to create sheet '{}': {}", EXPORT_SHEET_NAME, e))?;

    for (col, header) in table.headers.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, header, &header_format)
            .map_err(|e| format!("Failed to write header: {}", e))?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let row32 = (row_idx + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let col16 = col as u16;
            match as_number(cell) {
                Some(n) => worksheet.write_number(row32, col16, n),
                None => worksheet.write_string(row32, col16, cell),
            }
            .map_err(|e| format!("Failed to write cell ({}, {}): {}", row32, col16, e))?;
        }
    }

    worksheet
        .set_freeze_panes(1, 0)
        .map_err(|e| format!("Failed to freeze header row: {}", e))?;
    worksheet.autofit();

    workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {}", e))?;
    Ok(())
}

fn as_number(cell: &str) -> Option<f64> {
    if cell.is_empty() || cell.trim() != cell {
        return None;
    }
    let digits = cell.strip_prefix('-').unwrap_or(cell);
    if digits.len() > 1 && digits.starts_with('0') && !digits.starts_with("0.") {
        return None;
    }
    if !digits.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    cell.parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_as_number() {
        assert_eq!(as_number("101"), Some(101.0));
        assert_eq!(as_number("-2.5"), Some(-2.5));
        assert_eq!(as_number("0.5"), Some(0.5));
        assert_eq!(as_number("0"), Some(0.0));
        assert_eq!(as_number("007"), None);
        assert_eq!(as_number("RQ1"), None);
        assert_eq!(as_number(" 1"), None);
        assert_eq!(as_number("1e3"), None);
        assert_eq!(as_number(""), None);
    }

    #[test]
    fn test_float_cells_render_as_integers() {
        assert_eq!(cell_text(&Data::Float(101.0)), "101");
        assert_eq!(cell_text(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::Bool(true)), "TRUE");
    }

    #[test]
    fn test_export_then_import() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("resultado.xlsx");
        let table = Table::new(
            vec!["NUMERO CENTRO COSTO".into(), "CODIGO RQ".into(), "Prueba".into()],
            vec![
                vec!["101".into(), "007".into(), "Adam Milo".into()],
                vec!["102".into(), "RQ2".into(), "Manpower".into()],
            ],
        );

        export(&table, &path).unwrap();
        let back = import(&path, None).unwrap();
        assert_eq!(back, table);

        let named = import(&path, Some(EXPORT_SHEET_NAME)).unwrap();
        assert_eq!(named.rows.len(), 2);
    }

    #[test]
    fn test_missing_sheet_lists_available() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.xlsx");
        let table = Table::new(vec!["a".into()], vec![vec!["x".into()]]);
        export(&table, &path).unwrap();

        let err = import(&path, Some("Hoja1")).unwrap_err();
        assert!(err.contains("'Hoja1' not found"));
        assert!(err.contains(EXPORT_SHEET_NAME));
    }

    #[test]
    fn test_open_missing_file_fails() {
        let dir = tempdir().unwrap();
        let err = import(&dir.path().join("nope.xlsx"), None).unwrap_err();
        assert!(err.starts_with("Failed to open Excel file"));
    }
}
