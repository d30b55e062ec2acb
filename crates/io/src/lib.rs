// File I/O for assignment tables

use std::path::Path;

use abgrid_assign::Table;

pub mod csv;
pub mod xlsx;

/// Table file formats, picked by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Tsv,
    Excel,
}

impl TableFormat {
    pub fn from_path(path: &Path) -> Result<Self, String> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" | "txt" => Ok(TableFormat::Csv),
            "tsv" | "tab" => Ok(TableFormat::Tsv),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(TableFormat::Excel),
            "" => Err(format!("{}: missing file extension", path.display())),
            other => Err(format!(
                "{}: unsupported format '.{}' (expected csv, tsv, xlsx, xlsm, xls or ods)",
                path.display(),
                other
            )),
        }
    }
}

/// Read a table. `sheet` only applies to spreadsheet files.
pub fn read_table(path: &Path, sheet: Option<&str>) -> Result<Table, String> {
    match TableFormat::from_path(path)? {
        TableFormat::Csv => csv::import(path),
        TableFormat::Tsv => csv::import_tsv(path),
        TableFormat::Excel => xlsx::import(path, sheet),
    }
}

/// Write a table. Only xlsx is written among spreadsheet formats.
pub fn write_table(table: &Table, path: &Path) -> Result<(), String> {
    match TableFormat::from_path(path)? {
        TableFormat::Csv => csv::export(table, path),
        TableFormat::Tsv => csv::export_tsv(table, path),
        TableFormat::Excel => {
            let is_xlsx = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"));
            if !is_xlsx {
                return Err(format!(
                    "{}: spreadsheet output must be .xlsx",
                    path.display()
                ));
            }
            xlsx::export(table, path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_from_extension() {
        let f = |p: &str| TableFormat::from_path(&PathBuf::from(p));
        assert_eq!(f("a.csv"), Ok(TableFormat::Csv));
        assert_eq!(f("a.TSV"), Ok(TableFormat::Tsv));
        assert_eq!(f("a.xlsx"), Ok(TableFormat::Excel));
        assert_eq!(f("a.ods"), Ok(TableFormat::Excel));
        assert!(f("a.json").unwrap_err().contains("unsupported format '.json'"));
        assert!(f("noext").unwrap_err().contains("missing file extension"));
    }

    #[test]
    fn test_write_rejects_legacy_excel() {
        let table = Table::new(vec!["a".into()], vec![]);
        let err = write_table(&table, &PathBuf::from("out.xls")).unwrap_err();
        assert!(err.contains(".xlsx"));
    }

    #[test]
    fn test_csv_through_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        let table = Table::new(
            vec!["cluster".into(), "Prueba".into()],
            vec![vec!["1".into(), "Manpower".into()]],
        );
        write_table(&table, &path).unwrap();
        assert_eq!(read_table(&path, Some("ignored")).unwrap(), table);
    }
}
