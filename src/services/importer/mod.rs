pub mod csv;
pub mod infer;
pub mod json;
pub mod sqlite;

use crate::error::ImportError;
use crate::models::ImportResult;

/// Hard cap on the number of rows handed back to the caller.
pub const MAX_ROWS: usize = 1000;
/// Number of leading data rows examined for type and nullability inference.
pub const SAMPLE_ROWS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Json,
    Sql,
    Db,
}

impl FileFormat {
    /// Picks a parsing strategy from the file name suffix alone; the file
    /// contents are never sniffed.
    pub fn detect(file_name: &str) -> Result<Self, ImportError> {
        let lower = file_name.to_lowercase();
        if lower.ends_with(".csv") {
            Ok(FileFormat::Csv)
        } else if lower.ends_with(".json") {
            Ok(FileFormat::Json)
        } else if lower.ends_with(".sql") {
            Ok(FileFormat::Sql)
        } else if lower.ends_with(".db") {
            Ok(FileFormat::Db)
        } else {
            Err(ImportError::UnsupportedFormat)
        }
    }
}

/// Single entry point: dispatches on the detected format and returns the
/// uniform `{schema, data}` result. Each call builds its own parser state;
/// nothing is shared across invocations.
pub fn parse_file(file_name: &str, contents: &[u8]) -> Result<ImportResult, ImportError> {
    match FileFormat::detect(file_name)? {
        FileFormat::Csv => csv::parse(file_name, contents),
        FileFormat::Json => json::parse(file_name, contents),
        FileFormat::Sql => sqlite::replay_script(contents),
        FileFormat::Db => sqlite::open_container(contents),
    }
}

/// Strips a trailing extension (matched case-insensitively) from a file
/// name to form a table name.
pub(crate) fn table_name_from(file_name: &str, extension: &str) -> String {
    let lower = file_name.to_lowercase();
    if lower.ends_with(extension) {
        file_name[..file_name.len() - extension.len()].to_string()
    } else {
        file_name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_supported_suffixes_case_insensitively() {
        assert_eq!(FileFormat::detect("data.csv").unwrap(), FileFormat::Csv);
        assert_eq!(FileFormat::detect("DATA.CSV").unwrap(), FileFormat::Csv);
        assert_eq!(FileFormat::detect("rows.Json").unwrap(), FileFormat::Json);
        assert_eq!(FileFormat::detect("dump.SQL").unwrap(), FileFormat::Sql);
        assert_eq!(FileFormat::detect("app.db").unwrap(), FileFormat::Db);
    }

    #[test]
    fn rejects_unknown_suffix_with_fixed_message() {
        let err = FileFormat::detect("report.xlsx").unwrap_err();
        assert_eq!(err, ImportError::UnsupportedFormat);
        assert_eq!(
            err.to_string(),
            "Unsupported file format. Please upload a CSV, JSON, or SQL file."
        );
    }

    #[test]
    fn rejects_extensionless_name() {
        assert_eq!(
            FileFormat::detect("csv").unwrap_err(),
            ImportError::UnsupportedFormat
        );
    }

    #[test]
    fn parse_file_dispatches_by_extension() {
        let result = parse_file("people.csv", b"name,age\nAlice,30\n").unwrap();
        assert_eq!(result.schema.table_name, "people");

        let result = parse_file("people.json", br#"[{"name":"Alice"}]"#).unwrap();
        assert_eq!(result.schema.table_name, "people");

        let err = parse_file("people.txt", b"whatever").unwrap_err();
        assert_eq!(err, ImportError::UnsupportedFormat);
    }

    #[test]
    fn table_name_strips_extension_case_insensitively() {
        assert_eq!(table_name_from("Sales.CSV", ".csv"), "Sales");
        assert_eq!(table_name_from("sales.csv", ".csv"), "sales");
        // Only the trailing extension is removed
        assert_eq!(table_name_from("a.csv.backup.csv", ".csv"), "a.csv.backup");
    }
}
