use serde_json::{Map, Value};

use super::{infer, table_name_from, MAX_ROWS, SAMPLE_ROWS};
use crate::error::ImportError;
use crate::models::{ColumnDescriptor, ImportResult, TableSchema};

const MSG_MIN_ROWS: &str = "CSV file must contain headers and at least one data row";
const MSG_PARSE: &str = "Failed to parse CSV file. Please check the format.";

// Fields are split on raw commas with whitespace trimmed. Quoted fields are
// not recognized, so a comma inside quotes shifts the remaining columns.
fn split_fields(line: &str) -> Vec<String> {
    line.split(',').map(|v| v.trim().to_string()).collect()
}

pub fn parse(file_name: &str, contents: &[u8]) -> Result<ImportResult, ImportError> {
    let text =
        std::str::from_utf8(contents).map_err(|_| ImportError::ParseFailure(MSG_PARSE))?;

    let lines: Vec<&str> = text.split('\n').filter(|line| !line.trim().is_empty()).collect();
    if lines.len() < 2 {
        return Err(ImportError::Structural(MSG_MIN_ROWS));
    }

    let headers: Vec<String> = lines[0].split(',').map(|h| h.trim().to_string()).collect();
    let data_lines = &lines[1..];

    let sample: Vec<Vec<String>> = data_lines
        .iter()
        .take(SAMPLE_ROWS)
        .map(|line| split_fields(line))
        .collect();

    let columns = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            let candidates: Vec<&str> = sample
                .iter()
                .filter_map(|row| row.get(idx).map(String::as_str))
                .filter(|value| !value.is_empty())
                .collect();
            // A short row counts as an empty value for its missing columns
            let nullable = sample
                .iter()
                .any(|row| row.get(idx).map_or(true, |value| value.is_empty()));
            ColumnDescriptor {
                name: header.clone(),
                column_type: infer::infer_text_type(&candidates),
                nullable,
            }
        })
        .collect();

    let data = data_lines
        .iter()
        .take(MAX_ROWS)
        .map(|line| {
            let values = split_fields(line);
            let mut row = Map::with_capacity(headers.len());
            for (idx, header) in headers.iter().enumerate() {
                let value = values.get(idx).cloned().unwrap_or_default();
                row.insert(header.clone(), Value::String(value));
            }
            Value::Object(row)
        })
        .collect();

    Ok(ImportResult {
        schema: TableSchema {
            table_name: table_name_from(file_name, ".csv"),
            columns,
        },
        data,
    })
}
