use std::collections::HashSet;

use serde_json::Value;

use super::{infer, table_name_from, MAX_ROWS, SAMPLE_ROWS};
use crate::error::ImportError;
use crate::models::{ColumnDescriptor, ColumnType, ImportResult, TableSchema};

const MSG_EMPTY_ARRAY: &str = "JSON file contains an empty array";
const MSG_NOT_OBJECTS: &str = "JSON file must contain an array of objects";
const MSG_BAD_SHAPE: &str = "JSON file must contain an array of objects or an object with arrays";
const MSG_PARSE: &str = "Failed to parse JSON file. Please check the format.";

pub fn parse(file_name: &str, contents: &[u8]) -> Result<ImportResult, ImportError> {
    let value: Value =
        serde_json::from_slice(contents).map_err(|_| ImportError::ParseFailure(MSG_PARSE))?;

    match value {
        Value::Array(items) => {
            if items.is_empty() {
                return Err(ImportError::Structural(MSG_EMPTY_ARRAY));
            }
            from_rows(table_name_from(file_name, ".json"), items)
        }
        Value::Object(map) => {
            // The first array-valued property (in key order) is the row set
            // and its key becomes the table name.
            match map.into_iter().find(|(_, v)| v.is_array()) {
                Some((key, Value::Array(items))) if !items.is_empty() => from_rows(key, items),
                _ => Err(ImportError::Structural(MSG_NOT_OBJECTS)),
            }
        }
        _ => Err(ImportError::Structural(MSG_BAD_SHAPE)),
    }
}

fn from_rows(table_name: String, items: Vec<Value>) -> Result<ImportResult, ImportError> {
    let sample = &items[..items.len().min(SAMPLE_ROWS)];

    // Union of top-level keys across the sample, in first-seen order.
    // Non-object elements contribute nothing.
    let mut seen = HashSet::new();
    let mut keys: Vec<String> = Vec::new();
    for item in sample {
        if let Value::Object(object) = item {
            for key in object.keys() {
                if seen.insert(key.clone()) {
                    keys.push(key.clone());
                }
            }
        }
    }
    if keys.is_empty() {
        return Err(ImportError::Structural(MSG_NOT_OBJECTS));
    }

    let columns = keys
        .iter()
        .map(|key| {
            let first_value = sample
                .iter()
                .find_map(|item| item.get(key).filter(|v| !v.is_null()));
            let column_type = first_value.map_or(ColumnType::Text, infer::infer_json_type);
            let nullable = sample
                .iter()
                .any(|item| item.get(key).map_or(true, |v| v.is_null()));
            ColumnDescriptor {
                name: key.clone(),
                column_type,
                nullable,
            }
        })
        .collect();

    // Rows are returned as-is, not re-validated against the inferred schema
    let mut data = items;
    data.truncate(MAX_ROWS);

    Ok(ImportResult {
        schema: TableSchema {
            table_name,
            columns,
        },
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(name: &str, text: &str) -> Result<ImportResult, ImportError> {
        parse(name, text.as_bytes())
    }

    #[test]
    fn top_level_array_uses_file_base_name() {
        let result = parse_str("users.json", r#"[{"id": 1, "name": "Ada"}]"#).unwrap();
        assert_eq!(result.schema.table_name, "users");
        assert_eq!(result.schema.columns.len(), 2);
        assert_eq!(result.schema.columns[0].name, "id");
        assert_eq!(result.schema.columns[0].column_type, ColumnType::Integer);
        assert_eq!(result.data.len(), 1);
    }

    #[test]
    fn object_with_array_property_uses_the_property_key() {
        let result = parse_str(
            "export.json",
            r#"{"meta": 1, "orders": [{"total": 9.5}], "extra": [{"x": 1}]}"#,
        )
        .unwrap();
        assert_eq!(result.schema.table_name, "orders");
        assert_eq!(result.schema.columns[0].column_type, ColumnType::Real);
    }

    #[test]
    fn empty_top_level_array_has_its_own_message() {
        let err = parse_str("e.json", "[]").unwrap_err();
        assert_eq!(err, ImportError::Structural("JSON file contains an empty array"));
    }

    #[test]
    fn object_without_array_property_is_rejected() {
        let err = parse_str("o.json", r#"{"a": 1, "b": "x"}"#).unwrap_err();
        assert_eq!(
            err,
            ImportError::Structural("JSON file must contain an array of objects")
        );
    }

    #[test]
    fn object_whose_first_array_is_empty_is_rejected() {
        let err = parse_str("o.json", r#"{"rows": [], "more": [{"a": 1}]}"#).unwrap_err();
        assert_eq!(
            err,
            ImportError::Structural("JSON file must contain an array of objects")
        );
    }

    #[test]
    fn array_of_non_objects_is_rejected() {
        let err = parse_str("n.json", "[1, 2, 3]").unwrap_err();
        assert_eq!(
            err,
            ImportError::Structural("JSON file must contain an array of objects")
        );
    }

    #[test]
    fn scalar_top_level_is_rejected_with_shape_message() {
        let err = parse_str("s.json", "42").unwrap_err();
        assert_eq!(
            err,
            ImportError::Structural(
                "JSON file must contain an array of objects or an object with arrays"
            )
        );
    }

    #[test]
    fn malformed_json_collapses_to_generic_parse_message() {
        let err = parse_str("bad.json", "{not json").unwrap_err();
        assert_eq!(
            err,
            ImportError::ParseFailure("Failed to parse JSON file. Please check the format.")
        );
    }

    #[test]
    fn columns_are_the_union_of_sampled_keys_in_first_seen_order() {
        let result = parse_str("u.json", r#"[{"a": 1}, {"b": 2, "a": 3}, {"c": 4}]"#).unwrap();
        let names: Vec<&str> = result.schema.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn missing_or_null_keys_in_sample_mark_columns_nullable() {
        let result = parse_str("n.json", r#"[{"a": 1, "b": null}, {"a": 2}]"#).unwrap();
        let a = &result.schema.columns[0];
        let b = &result.schema.columns[1];
        assert!(!a.nullable);
        assert!(b.nullable);
        // b had no non-null sample value, so it defaults to TEXT
        assert_eq!(b.column_type, ColumnType::Text);
    }

    #[test]
    fn type_comes_from_the_first_non_null_value_only() {
        // First non-null for "v" is a number; the later string is ignored
        let result =
            parse_str("f.json", r#"[{"v": null}, {"v": 7}, {"v": "text"}]"#).unwrap();
        assert_eq!(result.schema.columns[0].column_type, ColumnType::Integer);
    }

    #[test]
    fn array_longer_than_cap_is_truncated_to_one_thousand() {
        let mut items = Vec::with_capacity(1001);
        for i in 0..1001 {
            items.push(format!(r#"{{"i": {}}}"#, i));
        }
        let text = format!("[{}]", items.join(","));
        let result = parse_str("big.json", &text).unwrap();
        assert_eq!(result.data.len(), 1000);
    }

    #[test]
    fn keys_outside_the_sample_stay_in_data_but_not_in_schema() {
        // 20 sampled rows with key "a"; row 21 introduces "late"
        let mut items: Vec<String> = (0..20).map(|i| format!(r#"{{"a": {}}}"#, i)).collect();
        items.push(r#"{"a": 20, "late": true}"#.to_string());
        let text = format!("[{}]", items.join(","));
        let result = parse_str("late.json", &text).unwrap();

        let names: Vec<&str> = result.schema.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a"]);
        assert_eq!(result.data[20]["late"], true);
    }

    #[test]
    fn rows_are_returned_as_is_without_flattening() {
        let result = parse_str("r.json", r#"[{"a": {"deep": 1}, "b": 2}]"#).unwrap();
        // The nested object survives in data, but its type is TEXT
        assert!(result.data[0]["a"].is_object());
        assert_eq!(result.schema.columns[0].column_type, ColumnType::Text);
    }
}
