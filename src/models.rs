use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Coarse column types, either inferred from sampled values or mapped from
/// a declared SQLite type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
    Text,
    Integer,
    Real,
    Boolean,
    Date,
}

impl ColumnType {
    /// Maps a declared SQLite column type to a coarse type, following the
    /// engine's affinity keyword matching. Unknown declarations fall back
    /// to TEXT.
    pub fn from_declared(declared: &str) -> Self {
        let upper = declared.to_uppercase();
        if upper.contains("INT") {
            ColumnType::Integer
        } else if upper.contains("BOOL") {
            ColumnType::Boolean
        } else if upper.contains("DATE") || upper.contains("TIME") {
            ColumnType::Date
        } else if upper.contains("REAL")
            || upper.contains("FLOA")
            || upper.contains("DOUB")
            || upper.contains("NUMERIC")
            || upper.contains("DECIMAL")
        {
            ColumnType::Real
        } else {
            ColumnType::Text
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSchema {
    pub table_name: String,
    pub columns: Vec<ColumnDescriptor>,
}

/// Uniform importer output, identical in shape across all source formats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportResult {
    pub schema: TableSchema,
    /// Row values are plain JSON scalars or null; nested structures are
    /// never descended into past the top level.
    pub data: Vec<Value>,
}
