use std::io::Write;

use rusqlite::{types::ValueRef, Connection};
use serde_json::{Map, Number, Value};

use super::MAX_ROWS;
use crate::error::ImportError;
use crate::models::{ColumnDescriptor, ColumnType, ImportResult, TableSchema};

const MSG_NO_TABLES: &str = "No tables found in SQL file.";
const MSG_PARSE: &str = "Failed to parse SQLite SQL file.";

/// Replays a SQL dump against a fresh in-memory database, then extracts the
/// first table. The script runs verbatim; there is no statement-level
/// sandboxing.
pub fn replay_script(contents: &[u8]) -> Result<ImportResult, ImportError> {
    let script =
        std::str::from_utf8(contents).map_err(|_| ImportError::ParseFailure(MSG_PARSE))?;
    let conn =
        Connection::open_in_memory().map_err(|_| ImportError::ParseFailure(MSG_PARSE))?;
    conn.execute_batch(script)
        .map_err(|_| ImportError::ParseFailure(MSG_PARSE))?;
    extract_first_table(&conn)
}

/// Opens a binary SQLite container. The bytes are staged in a temporary
/// file because the engine opens containers by path; the file is removed
/// when the handle drops.
pub fn open_container(contents: &[u8]) -> Result<ImportResult, ImportError> {
    let mut staged = tempfile::NamedTempFile::new().map_err(|_| ImportError::IoFailure)?;
    staged.write_all(contents).map_err(|_| ImportError::IoFailure)?;
    staged.flush().map_err(|_| ImportError::IoFailure)?;

    let conn =
        Connection::open(staged.path()).map_err(|_| ImportError::ParseFailure(MSG_PARSE))?;
    extract_first_table(&conn)
}

// Only the first catalog-listed table is surfaced; multi-table inputs are
// truncated to that table.
fn extract_first_table(conn: &Connection) -> Result<ImportResult, ImportError> {
    let tables = list_tables(conn).map_err(|_| ImportError::ParseFailure(MSG_PARSE))?;
    let table_name = tables
        .into_iter()
        .next()
        .ok_or(ImportError::Structural(MSG_NO_TABLES))?;

    let columns =
        read_columns(conn, &table_name).map_err(|_| ImportError::ParseFailure(MSG_PARSE))?;
    let data = read_rows(conn, &table_name).map_err(|_| ImportError::ParseFailure(MSG_PARSE))?;

    Ok(ImportResult {
        schema: TableSchema {
            table_name,
            columns,
        },
        data,
    })
}

fn list_tables(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table'")?;
    let names = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(names)
}

// Column metadata comes from the engine's catalog, exact rather than
// sampled. Declared types are coarsened through affinity matching.
fn read_columns(conn: &Connection, table: &str) -> rusqlite::Result<Vec<ColumnDescriptor>> {
    let pragma_sql = format!("PRAGMA table_info('{}')", table);
    let mut stmt = conn.prepare(&pragma_sql)?;
    let columns = stmt
        .query_map([], |row| {
            let name: String = row.get(1)?;
            let declared: String = row.get(2)?;
            let not_null: i64 = row.get(3)?;
            Ok(ColumnDescriptor {
                name,
                column_type: ColumnType::from_declared(&declared),
                nullable: not_null == 0,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(columns)
}

fn read_rows(conn: &Connection, table: &str) -> rusqlite::Result<Vec<Value>> {
    let select_sql = format!("SELECT * FROM '{}' LIMIT {}", table, MAX_ROWS);
    let mut stmt = conn.prepare(&select_sql)?;
    let column_names: Vec<String> =
        stmt.column_names().iter().map(|name| name.to_string()).collect();

    let mut rows = stmt.query([])?;
    let mut data = Vec::new();
    while let Some(row) = rows.next()? {
        let mut object = Map::with_capacity(column_names.len());
        for (idx, name) in column_names.iter().enumerate() {
            object.insert(name.clone(), sql_value_to_json(row.get_ref(idx)?));
        }
        data.push(Value::Object(object));
    }
    Ok(data)
}

fn sql_value_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Number(i.into()),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(_) => Value::String("BLOB".to_string()),
    }
}
