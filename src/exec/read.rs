use crate::Result;
use crate::exec::ExecInfo;
use anyhow::Context;
use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use std::collections::BTreeMap;
use std::path::Path;

pub const EXEC_INFO_TABLE: &str = "exec_info";

/// Read the `exec_info` table of one result file.
///
/// Returns `Ok(None)` when the file is a database without that table. The file
/// is opened read-only and the connection is closed before returning.
pub fn read_exec_info(path: &Path) -> Result<Option<ExecInfo>> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("open {}", path.display()))?;

    let table: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![EXEC_INFO_TABLE],
            |row| row.get(0),
        )
        .optional()
        .with_context(|| format!("look up table {}", EXEC_INFO_TABLE))?;

    if table.is_none() {
        return Ok(None);
    }

    let props = read_properties(&conn)?;
    conn.close()
        .map_err(|(_, e)| e)
        .with_context(|| format!("close {}", path.display()))?;

    ExecInfo::from_properties(props).map(Some)
}

fn read_properties(conn: &Connection) -> Result<BTreeMap<String, String>> {
    let mut stmt = conn
        .prepare(&format!("SELECT Property, Value FROM {}", EXEC_INFO_TABLE))
        .with_context(|| format!("query {}", EXEC_INFO_TABLE))?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, Value>(0)?, row.get::<_, Value>(1)?)))?;

    // Later rows overwrite earlier ones for a repeated property.
    let mut props = BTreeMap::new();
    for row in rows {
        let (property, value) = row?;
        if let (Some(property), Some(value)) = (as_text(property), as_text(value)) {
            props.insert(property, value);
        }
    }
    Ok(props)
}

/// SQLite is loosely typed; render whatever was stored as text. NULL is absent.
fn as_text(v: Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(f) => Some(f.to_string()),
        Value::Text(s) => Some(s),
        Value::Blob(b) => Some(String::from_utf8_lossy(&b).into_owned()),
    }
}
