//! Output sinks: a directory of CSV files or a SQLite database

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::types::{ToSqlOutput, Value};
use rusqlite::{Connection, ToSql};
use tracing::info;

use crate::error::{ConvertError, Result};
use crate::table::{Cell, Table};

/// Destination for converted tables. Writing a table replaces any
/// previous copy of it.
pub trait TableSink {
    fn write_table(&mut self, table: &Table) -> Result<()>;
}

/// Writes `<dir>/<table>.csv` with the legacy header row
#[derive(Debug, Clone)]
pub struct CsvSink {
    dir: PathBuf,
}

impl CsvSink {
    /// The directory is created on first write, so a run that fails
    /// validation leaves no trace.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{table}.csv"))
    }
}

impl TableSink for CsvSink {
    fn write_table(&mut self, table: &Table) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| ConvertError::io(&self.dir, e))?;
        let path = self.path_for(table.name);

        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::CRLF)
            .quote_style(csv::QuoteStyle::Necessary)
            .from_path(&path)?;

        writer.write_record(table.columns)?;
        for row in table.rows() {
            writer.write_record(row.iter().map(|cell| cell.render().into_owned()))?;
        }
        writer.flush().map_err(|e| ConvertError::io(&path, e))?;

        info!("Wrote {} rows to {}", table.len(), path.display());
        Ok(())
    }
}

impl ToSql for Cell {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Cell::Null => ToSqlOutput::Owned(Value::Null),
            Cell::Int(v) => ToSqlOutput::Owned(Value::Integer(*v)),
            Cell::Float(v) => ToSqlOutput::Owned(Value::Real(*v)),
            Cell::Text(s) => ToSqlOutput::from(s.as_str()),
        })
    }
}

/// Writes each table into a SQLite database under its legacy name
pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            conn: Connection::open(path)?,
        })
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl TableSink for SqliteSink {
    fn write_table(&mut self, table: &Table) -> Result<()> {
        let name = quote_ident(table.name);
        let columns: Vec<String> = table.columns.iter().map(|c| quote_ident(c)).collect();
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();

        let tx = self.conn.transaction()?;
        // Untyped columns keep each value's own storage class
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {name};
             CREATE TABLE {name} ({});",
            columns.join(", ")
        ))?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {name} ({}) VALUES ({})",
                columns.join(", "),
                placeholders.join(", ")
            ))?;
            for row in table.rows() {
                stmt.execute(rusqlite::params_from_iter(row.iter()))?;
            }
        }
        tx.commit()?;

        info!("Wrote {} rows to table {}", table.len(), table.name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> Table {
        let mut table = Table::new("invSample", &["itemID", "itemName", "mass"]);
        table.push(vec![Cell::Int(1), Cell::from("Tritanium, refined"), Cell::Float(0.01)]);
        table.push(vec![Cell::Int(2), Cell::from("Say \"hi\""), Cell::Null]);
        table
    }

    #[test]
    fn csv_uses_legacy_quoting_and_line_endings() {
        let dir = tempdir().unwrap();
        let mut sink = CsvSink::new(dir.path().join("out"));
        sink.write_table(&sample()).unwrap();

        let body = fs::read_to_string(sink.path_for("invSample")).unwrap();
        assert_eq!(
            body,
            "itemID,itemName,mass\r\n1,\"Tritanium, refined\",0.01\r\n2,\"Say \"\"hi\"\"\",\r\n"
        );
    }

    #[test]
    fn csv_rewrite_is_byte_identical() {
        let dir = tempdir().unwrap();
        let mut sink = CsvSink::new(dir.path());
        sink.write_table(&sample()).unwrap();
        let first = fs::read(sink.path_for("invSample")).unwrap();
        sink.write_table(&sample()).unwrap();
        let second = fs::read(sink.path_for("invSample")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn sqlite_replaces_table_and_keeps_types() {
        let mut sink = SqliteSink::from_connection(Connection::open_in_memory().unwrap());
        sink.write_table(&sample()).unwrap();
        sink.write_table(&sample()).unwrap();

        let conn = sink.connection();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM invSample", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 2);

        let mass: Option<f64> = conn
            .query_row("SELECT mass FROM invSample WHERE itemID = 1", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mass, Some(0.01));

        let missing: Option<f64> = conn
            .query_row("SELECT mass FROM invSample WHERE itemID = 2", [], |row| row.get(0))
            .unwrap();
        assert_eq!(missing, None);
    }
}
