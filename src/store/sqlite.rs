use anyhow::{bail, Context, Result};
use rusqlite::Connection;
use std::collections::HashSet;
use std::path::Path;

use super::schema_gen::{generate_create_table, generate_indexes, generate_insert};
use crate::schema::TableSchema;

/// A typed row that can be persisted into its relation
pub trait TableRow {
    /// The relation this row belongs to
    const SCHEMA: &'static TableSchema;

    /// Bind the row's values to a positional INSERT statement
    /// (parameter order follows the schema's column order)
    fn bind(&self, stmt: &mut rusqlite::Statement<'_>) -> rusqlite::Result<()>;
}

/// Embedded warehouse store. One connection, single writer; every table
/// is dropped and recreated by the stage that owns it.
pub struct Warehouse {
    conn: Connection,
}

impl Warehouse {
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path).context("Failed to open warehouse database")?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        // Optimized for bulk rebuild, not concurrent access. Referential
        // integrity is warning-only by design (orphans are recounted by the
        // validator), so pin the stock SQLite foreign_keys default: the
        // bundled build flips it on at compile time, which would break the
        // drop-and-recreate rebuild order.
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -64000;
             PRAGMA foreign_keys = OFF;",
        )?;

        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Drop and recreate a table with its indexes
    pub fn rebuild_table(&self, schema: &TableSchema) -> Result<()> {
        self.conn
            .execute(&format!("DROP TABLE IF EXISTS {}", schema.name), [])
            .with_context(|| format!("Failed to drop table: {}", schema.name))?;

        self.conn
            .execute(&generate_create_table(schema), [])
            .with_context(|| format!("Failed to create table: {}", schema.name))?;

        for index_sql in generate_indexes(schema) {
            self.conn
                .execute(&index_sql, [])
                .with_context(|| format!("Failed to create index for: {}", schema.name))?;
        }

        Ok(())
    }

    /// Drop, recreate, and repopulate a relation in one transaction.
    /// Returns the number of rows written.
    pub fn rebuild_with_rows<T: TableRow>(&mut self, rows: &[T]) -> Result<u64> {
        let schema = T::SCHEMA;
        self.rebuild_table(schema)?;

        let insert_sql = generate_insert(schema);
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(&insert_sql)?;
            for row in rows {
                row.bind(&mut stmt)
                    .with_context(|| format!("Failed to bind row for {}", schema.name))?;
                stmt.raw_execute()
                    .with_context(|| format!("Failed to insert into {}", schema.name))?;
            }
        }
        tx.commit()?;

        Ok(rows.len() as u64)
    }

    /// Append rows to an existing relation (staging loads)
    pub fn append_rows<T: TableRow>(&mut self, rows: &[T]) -> Result<u64> {
        let schema = T::SCHEMA;
        let insert_sql = generate_insert(schema);
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(&insert_sql)?;
            for row in rows {
                row.bind(&mut stmt)
                    .with_context(|| format!("Failed to bind row for {}", schema.name))?;
                stmt.raw_execute()
                    .with_context(|| format!("Failed to insert into {}", schema.name))?;
            }
        }
        tx.commit()?;

        Ok(rows.len() as u64)
    }

    pub fn table_exists(&self, name: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Fatal precondition check: the relation must exist and carry every
    /// column the schema declares.
    pub fn require_table(&self, schema: &TableSchema) -> Result<()> {
        if !self.table_exists(schema.name)? {
            bail!("Required staging table is missing: {}", schema.name);
        }

        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info({})", schema.name))?;
        let present: HashSet<String> = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<rusqlite::Result<_>>()?;

        for col in schema.columns {
            if !present.contains(col.name) {
                bail!(
                    "Table {} is missing required column: {}",
                    schema.name,
                    col.name
                );
            }
        }

        Ok(())
    }

    pub fn count(&self, table: &str) -> Result<i64> {
        let count: i64 =
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                    row.get(0)
                })?;
        Ok(count)
    }
}
