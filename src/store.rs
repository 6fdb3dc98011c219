// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Transaction;

use crate::error::ErrorReport;
use crate::error::Fallible;

/// A persistent string key-value store backed by SQLite. Values are
/// overwritten on write and survive restarts.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    pub fn open(database_path: &Path) -> Fallible<Self> {
        log::debug!("Opening store at {}", database_path.display());
        let conn = Connection::open(database_path)?;
        Self::from_connection(conn)
    }

    #[cfg(test)]
    pub fn in_memory() -> Fallible<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(mut conn: Connection) -> Fallible<Self> {
        {
            let tx = conn.transaction()?;
            if !probe_schema_exists(&tx)? {
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn get(&self, key: &str) -> Fallible<Option<String>> {
        let conn = self.acquire()?;
        let sql = "select value from kv where key = ?;";
        let value: Option<String> = conn
            .query_row(sql, [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    pub fn set(&self, key: &str, value: &str) -> Fallible<()> {
        let conn = self.acquire()?;
        let sql = "insert into kv (key, value) values (?, ?) on conflict (key) do update set value = excluded.value;";
        conn.execute(sql, (key, value))?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Fallible<()> {
        let conn = self.acquire()?;
        conn.execute("delete from kv where key = ?;", [key])?;
        Ok(())
    }

    fn acquire(&self) -> Fallible<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| ErrorReport::new("store connection lock is poisoned"))
    }
}

fn probe_schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["kv"], |row| row.get(0))?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_get_missing() -> Fallible<()> {
        let store = Store::in_memory()?;
        assert_eq!(store.get("missing")?, None);
        Ok(())
    }

    #[test]
    fn test_set_overwrites() -> Fallible<()> {
        let store = Store::in_memory()?;
        store.set("k", "one")?;
        store.set("k", "two")?;
        assert_eq!(store.get("k")?, Some("two".to_string()));
        Ok(())
    }

    #[test]
    fn test_remove() -> Fallible<()> {
        let store = Store::in_memory()?;
        store.set("k", "v")?;
        store.remove("k")?;
        assert_eq!(store.get("k")?, None);
        // Removing an absent key is fine.
        store.remove("k")?;
        Ok(())
    }

    #[test]
    fn test_survives_reopen() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join("triviadeck.db");
        {
            let store = Store::open(&path)?;
            store.set("k", "v")?;
        }
        let store = Store::open(&path)?;
        assert_eq!(store.get("k")?, Some("v".to_string()));
        Ok(())
    }
}
