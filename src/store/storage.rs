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

#[cfg(test)]
use std::collections::HashMap;
use std::path::Path;

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Transaction;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::types::timestamp::Timestamp;

/// A persisted key-value store of whole documents. Writes replace the
/// previous value; there are no partial updates.
pub trait Storage {
    fn get(&self, key: &str) -> Fallible<Option<Vec<u8>>>;

    fn set(&mut self, key: &str, value: &[u8]) -> Fallible<()>;

    fn remove(&mut self, key: &str) -> Fallible<()>;
}

/// Storage that lives and dies with the process.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStorage {
    documents: HashMap<String, Vec<u8>>,
}

#[cfg(test)]
impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Fallible<Option<Vec<u8>>> {
        Ok(self.documents.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Fallible<()> {
        self.documents.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Fallible<()> {
        self.documents.remove(key);
        Ok(())
    }
}

/// Documents stored in a single SQLite table.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    pub fn open(database_path: &Path) -> Fallible<Self> {
        let database_path: &str = database_path
            .to_str()
            .ok_or_else(|| ErrorReport::new("invalid path"))?;
        let mut conn = Connection::open(database_path)?;
        {
            let tx = conn.transaction()?;
            if !probe_schema_exists(&tx)? {
                log::debug!("Creating storage schema in {database_path}");
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        Ok(Self { conn })
    }
}

impl Storage for SqliteStorage {
    fn get(&self, key: &str) -> Fallible<Option<Vec<u8>>> {
        let sql = "select value from documents where key = ?;";
        let value: Option<Vec<u8>> = self
            .conn
            .query_row(sql, [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Fallible<()> {
        let tx = self.conn.transaction()?;
        let sql = "insert into documents (key, value, updated_at) values (?, ?, ?) on conflict (key) do update set value = excluded.value, updated_at = excluded.updated_at;";
        tx.execute(sql, (key, value, Timestamp::now()))?;
        tx.commit()?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Fallible<()> {
        self.conn.execute("delete from documents where key = ?;", [key])?;
        Ok(())
    }
}

fn probe_schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["documents"], |row| row.get(0))?;
    Ok(count > 0)
}
