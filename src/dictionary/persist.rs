//! Saving and restoring a dictionary with SQLite.
//!
//! The database has the following schema:
//!
//! ```sql
//! CREATE TABLE meta (name TEXT PRIMARY KEY, value INT);
//! CREATE TABLE entries (id INT PRIMARY KEY, frequency INT, first_seen_batch INT);
//! CREATE TABLE vertices (entry INT, vid INT, vlabel INT);
//! CREATE TABLE edges (entry INT, seq INT, src INT, dst INT, elabel INT);
//! ```
//!
//! Vertex ids are the local ids of each entry's representative pattern.

use super::{DictionaryEntry, PatternStore};
use crate::{
    error::{Error, Result},
    pattern::{canonicalize, Pattern},
};
use log::info;
use rusqlite::{params, Connection, OpenFlags};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

const SCHEMA: &str = "
DROP TABLE IF EXISTS meta;
DROP TABLE IF EXISTS entries;
DROP TABLE IF EXISTS vertices;
DROP TABLE IF EXISTS edges;
CREATE TABLE meta (name TEXT PRIMARY KEY, value INT NOT NULL);
CREATE TABLE entries (id INT PRIMARY KEY, frequency INT NOT NULL, first_seen_batch INT NOT NULL);
CREATE TABLE vertices (entry INT NOT NULL, vid INT NOT NULL, vlabel INT NOT NULL);
CREATE TABLE edges (entry INT NOT NULL, seq INT NOT NULL, src INT NOT NULL, dst INT NOT NULL, elabel INT NOT NULL);
";

/// A dictionary together with the run counters saved alongside it.
#[derive(Debug)]
pub struct SavedState {
    pub directed: bool,
    pub counters: BTreeMap<String, u64>,
    pub store: PatternStore,
}

/// Write `store` to the SQLite database at `path`, replacing any previous state.
pub fn save_state<P: AsRef<Path>>(
    path: P,
    store: &PatternStore,
    directed: bool,
    counters: &[(&str, u64)],
) -> Result<()> {
    let mut conn = Connection::open(path.as_ref())?;
    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA)?;
    tx.execute(
        "INSERT INTO meta (name, value) VALUES ('directed', ?1)",
        params![directed as i64],
    )?;
    for &(name, value) in counters {
        tx.execute(
            "INSERT INTO meta (name, value) VALUES (?1, ?2)",
            params![name, value as i64],
        )?;
    }
    for (id, entry) in store.snapshot().iter().enumerate() {
        let id = id as i64;
        tx.execute(
            "INSERT INTO entries (id, frequency, first_seen_batch) VALUES (?1, ?2, ?3)",
            params![id, entry.frequency() as i64, entry.first_seen_batch() as i64],
        )?;
        let pattern = entry.representative();
        for (vid, vlabel) in pattern.vertices() {
            tx.execute(
                "INSERT INTO vertices (entry, vid, vlabel) VALUES (?1, ?2, ?3)",
                params![id, vid as i64, vlabel],
            )?;
        }
        for (seq, &(src, dst, elabel)) in pattern.edge_list().iter().enumerate() {
            tx.execute(
                "INSERT INTO edges (entry, seq, src, dst, elabel) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, seq as i64, src as i64, dst as i64, elabel],
            )?;
        }
    }
    tx.commit()?;
    info!(
        "saved {} entries to {}",
        store.len(),
        path.as_ref().display()
    );
    Ok(())
}

/// Read back a dictionary written by [`save_state`].
///
/// The database is opened read-only; a missing file is an error.
pub fn load_state<P: AsRef<Path>>(path: P) -> Result<SavedState> {
    let conn = Connection::open_with_flags(path.as_ref(), OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    let mut counters = BTreeMap::new();
    let mut directed = false;
    {
        let mut stmt = conn.prepare("SELECT name, value FROM meta")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        for row in rows {
            let (name, value) = row?;
            if name == "directed" {
                directed = value != 0;
            } else {
                counters.insert(name, value as u64);
            }
        }
    }
    let mut store = PatternStore::new();
    let mut entries_stmt =
        conn.prepare("SELECT id, frequency, first_seen_batch FROM entries ORDER BY id")?;
    let mut vertices_stmt =
        conn.prepare("SELECT vlabel FROM vertices WHERE entry = ?1 ORDER BY vid")?;
    let mut edges_stmt =
        conn.prepare("SELECT src, dst, elabel FROM edges WHERE entry = ?1 ORDER BY seq")?;
    let entries = entries_stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    for (id, frequency, first_seen_batch) in entries {
        let mut pattern = Pattern::new(directed);
        for vlabel in vertices_stmt.query_map(params![id], |row| row.get(0))? {
            pattern.add_vertex(vlabel?);
        }
        for edge in edges_stmt.query_map(params![id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get(2)?,
            ))
        })? {
            let (src, dst, elabel) = edge?;
            if !pattern.add_edge(src as usize, dst as usize, elabel) {
                return Err(Error::CorruptState(format!(
                    "entry {} has an invalid edge ({}, {}, {})",
                    id, src, dst, elabel
                )));
            }
        }
        if pattern.is_empty() || !pattern.is_connected() {
            return Err(Error::CorruptState(format!(
                "entry {} is not a connected pattern",
                id
            )));
        }
        store.insert_entry(DictionaryEntry::new(
            canonicalize(&pattern),
            Arc::new(pattern),
            frequency as u64,
            first_seen_batch as u64,
        ));
    }
    info!(
        "loaded {} entries from {}",
        store.len(),
        path.as_ref().display()
    );
    Ok(SavedState {
        directed,
        counters,
        store,
    })
}
