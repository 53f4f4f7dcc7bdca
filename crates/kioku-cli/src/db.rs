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

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use chrono::TimeDelta;
use kioku_core::Card;
use kioku_core::CardKey;
use kioku_core::CardParams;
use kioku_core::CardStatus;
use kioku_core::CardStore;
use kioku_core::MemoryState;
use kioku_core::Timestamp;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Transaction;
use rusqlite::TransactionBehavior;

use crate::error::Fallible;
use crate::error::fail;

/// A SQLite-backed card store.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn new(database_path: &str) -> Fallible<Self> {
        let mut conn = Connection::open(database_path)?;
        {
            let tx = conn.transaction()?;
            if !probe_schema_exists(&tx)? {
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        let conn = Arc::new(Mutex::new(conn));
        Ok(Self { conn })
    }

    /// Return the number of cards in the database.
    #[cfg(test)]
    pub fn card_count(&self) -> Fallible<usize> {
        let conn = self.acquire();
        let count: i64 = conn.query_row("select count(*) from cards;", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn load(&self, key: &CardKey) -> Fallible<Option<Card>> {
        let conn = self.acquire();
        load_card(&conn, key)
    }

    fn store(&self, key: &CardKey, card: &Card) -> Fallible<()> {
        log::debug!("Saving card {key} with status {}", card.status());
        let row = CardRow::from_card(card);
        let mut conn = self.acquire();
        let tx = conn.transaction()?;
        upsert_card(&tx, key, &row)?;
        tx.commit()?;
        Ok(())
    }

    /// Read a card, compute its successor, and write it back inside a single
    /// immediate transaction. The write lock is taken before the read, so
    /// concurrent updates of the same card are serialized. Nothing is written
    /// if `f` fails.
    pub fn update<F>(&self, key: &CardKey, f: F) -> Fallible<Card>
    where
        F: FnOnce(Option<Card>) -> Fallible<Card>,
    {
        let mut conn = self.acquire();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let current = load_card(&tx, key)?;
        let next = f(current)?;
        log::debug!("Saving card {key} with status {}", next.status());
        upsert_card(&tx, key, &CardRow::from_card(&next))?;
        tx.commit()?;
        Ok(next)
    }

    fn acquire(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CardStore for Database {
    fn get(&self, key: &CardKey) -> kioku_core::Fallible<Option<Card>> {
        log::debug!("Loading card {key}");
        self.load(key)
            .map_err(|e| kioku_core::ErrorReport::new(e.message()))
    }

    fn upsert(&self, key: &CardKey, card: &Card) -> kioku_core::Fallible<()> {
        self.store(key, card)
            .map_err(|e| kioku_core::ErrorReport::new(e.message()))
    }
}

fn load_card(conn: &Connection, key: &CardKey) -> Fallible<Option<Card>> {
    let sql = "select status, difficulty, stability, review_time, interval_ms, lapses, repeats from cards where card_key = ?;";
    let row = conn
        .query_row(sql, [key.to_hex()], |row| {
            Ok(CardRow {
                status: row.get(0)?,
                difficulty: row.get(1)?,
                stability: row.get(2)?,
                review_time: row.get(3)?,
                interval_ms: row.get(4)?,
                lapses: row.get(5)?,
                repeats: row.get(6)?,
            })
        })
        .optional()?;
    match row {
        Some(row) => Ok(Some(row.into_card()?)),
        None => Ok(None),
    }
}

/// A card as it is laid out in the `cards` table. SQLite stores a NaN
/// `REAL` as `NULL`, so a reviewed card with a null stability reads back
/// as NaN.
struct CardRow {
    status: String,
    difficulty: Option<f64>,
    stability: Option<f64>,
    review_time: Option<String>,
    interval_ms: i64,
    lapses: u32,
    repeats: u32,
}

impl CardRow {
    fn from_card(card: &Card) -> Self {
        let (difficulty, stability, review_time) = match card.params() {
            CardParams::New => (None, None, None),
            CardParams::Existing(state) => (
                Some(state.difficulty),
                Some(state.stability),
                Some(state.review_time.to_rfc3339()),
            ),
        };
        Self {
            status: card.status().as_str().to_string(),
            difficulty,
            stability,
            review_time,
            interval_ms: card.interval().num_milliseconds(),
            lapses: card.lapses(),
            repeats: card.repeats(),
        }
    }

    fn into_card(self) -> Fallible<Card> {
        let status = CardStatus::try_from(self.status)?;
        let params = match (self.difficulty, self.stability, self.review_time) {
            (None, None, None) => CardParams::New,
            (Some(difficulty), Some(stability), Some(review_time)) => {
                CardParams::Existing(MemoryState {
                    difficulty,
                    stability,
                    review_time: Timestamp::parse_rfc3339(&review_time)?,
                })
            }
            (Some(difficulty), None, Some(review_time)) => CardParams::Existing(MemoryState {
                difficulty,
                stability: f64::NAN,
                review_time: Timestamp::parse_rfc3339(&review_time)?,
            }),
            _ => return fail("card record has incomplete memory parameters."),
        };
        let card = Card::from_parts(
            params,
            status,
            TimeDelta::milliseconds(self.interval_ms),
            self.lapses,
            self.repeats,
        )?;
        Ok(card)
    }
}

fn upsert_card(tx: &Transaction, key: &CardKey, row: &CardRow) -> Fallible<()> {
    let sql = "insert into cards (card_key, status, difficulty, stability, review_time, interval_ms, lapses, repeats) values (?, ?, ?, ?, ?, ?, ?, ?) on conflict (card_key) do update set status = excluded.status, difficulty = excluded.difficulty, stability = excluded.stability, review_time = excluded.review_time, interval_ms = excluded.interval_ms, lapses = excluded.lapses, repeats = excluded.repeats;";
    tx.execute(
        sql,
        (
            key.to_hex(),
            &row.status,
            row.difficulty,
            row.stability,
            &row.review_time,
            row.interval_ms,
            row.lapses,
            row.repeats,
        ),
    )?;
    Ok(())
}

fn probe_schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["cards"], |row| row.get(0))?;
    Ok(count > 0)
}
