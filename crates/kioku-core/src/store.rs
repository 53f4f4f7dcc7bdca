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

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::error::Fallible;
use crate::types::card::Card;
use crate::types::card_key::CardKey;

/// Persistence for cards, keyed by item and practice mode. Implementations
/// must serialize updates to the same key.
pub trait CardStore {
    /// The stored card, or `None` if the item has never been reviewed.
    fn get(&self, key: &CardKey) -> Fallible<Option<Card>>;

    /// Insert or replace the card stored under `key`.
    fn upsert(&self, key: &CardKey, card: &Card) -> Fallible<()>;
}

/// A card store that lives only as long as the process.
#[derive(Default)]
pub struct MemoryCardStore {
    cards: Mutex<HashMap<CardKey, Card>>,
}

impl MemoryCardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.acquire().len()
    }

    pub fn is_empty(&self) -> bool {
        self.acquire().is_empty()
    }

    fn acquire(&self) -> MutexGuard<'_, HashMap<CardKey, Card>> {
        self.cards.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CardStore for MemoryCardStore {
    fn get(&self, key: &CardKey) -> Fallible<Option<Card>> {
        Ok(self.acquire().get(key).cloned())
    }

    fn upsert(&self, key: &CardKey, card: &Card) -> Fallible<()> {
        self.acquire().insert(*key, card.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;
    use crate::scheduler::Scheduler;
    use crate::types::rating::Rating;
    use crate::types::timestamp::Timestamp;

    #[test]
    fn test_missing_card() -> Fallible<()> {
        let store = MemoryCardStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get(&CardKey::new("火", "meaning"))?, None);
        Ok(())
    }

    #[test]
    fn test_upsert_replaces() -> Fallible<()> {
        let store = MemoryCardStore::new();
        let key = CardKey::new("火", "meaning");
        let scheduler = Scheduler::default();
        let now = Timestamp::new(Utc.with_ymd_and_hms(2022, 11, 29, 12, 30, 0).unwrap());

        let first = scheduler.review(&Card::new(), Rating::Good, now);
        store.upsert(&key, &first)?;
        assert_eq!(store.get(&key)?, Some(first.clone()));

        let second = scheduler.review(&first, Rating::Good, now + first.interval());
        store.upsert(&key, &second)?;
        assert_eq!(store.get(&key)?, Some(second));
        assert_eq!(store.len(), 1);
        Ok(())
    }

    #[test]
    fn test_keys_are_separate() -> Fallible<()> {
        let store = MemoryCardStore::new();
        store.upsert(&CardKey::new("火", "meaning"), &Card::new())?;
        assert_eq!(store.get(&CardKey::new("火", "reading"))?, None);
        Ok(())
    }
}
