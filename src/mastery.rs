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

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::error::Fallible;
use crate::store::Store;
use crate::types::card_id::CardId;
use crate::types::timestamp::Timestamp;

/// The store key holding the serialized [`MasteryRecord`].
pub const MASTERY_KEY: &str = "triviadeck-mastered-cards";

/// The set of cards the user has marked as known.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryRecord {
    #[serde(default)]
    pub card_ids: BTreeSet<CardId>,
    #[serde(default)]
    pub last_reset: Option<Timestamp>,
}

/// The mastery record together with the store it is persisted to. Every
/// change is written through immediately.
pub struct MasteryLedger {
    store: Store,
    record: MasteryRecord,
}

impl MasteryLedger {
    /// Load the persisted record. A missing, unreadable, or corrupt record
    /// is treated as an empty one.
    pub fn load(store: Store) -> Self {
        let record = match store.get(MASTERY_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<MasteryRecord>(&json) {
                Ok(record) => record,
                Err(e) => {
                    log::warn!("Ignoring corrupt mastery record: {e}");
                    MasteryRecord::default()
                }
            },
            Ok(None) => MasteryRecord::default(),
            Err(e) => {
                log::warn!("Could not read mastery record: {e}");
                MasteryRecord::default()
            }
        };
        log::debug!("Loaded {} mastered cards.", record.card_ids.len());
        Self { store, record }
    }

    /// Mark a card as mastered. Returns whether it was newly added; marking
    /// a card twice changes nothing.
    pub fn mark_mastered(&mut self, id: CardId) -> Fallible<bool> {
        if self.record.card_ids.contains(&id) {
            return Ok(false);
        }
        log::debug!("Marking {id} as mastered");
        self.record.card_ids.insert(id);
        self.persist()?;
        Ok(true)
    }

    /// Forget every mastered card and stamp the reset time.
    pub fn reset(&mut self) -> Fallible<()> {
        self.record = MasteryRecord {
            card_ids: BTreeSet::new(),
            last_reset: Some(Timestamp::now()),
        };
        self.persist()
    }

    pub fn count(&self) -> usize {
        self.record.card_ids.len()
    }

    pub fn contains(&self, id: &CardId) -> bool {
        self.record.card_ids.contains(id)
    }

    pub fn record(&self) -> &MasteryRecord {
        &self.record
    }

    fn persist(&self) -> Fallible<()> {
        let json = serde_json::to_string(&self.record)?;
        self.store.set(MASTERY_KEY, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::card_id::identify;

    #[test]
    fn test_load_absent() -> Fallible<()> {
        let ledger = MasteryLedger::load(Store::in_memory()?);
        assert_eq!(ledger.count(), 0);
        assert_eq!(ledger.record(), &MasteryRecord::default());
        Ok(())
    }

    #[test]
    fn test_load_corrupt() -> Fallible<()> {
        let store = Store::in_memory()?;
        store.set(MASTERY_KEY, "{not json")?;
        let ledger = MasteryLedger::load(store);
        assert_eq!(ledger.count(), 0);
        assert_eq!(ledger.record().last_reset, None);
        Ok(())
    }

    #[test]
    fn test_load_browser_format() -> Fallible<()> {
        let store = Store::in_memory()?;
        store.set(
            MASTERY_KEY,
            r#"{"cardIds":["card-22yv","card-3g"],"lastReset":"2025-01-02T03:04:05.000Z"}"#,
        )?;
        let ledger = MasteryLedger::load(store);
        assert_eq!(ledger.count(), 2);
        assert!(ledger.contains(&identify("a", "b")));
        assert!(ledger.record().last_reset.is_some());
        Ok(())
    }

    #[test]
    fn test_mark_mastered_is_idempotent() -> Fallible<()> {
        let mut ledger = MasteryLedger::load(Store::in_memory()?);
        let id = identify("a", "b");
        assert!(ledger.mark_mastered(id.clone())?);
        let once = ledger.record().clone();
        assert!(!ledger.mark_mastered(id.clone())?);
        assert_eq!(ledger.record(), &once);
        assert_eq!(ledger.count(), 1);
        Ok(())
    }

    #[test]
    fn test_mark_mastered_persists() -> Fallible<()> {
        let store = Store::in_memory()?;
        let mut ledger = MasteryLedger::load(store.clone());
        ledger.mark_mastered(CardId::from_raw("card-x"))?;
        let reloaded = MasteryLedger::load(store.clone());
        assert!(reloaded.contains(&CardId::from_raw("card-x")));
        let json = store.get(MASTERY_KEY)?.unwrap();
        assert_eq!(json, r#"{"cardIds":["card-x"],"lastReset":null}"#);
        Ok(())
    }

    #[test]
    fn test_reset() -> Fallible<()> {
        let store = Store::in_memory()?;
        let mut ledger = MasteryLedger::load(store.clone());
        ledger.mark_mastered(identify("a", "b"))?;
        ledger.mark_mastered(identify("c", "d"))?;
        let before = Timestamp::now();
        ledger.reset()?;
        assert_eq!(ledger.count(), 0);
        let last_reset = ledger.record().last_reset.unwrap();
        assert!(last_reset >= before);
        let reloaded = MasteryLedger::load(store);
        assert_eq!(reloaded.count(), 0);
        assert!(reloaded.record().last_reset.is_some());
        Ok(())
    }
}
