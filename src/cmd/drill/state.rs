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
use std::sync::PoisonError;

use tokio::sync::oneshot;

use crate::ai::AiClient;
use crate::deck::Deck;
use crate::mastery::MasteryLedger;
use crate::store::Store;
use crate::types::card_id::CardId;

#[derive(Clone)]
pub struct ServerState {
    pub store: Store,
    pub ai: AiClient,
    pub mutable: Arc<Mutex<MutableState>>,
    pub shutdown_tx: Arc<Mutex<Option<oneshot::Sender<()>>>>,
}

impl ServerState {
    pub fn lock(&self) -> MutexGuard<'_, MutableState> {
        self.mutable.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct MutableState {
    pub deck: Deck,
    pub ledger: MasteryLedger,
    pub flipped: bool,
    /// Why the dataset could not be loaded, shown in place of the card.
    pub load_error: Option<String>,
    /// Whether an AI request is in flight.
    pub ai_pending: bool,
    pub ai_answer: Option<AiAnswer>,
    /// A one-shot message for the AI panel, such as a rejected second Ask.
    pub ai_notice: Option<String>,
    /// A one-shot message for the settings panel.
    pub notice: Option<Notice>,
}

impl MutableState {
    pub fn new(deck: Deck, ledger: MasteryLedger, load_error: Option<String>) -> Self {
        Self {
            deck,
            ledger,
            flipped: false,
            load_error,
            ai_pending: false,
            ai_answer: None,
            ai_notice: None,
            notice: None,
        }
    }

    /// Called after the current card changes.
    pub fn show_front(&mut self) {
        self.flipped = false;
    }
}

/// The outcome of the last AI request, kept with the card it was about.
pub struct AiAnswer {
    pub card_id: CardId,
    pub question: String,
    pub result: Result<String, String>,
}

pub enum Notice {
    Success(String),
    Error(String),
}

/// Clears the in-flight flag when dropped, so that every way out of an AI
/// request re-enables the Ask button.
pub struct PendingGuard {
    mutable: Arc<Mutex<MutableState>>,
}

impl PendingGuard {
    pub fn new(mutable: Arc<Mutex<MutableState>>) -> Self {
        Self { mutable }
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        let mut mutable = self.mutable.lock().unwrap_or_else(PoisonError::into_inner);
        mutable.ai_pending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fallible;

    #[test]
    fn test_pending_guard_clears_flag() -> Fallible<()> {
        let ledger = MasteryLedger::load(Store::in_memory()?);
        let mut state = MutableState::new(Deck::new(Vec::new()), ledger, None);
        state.ai_pending = true;
        let mutable = Arc::new(Mutex::new(state));
        {
            let _guard = PendingGuard::new(mutable.clone());
        }
        assert!(!mutable.lock().unwrap().ai_pending);
        Ok(())
    }
}
