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

use std::sync::PoisonError;

use axum::Form;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use maud::html;
use serde::Deserialize;

use crate::cmd::drill::state::AiAnswer;
use crate::cmd::drill::state::Notice;
use crate::cmd::drill::state::PendingGuard;
use crate::cmd::drill::state::ServerState;
use crate::cmd::drill::template::page_template;
use crate::credential::clear_credential;
use crate::credential::load_credential;
use crate::credential::save_credential;
use crate::deck::Navigation;
use crate::deck::Selection;
use crate::error::Fallible;
use crate::error::fail;

#[derive(Debug, Deserialize)]
enum Action {
    Flip,
    Next,
    Prev,
    Shuffle,
    Category,
    Master,
    ResetMastery,
    SaveKey,
    ClearKey,
    Ask,
    Shutdown,
}

#[derive(Deserialize)]
pub struct FormData {
    action: Action,
    category: Option<String>,
    api_key: Option<String>,
    question: Option<String>,
}

pub async fn post_handler(State(state): State<ServerState>, Form(form): Form<FormData>) -> Response {
    let FormData {
        action,
        category,
        api_key,
        question,
    } = form;
    match action {
        Action::Shutdown => return shutdown(&state).into_response(),
        Action::Ask => {
            // Shown next to the Ask form rather than in the settings panel.
            if let Err(e) = ask(&state, question.unwrap_or_default()).await {
                log::error!("{e}");
                state.lock().ai_notice = Some(e.message().to_string());
            }
        }
        action => {
            let result = match action {
                Action::SaveKey => save_key(&state, api_key.unwrap_or_default()),
                action => action_handler(&state, action, category),
            };
            if let Err(e) = result {
                log::error!("{e}");
                state.lock().notice = Some(Notice::Error(e.message().to_string()));
            }
        }
    }
    Redirect::to("/").into_response()
}

fn action_handler(state: &ServerState, action: Action, category: Option<String>) -> Fallible<()> {
    let mut mutable = state.lock();
    match action {
        Action::Flip => {
            if !mutable.deck.is_empty() {
                mutable.flipped = !mutable.flipped;
            }
        }
        Action::Next | Action::Prev => {
            let navigation = match action {
                Action::Next => mutable.deck.next(),
                _ => mutable.deck.prev(),
            };
            match navigation {
                Navigation::Moved => mutable.show_front(),
                boundary => log::debug!("Ignoring {action:?}: {boundary:?}"),
            }
        }
        Action::Shuffle => {
            mutable.deck.shuffle(&mut rand::rng());
            mutable.show_front();
        }
        Action::Category => {
            let raw = category.unwrap_or_default();
            match parse_selection(&raw)? {
                Selection::All => mutable.deck.load_all(),
                Selection::Category(index) => mutable.deck.load_category(index)?,
            }
            mutable.show_front();
        }
        Action::Master => {
            let Some(id) = mutable.deck.current().map(|card| card.id().clone()) else {
                return fail("there is no card to mark as mastered.");
            };
            mutable.ledger.mark_mastered(id)?;
        }
        Action::ResetMastery => {
            mutable.ledger.reset()?;
            log::debug!("Mastery record reset");
        }
        Action::ClearKey => {
            clear_credential(&state.store)?;
            mutable.notice = Some(Notice::Success("API key cleared".to_string()));
        }
        Action::SaveKey | Action::Ask | Action::Shutdown => {
            return fail(format!("{action:?} is not handled synchronously."));
        }
    }
    Ok(())
}

fn save_key(state: &ServerState, api_key: String) -> Fallible<()> {
    save_credential(&state.store, &api_key)?;
    state.lock().notice = Some(Notice::Success("API key saved successfully!".to_string()));
    Ok(())
}

/// Decode the `category` form field: `all` or a category index.
fn parse_selection(raw: &str) -> Fallible<Selection> {
    if raw == "all" {
        return Ok(Selection::All);
    }
    match raw.parse::<usize>() {
        Ok(index) => Ok(Selection::Category(index)),
        Err(_) => fail(format!("invalid category selection: {raw:?}")),
    }
}

/// Ask the AI about the current card. The state lock is only held to read
/// the card and to store the outcome, never across the request.
async fn ask(state: &ServerState, question: String) -> Fallible<()> {
    let credential = load_credential(&state.store);
    let card = {
        let mut mutable = state.lock();
        if mutable.ai_pending {
            return fail("A question is already being answered. Please wait.");
        }
        let Some(card) = mutable.deck.current().cloned() else {
            return fail("There is no card to ask about.");
        };
        mutable.ai_pending = true;
        card
    };
    let _pending = PendingGuard::new(state.mutable.clone());
    let result = state.ai.ask(credential.as_deref(), &card, &question).await;
    if let Err(e) = &result {
        log::error!("AI request about {} failed: {e}", card.id());
    }
    let mut mutable = state.lock();
    mutable.ai_answer = Some(AiAnswer {
        card_id: card.id().clone(),
        question: question.trim().to_string(),
        result: result.map_err(|e| e.to_string()),
    });
    Ok(())
}

fn shutdown(state: &ServerState) -> (StatusCode, Html<String>) {
    let sender = state
        .shutdown_tx
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
    match sender {
        Some(tx) => {
            log::debug!("Shutting down");
            let _ = tx.send(());
        }
        None => log::debug!("Shutdown already requested"),
    }
    let body = html! {
        div.root {
            div.finished {
                h1 { "Session Ended" }
                p { "The server has stopped. You can close this tab." }
            }
        }
    };
    (StatusCode::OK, Html(page_template(body).into_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selection() -> Fallible<()> {
        assert_eq!(parse_selection("all")?, Selection::All);
        assert_eq!(parse_selection("0")?, Selection::Category(0));
        assert_eq!(parse_selection("12")?, Selection::Category(12));
        Ok(())
    }

    #[test]
    fn test_parse_selection_invalid() {
        for raw in ["", "All", "-1", "one"] {
            assert!(parse_selection(raw).is_err(), "accepted {raw:?}");
        }
    }
}
