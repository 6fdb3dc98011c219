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

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use maud::Markup;
use maud::PreEscaped;
use maud::html;

use crate::cmd::drill::state::MutableState;
use crate::cmd::drill::state::Notice;
use crate::cmd::drill::state::ServerState;
use crate::cmd::drill::template::page_template;
use crate::credential::load_credential;
use crate::deck::Selection;
use crate::markdown::markdown_to_html;
use crate::types::card::Card;

pub async fn get_handler(State(state): State<ServerState>) -> (StatusCode, Html<String>) {
    let has_credential = load_credential(&state.store).is_some();
    let mut mutable = state.lock();
    let notice = mutable.notice.take();
    let ai_notice = mutable.ai_notice.take();
    let body = html! {
        div.root {
            div.header {
                (render_category_select(&mutable))
                div.progress {
                    @if let Some(position) = mutable.deck.position() {
                        span #current { (position + 1) }
                        " / "
                        span #total { (mutable.deck.len()) }
                    }
                }
                div.mastered-count {
                    "Mastered: " span #mastered-count { (mutable.ledger.count()) }
                }
            }
            div.card-container {
                (render_card(&mutable))
            }
            div.controls {
                (render_controls(&mutable))
            }
            @if let Some(card) = mutable.deck.current() {
                (render_ai_panel(&mutable, card, has_credential, ai_notice.as_deref()))
            }
            (render_settings(has_credential, notice))
        }
    };
    let html = page_template(body);
    (StatusCode::OK, Html(html.into_string()))
}

fn render_category_select(mutable: &MutableState) -> Markup {
    let selection = mutable.deck.selection();
    html! {
        form #category-form action="/" method="post" {
            input type="hidden" name="action" value="Category";
            select #category-select name="category" {
                option value="all" selected[selection == Selection::All] { "All categories" }
                @for (index, category) in mutable.deck.categories().iter().enumerate() {
                    option value=(index) selected[selection == Selection::Category(index)] {
                        (format!("{} ({} cards)", category.name, category.cards.len()))
                    }
                }
            }
            input #switch type="submit" value="Switch";
        }
    }
}

fn render_card(mutable: &MutableState) -> Markup {
    let Some(card) = mutable.deck.current() else {
        let placeholder = match &mutable.load_error {
            Some(reason) => format!("Error loading flashcards: {reason}"),
            None => "No flashcards available".to_string(),
        };
        return html! {
            div #flashcard .card .empty {
                div.question { (placeholder) }
            }
        };
    };
    let mastered = mutable.ledger.contains(card.id());
    html! {
        div #flashcard .card .flipped[mutable.flipped] {
            div.card-header {
                span #category-name { (card.category()) }
                @if let Some(jeopardy_category) = card.jeopardy_category() {
                    span #jeopardy-category { "Jeopardy Category: " (jeopardy_category) }
                }
                @if mastered {
                    span.mastered-badge { "Mastered" }
                }
            }
            div.card-inner {
                div.card-front {
                    div #question .question { (card.question()) }
                    div.hint { "Click or press space to flip" }
                }
                div.card-back {
                    div #answer .answer { (card.html_answer()) }
                }
            }
        }
    }
}

fn render_controls(mutable: &MutableState) -> Markup {
    let deck = &mutable.deck;
    let mastered = deck
        .current()
        .is_none_or(|card| mutable.ledger.contains(card.id()));
    html! {
        form action="/" method="post" {
            input #prev type="submit" name="action" value="Prev" title="Previous card. Shortcut: left arrow." disabled[!deck.can_prev()];
            input #flip type="submit" name="action" value="Flip" title="Show the other side. Shortcut: space." disabled[deck.is_empty()];
            input #next type="submit" name="action" value="Next" title="Next card. Shortcut: right arrow." disabled[!deck.can_next()];
            div.spacer {}
            input #shuffle type="submit" name="action" value="Shuffle" title="Shuffle the current cards." disabled[deck.is_empty()];
            input #master type="submit" name="action" value="Master" title="Mark this card as mastered." disabled[mastered];
        }
    }
}

fn render_ai_panel(
    mutable: &MutableState,
    card: &Card,
    has_credential: bool,
    ai_notice: Option<&str>,
) -> Markup {
    let answer = mutable
        .ai_answer
        .as_ref()
        .filter(|answer| &answer.card_id == card.id());
    html! {
        div.ai-panel {
            h2 { "Ask AI" }
            p #ai-context-question { (card.question()) }
            @if !has_credential {
                p.ai-hint { "Save your OpenAI API key in settings to ask questions." }
            }
            form #ask-form action="/" method="post" {
                input type="hidden" name="action" value="Ask";
                textarea #ai-question-input name="question" placeholder="What would you like to know about this clue?" {}
                input #ask type="submit" value="Ask" disabled[mutable.ai_pending];
            }
            div #ai-loading .hidden[!mutable.ai_pending] { "Thinking..." }
            @if let Some(message) = ai_notice {
                p #ai-notice { (message) }
            }
            @if let Some(answer) = answer {
                p.ai-asked { "You asked: " (answer.question) }
                @match &answer.result {
                    Ok(text) => {
                        div #ai-response .rich-text { (PreEscaped(markdown_to_html(text))) }
                    }
                    Err(message) => {
                        div #ai-error { (message) }
                    }
                }
            }
        }
    }
}

fn render_settings(has_credential: bool, notice: Option<Notice>) -> Markup {
    html! {
        details #settings .settings open[notice.is_some()] {
            summary { "Settings" }
            form action="/" method="post" {
                label for="api-key-input" { "OpenAI API key" }
                input #api-key-input type="password" name="api_key" autocomplete="off" placeholder=(if has_credential { "API key is saved" } else { "sk-..." });
                button #toggle-api-key type="button" { "Show" }
                button #save-api-key type="submit" name="action" value="SaveKey" { "Save key" }
                button #clear-api-key type="submit" name="action" value="ClearKey" disabled[!has_credential] { "Clear key" }
            }
            @match &notice {
                Some(Notice::Success(message)) => {
                    p #api-key-status .success { (message) }
                }
                Some(Notice::Error(message)) => {
                    p #api-key-status .error { (message) }
                }
                None => {}
            }
            form action="/" method="post" {
                button #reset-mastery type="submit" name="action" value="ResetMastery" { "Reset mastered cards" }
                button #shutdown type="submit" name="action" value="Shutdown" { "Quit" }
            }
        }
    }
}
