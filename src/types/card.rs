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

use maud::Markup;

use crate::format::format_answer;
use crate::types::card_id::CardId;
use crate::types::card_id::identify;

#[derive(Clone, PartialEq, Debug)]
pub struct Card {
    /// The clue shown on the front of the card.
    question: String,
    /// The answer on the back. May span several lines and contain bullets.
    answer: String,
    /// The name of the category this card was loaded from.
    category: String,
    /// The category the clue had on the show, if known.
    jeopardy_category: Option<String>,
    /// The cached identifier of the card's content.
    id: CardId,
}

impl Card {
    pub fn new(
        question: impl Into<String>,
        answer: impl Into<String>,
        category: impl Into<String>,
        jeopardy_category: Option<String>,
    ) -> Self {
        let question = question.into();
        let answer = answer.into();
        let id = identify(&question, &answer);
        Self {
            question,
            answer,
            category: category.into(),
            jeopardy_category,
            id,
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn jeopardy_category(&self) -> Option<&str> {
        self.jeopardy_category.as_deref()
    }

    pub fn id(&self) -> &CardId {
        &self.id
    }

    /// A copy of this card filed under another category.
    pub fn with_category(&self, category: &str) -> Self {
        Self {
            category: category.to_string(),
            ..self.clone()
        }
    }

    pub fn html_answer(&self) -> Markup {
        format_answer(&self.answer)
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Category {
    pub name: String,
    pub cards: Vec<Card>,
}
