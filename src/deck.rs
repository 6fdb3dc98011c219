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

use rand::Rng;

use crate::dataset::DeckError;
use crate::dataset::flatten;
use crate::dataset::select_category;
use crate::types::card::Card;
use crate::types::card::Category;

/// Which part of the dataset the working set was built from.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Selection {
    All,
    Category(usize),
}

/// The outcome of a navigation command.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Navigation {
    Moved,
    /// Already at the first card (or the working set is empty).
    AtStart,
    /// Already at the last card (or the working set is empty).
    AtEnd,
}

/// The study session's deck: the working set of cards being navigated and
/// the cursor into it.
///
/// The working set is rebuilt, never edited, on every category switch, and
/// permuted in place on shuffle. Whenever it is non-empty, `index` points
/// at a card in it.
pub struct Deck {
    categories: Vec<Category>,
    working: Vec<Card>,
    index: usize,
    selection: Selection,
}

impl Deck {
    /// Create a deck over the given dataset, with every card in the working
    /// set.
    pub fn new(categories: Vec<Category>) -> Self {
        let mut deck = Self {
            categories,
            working: Vec::new(),
            index: 0,
            selection: Selection::All,
        };
        deck.load_all();
        deck
    }

    pub fn load_all(&mut self) {
        self.working = flatten(&self.categories);
        self.index = 0;
        self.selection = Selection::All;
    }

    /// Replace the working set with the cards of one category. On error the
    /// deck is left as it was.
    pub fn load_category(&mut self, index: usize) -> Result<(), DeckError> {
        let cards = select_category(&self.categories, index)?;
        self.working = cards;
        self.index = 0;
        self.selection = Selection::Category(index);
        Ok(())
    }

    /// Fisher-Yates shuffle of the working set, then rewind to the first
    /// card.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        for i in (1..self.working.len()).rev() {
            let j = rng.random_range(0..=i);
            self.working.swap(i, j);
        }
        self.index = 0;
    }

    pub fn next(&mut self) -> Navigation {
        if self.can_next() {
            self.index += 1;
            Navigation::Moved
        } else {
            Navigation::AtEnd
        }
    }

    pub fn prev(&mut self) -> Navigation {
        if self.can_prev() {
            self.index -= 1;
            Navigation::Moved
        } else {
            Navigation::AtStart
        }
    }

    pub fn current(&self) -> Option<&Card> {
        self.working.get(self.index)
    }

    /// The zero-based position of the current card, if there is one.
    pub fn position(&self) -> Option<usize> {
        if self.working.is_empty() {
            None
        } else {
            Some(self.index)
        }
    }

    pub fn can_next(&self) -> bool {
        self.index + 1 < self.working.len()
    }

    pub fn can_prev(&self) -> bool {
        self.index > 0
    }

    pub fn len(&self) -> usize {
        self.working.len()
    }

    pub fn is_empty(&self) -> bool {
        self.working.is_empty()
    }

    #[cfg(test)]
    pub fn cards(&self) -> &[Card] {
        &self.working
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }
}
