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

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fs::read_to_string;
use std::path::Path;

use serde::Deserialize;

use crate::error::ErrorReport;
use crate::types::card::Card;
use crate::types::card::Category;

#[derive(Debug, PartialEq)]
pub enum DeckError {
    /// The dataset does not have the `categories`/`flashcards` shape.
    MalformedDataset(String),
    /// A category index that does not name a category.
    IndexOutOfRange { index: usize, len: usize },
}

impl Display for DeckError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DeckError::MalformedDataset(reason) => write!(f, "malformed dataset: {reason}"),
            DeckError::IndexOutOfRange { index, len } => write!(
                f,
                "category index {index} is out of range (there are {len} categories)"
            ),
        }
    }
}

impl Error for DeckError {}

impl From<DeckError> for ErrorReport {
    fn from(value: DeckError) -> Self {
        ErrorReport::new(value.to_string())
    }
}

#[derive(Deserialize)]
struct RawDataset {
    categories: Vec<RawCategory>,
}

#[derive(Deserialize)]
struct RawCategory {
    name: String,
    flashcards: Vec<RawCard>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCard {
    question: String,
    answer: String,
    #[serde(default)]
    jeopardy_category: Option<String>,
}

/// Parse a dataset of the form
/// `{ "categories": [ { "name", "flashcards": [ { "question", "answer", "jeopardyCategory"? } ] } ] }`.
pub fn load_dataset(raw: &str) -> Result<Vec<Category>, DeckError> {
    let dataset: RawDataset =
        serde_json::from_str(raw).map_err(|e| DeckError::MalformedDataset(e.to_string()))?;
    let categories = dataset
        .categories
        .into_iter()
        .map(|category| {
            let cards = category
                .flashcards
                .into_iter()
                .map(|card| {
                    Card::new(
                        card.question,
                        card.answer,
                        category.name.as_str(),
                        card.jeopardy_category,
                    )
                })
                .collect();
            Category {
                name: category.name,
                cards,
            }
        })
        .collect();
    Ok(categories)
}

/// Read and parse a dataset file.
pub fn read_dataset(path: &Path) -> Result<Vec<Category>, DeckError> {
    log::debug!("Reading dataset from {}", path.display());
    let raw = read_to_string(path)
        .map_err(|e| DeckError::MalformedDataset(format!("{}: {e}", path.display())))?;
    load_dataset(&raw)
}

/// Every card in the dataset, category by category, tagged with its
/// category's name.
pub fn flatten(categories: &[Category]) -> Vec<Card> {
    categories.iter().flat_map(tagged).collect()
}

/// The cards of a single category, in their original order.
pub fn select_category(categories: &[Category], index: usize) -> Result<Vec<Card>, DeckError> {
    match categories.get(index) {
        Some(category) => Ok(tagged(category)),
        None => Err(DeckError::IndexOutOfRange {
            index,
            len: categories.len(),
        }),
    }
}

fn tagged(category: &Category) -> Vec<Card> {
    category
        .cards
        .iter()
        .map(|card| card.with_category(&category.name))
        .collect()
}
