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


use std::fmt::Display;
use std::fmt::Formatter;
use std::path::Path;

use clap::ValueEnum;
use serde::Serialize;

use crate::dataset::read_dataset;
use crate::error::Fallible;
use crate::mastery::MasteryLedger;
use crate::mastery::MasteryRecord;
use crate::store::Store;
use crate::types::card::Category;
use crate::types::timestamp::Timestamp;

#[derive(ValueEnum, Clone)]
pub enum StatsFormat {
    /// Plain text output.
    Text,
    /// JSON output.
    Json,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Text => write!(f, "text"),
            StatsFormat::Json => write!(f, "json"),
        }
    }
}

pub fn print_stats(dataset: &Path, db_path: &Path, format: StatsFormat) -> Fallible<()> {
    let categories = read_dataset(dataset)?;
    let ledger = MasteryLedger::load(Store::open(db_path)?);
    let stats = Stats::new(&categories, ledger.record());
    match format {
        StatsFormat::Text => print!("{}", stats.to_text()),
        StatsFormat::Json => {
            let stats_json = serde_json::to_string_pretty(&stats)?;
            println!("{}", stats_json);
        }
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    categories: Vec<CategoryStats>,
    card_count: usize,
    /// Every mastered id in the record, including ids of cards that are no
    /// longer in the dataset.
    mastered_count: usize,
    last_reset: Option<Timestamp>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CategoryStats {
    name: String,
    card_count: usize,
    mastered_count: usize,
}

impl Stats {
    fn new(categories: &[Category], record: &MasteryRecord) -> Self {
        let categories: Vec<CategoryStats> = categories
            .iter()
            .map(|category| CategoryStats {
                name: category.name.clone(),
                card_count: category.cards.len(),
                mastered_count: category
                    .cards
                    .iter()
                    .filter(|card| record.card_ids.contains(card.id()))
                    .count(),
            })
            .collect();
        Self {
            card_count: categories.iter().map(|c| c.card_count).sum(),
            categories,
            mastered_count: record.card_ids.len(),
            last_reset: record.last_reset,
        }
    }

    fn to_text(&self) -> String {
        let mut text = String::new();
        for category in &self.categories {
            text.push_str(&format!(
                "{}: {} cards, {} mastered\n",
                category.name, category.card_count, category.mastered_count
            ));
        }
        text.push_str(&format!("Total: {} cards\n", self.card_count));
        text.push_str(&format!("Mastered: {}\n", self.mastered_count));
        match self.last_reset {
            Some(ts) => text.push_str(&format!("Last reset: {ts}\n")),
            None => text.push_str("Last reset: never\n"),
        }
        text
    }
}
