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


use std::path::Path;
use std::path::PathBuf;

use clap::Parser;

use crate::cmd::check::check_dataset;
use crate::cmd::drill::server::DrillOptions;
use crate::cmd::drill::server::start_server;
use crate::cmd::forget::forget_mastery;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_stats;
use crate::config::CONFIG_FILE_NAME;
use crate::config::Config;
use crate::error::Fallible;

const DEFAULT_DATASET: &str = "flashcards.json";
const DEFAULT_DB_NAME: &str = "triviadeck.db";

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Study a dataset in the browser.
    Drill {
        /// Path to the dataset. Defaults to `flashcards.json`.
        dataset: Option<String>,
        /// Port to serve on.
        #[arg(long)]
        port: Option<u16>,
        /// Path to the database. Defaults to `triviadeck.db` next to the dataset.
        #[arg(long)]
        db: Option<String>,
        /// Path to the configuration file. Defaults to `triviadeck.toml` next to the dataset.
        #[arg(long)]
        config: Option<String>,
        /// Keep the dataset order at startup.
        #[arg(long)]
        no_shuffle: bool,
        /// Don't open the browser.
        #[arg(long)]
        no_open: bool,
    },
    /// Check that a dataset is well-formed.
    Check {
        /// Path to the dataset. Defaults to `flashcards.json`.
        dataset: Option<String>,
    },
    /// Print dataset and mastery statistics.
    Stats {
        /// Path to the dataset. Defaults to `flashcards.json`.
        dataset: Option<String>,
        /// Which output format to use.
        #[arg(long, default_value_t = StatsFormat::Text)]
        format: StatsFormat,
        /// Path to the database. Defaults to `triviadeck.db` next to the dataset.
        #[arg(long)]
        db: Option<String>,
    },
    /// Forget every mastered card.
    Forget {
        /// Path to the dataset. Defaults to `flashcards.json`.
        dataset: Option<String>,
        /// Path to the database. Defaults to `triviadeck.db` next to the dataset.
        #[arg(long)]
        db: Option<String>,
    },
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Drill {
            dataset,
            port,
            db,
            config,
            no_shuffle,
            no_open,
        } => {
            let dataset = dataset_path(dataset);
            let config_path = config
                .map(PathBuf::from)
                .unwrap_or_else(|| sibling(&dataset, CONFIG_FILE_NAME));
            let mut config = Config::load(&config_path)?;
            if let Some(port) = port {
                config.server.port = port;
            }
            if no_shuffle {
                config.server.shuffle_on_start = false;
            }
            if no_open {
                config.server.open_browser = false;
            }
            let db_path = db_path(&dataset, db);
            start_server(DrillOptions {
                dataset,
                db_path,
                config,
            })
            .await
        }
        Command::Check { dataset } => check_dataset(&dataset_path(dataset)),
        Command::Stats {
            dataset,
            format,
            db,
        } => {
            let dataset = dataset_path(dataset);
            print_stats(&dataset, &db_path(&dataset, db), format)
        }
        Command::Forget { dataset, db } => {
            let dataset = dataset_path(dataset);
            forget_mastery(&db_path(&dataset, db))
        }
    }
}

fn dataset_path(dataset: Option<String>) -> PathBuf {
    PathBuf::from(dataset.unwrap_or_else(|| DEFAULT_DATASET.to_string()))
}

fn db_path(dataset: &Path, db: Option<String>) -> PathBuf {
    match db {
        Some(db) => PathBuf::from(db),
        None => sibling(dataset, DEFAULT_DB_NAME),
    }
}

/// A file in the same directory as the dataset.
fn sibling(dataset: &Path, name: &str) -> PathBuf {
    match dataset.parent() {
        Some(directory) => directory.join(name),
        None => PathBuf::from(name),
    }
}
