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

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use axum::Router;
use axum::http::HeaderName;
use axum::http::StatusCode;
use axum::http::header::CACHE_CONTROL;
use axum::http::header::CONTENT_TYPE;
use axum::response::Html;
use axum::routing::get;
use axum::routing::post;
use tokio::net::TcpListener;
use tokio::net::TcpStream;
use tokio::signal::ctrl_c;
use tokio::sync::oneshot;
use tokio::time::sleep;

use crate::ai::AiClient;
use crate::cmd::drill::get::get_handler;
use crate::cmd::drill::post::post_handler;
use crate::cmd::drill::state::MutableState;
use crate::cmd::drill::state::ServerState;
use crate::config::Config;
use crate::dataset::read_dataset;
use crate::deck::Deck;
use crate::error::Fallible;
use crate::mastery::MasteryLedger;
use crate::store::Store;

pub struct DrillOptions {
    pub dataset: PathBuf,
    pub db_path: PathBuf,
    pub config: Config,
}

pub async fn start_server(options: DrillOptions) -> Fallible<()> {
    let DrillOptions {
        dataset,
        db_path,
        config,
    } = options;

    log::debug!("Loading dataset from {}", dataset.display());
    let start = Instant::now();
    // A broken dataset still gets a page, with the reason in place of the card.
    let (categories, load_error) = match read_dataset(&dataset) {
        Ok(categories) => (categories, None),
        Err(e) => {
            log::error!("Failed to load {}: {e}", dataset.display());
            (Vec::new(), Some(e.to_string()))
        }
    };
    let mut deck = Deck::new(categories);
    if config.server.shuffle_on_start {
        deck.shuffle(&mut rand::rng());
    }
    let duration = start.elapsed().as_millis();
    log::debug!("Deck of {} cards loaded in {duration}ms.", deck.len());

    log::debug!("Opening store at {}", db_path.display());
    let store = Store::open(&db_path)?;
    let ledger = MasteryLedger::load(store.clone());

    let port = config.server.port;
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let state = ServerState {
        store,
        ai: AiClient::new(config.ai.clone())?,
        mutable: Arc::new(Mutex::new(MutableState::new(deck, ledger, load_error))),
        shutdown_tx: Arc::new(Mutex::new(Some(shutdown_tx))),
    };
    let app = Router::new();
    let app = app.route("/", get(get_handler));
    let app = app.route("/", post(post_handler));
    let app = app.route("/script.js", get(script));
    let app = app.route("/style.css", get(stylesheet));
    let app = app.fallback(not_found_handler);
    let app = app.with_state(state);
    let bind = format!("127.0.0.1:{port}");

    if config.server.open_browser {
        // Start a separate task to open the browser.
        let url = format!("http://{bind}/");
        let target = bind.clone();
        tokio::spawn(async move {
            loop {
                if let Ok(stream) = TcpStream::connect(&target).await {
                    drop(stream);
                    break;
                }
                sleep(Duration::from_millis(1)).await;
            }
            if let Err(e) = open::that(&url) {
                log::error!("Failed to open {url}: {e}");
            }
        });
    }

    log::debug!("Starting server on {bind}");
    let listener = TcpListener::bind(&bind).await?;
    println!("Serving flashcards on http://{bind}/");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_rx))
        .await?;
    log::debug!("Server stopped.");
    Ok(())
}

/// Resolves when the page asks to quit or the process is interrupted.
async fn shutdown_signal(shutdown_rx: oneshot::Receiver<()>) {
    tokio::select! {
        _ = shutdown_rx => log::debug!("Shutdown requested from the page."),
        _ = ctrl_c() => log::debug!("Interrupted."),
    }
}

async fn script() -> (StatusCode, [(HeaderName, &'static str); 1], &'static str) {
    let content = include_str!("script.js");
    (StatusCode::OK, [(CONTENT_TYPE, "text/javascript")], content)
}

async fn stylesheet() -> (StatusCode, [(HeaderName, &'static str); 2], &'static [u8]) {
    let bytes = include_bytes!("style.css");
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, "text/css"),
            (CACHE_CONTROL, "public, max-age=604800, immutable"),
        ],
        bytes,
    )
}

async fn not_found_handler() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html("Not Found".to_string()))
}
