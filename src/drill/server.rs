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
use tokio::time::sleep;

use crate::collection::Collection;
use crate::drill::get::get_handler;
use crate::drill::post::post_handler;
use crate::drill::state::MutableState;
use crate::drill::state::ServerState;
use crate::error::Fallible;
use crate::queue::due_cards;
use crate::session::Session;
use crate::types::timestamp::Timestamp;

pub const DEFAULT_PORT: u16 = 8000;

/// Review the due cards of a deck in the browser. Returns right away if
/// nothing is due.
pub async fn start_server(
    directory: PathBuf,
    deck: String,
    port: u16,
    open_browser: bool,
) -> Fallible<()> {
    let collection = Collection::open(directory)?;
    let deck = collection.find_deck(&deck)?;
    let prefs = collection.review_prefs(deck.id());
    let cards = due_cards(
        deck,
        prefs.review_count,
        collection.config.new_card_policy(&prefs),
        Timestamp::now(),
    );
    if cards.is_empty() {
        println!("No cards due in {}.", deck.name());
        return Ok(());
    }
    log::debug!("Reviewing {} cards from {}.", cards.len(), deck.name());
    let session = Session::new(deck.id().clone(), cards);

    let state = ServerState {
        deck_name: deck.name().to_string(),
        parameters: collection.config.parameters().clone(),
        mutable: Arc::new(Mutex::new(MutableState {
            reveal: false,
            collection,
            session,
        })),
    };
    let app = Router::new();
    let app = app.route("/", get(get_handler));
    let app = app.route("/", post(post_handler));
    let app = app.route("/script.js", get(script));
    let app = app.route("/style.css", get(stylesheet));
    let app = app.fallback(not_found_handler);
    let app = app.with_state(state);
    let bind = format!("127.0.0.1:{port}");

    if open_browser {
        // Open the browser once the listener is up.
        let url = format!("http://{bind}/");
        let bind = bind.clone();
        tokio::spawn(async move {
            loop {
                if let Ok(stream) = TcpStream::connect(&bind).await {
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
    println!("Drilling at http://{bind}/");
    let listener = TcpListener::bind(&bind).await?;
    axum::serve(listener, app).await?;
    Ok(())
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
