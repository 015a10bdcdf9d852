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

use clap::Parser;
use clap::Subcommand;

use crate::cmd::backup::export_collection;
use crate::cmd::backup::restore_collection;
use crate::cmd::card::add_card;
use crate::cmd::card::delete_card;
use crate::cmd::card::edit_card;
use crate::cmd::card::list_cards;
use crate::cmd::deck::delete_deck;
use crate::cmd::deck::list_decks;
use crate::cmd::deck::new_deck;
use crate::cmd::deck::rename_deck;
use crate::cmd::import::import_anki;
use crate::cmd::prefs::update_prefs;
use crate::cmd::stats::print_stats;
use crate::drill::server::DEFAULT_PORT;
use crate::drill::server::start_server;
use crate::error::Fallible;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the collection directory. Defaults to the current directory.
    #[arg(long, global = true)]
    directory: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List decks with their card counts.
    Decks,
    /// Create a deck.
    NewDeck {
        name: String,
    },
    /// Rename a deck.
    RenameDeck {
        /// Deck id or name.
        deck: String,
        name: String,
    },
    /// Delete a deck and its cards.
    DeleteDeck {
        /// Deck id or name.
        deck: String,
    },
    /// Add a card to a deck.
    Add {
        /// Deck id or name.
        deck: String,
        front: String,
        back: String,
    },
    /// List the cards in a deck.
    Cards {
        /// Deck id or name.
        deck: String,
    },
    /// Change the text of a card.
    Edit {
        /// Deck id or name.
        deck: String,
        /// Card id.
        card: String,
        #[arg(long)]
        front: Option<String>,
        #[arg(long)]
        back: Option<String>,
    },
    /// Delete a card.
    DeleteCard {
        /// Deck id or name.
        deck: String,
        /// Card id.
        card: String,
    },
    /// Show or change a deck's review preferences.
    Prefs {
        /// Deck id or name.
        deck: String,
        /// The maximum number of cards per session.
        #[arg(long)]
        review_count: Option<usize>,
        /// The maximum number of new cards per session.
        #[arg(long)]
        new_card_limit: Option<usize>,
    },
    /// Create a deck from an Anki "Notes in Plain Text" export.
    ImportAnki {
        /// Path to the export.
        file: PathBuf,
        /// Columns for the front of the card, 1-based and comma-separated.
        #[arg(long)]
        front: String,
        /// Columns for the back of the card, 1-based and comma-separated.
        #[arg(long)]
        back: String,
        /// Name of the new deck.
        #[arg(long, default_value = "Imported Deck")]
        name: String,
    },
    /// Write a backup of every deck and its preferences.
    Export {
        /// Output file. Defaults to stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Replace the collection with a backup.
    Restore {
        file: PathBuf,
    },
    /// Print collection statistics as JSON.
    Stats,
    /// Review a deck's due cards in the browser.
    Drill {
        /// Deck id or name.
        deck: String,
        /// The port to use for the web server.
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
        /// Don't open the browser automatically.
        #[arg(long)]
        no_open: bool,
    },
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Cli = Cli::parse();
    let directory = cli.directory;
    match cli.command {
        Command::Decks => list_decks(directory),
        Command::NewDeck { name } => new_deck(directory, &name),
        Command::RenameDeck { deck, name } => rename_deck(directory, &deck, &name),
        Command::DeleteDeck { deck } => delete_deck(directory, &deck),
        Command::Add { deck, front, back } => add_card(directory, &deck, &front, &back),
        Command::Cards { deck } => list_cards(directory, &deck),
        Command::Edit {
            deck,
            card,
            front,
            back,
        } => edit_card(directory, &deck, &card, front, back),
        Command::DeleteCard { deck, card } => delete_card(directory, &deck, &card),
        Command::Prefs {
            deck,
            review_count,
            new_card_limit,
        } => update_prefs(directory, &deck, review_count, new_card_limit),
        Command::ImportAnki {
            file,
            front,
            back,
            name,
        } => import_anki(directory, &file, &front, &back, &name),
        Command::Export { output } => export_collection(directory, output),
        Command::Restore { file } => restore_collection(directory, &file),
        Command::Stats => print_stats(directory),
        Command::Drill {
            deck,
            port,
            no_open,
        } => {
            let directory: PathBuf = match directory {
                Some(dir) => PathBuf::from(dir),
                None => std::env::current_dir()?,
            };
            start_server(directory, deck, port, !no_open).await
        }
    }
}
