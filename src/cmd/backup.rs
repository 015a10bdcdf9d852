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

use std::fs::read_to_string;
use std::fs::write;
use std::path::Path;
use std::path::PathBuf;

use crate::collection::Collection;
use crate::error::Fallible;
use crate::types::timestamp::Timestamp;

pub fn export_collection(directory: Option<String>, output: Option<PathBuf>) -> Fallible<()> {
    let coll: Collection = Collection::new(directory)?;
    let json: String = coll.export(Timestamp::now())?;
    match output {
        Some(path) => {
            write(&path, json)?;
            println!("Wrote backup to {}.", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

pub fn restore_collection(directory: Option<String>, file: &Path) -> Fallible<()> {
    let mut coll: Collection = Collection::new(directory)?;
    let text = read_to_string(file)?;
    let summary = coll.restore(&text, Timestamp::now())?;
    println!(
        "Restored {} decks with {} cards.",
        summary.deck_count, summary.card_count
    );
    if summary.repaired_timestamps > 0 {
        println!("Replaced {} invalid timestamps.", summary.repaired_timestamps);
    }
    Ok(())
}
