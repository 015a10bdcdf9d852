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
use std::path::Path;

use crate::anki::parse_anki_txt;
use crate::collection::Collection;
use crate::error::Fallible;
use crate::error::fail;
use crate::types::timestamp::Timestamp;

pub fn import_anki(
    directory: Option<String>,
    file: &Path,
    front: &str,
    back: &str,
    name: &str,
) -> Fallible<()> {
    let mut coll: Collection = Collection::new(directory)?;
    let text = read_to_string(file)?;
    let export = parse_anki_txt(&text);
    if export.column_count == 0 {
        return fail("no data found in the export.");
    }
    let pairs = export.pairs(&parse_columns(front)?, &parse_columns(back)?)?;
    let deck = coll.import_deck(name, pairs, Timestamp::now())?;
    println!(
        "Imported {} cards into {} ({}).",
        deck.cards().len(),
        deck.name(),
        deck.id()
    );
    Ok(())
}

/// Parse a comma-separated list of 1-based column numbers into 0-based
/// indices.
fn parse_columns(text: &str) -> Fallible<Vec<usize>> {
    text.split(',')
        .map(|part| match part.trim().parse::<usize>() {
            Ok(n) if n > 0 => Ok(n - 1),
            _ => fail(format!("invalid column number: {part:?}")),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs::write;

    use super::*;
    use crate::helper::create_tmp_directory;

    #[test]
    fn test_parse_columns() -> Fallible<()> {
        assert_eq!(parse_columns("1")?, vec![0]);
        assert_eq!(parse_columns("2, 5,7")?, vec![1, 4, 6]);
        assert!(parse_columns("0").is_err());
        assert!(parse_columns("a").is_err());
        assert!(parse_columns("").is_err());
        Ok(())
    }

    #[test]
    fn test_import_anki() -> Fallible<()> {
        let directory = create_tmp_directory()?;
        let file = directory.join("export.txt");
        write(&file, "#separator:tab\n#html:false\nhola\thello\tgreeting\nadiós\tgoodbye\t\n")?;
        let dir = Some(directory.display().to_string());
        import_anki(dir.clone(), &file, "1", "2,3", "Spanish")?;

        let coll = Collection::new(dir.clone())?;
        let deck = coll.find_deck("Spanish")?;
        assert_eq!(deck.cards().len(), 2);
        assert_eq!(deck.cards()[0].front(), "hola");
        assert_eq!(deck.cards()[0].back(), "hello\ngreeting");
        assert_eq!(deck.cards()[1].back(), "goodbye\n");

        assert!(import_anki(dir, &file, "1", "4", "Spanish").is_err());
        Ok(())
    }

    #[test]
    fn test_import_empty_export() -> Fallible<()> {
        let directory = create_tmp_directory()?;
        let file = directory.join("export.txt");
        write(&file, "#separator:tab\n")?;
        let dir = Some(directory.display().to_string());
        assert!(import_anki(dir, &file, "1", "2", "Empty").is_err());
        Ok(())
    }
}
