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

//! Parsing of Anki's "Notes in Plain Text" export.

use crate::error::Fallible;
use crate::error::fail;

const SEPARATOR_DIRECTIVE: &str = "#separator:";
const HTML_DIRECTIVE: &str = "#html:";

/// The fields of an export, by column.
#[derive(Debug, PartialEq)]
pub struct AnkiExport {
    pub separator: String,
    pub is_html: bool,
    /// `columns[c][r]` is field `c` of row `r`. Every column has one entry
    /// per row.
    pub columns: Vec<Vec<String>>,
    pub column_count: usize,
}

pub fn parse_anki_txt(text: &str) -> AnkiExport {
    let mut separator = "\t".to_string();
    let mut is_html = false;
    let mut lines: Vec<&str> = Vec::new();
    for line in text.lines().filter(|line| !line.trim().is_empty()) {
        if let Some(value) = line.strip_prefix(SEPARATOR_DIRECTIVE) {
            separator = separator_by_name(value.trim());
        } else if let Some(value) = line.strip_prefix(HTML_DIRECTIVE) {
            is_html = value.trim().eq_ignore_ascii_case("true");
        } else if !line.starts_with('#') {
            lines.push(line);
        }
    }

    let rows: Vec<Vec<&str>> = lines
        .iter()
        .map(|line| line.split(separator.as_str()).collect())
        .collect();
    let column_count = rows.iter().map(Vec::len).max().unwrap_or(0);
    let columns = (0..column_count)
        .map(|c| {
            rows.iter()
                .map(|row| row.get(c).copied().unwrap_or_default().to_string())
                .collect()
        })
        .collect();

    AnkiExport {
        separator,
        is_html,
        columns,
        column_count,
    }
}

fn separator_by_name(name: &str) -> String {
    match name.to_ascii_lowercase().as_str() {
        "tab" => "\t".to_string(),
        "comma" => ",".to_string(),
        "semicolon" => ";".to_string(),
        "pipe" => "|".to_string(),
        "space" => " ".to_string(),
        _ => name.to_string(),
    }
}

impl AnkiExport {
    pub fn row_count(&self) -> usize {
        self.columns.first().map(Vec::len).unwrap_or(0)
    }

    /// Build `(front, back)` pairs from 0-based column indices. Selected
    /// fields are joined with newlines; rows that come out blank on both
    /// sides are skipped.
    pub fn pairs(
        &self,
        front_columns: &[usize],
        back_columns: &[usize],
    ) -> Fallible<Vec<(String, String)>> {
        for &c in front_columns.iter().chain(back_columns) {
            if c >= self.column_count {
                return fail(format!(
                    "column {} does not exist, the export has {} columns.",
                    c + 1,
                    self.column_count
                ));
            }
        }
        if front_columns.is_empty() || back_columns.is_empty() {
            return fail("select at least one column for each side of the card.");
        }
        let join = |columns: &[usize], row: usize| -> String {
            columns
                .iter()
                .map(|&c| self.columns[c][row].as_str())
                .collect::<Vec<&str>>()
                .join("\n")
        };
        let mut pairs = Vec::new();
        for row in 0..self.row_count() {
            let front = join(front_columns, row);
            let back = join(back_columns, row);
            if front.trim().is_empty() && back.trim().is_empty() {
                continue;
            }
            pairs.push((front, back));
        }
        Ok(pairs)
    }
}
