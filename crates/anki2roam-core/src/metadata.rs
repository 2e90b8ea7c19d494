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

use std::sync::LazyLock;

use regex::Regex;

use crate::error::Fallible;
use crate::error::fail;
use crate::types::card::Card;
use crate::types::card::Note;
use crate::types::date::Date;

static CLOSING_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</\w+?>").expect("closing tag pattern"));

/// The Roam summary of a card's scheduling state.
#[derive(Clone, Debug, PartialEq)]
pub struct CardMetadata {
    interval: i64,
    factor: i64,
    due: Option<Date>,
    tags: Vec<String>,
}

impl CardMetadata {
    pub fn new(card: &Card, note: &Note, due: Option<Date>) -> Self {
        Self {
            interval: card.interval,
            factor: card.factor,
            due,
            tags: note.tags.clone(),
        }
    }

    /// The non-empty parts of the summary, in display order.
    pub fn parts(&self) -> Vec<String> {
        let mut parts = Vec::new();
        if self.interval != 0 {
            parts.push(format!("[[[[interval]]:{}]]", self.interval));
        }
        if self.factor != 0 {
            parts.push(format!("[[[[factor]]:{}]]", format_factor(self.factor)));
        }
        if let Some(due) = self.due {
            parts.push(roam_date(due));
        }
        let tags = format_tags(&self.tags);
        if !tags.is_empty() {
            parts.push(tags);
        }
        parts
    }

    /// The summary as one space-separated line.
    pub fn line(&self) -> String {
        self.parts().join(" ")
    }
}

/// A permille ease factor as a ratio. Whole numbers keep one decimal so
/// that 2000 reads `2.0`.
fn format_factor(factor: i64) -> String {
    let ratio = factor as f64 / 1000.0;
    if ratio.fract() == 0.0 {
        format!("{ratio:.1}")
    } else {
        format!("{ratio}")
    }
}

pub fn roam_date(date: Date) -> String {
    format!("[[{}]]", date.roam_title())
}

pub fn format_tags(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| format!("[[{tag}]]"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Where in the answer the metadata goes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InsertionPoint {
    /// Before the first closing tag.
    #[default]
    FirstClosingTag,
    /// Before the last closing tag.
    LastClosingTag,
}

/// Splice `metadata` into `answer` immediately before the chosen closing tag.
///
/// An answer without any closing tag has no insertion point and is an error.
pub fn insert_metadata(answer: &str, metadata: &str, at: InsertionPoint) -> Fallible<String> {
    let found = match at {
        InsertionPoint::FirstClosingTag => CLOSING_TAG.find(answer),
        InsertionPoint::LastClosingTag => CLOSING_TAG.find_iter(answer).last(),
    };
    let Some(m) = found else {
        return fail("no closing tag in the answer to attach metadata to");
    };
    let pos = m.start();
    let mut spliced = String::with_capacity(answer.len() + metadata.len());
    spliced.push_str(&answer[..pos]);
    spliced.push_str(metadata);
    spliced.push_str(&answer[pos..]);
    Ok(spliced)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::types::card::CardType;

    fn card(interval: i64, factor: i64) -> Card {
        Card {
            id: 1,
            note_id: 1,
            deck_id: 1,
            original_deck_id: 0,
            ord: 0,
            card_type: CardType::Due,
            queue: 2,
            due: 0,
            interval,
            factor,
        }
    }

    fn note(tags: &[&str]) -> Note {
        Note {
            id: 1,
            model_id: 1,
            fields: vec![],
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::new(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_full_metadata_line() {
        let meta = CardMetadata::new(
            &card(12, 2500),
            &note(&["books", "algorithms"]),
            Some(date(2026, 10, 19)),
        );
        assert_eq!(
            meta.line(),
            "[[[[interval]]:12]] [[[[factor]]:2.5]] [[October 19th, 2026]] [[books]] [[algorithms]]"
        );
    }

    #[test]
    fn test_zero_values_are_dropped() {
        let meta = CardMetadata::new(&card(0, 0), &note(&[]), None);
        assert!(meta.parts().is_empty());
        assert_eq!(meta.line(), "");
    }

    #[test]
    fn test_new_card_has_no_date() {
        let meta = CardMetadata::new(&card(0, 0), &note(&["x"]), None);
        assert_eq!(meta.line(), "[[x]]");
    }

    #[test]
    fn test_whole_factor_keeps_decimal() {
        assert_eq!(format_factor(2000), "2.0");
        assert_eq!(format_factor(2500), "2.5");
        assert_eq!(format_factor(1300), "1.3");
    }

    #[test]
    fn test_insert_before_first_closing_tag() -> Fallible<()> {
        let answer = "<div>Front</div><hr id=answer><div>Back</div>";
        let spliced = insert_metadata(answer, "<span>M</span>", InsertionPoint::FirstClosingTag)?;
        assert_eq!(
            spliced,
            "<div>Front<span>M</span></div><hr id=answer><div>Back</div>"
        );
        Ok(())
    }

    #[test]
    fn test_insert_before_last_closing_tag() -> Fallible<()> {
        let answer = "<div>Front</div><hr id=answer><div>Back</div>";
        let spliced = insert_metadata(answer, "<span>M</span>", InsertionPoint::LastClosingTag)?;
        assert_eq!(
            spliced,
            "<div>Front</div><hr id=answer><div>Back<span>M</span></div>"
        );
        Ok(())
    }

    /// Upstream behavior without a closing tag is undefined; here it is an
    /// error rather than a guessed fallback.
    #[test]
    fn test_no_closing_tag_is_an_error() {
        for at in [InsertionPoint::FirstClosingTag, InsertionPoint::LastClosingTag] {
            assert!(insert_metadata("plain text <br>", "M", at).is_err());
        }
    }
}
