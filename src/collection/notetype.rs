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

use serde::Deserialize;

use anki2roam_core::types::card::DeckId;
use anki2roam_core::types::card::ModelId;

/// Separator between the levels of a deck name.
pub const DECK_SEPARATOR: &str = "::";

/// A deck, from the `decks` JSON column or the `decks` table.
#[derive(Clone, Debug, Deserialize)]
pub struct Deck {
    pub id: DeckId,
    pub name: String,
}

impl Deck {
    /// Whether `other` sits anywhere below this deck.
    pub fn is_ancestor_of(&self, other: &Deck) -> bool {
        let prefix = format!("{}{}", self.name.to_lowercase(), DECK_SEPARATOR);
        other.name.to_lowercase().starts_with(&prefix)
    }
}

/// A note type, from the `models` JSON column or the `notetypes` table.
#[derive(Clone, Debug, Deserialize)]
pub struct Model {
    pub id: ModelId,
    pub name: String,
    /// 1 for cloze note types.
    #[serde(rename = "type", default)]
    pub kind: i64,
    #[serde(default)]
    pub css: String,
    #[serde(rename = "flds")]
    pub fields: Vec<FieldDef>,
    #[serde(rename = "tmpls")]
    pub templates: Vec<TemplateDef>,
}

impl Model {
    pub fn is_cloze(&self) -> bool {
        self.kind == 1
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub ord: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TemplateDef {
    pub name: String,
    pub ord: u32,
    pub qfmt: String,
    pub afmt: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fallible;

    fn deck(id: DeckId, name: &str) -> Deck {
        Deck {
            id,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_is_ancestor_of() {
        let books = deck(1, "Books");
        assert!(books.is_ancestor_of(&deck(2, "Books::Algorithms")));
        assert!(books.is_ancestor_of(&deck(3, "books::Algorithms::Ch 1")));
        assert!(!books.is_ancestor_of(&deck(4, "Bookshelf")));
        assert!(!books.is_ancestor_of(&books));
    }

    #[test]
    fn test_deserialize_model() -> Fallible<()> {
        let json = r#"{
            "id": 1001, "name": "Cloze", "type": 1, "css": ".card {}",
            "flds": [{"name": "Text", "ord": 0, "sticky": false}],
            "tmpls": [{"name": "Cloze", "ord": 0, "qfmt": "{{cloze:Text}}", "afmt": "{{cloze:Text}}", "did": null}],
            "sortf": 0
        }"#;
        let model: Model = serde_json::from_str(json)?;
        assert!(model.is_cloze());
        assert_eq!(model.fields[0].name, "Text");
        assert_eq!(model.templates[0].qfmt, "{{cloze:Text}}");
        Ok(())
    }
}
