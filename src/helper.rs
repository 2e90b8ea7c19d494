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

use prost::Message;
use rusqlite::Connection;
use rusqlite::params;
use serde_json::Value;
use serde_json::json;
use tempfile::tempdir;

use anki2roam_core::Card;
use anki2roam_core::CardType;
use anki2roam_core::types::card::DeckId;
use anki2roam_core::types::card::ModelId;
use anki2roam_core::types::card::NoteId;

use crate::collection::COLLECTION_FILE;
use crate::collection::Collection;
use crate::collection::MEDIA_DIRECTORY;
use crate::collection::notetype::DECK_SEPARATOR;
use crate::collection::register_unicase;
use crate::collection::tables::NotetypeConfig;
use crate::collection::tables::TemplateConfig;
use crate::error::Fallible;

pub const CREATED: i64 = 1_600_000_000;
pub const DEFAULT_DECK_ID: DeckId = 1;
pub const BASIC_MODEL_ID: ModelId = 1001;
pub const CLOZE_MODEL_ID: ModelId = 1002;
pub const BASIC_CSS: &str = ".card { font-family: arial; }";
pub const CLOZE_CSS: &str = ".cloze { font-weight: bold; color: blue; }";

pub fn create_tmp_directory() -> Fallible<PathBuf> {
    let dir = tempdir()?.keep();
    Ok(dir.canonicalize()?)
}

pub fn card(id: i64, note_id: NoteId, deck_id: DeckId) -> Card {
    Card {
        id,
        note_id,
        deck_id,
        original_deck_id: 0,
        ord: 0,
        card_type: CardType::Due,
        queue: 2,
        due: 0,
        interval: 3,
        factor: 2500,
    }
}

/// A note type every test collection starts with.
struct StockModel {
    id: ModelId,
    name: &'static str,
    kind: i32,
    css: &'static str,
    fields: &'static [&'static str],
    /// Name, question format, answer format.
    template: (&'static str, &'static str, &'static str),
}

const STOCK_MODELS: [StockModel; 2] = [
    StockModel {
        id: BASIC_MODEL_ID,
        name: "Basic",
        kind: 0,
        css: BASIC_CSS,
        fields: &["Front", "Back"],
        template: (
            "Card 1",
            "<div>{{Front}}</div>",
            "{{FrontSide}}<hr id=answer><div>{{Back}}</div>",
        ),
    },
    StockModel {
        id: CLOZE_MODEL_ID,
        name: "Cloze",
        kind: 1,
        css: CLOZE_CSS,
        fields: &["Text", "Back Extra"],
        template: (
            "Cloze",
            "<div>{{cloze:Text}}</div>",
            "<div>{{cloze:Text}}</div><div>{{Back Extra}}</div>",
        ),
    },
];

/// Where decks and note types are stored.
#[derive(Clone, Copy, PartialEq)]
enum Layout {
    /// JSON in the `col` table, as in schema 11.
    Json,
    /// Rows in their own tables, as in schema 18.
    Tables,
}

pub struct TestCollection {
    pub profile: PathBuf,
    conn: Connection,
    layout: Layout,
    decks: serde_json::Map<String, Value>,
}

impl TestCollection {
    /// A legacy (schema 11) collection.
    pub fn create() -> Fallible<Self> {
        Self::create_with(Layout::Json)
    }

    /// A collection as newer Anki versions write it.
    pub fn create_with_tables() -> Fallible<Self> {
        Self::create_with(Layout::Tables)
    }

    fn create_with(layout: Layout) -> Fallible<Self> {
        let profile = create_tmp_directory()?;
        let conn = Connection::open(profile.join(COLLECTION_FILE))?;
        register_unicase(&conn)?;
        conn.execute_batch(SCHEMA)?;
        match layout {
            Layout::Json => {
                let mut models = serde_json::Map::new();
                for model in &STOCK_MODELS {
                    models.insert(model.id.to_string(), model_json(model));
                }
                conn.execute(
                    "INSERT INTO col VALUES (1, ?1, 0, 0, 11, 0, 0, 0, '{}', ?2, '{}', '{}', '{}')",
                    params![CREATED, Value::Object(models).to_string()],
                )?;
            }
            Layout::Tables => {
                conn.execute_batch(TABLE_SCHEMA)?;
                conn.execute(
                    "INSERT INTO col VALUES (1, ?1, 0, 0, 18, 0, 0, 0, '', '', '', '', '')",
                    params![CREATED],
                )?;
                for model in &STOCK_MODELS {
                    insert_model_rows(&conn, model)?;
                }
            }
        }
        let mut collection = Self {
            profile,
            conn,
            layout,
            decks: serde_json::Map::new(),
        };
        collection.add_deck(DEFAULT_DECK_ID, "Default")?;
        Ok(collection)
    }

    pub fn collection_path(&self) -> PathBuf {
        self.profile.join(COLLECTION_FILE)
    }

    pub fn add_deck(&mut self, id: DeckId, name: &str) -> Fallible<()> {
        match self.layout {
            Layout::Json => {
                self.decks.insert(
                    id.to_string(),
                    json!({"id": id, "name": name, "dyn": 0, "collapsed": false}),
                );
                let decks = Value::Object(self.decks.clone()).to_string();
                self.conn
                    .execute("UPDATE col SET decks = ?1", params![decks])?;
            }
            Layout::Tables => {
                self.conn.execute(
                    "INSERT INTO decks VALUES (?1, ?2, 0, 0, x'', x'')",
                    params![id, name.replace(DECK_SEPARATOR, "\x1f")],
                )?;
            }
        }
        Ok(())
    }

    pub fn add_note(&self, id: NoteId, model_id: ModelId, fields: &[&str], tags: &str) -> Fallible<()> {
        self.conn.execute(
            "INSERT INTO notes VALUES (?1, ?2, ?3, 0, 0, ?4, ?5, '', 0, 0, '')",
            params![id, format!("guid{id}"), model_id, tags, fields.join("\x1f")],
        )?;
        Ok(())
    }

    pub fn add_card(&self, card: &Card) -> Fallible<()> {
        let card_type: i64 = match card.card_type {
            CardType::New => 0,
            CardType::Learning => 1,
            CardType::Due => 2,
            CardType::Filtered => 3,
        };
        self.conn.execute(
            "INSERT INTO cards VALUES (?1, ?2, ?3, ?4, 0, 0, ?5, ?6, ?7, ?8, ?9, 0, 0, 0, 0, ?10, 0, '')",
            params![
                card.id,
                card.note_id,
                card.deck_id,
                card.ord,
                card_type,
                card.queue,
                card.due,
                card.interval,
                card.factor,
                card.original_deck_id
            ],
        )?;
        Ok(())
    }

    pub fn execute(&self, sql: &str) -> Fallible<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    /// Create the media store and put a file in it.
    pub fn add_media(&self, name: &str, contents: &str) -> Fallible<PathBuf> {
        let dir = self.profile.join(MEDIA_DIRECTORY);
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(name);
        std::fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn open(&self) -> Fallible<Collection> {
        Collection::open(&self.collection_path())
    }
}

fn model_json(model: &StockModel) -> Value {
    let fields: Vec<Value> = model
        .fields
        .iter()
        .enumerate()
        .map(|(ord, name)| json!({"name": name, "ord": ord}))
        .collect();
    let (name, qfmt, afmt) = model.template;
    json!({
        "id": model.id,
        "name": model.name,
        "type": model.kind,
        "css": model.css,
        "flds": fields,
        "tmpls": [{"name": name, "ord": 0, "qfmt": qfmt, "afmt": afmt}]
    })
}

fn insert_model_rows(conn: &Connection, model: &StockModel) -> Fallible<()> {
    let config = NotetypeConfig {
        kind: model.kind,
        css: model.css.to_string(),
    };
    conn.execute(
        "INSERT INTO notetypes VALUES (?1, ?2, 0, 0, ?3)",
        params![model.id, model.name, config.encode_to_vec()],
    )?;
    for (ord, name) in model.fields.iter().enumerate() {
        conn.execute(
            "INSERT INTO fields VALUES (?1, ?2, ?3, x'')",
            params![model.id, ord as i64, name],
        )?;
    }
    let (name, qfmt, afmt) = model.template;
    let config = TemplateConfig {
        q_format: qfmt.to_string(),
        a_format: afmt.to_string(),
    };
    conn.execute(
        "INSERT INTO templates VALUES (?1, 0, ?2, 0, 0, ?3)",
        params![model.id, name, config.encode_to_vec()],
    )?;
    Ok(())
}

const SCHEMA: &str = r#"
CREATE TABLE col (
    id integer primary key,
    crt integer not null,
    mod integer not null,
    scm integer not null,
    ver integer not null,
    dty integer not null,
    usn integer not null,
    ls integer not null,
    conf text not null,
    models text not null,
    decks text not null,
    dconf text not null,
    tags text not null
);
CREATE TABLE notes (
    id integer primary key,
    guid text not null,
    mid integer not null,
    mod integer not null,
    usn integer not null,
    tags text not null,
    flds text not null,
    sfld integer not null,
    csum integer not null,
    flags integer not null,
    data text not null
);
CREATE TABLE cards (
    id integer primary key,
    nid integer not null,
    did integer not null,
    ord integer not null,
    mod integer not null,
    usn integer not null,
    type integer not null,
    queue integer not null,
    due integer not null,
    ivl integer not null,
    factor integer not null,
    reps integer not null,
    lapses integer not null,
    left integer not null,
    odue integer not null,
    odid integer not null,
    flags integer not null,
    data text not null
);
"#;

const TABLE_SCHEMA: &str = r#"
CREATE TABLE decks (
    id integer primary key not null,
    name text not null collate unicase,
    mtime_secs integer not null,
    usn integer not null,
    common blob not null,
    kind blob not null
);
CREATE UNIQUE INDEX idx_decks_name ON decks (name);
CREATE TABLE notetypes (
    id integer not null primary key,
    name text not null collate unicase,
    mtime_secs integer not null,
    usn integer not null,
    config blob not null
);
CREATE TABLE fields (
    ntid integer not null,
    ord integer not null,
    name text not null collate unicase,
    config blob not null,
    primary key (ntid, ord)
) without rowid;
CREATE TABLE templates (
    ntid integer not null,
    ord integer not null,
    name text not null collate unicase,
    mtime_secs integer not null,
    usn integer not null,
    config blob not null,
    primary key (ntid, ord)
) without rowid;
"#;
