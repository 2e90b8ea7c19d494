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
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::Deserialize;

use anki2roam_core::ExportFormat;
use anki2roam_core::HtmlFormat;
use anki2roam_core::InsertionPoint;
use anki2roam_core::MarkdownFormat;
use anki2roam_core::Timestamp;

use crate::collection::COLLECTION_FILE;
use crate::collection::MEDIA_DIRECTORY;
use crate::error::Fallible;
use crate::error::fail;
use crate::select::Selection;

/// Default name of the media folder created next to the documents.
pub const DEFAULT_MEDIA_FOLDER: &str = "medias";

/// Which documents to write.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatChoice {
    Html,
    Markdown,
    #[default]
    Both,
}

/// Where the metadata goes in the HTML answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertAt {
    /// Before the first closing tag.
    First,
    /// Before the last closing tag.
    Last,
}

impl From<InsertAt> for InsertionPoint {
    fn from(value: InsertAt) -> Self {
        match value {
            InsertAt::First => InsertionPoint::FirstClosingTag,
            InsertAt::Last => InsertionPoint::LastClosingTag,
        }
    }
}

/// Settings read from a TOML file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub output: Option<PathBuf>,
    pub format: Option<FormatChoice>,
    pub subdecks: Option<bool>,
    pub include_filtered: Option<bool>,
    pub media_folder: Option<String>,
    pub insert_at: Option<InsertAt>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Fallible<Self> {
        if !path.exists() {
            return fail(format!("config file does not exist: {}", path.display()));
        }
        let text = read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }
}

/// Everything one export run needs.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportConfig {
    pub deck_name: String,
    /// The Anki profile directory holding the collection and its media.
    pub profile_directory: PathBuf,
    pub output_directory: PathBuf,
    pub format: FormatChoice,
    pub selection: Selection,
    /// Name of the media folder inside the output directory.
    pub media_folder: String,
    pub insertion: InsertionPoint,
    /// "Now" for due-date derivation.
    pub exported_at: Timestamp,
}

impl ExportConfig {
    pub fn new(
        deck_name: impl Into<String>,
        profile_directory: impl Into<PathBuf>,
        exported_at: Timestamp,
    ) -> Self {
        Self {
            deck_name: deck_name.into(),
            profile_directory: profile_directory.into(),
            output_directory: PathBuf::from("."),
            format: FormatChoice::default(),
            selection: Selection::default(),
            media_folder: DEFAULT_MEDIA_FOLDER.to_string(),
            insertion: InsertionPoint::default(),
            exported_at,
        }
    }

    /// Take every value the file sets.
    pub fn with_file(mut self, file: ConfigFile) -> Self {
        if let Some(output) = file.output {
            self.output_directory = output;
        }
        if let Some(format) = file.format {
            self.format = format;
        }
        if let Some(subdecks) = file.subdecks {
            self.selection.include_subdecks = subdecks;
        }
        if let Some(include_filtered) = file.include_filtered {
            self.selection.include_filtered = include_filtered;
        }
        if let Some(media_folder) = file.media_folder {
            self.media_folder = media_folder;
        }
        if let Some(insert_at) = file.insert_at {
            self.insertion = insert_at.into();
        }
        self
    }

    pub fn validate(&self) -> Fallible<()> {
        if self.deck_name.trim().is_empty() {
            return fail("deck name is empty");
        }
        let mut components = Path::new(&self.media_folder).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(()),
            _ => fail(format!(
                "media folder must be a plain directory name, got '{}'",
                self.media_folder
            )),
        }
    }

    pub fn collection_path(&self) -> PathBuf {
        self.profile_directory.join(COLLECTION_FILE)
    }

    pub fn media_store_path(&self) -> PathBuf {
        self.profile_directory.join(MEDIA_DIRECTORY)
    }

    pub fn media_destination(&self) -> PathBuf {
        self.output_directory.join(&self.media_folder)
    }

    /// The document for a format: the deck name plus the format's extension.
    /// Path separators in the deck name become underscores.
    pub fn document_path(&self, extension: &str) -> PathBuf {
        let stem: String = self
            .deck_name
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        self.output_directory.join(format!("{stem}.{extension}"))
    }

    /// The formats to write, Markdown first.
    pub fn formats(&self) -> Vec<Box<dyn ExportFormat>> {
        let html: Box<dyn ExportFormat> = Box::new(HtmlFormat::new(self.insertion));
        let markdown: Box<dyn ExportFormat> = Box::new(MarkdownFormat);
        match self.format {
            FormatChoice::Html => vec![html],
            FormatChoice::Markdown => vec![markdown],
            FormatChoice::Both => vec![markdown, html],
        }
    }
}
