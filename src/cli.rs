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
use log::warn;

use anki2roam_core::Timestamp;

use crate::cmd::export::export_deck;
use crate::config::ConfigFile;
use crate::config::ExportConfig;
use crate::config::FormatChoice;
use crate::config::InsertAt;
use crate::error::Fallible;

/// Export an Anki deck to HTML and Markdown for Roam Research.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Name of the deck to export, e.g. "Books::Algorithms to Live By".
    deck_name: String,
    /// Path to the Anki profile directory, the one holding collection.anki2.
    profile_directory: PathBuf,
    /// Output directory. By default, the current working directory is used.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Which documents to write. Default is both.
    #[arg(long, value_enum)]
    format: Option<FormatChoice>,
    /// Also export the cards of every child deck. `--subdecks=false` turns
    /// off a config file's setting.
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    subdecks: Option<bool>,
    /// Also export cards temporarily moved into a filtered deck.
    /// `--include-filtered=false` turns off a config file's setting.
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    include_filtered: Option<bool>,
    /// Where to splice the metadata into each answer. Default is first.
    #[arg(long, value_enum)]
    insert_at: Option<InsertAt>,
    /// Name of the media folder created beside the documents. Default is "medias".
    #[arg(long)]
    media_folder: Option<String>,
    /// Path to a TOML file with export settings. Flags override it.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Open the HTML document once the export is done.
    #[arg(long)]
    open: bool,
}

impl Cli {
    /// Flags over the config file over defaults.
    fn export_config(&self, exported_at: Timestamp) -> Fallible<ExportConfig> {
        let mut config = ExportConfig::new(
            self.deck_name.as_str(),
            self.profile_directory.clone(),
            exported_at,
        );
        if let Some(path) = &self.config {
            config = config.with_file(ConfigFile::load(path)?);
        }
        if let Some(output) = &self.output {
            config.output_directory = output.clone();
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(subdecks) = self.subdecks {
            config.selection.include_subdecks = subdecks;
        }
        if let Some(include_filtered) = self.include_filtered {
            config.selection.include_filtered = include_filtered;
        }
        if let Some(insert_at) = self.insert_at {
            config.insertion = insert_at.into();
        }
        if let Some(media_folder) = &self.media_folder {
            config.media_folder = media_folder.clone();
        }
        Ok(config)
    }
}

pub fn entrypoint() -> Fallible<()> {
    let cli = Cli::parse();
    let config = cli.export_config(Timestamp::now())?;
    let summary = export_deck(&config)?;
    if cli.open {
        let html = summary
            .documents
            .iter()
            .find(|path| path.extension().is_some_and(|ext| ext == "html"));
        match html {
            Some(path) => open::that(path)?,
            None => warn!("Nothing to open: no HTML document was written"),
        }
    }
    Ok(())
}
