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

use crate::assemble::RenderedCard;
use crate::assemble::StyleSheet;
use crate::error::Fallible;
use crate::format::ExportFormat;
use crate::markdown::html_to_markdown;

const INDENT: &str = "\n  ";

/// A Markdown outline with one top-level bullet per card.
#[derive(Clone, Copy, Debug, Default)]
pub struct MarkdownFormat;

impl ExportFormat for MarkdownFormat {
    fn extension(&self) -> &'static str {
        "md"
    }

    fn card_fragment(&self, card: &RenderedCard) -> Fallible<String> {
        let mut lines: Vec<String> = card
            .fields
            .iter()
            .map(|field| html_to_markdown(field))
            .filter(|field| !field.is_empty())
            .map(|field| field.replace('\n', INDENT))
            .collect();
        let metadata = card.metadata.line();
        if !metadata.is_empty() {
            lines.push(metadata);
        }
        Ok(format!(" - {INDENT}{}", lines.join(INDENT)))
    }

    fn aggregate(&self, _deck_name: &str, _styles: &StyleSheet, fragments: &[String]) -> String {
        fragments.join("\n")
    }
}
