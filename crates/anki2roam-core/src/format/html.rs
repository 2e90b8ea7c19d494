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

use maud::DOCTYPE;
use maud::PreEscaped;
use maud::html;

use crate::assemble::RenderedCard;
use crate::assemble::StyleSheet;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::format::ExportFormat;
use crate::metadata::InsertionPoint;
use crate::metadata::insert_metadata;

/// Wraps the contents of every cloze deletion in braces once the page loads.
const CLOZE_BRACKETS_JS: &str = r#"
function addBrackets() {
    const elements = document.getElementsByClassName("cloze");
    for (const element of elements) {
        element.innerHTML = `{${element.innerHTML}}`;
    }
}
"#;

/// A single HTML page holding every card of the deck.
#[derive(Clone, Copy, Debug, Default)]
pub struct HtmlFormat {
    pub insertion: InsertionPoint,
}

impl HtmlFormat {
    pub fn new(insertion: InsertionPoint) -> Self {
        Self { insertion }
    }
}

impl ExportFormat for HtmlFormat {
    fn extension(&self) -> &'static str {
        "html"
    }

    fn card_fragment(&self, card: &RenderedCard) -> Fallible<String> {
        let metadata = format!("<span>{}</span>", card.metadata.line());
        let answer = insert_metadata(&card.answer, &metadata, self.insertion)
            .map_err(|e| ErrorReport::new(format!("card {}: {}", card.card_id, e.message())))?;
        Ok(format!(r#"<div class="card"> {answer} </div>"#))
    }

    fn aggregate(&self, deck_name: &str, styles: &StyleSheet, fragments: &[String]) -> String {
        let css = styles.rules().join("\n");
        let cards = fragments.join("\n");
        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="utf-8";
                    title { (deck_name) }
                    style { (PreEscaped(css)) }
                    script { (PreEscaped(CLOZE_BRACKETS_JS)) }
                }
                body onload="addBrackets();" {
                    (PreEscaped(cards))
                }
            }
        }
        .into_string()
    }
}
