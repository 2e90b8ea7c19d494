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

//! Conversion of note field HTML into Roam-flavoured Markdown.

use std::sync::LazyLock;

use regex::Regex;

struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

impl Rule {
    fn apply(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, self.replacement)
            .into_owned()
    }
}

fn rule(pattern: &str, replacement: &'static str) -> Rule {
    Rule {
        pattern: Regex::new(pattern).expect("markdown conversion pattern"),
        replacement,
    }
}

static IMAGE: LazyLock<Rule> =
    LazyLock::new(|| rule(r#"(?i)<img[^>]*src="([^"]*)"[^>]*>"#, "![]($1)"));

/// Inline rules only match tags with no markup inside, so they run until
/// nothing changes and nested tags convert from the inside out.
static INLINE_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        rule(r"(?i)<(?:b|strong)>([^<]*)</(?:b|strong)>", "**$1**"),
        rule(r"(?i)<(?:i|em)>([^<]*)</(?:i|em)>", "*$1*"),
        rule(r"(?i)<code>([^<]*)</code>", "`$1`"),
        rule(r#"(?i)<a[^>]*href="([^"]*)"[^>]*>([^<]*)</a>"#, "[$2]($1)"),
    ]
});

/// Line breaks, then whatever tags are left.
static BLOCK_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        rule(r"(?i)<br\s*/?>", "\n"),
        rule(r"(?i)</(?:div|p|li|h[1-6])>", "\n"),
        rule(r"<[^>]+>", ""),
    ]
});

static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)+").expect("blank line pattern"));

/// Convert field HTML to Markdown.
pub fn html_to_markdown(html: &str) -> String {
    let mut text = IMAGE.apply(html);
    loop {
        let before = text.len();
        for rule in INLINE_RULES.iter() {
            text = rule.apply(&text);
        }
        if text.len() == before {
            break;
        }
    }
    for rule in BLOCK_RULES.iter() {
        text = rule.apply(&text);
    }
    let text = decode_entities(&text);
    BLANK_LINES
        .replace_all(&text, "\n\n")
        .trim()
        .to_string()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        assert_eq!(html_to_markdown("Hello"), "Hello");
    }

    #[test]
    fn test_inline_markup() {
        assert_eq!(
            html_to_markdown("<b>bold</b>, <i>italic</i> and <code>x</code>"),
            "**bold**, *italic* and `x`"
        );
    }

    #[test]
    fn test_nested_inline_markup() {
        assert_eq!(html_to_markdown("<b><i>x</i></b>"), "***x***");
        assert_eq!(
            html_to_markdown("<strong>a <em>b</em> <code>c</code></strong>"),
            "**a *b* `c`**"
        );
        assert_eq!(
            html_to_markdown(r#"<a href="https://example.com"><b>site</b></a>"#),
            "[**site**](https://example.com)"
        );
    }

    #[test]
    fn test_linked_image() {
        assert_eq!(
            html_to_markdown(r#"<a href="https://example.com"><img src="medias/cat.jpg"></a>"#),
            "[![](medias/cat.jpg)](https://example.com)"
        );
    }

    #[test]
    fn test_links_and_images() {
        assert_eq!(
            html_to_markdown(r#"<a href="https://example.com">site</a> <img src="medias/cat.jpg" />"#),
            "[site](https://example.com) ![](medias/cat.jpg)"
        );
    }

    #[test]
    fn test_block_elements_become_lines() {
        assert_eq!(
            html_to_markdown("<div>one</div><div>two<br>three</div>"),
            "one\ntwo\nthree"
        );
    }

    #[test]
    fn test_blank_lines_collapse() {
        assert_eq!(html_to_markdown("a<br><br><br><br>b"), "a\n\nb");
    }

    #[test]
    fn test_entities() {
        assert_eq!(html_to_markdown("a &lt; b &amp;&amp; c&nbsp;d"), "a < b && c d");
        assert_eq!(html_to_markdown("&amp;lt;"), "&lt;");
    }
}
