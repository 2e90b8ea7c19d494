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

use std::collections::HashMap;
use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use crate::error::Fallible;
use crate::error::fail;
use crate::render::Side;
use crate::render::cloze::render_cloze;

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern"));

/// A parsed template.
#[derive(Debug, PartialEq)]
enum Node<'a> {
    Text(&'a str),
    /// `{{filter:...:Field}}`. Filters are kept in written order.
    Replacement { field: &'a str, filters: Vec<&'a str> },
    /// `{{#Field}}...{{/Field}}`, or `{{^Field}}...{{/Field}}` when negated.
    Section {
        field: &'a str,
        negated: bool,
        children: Vec<Node<'a>>,
    },
}

/// What a template is rendered against.
pub struct Context<'a> {
    pub fields: &'a HashMap<String, String>,
    /// The cloze number this card reveals.
    pub cloze_ord: u32,
    pub side: Side,
}

impl Context<'_> {
    fn field(&self, name: &str) -> Fallible<&str> {
        match self.fields.get(name) {
            Some(value) => Ok(value.as_str()),
            // The question side has no front side to include.
            None if name == "FrontSide" => Ok(""),
            None => fail(format!("unknown field '{name}'")),
        }
    }
}

pub fn render_template(template: &str, ctx: &Context) -> Fallible<String> {
    let nodes = parse(template)?;
    let mut out = String::with_capacity(template.len());
    render_nodes(&nodes, ctx, &mut out)?;
    Ok(out)
}

/// An open section on the parse stack: its field, whether it is negated,
/// and the nodes collected so far.
type Frame<'a> = (Option<(&'a str, bool)>, Vec<Node<'a>>);

fn parse(template: &str) -> Fallible<Vec<Node<'_>>> {
    let mut stack: Vec<Frame> = vec![(None, Vec::new())];
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        if start > 0 {
            push(&mut stack, Node::Text(&rest[..start]));
        }
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            return fail("'{{' without a matching '}}'");
        };
        let tag = after[..end].trim();
        rest = &after[end + 2..];

        if let Some(field) = tag.strip_prefix('#') {
            stack.push((Some((field.trim(), false)), Vec::new()));
        } else if let Some(field) = tag.strip_prefix('^') {
            stack.push((Some((field.trim(), true)), Vec::new()));
        } else if let Some(field) = tag.strip_prefix('/') {
            let field = field.trim();
            if stack.len() == 1 {
                return fail(format!("'{{{{/{field}}}}}' closes a section that was never opened"));
            }
            let Some((Some((open, negated)), children)) = stack.pop() else {
                return fail("corrupt section stack");
            };
            if open != field {
                return fail(format!(
                    "'{{{{/{field}}}}}' does not match the open section '{open}'"
                ));
            }
            push(
                &mut stack,
                Node::Section {
                    field,
                    negated,
                    children,
                },
            );
        } else {
            let mut parts: Vec<&str> = tag.split(':').map(str::trim).collect();
            let field = parts.pop().unwrap_or_default();
            push(
                &mut stack,
                Node::Replacement {
                    field,
                    filters: parts,
                },
            );
        }
    }
    if !rest.is_empty() {
        push(&mut stack, Node::Text(rest));
    }
    match stack.pop() {
        Some((None, nodes)) if stack.is_empty() => Ok(nodes),
        Some((Some((field, _)), _)) => fail(format!("section '{field}' is never closed")),
        _ => fail("corrupt section stack"),
    }
}

fn push<'a>(stack: &mut [Frame<'a>], node: Node<'a>) {
    if let Some((_, nodes)) = stack.last_mut() {
        nodes.push(node);
    }
}

fn render_nodes(nodes: &[Node], ctx: &Context, out: &mut String) -> Fallible<()> {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Replacement { field, filters } => {
                let mut value = ctx.field(field)?.to_string();
                // Filters apply innermost first: `{{text:cloze:Field}}` runs `cloze`, then `text`.
                for filter in filters.iter().rev() {
                    value = apply_filter(filter, &value, ctx);
                }
                out.push_str(&value);
            }
            Node::Section {
                field,
                negated,
                children,
            } => {
                let present = !field_is_empty(ctx.field(field)?);
                if present != *negated {
                    render_nodes(children, ctx, out)?;
                }
            }
        }
    }
    Ok(())
}

fn apply_filter(filter: &str, value: &str, ctx: &Context) -> String {
    match filter {
        "text" => strip_html(value),
        "cloze" => render_cloze(value, ctx.cloze_ord, ctx.side),
        "hint" => value.to_string(),
        // Typing and speech need a live reviewer.
        "type" | "tts" => String::new(),
        _ => {
            debug!("Unsupported template filter '{filter}', passing the value through.");
            value.to_string()
        }
    }
}

fn strip_html(value: &str) -> String {
    HTML_TAG.replace_all(value, "").into_owned()
}

fn field_is_empty(value: &str) -> bool {
    strip_html(value).replace("&nbsp;", " ").trim().is_empty()
}
