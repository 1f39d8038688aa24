//! Compound selectors: `tag`, `*`, `.class`, `#id` and comma-separated lists of them.
use std::iter::Peekable;
use std::str::CharIndices;

use crate::document::{Document, NodeId};
use crate::error::SelectorError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Compound {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
}

impl Compound {
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some(name) = doc.tag_name(node) else {
            return false;
        };
        if let Some(tag) = &self.tag {
            if !tag.eq_ignore_ascii_case(name) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if doc.attribute(node, "id") != Some(id.as_str()) {
                return false;
            }
        }
        self.classes.iter().all(|c| doc.has_class(node, c))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Compound>,
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

impl Selector {
    /// Selector matching any element that carries `class`.
    pub fn class(class: &str) -> Self {
        Self {
            alternatives: vec![Compound {
                classes: vec![class.to_string()],
                ..Compound::default()
            }],
        }
    }

    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(SelectorError::Empty);
        }
        let alternatives = trimmed
            .split(',')
            .map(|part| parse_compound(part.trim(), input))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { alternatives })
    }

    pub fn alternatives(&self) -> &[Compound] {
        &self.alternatives
    }

    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.alternatives.iter().any(|c| c.matches(doc, node))
    }
}

fn unsupported(selector: &str, reason: impl Into<String>) -> SelectorError {
    SelectorError::Unsupported {
        selector: selector.to_string(),
        reason: reason.into(),
    }
}

fn take_ident(chars: &mut Peekable<CharIndices<'_>>) -> String {
    let mut ident = String::new();
    while let Some(&(_, c)) = chars.peek() {
        if !is_ident_char(c) {
            break;
        }
        ident.push(c);
        chars.next();
    }
    ident
}

fn parse_compound(part: &str, whole: &str) -> Result<Compound, SelectorError> {
    if part.is_empty() {
        return Err(unsupported(whole, "empty selector in list"));
    }
    let mut compound = Compound::default();
    let mut chars = part.char_indices().peekable();

    if let Some(&(_, c)) = chars.peek() {
        if c == '*' {
            chars.next();
        } else if is_ident_char(c) {
            compound.tag = Some(take_ident(&mut chars).to_ascii_lowercase());
        }
    }

    while let Some((_, c)) = chars.next() {
        match c {
            '.' => {
                let class = take_ident(&mut chars);
                if class.is_empty() {
                    return Err(unsupported(whole, "expected class name after '.'"));
                }
                compound.classes.push(class);
            }
            '#' => {
                let id = take_ident(&mut chars);
                if id.is_empty() {
                    return Err(unsupported(whole, "expected id after '#'"));
                }
                if compound.id.is_some() {
                    return Err(unsupported(whole, "more than one id"));
                }
                compound.id = Some(id);
            }
            c if c.is_whitespace() || matches!(c, '>' | '+' | '~') => {
                return Err(unsupported(whole, "combinators are not supported"));
            }
            ':' | '[' => {
                return Err(unsupported(
                    whole,
                    "pseudo-classes and attribute selectors are not supported",
                ));
            }
            other => {
                return Err(unsupported(whole, format!("unexpected character {other:?}")));
            }
        }
    }

    Ok(compound)
}

impl Document {
    /// Elements under `root` matching `selector`, in document order.
    pub fn query_selector_all(&self, root: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&n| selector.matches(self, n))
            .collect()
    }

    pub fn query_selector(&self, root: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(root)
            .into_iter()
            .find(|&n| selector.matches(self, n))
    }

    pub fn elements_by_class_name(&self, class: &str) -> Vec<NodeId> {
        self.query_selector_all(self.root(), &Selector::class(class))
    }
}
