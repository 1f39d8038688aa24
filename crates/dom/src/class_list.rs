//! `class` attribute as an ordered token set.
//!
//! Reads never fail: a non-element or an element without `class` has no tokens.
//! Every mutation re-serializes the set (deduplicated, single-space separated),
//! and an element that never had a `class` attribute only gains one when a token
//! is actually added.
use crate::document::{Document, NodeId};
use crate::error::DomError;

const CLASS: &str = "class";

pub(crate) fn split_tokens(value: &str) -> impl Iterator<Item = &str> {
    value.split_ascii_whitespace()
}

fn validate(token: &str) -> Result<(), DomError> {
    if token.is_empty() || token.bytes().any(|b| b.is_ascii_whitespace()) {
        return Err(DomError::InvalidToken(token.to_string()));
    }
    Ok(())
}

/// Mutable view over one element's classes.
pub struct ClassList<'a> {
    attributes: &'a mut Vec<(String, Option<String>)>,
}

impl ClassList<'_> {
    fn value(&self) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(CLASS))
            .map(|(_, v)| v.as_deref().unwrap_or(""))
    }

    fn ordered_set(&self) -> Vec<String> {
        let mut set: Vec<String> = Vec::new();
        for token in split_tokens(self.value().unwrap_or("")) {
            if !set.iter().any(|t| t == token) {
                set.push(token.to_string());
            }
        }
        set
    }

    fn write(&mut self, set: &[String]) {
        let joined = set.join(" ");
        match self
            .attributes
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(CLASS))
        {
            Some((_, v)) => *v = Some(joined),
            None => {
                if !set.is_empty() {
                    self.attributes.push((CLASS.to_string(), Some(joined)));
                }
            }
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        split_tokens(self.value().unwrap_or("")).any(|t| t == token)
    }

    pub fn tokens(&self) -> Vec<String> {
        self.ordered_set()
    }

    pub fn len(&self) -> usize {
        self.ordered_set().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn add(&mut self, token: &str) -> Result<(), DomError> {
        validate(token)?;
        let mut set = self.ordered_set();
        if !set.iter().any(|t| t == token) {
            set.push(token.to_string());
        }
        self.write(&set);
        Ok(())
    }

    pub fn remove(&mut self, token: &str) -> Result<(), DomError> {
        validate(token)?;
        let mut set = self.ordered_set();
        set.retain(|t| t != token);
        self.write(&set);
        Ok(())
    }

    /// Flip `token`; returns whether it is present afterwards.
    pub fn toggle(&mut self, token: &str) -> Result<bool, DomError> {
        if self.contains(token) {
            self.remove(token)?;
            Ok(false)
        } else {
            self.add(token)?;
            Ok(true)
        }
    }

    /// Swap `old` for `new` in place. Returns false (and changes nothing) when
    /// `old` is absent.
    pub fn replace(&mut self, old: &str, new: &str) -> Result<bool, DomError> {
        validate(old)?;
        validate(new)?;
        let mut set = self.ordered_set();
        let Some(pos) = set.iter().position(|t| t == old) else {
            return Ok(false);
        };
        if set.iter().any(|t| t == new) {
            set.remove(pos);
        } else {
            set[pos] = new.to_string();
        }
        self.write(&set);
        Ok(true)
    }
}

impl Document {
    pub fn class_list(&mut self, id: NodeId) -> Result<ClassList<'_>, DomError> {
        Ok(ClassList {
            attributes: self.attributes_mut(id)?,
        })
    }

    pub fn has_class(&self, id: NodeId, token: &str) -> bool {
        self.attribute(id, CLASS)
            .is_some_and(|value| split_tokens(value).any(|t| t == token))
    }

    pub fn classes(&self, id: NodeId) -> Vec<&str> {
        self.attribute(id, CLASS)
            .map(|value| split_tokens(value).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with(markup: &str) -> (Document, NodeId) {
        let doc = Document::parse(markup);
        let el = doc.descendants(doc.root())[0];
        (doc, el)
    }

    #[test]
    fn add_appends_once_and_normalizes() {
        let (mut doc, el) = doc_with(r#"<div class="  toggle  toggle extra">"#);
        doc.class_list(el).unwrap().add("toggle-closed").unwrap();
        assert_eq!(
            doc.attribute(el, "class"),
            Some("toggle extra toggle-closed")
        );
        doc.class_list(el).unwrap().add("toggle").unwrap();
        assert_eq!(doc.classes(el), vec!["toggle", "extra", "toggle-closed"]);
    }

    #[test]
    fn add_creates_missing_attribute() {
        let (mut doc, el) = doc_with("<div>");
        assert!(doc.classes(el).is_empty());
        doc.class_list(el).unwrap().add("a").unwrap();
        assert_eq!(doc.attribute(el, "class"), Some("a"));
    }

    #[test]
    fn remove_drops_every_occurrence_without_creating_attribute() {
        let (mut doc, el) = doc_with(r#"<div class="a b a">"#);
        doc.class_list(el).unwrap().remove("a").unwrap();
        assert_eq!(doc.attribute(el, "class"), Some("b"));

        let (mut doc, el) = doc_with("<div>");
        doc.class_list(el).unwrap().remove("a").unwrap();
        assert_eq!(doc.attribute(el, "class"), None);
    }

    #[test]
    fn toggle_and_replace() {
        let (mut doc, el) = doc_with(r#"<div class="x toggle-closed y">"#);
        let mut list = doc.class_list(el).unwrap();
        assert!(list.replace("toggle-closed", "toggle-open").unwrap());
        assert_eq!(list.tokens(), vec!["x", "toggle-open", "y"]);
        assert!(!list.replace("missing", "z").unwrap());
        assert!(!list.toggle("x").unwrap());
        assert!(list.toggle("x").unwrap());
        assert_eq!(list.tokens(), vec!["toggle-open", "y", "x"]);
    }

    #[test]
    fn rejects_invalid_tokens() {
        let (mut doc, el) = doc_with("<div>");
        let mut list = doc.class_list(el).unwrap();
        assert_eq!(list.add(""), Err(DomError::InvalidToken(String::new())));
        assert_eq!(
            list.add("two words"),
            Err(DomError::InvalidToken("two words".to_string()))
        );
    }

    #[test]
    fn non_elements_have_no_class_list() {
        let (mut doc, el) = doc_with("text");
        assert!(doc.class_list(el).is_err());
        assert!(!doc.has_class(el, "toggle"));
        assert!(matches!(
            doc.class_list(NodeId::DOCUMENT),
            Err(DomError::NotAnElement(NodeId::DOCUMENT))
        ));
    }
}
