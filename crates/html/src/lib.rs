//! HTML front end: tokenizer, entity decoding and tree builder.

mod dom_builder;
mod entities;
mod tokenizer;
mod types;

pub use crate::dom_builder::{build_dom, parse};
pub use crate::tokenizer::{Tokenizer, tokenize};
pub use crate::types::{AtomId, AtomTable, Node, Token, TokenStream};

/// Elements serialized without an end tag.
pub fn is_void_element(name: &str) -> bool {
    tokenizer::is_void_element(name)
}

/// Elements whose body is raw text (no entity decoding, no child tags).
pub fn is_rawtext_element(name: &str) -> bool {
    tokenizer::is_rawtext_element(name)
}
