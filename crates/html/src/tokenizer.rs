//! Practical HTML tokenizer.
//!
//! Tag and attribute names are ASCII `[A-Za-z0-9:_-]`, folded to lowercase.
//! `<script>` and `<style>` bodies are raw text up to the matching close tag.
//! This is not the HTML5 state machine: malformed markup is recovered from by
//! skipping bytes rather than by the HTML5 parse-error rules.
use crate::entities::decode_entities;
use crate::types::{AtomId, AtomTable, Token, TokenStream};
use memchr::memchr;

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";
const DOCTYPE_START: &[u8] = b"<!doctype";

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

pub(crate) fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

pub(crate) fn is_rawtext_element(name: &str) -> bool {
    name == "script" || name == "style"
}

/// Tokenize a whole document in one pass.
pub fn tokenize(input: &str) -> TokenStream {
    Tokenizer::new(input).run()
}

/// Cursor over the input. Slices are only ever cut at ASCII bytes, so every
/// slice endpoint is a UTF-8 char boundary.
pub struct Tokenizer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    atoms: AtomTable,
    out: Vec<Token>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            atoms: AtomTable::new(),
            out: Vec::new(),
        }
    }

    pub fn run(mut self) -> TokenStream {
        while self.pos < self.bytes.len() {
            if self.bytes[self.pos] != b'<' {
                self.text();
                continue;
            }
            let rest = &self.input[self.pos..];
            if rest.starts_with(COMMENT_START) {
                self.comment();
            } else if self.starts_with_ignore_case(DOCTYPE_START) {
                self.doctype();
            } else if self.peek(1) == Some(b'/') {
                self.end_tag();
            } else if self.peek(1).is_some_and(|b| b.is_ascii_alphabetic()) {
                self.start_tag();
            } else {
                // A stray `<` is literal text.
                self.push_text("<".to_string());
                self.pos += 1;
            }
        }
        log::trace!(target: "html.tokenizer", "emitted {} tokens", self.out.len());
        TokenStream::new(self.out, self.atoms)
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn starts_with_ignore_case(&self, needle: &[u8]) -> bool {
        self.bytes
            .get(self.pos..self.pos + needle.len())
            .is_some_and(|s| s.eq_ignore_ascii_case(needle))
    }

    fn push_text(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        // Merge with a preceding text token so stray `<` doesn't split text nodes.
        if let Some(Token::Text(prev)) = self.out.last_mut() {
            prev.push_str(&text);
            return;
        }
        self.out.push(Token::Text(text));
    }

    fn text(&mut self) {
        let start = self.pos;
        let end = memchr(b'<', &self.bytes[start..])
            .map(|rel| start + rel)
            .unwrap_or(self.bytes.len());
        self.pos = end;
        let decoded = decode_entities(&self.input[start..end]);
        self.push_text(decoded);
    }

    fn comment(&mut self) {
        let body_start = self.pos + COMMENT_START.len();
        match self.input[body_start..].find(COMMENT_END) {
            Some(rel) => {
                let body = &self.input[body_start..body_start + rel];
                self.out.push(Token::Comment(body.to_string()));
                self.pos = body_start + rel + COMMENT_END.len();
            }
            None => {
                // Unterminated comments swallow the rest of the input.
                self.out
                    .push(Token::Comment(self.input[body_start..].to_string()));
                self.pos = self.bytes.len();
            }
        }
    }

    /// An unterminated doctype runs to the end of the input.
    fn doctype(&mut self) {
        let body_start = self.pos + 2;
        let body_end = match memchr(b'>', &self.bytes[body_start..]) {
            Some(rel) => {
                self.pos = body_start + rel + 1;
                body_start + rel
            }
            None => {
                log::warn!(target: "html.tokenizer", "unterminated doctype at byte {}", self.pos);
                self.pos = self.bytes.len();
                self.bytes.len()
            }
        };
        let body = self.input[body_start..body_end].trim();
        self.out.push(Token::Doctype(body.to_string()));
    }

    fn name(&mut self) -> Option<AtomId> {
        let start = self.pos;
        while self.pos < self.bytes.len() && is_name_byte(self.bytes[self.pos]) {
            self.pos += 1;
        }
        if start == self.pos {
            return None;
        }
        Some(self.atoms.intern_ascii_lowercase(&self.input[start..self.pos]))
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn skip_past_gt(&mut self) {
        match memchr(b'>', &self.bytes[self.pos..]) {
            Some(rel) => self.pos += rel + 1,
            None => self.pos = self.bytes.len(),
        }
    }

    fn end_tag(&mut self) {
        self.pos += 2;
        let name = self.name();
        self.skip_past_gt();
        match name {
            Some(name) => self.out.push(Token::EndTag(name)),
            None => log::trace!(target: "html.tokenizer", "dropping nameless end tag"),
        }
    }

    fn start_tag(&mut self) {
        self.pos += 1;
        let Some(name) = self.name() else {
            return;
        };
        let mut attributes: Vec<(AtomId, Option<String>)> = Vec::new();
        let mut self_closing = false;

        loop {
            self.skip_whitespace();
            match self.peek(0) {
                None => break,
                Some(b'>') => {
                    self.pos += 1;
                    break;
                }
                Some(b'/') => {
                    self.pos += 1;
                    if self.peek(0) == Some(b'>') {
                        self.pos += 1;
                        self_closing = true;
                        break;
                    }
                }
                Some(_) => match self.name() {
                    Some(attr) => {
                        let value = self.attribute_value();
                        if !attributes.iter().any(|(existing, _)| *existing == attr) {
                            attributes.push((attr, value));
                        }
                    }
                    None => self.pos += 1,
                },
            }
        }

        let tag = self.atoms.resolve(name);
        let void = is_void_element(tag);
        let rawtext = is_rawtext_element(tag);
        self.out.push(Token::StartTag {
            name,
            attributes,
            self_closing: self_closing || void,
        });

        if rawtext && !self_closing {
            self.rawtext(name);
        }
    }

    fn attribute_value(&mut self) -> Option<String> {
        self.skip_whitespace();
        if self.peek(0) != Some(b'=') {
            return None;
        }
        self.pos += 1;
        self.skip_whitespace();
        match self.peek(0) {
            Some(quote @ (b'"' | b'\'')) => {
                let start = self.pos + 1;
                let end = memchr(quote, &self.bytes[start..])
                    .map(|rel| start + rel)
                    .unwrap_or(self.bytes.len());
                self.pos = (end + 1).min(self.bytes.len());
                Some(decode_entities(&self.input[start..end]))
            }
            _ => {
                let start = self.pos;
                while let Some(b) = self.peek(0) {
                    if b.is_ascii_whitespace() || b == b'>' {
                        break;
                    }
                    if b == b'/' && self.peek(1) == Some(b'>') {
                        break;
                    }
                    self.pos += 1;
                }
                Some(decode_entities(&self.input[start..self.pos]))
            }
        }
    }

    fn rawtext(&mut self, name: AtomId) {
        let tag = self.atoms.resolve(name);
        let body_start = self.pos;
        match find_close_tag(&self.input[body_start..], tag) {
            Some((rel_start, rel_end)) => {
                let body = &self.input[body_start..body_start + rel_start];
                if !body.is_empty() {
                    self.out.push(Token::Text(body.to_string()));
                }
                self.pos = body_start + rel_end;
            }
            None => {
                let body = &self.input[body_start..];
                if !body.is_empty() {
                    self.out.push(Token::Text(body.to_string()));
                }
                self.pos = self.bytes.len();
            }
        }
        self.out.push(Token::EndTag(name));
    }
}

/// Find `</tag` (case-insensitive) followed by optional whitespace and `>`.
/// Returns the byte range of the close tag within `haystack`.
fn find_close_tag(haystack: &str, tag: &str) -> Option<(usize, usize)> {
    let bytes = haystack.as_bytes();
    let tag = tag.as_bytes();
    let mut i = 0;
    while let Some(rel) = memchr(b'<', &bytes[i..]) {
        let start = i + rel;
        let name_start = start + 2;
        let name_end = name_start + tag.len();
        if bytes.get(start + 1) == Some(&b'/')
            && bytes
                .get(name_start..name_end)
                .is_some_and(|s| s.eq_ignore_ascii_case(tag))
        {
            let mut k = name_end;
            while k < bytes.len() && bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            if bytes.get(k) == Some(&b'>') {
                return Some((start, k + 1));
            }
        }
        i = start + 1;
    }
    None
}
