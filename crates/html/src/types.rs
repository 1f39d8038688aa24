use std::collections::HashMap;
use std::sync::Arc;

/// Interned tag or attribute name. Only meaningful with the `AtomTable` that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AtomId(pub u32);

/// Per-stream name table.
///
/// Names are stored ASCII-lowercased, so `DIV` and `div` share one atom.
#[derive(Debug, Default)]
pub struct AtomTable {
    atoms: Vec<Arc<str>>,
    map: HashMap<Arc<str>, AtomId>,
}

impl AtomTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern_ascii_lowercase(&mut self, name: &str) -> AtomId {
        if !name.bytes().any(|b| b.is_ascii_uppercase()) {
            if let Some(id) = self.map.get(name) {
                return *id;
            }
            return self.insert(Arc::from(name));
        }
        let folded = name.to_ascii_lowercase();
        if let Some(id) = self.map.get(folded.as_str()) {
            return *id;
        }
        self.insert(Arc::from(folded))
    }

    fn insert(&mut self, name: Arc<str>) -> AtomId {
        let id = AtomId(self.atoms.len() as u32);
        self.atoms.push(Arc::clone(&name));
        self.map.insert(name, id);
        id
    }

    /// Resolve an atom back to its name; unknown ids resolve to `""`.
    pub fn resolve(&self, id: AtomId) -> &str {
        self.atoms.get(id.0 as usize).map(|s| &**s).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Doctype(String),
    StartTag {
        name: AtomId,
        attributes: Vec<(AtomId, Option<String>)>,
        self_closing: bool,
    },
    EndTag(AtomId),
    Comment(String),
    Text(String),
}

/// Tokens plus the atom table their names were interned into.
#[derive(Debug)]
pub struct TokenStream {
    tokens: Vec<Token>,
    atoms: AtomTable,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>, atoms: AtomTable) -> Self {
        Self { tokens, atoms }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn atoms(&self) -> &AtomTable {
        &self.atoms
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Owned document tree as produced by the builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Document {
        doctype: Option<String>,
        children: Vec<Node>,
    },
    Element {
        name: String,
        attributes: Vec<(String, Option<String>)>,
        children: Vec<Node>,
    },
    Text {
        text: String,
    },
    Comment {
        text: String,
    },
}

impl Node {
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Document { children, .. } | Node::Element { children, .. } => children,
            Node::Text { .. } | Node::Comment { .. } => &[],
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        match self {
            Node::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .and_then(|(_, v)| v.as_deref()),
            _ => None,
        }
    }
}
