use std::fmt;

use html::Node;

use crate::error::DomError;

/// Handle to a node of one `Document`. Handles are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// The document node of every `Document`.
    pub const DOCUMENT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document {
        doctype: Option<String>,
    },
    Element {
        name: String,
        attributes: Vec<(String, Option<String>)>,
    },
    Text {
        text: String,
    },
    Comment {
        text: String,
    },
}

#[derive(Debug, Clone)]
struct NodeRecord {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl NodeRecord {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    fn allows_children(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Document { .. } | NodeKind::Element { .. }
        )
    }
}

/// Live document tree. Node 0 is always the document node.
///
/// Nodes created but never appended, or detached later, stay valid: they simply
/// have no parent, the same way a removed DOM node is still a usable object.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeRecord>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeRecord::new(NodeKind::Document { doctype: None })],
        }
    }

    pub fn parse(input: &str) -> Self {
        Self::from_node(&html::parse(input))
    }

    /// Copy an owned tree into a fresh arena. A non-document root is appended
    /// under a new document node.
    pub fn from_node(root: &Node) -> Self {
        let mut doc = Self::new();
        let mut stack: Vec<(&Node, NodeId)> = Vec::new();

        match root {
            Node::Document { doctype, children } => {
                doc.nodes[0].kind = NodeKind::Document {
                    doctype: doctype.clone(),
                };
                for child in children.iter().rev() {
                    stack.push((child, NodeId::DOCUMENT));
                }
            }
            other => stack.push((other, NodeId::DOCUMENT)),
        }

        while let Some((node, parent)) = stack.pop() {
            let kind = match node {
                // A nested document node has no meaning here; keep its subtree.
                Node::Document { children, .. } => {
                    for child in children.iter().rev() {
                        stack.push((child, parent));
                    }
                    continue;
                }
                Node::Element {
                    name, attributes, ..
                } => NodeKind::Element {
                    name: name.clone(),
                    attributes: attributes.clone(),
                },
                Node::Text { text } => NodeKind::Text { text: text.clone() },
                Node::Comment { text } => NodeKind::Comment { text: text.clone() },
            };
            let id = doc.push(kind);
            doc.nodes[id.index()].parent = Some(parent);
            doc.nodes[parent.index()].children.push(id);
            for child in node.children().iter().rev() {
                stack.push((child, id));
            }
        }

        doc
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeRecord::new(kind));
        id
    }

    fn record(&self, id: NodeId) -> Result<&NodeRecord, DomError> {
        self.nodes.get(id.index()).ok_or(DomError::UnknownNode(id))
    }

    fn record_mut(&mut self, id: NodeId) -> Result<&mut NodeRecord, DomError> {
        self.nodes
            .get_mut(id.index())
            .ok_or(DomError::UnknownNode(id))
    }

    pub fn root(&self) -> NodeId {
        NodeId::DOCUMENT
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn doctype(&self) -> Option<&str> {
        match &self.nodes[0].kind {
            NodeKind::Document { doctype } => doctype.as_deref(),
            _ => None,
        }
    }

    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.push(NodeKind::Element {
            name: name.to_ascii_lowercase(),
            attributes: Vec::new(),
        })
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text {
            text: text.to_string(),
        })
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Comment {
            text: text.to_string(),
        })
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let parent_record = self.record(parent)?;
        if !parent_record.allows_children() {
            return Err(DomError::InvalidParent(parent));
        }
        let child_record = self.record(child)?;
        if child == NodeId::DOCUMENT {
            return Err(DomError::CycleDetected { parent, child });
        }
        if child_record.parent.is_some() {
            return Err(DomError::AlreadyAttached(child));
        }
        if parent == child || self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::CycleDetected { parent, child });
        }
        self.nodes[parent.index()].children.push(child);
        self.nodes[child.index()].parent = Some(parent);
        Ok(())
    }

    /// Unlink `node` (and its subtree) from its parent. The subtree stays intact.
    pub fn detach(&mut self, node: NodeId) -> Result<(), DomError> {
        if node == NodeId::DOCUMENT {
            return Err(DomError::DetachDocument);
        }
        let Some(parent) = self.record_mut(node)?.parent.take() else {
            return Ok(());
        };
        self.nodes[parent.index()].children.retain(|c| *c != node);
        Ok(())
    }

    pub fn kind(&self, id: NodeId) -> Result<&NodeKind, DomError> {
        Ok(&self.record(id)?.kind)
    }

    /// The container of `id`: its structural parent, if attached.
    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, DomError> {
        Ok(self.record(id)?.parent)
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId], DomError> {
        Ok(&self.record(id)?.children)
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.kind(id), Ok(NodeKind::Element { .. }))
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            Ok(NodeKind::Element { name, .. }) => Some(name),
            _ => None,
        }
    }

    pub fn attributes(&self, id: NodeId) -> Result<&[(String, Option<String>)], DomError> {
        match self.kind(id)? {
            NodeKind::Element { attributes, .. } => Ok(attributes),
            _ => Err(DomError::NotAnElement(id)),
        }
    }

    pub(crate) fn attributes_mut(
        &mut self,
        id: NodeId,
    ) -> Result<&mut Vec<(String, Option<String>)>, DomError> {
        match &mut self.record_mut(id)?.kind {
            NodeKind::Element { attributes, .. } => Ok(attributes),
            _ => Err(DomError::NotAnElement(id)),
        }
    }

    /// Attribute value; a present attribute without a value reads as `""`.
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attributes(id)
            .ok()?
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_deref().unwrap_or(""))
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let attributes = self.attributes_mut(id)?;
        match attributes
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            Some((_, v)) => *v = Some(value.to_string()),
            None => attributes.push((name.to_ascii_lowercase(), Some(value.to_string()))),
        }
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<bool, DomError> {
        let attributes = self.attributes_mut(id)?;
        let before = attributes.len();
        attributes.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        Ok(attributes.len() != before)
    }

    /// Text content of a subtree, concatenated in document order.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            let Ok(record) = self.record(node) else {
                continue;
            };
            if let NodeKind::Text { text } = &record.kind {
                out.push_str(text);
            }
            stack.extend(record.children.iter().rev().copied());
        }
        out
    }

    /// Ancestors of `id`, nearest first. `id` itself is not included.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.nodes.get(id.index()).and_then(|r| r.parent),
        }
    }

    /// Descendants of `root` in document order. `root` itself is not included.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let Ok(record) = self.record(root) else {
            return out;
        };
        let mut stack: Vec<NodeId> = record.children.iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.nodes[node.index()].children.iter().rev().copied());
        }
        out
    }

    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).any(|a| a == ancestor)
    }

    /// Element carrying `id="<value>"`, first in document order.
    pub fn find_by_id(&self, value: &str) -> Option<NodeId> {
        self.descendants(NodeId::DOCUMENT)
            .into_iter()
            .find(|&n| self.attribute(n, "id") == Some(value))
    }
}

pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.nodes.get(current.index()).and_then(|r| r.parent);
        Some(current)
    }
}
