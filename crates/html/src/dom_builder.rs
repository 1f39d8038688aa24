use crate::types::{Node, Token, TokenStream};

/// Build an owned tree from a token stream with a stack of open elements.
///
/// An end tag closes the nearest open element with the same name and everything
/// opened after it; an end tag with no matching open element is dropped.
pub fn build_dom(stream: &TokenStream) -> Node {
    let atoms = stream.atoms();
    let mut arena = NodeArena::new();
    let root = arena.push(ArenaNode {
        node: Node::Document {
            doctype: None,
            children: Vec::new(),
        },
        children: Vec::new(),
    });
    let mut open_elements: Vec<usize> = Vec::new();

    for token in stream.tokens() {
        let parent = open_elements.last().copied().unwrap_or(root);
        match token {
            Token::Doctype(doctype) => arena.set_doctype(root, doctype.clone()),
            Token::Comment(text) => {
                arena.add_leaf(parent, Node::Comment { text: text.clone() });
            }
            Token::Text(text) => {
                if !text.is_empty() {
                    arena.add_leaf(parent, Node::Text { text: text.clone() });
                }
            }
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                let element = Node::Element {
                    name: atoms.resolve(*name).to_string(),
                    attributes: attributes
                        .iter()
                        .map(|(k, v)| (atoms.resolve(*k).to_string(), v.clone()))
                        .collect(),
                    children: Vec::new(),
                };
                let index = arena.add_leaf(parent, element);
                if !*self_closing {
                    open_elements.push(index);
                }
            }
            Token::EndTag(name) => {
                let target = atoms.resolve(*name);
                match open_elements
                    .iter()
                    .rposition(|&open| arena.is_element_named(open, target))
                {
                    Some(pos) => open_elements.truncate(pos),
                    None => log::warn!(target: "html.builder", "ignoring stray </{target}>"),
                }
            }
        }
    }

    arena.into_node(root)
}

/// Parse markup straight into an owned tree.
pub fn parse(input: &str) -> Node {
    build_dom(&crate::tokenize(input))
}

struct ArenaNode {
    node: Node,
    children: Vec<usize>,
}

struct NodeArena {
    nodes: Vec<Option<ArenaNode>>,
}

impl NodeArena {
    fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    fn push(&mut self, node: ArenaNode) -> usize {
        self.nodes.push(Some(node));
        self.nodes.len() - 1
    }

    fn add_leaf(&mut self, parent: usize, node: Node) -> usize {
        let index = self.push(ArenaNode {
            node,
            children: Vec::new(),
        });
        if let Some(parent) = self.nodes[parent].as_mut() {
            parent.children.push(index);
        }
        index
    }

    fn set_doctype(&mut self, root: usize, value: String) {
        if let Some(ArenaNode {
            node: Node::Document { doctype, .. },
            ..
        }) = self.nodes[root].as_mut()
        {
            *doctype = Some(value);
        }
    }

    fn is_element_named(&self, index: usize, target: &str) -> bool {
        matches!(
            &self.nodes[index],
            Some(ArenaNode { node: Node::Element { name, .. }, .. }) if name == target
        )
    }

    /// Assemble the owned tree bottom-up without recursion so deep documents
    /// cannot overflow the stack.
    fn into_node(mut self, root: usize) -> Node {
        let mut stack: Vec<(usize, bool)> = vec![(root, false)];
        let mut built: Vec<Node> = Vec::new();

        while let Some((index, visited)) = stack.pop() {
            let Some(entry) = self.nodes[index].as_ref() else {
                continue;
            };
            if !visited {
                stack.push((index, true));
                for &child in entry.children.iter().rev() {
                    stack.push((child, false));
                }
                continue;
            }

            let Some(ArenaNode { mut node, children }) = self.nodes[index].take() else {
                continue;
            };
            let split = built.len().saturating_sub(children.len());
            let kids = built.split_off(split);
            match &mut node {
                Node::Document { children, .. } | Node::Element { children, .. } => {
                    *children = kids;
                }
                Node::Text { .. } | Node::Comment { .. } => {
                    debug_assert!(kids.is_empty(), "leaf node cannot own children");
                }
            }
            built.push(node);
        }

        debug_assert_eq!(built.len(), 1, "builder must produce exactly one root");
        built.pop().unwrap_or(Node::Document {
            doctype: None,
            children: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element_names(node: &Node, out: &mut Vec<String>) {
        if let Node::Element { name, .. } = node {
            out.push(name.clone());
        }
        for child in node.children() {
            element_names(child, out);
        }
    }

    #[test]
    fn nests_children_under_open_elements() {
        let dom = parse(r#"<!doctype html><ul class="toggle"><li>a</li><li>b</li></ul>"#);
        let Node::Document { doctype, children } = &dom else {
            panic!("expected document root");
        };
        assert_eq!(doctype.as_deref(), Some("doctype html"));
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].attribute("class"), Some("toggle"));
        assert_eq!(children[0].children().len(), 2);
    }

    #[test]
    fn end_tag_closes_intervening_elements() {
        let dom = parse("<div><p><b>x</div><i>y</i>");
        let Node::Document { children, .. } = &dom else {
            panic!("expected document root");
        };
        assert_eq!(children.len(), 2, "got {dom:?}");
        let mut names = Vec::new();
        element_names(&dom, &mut names);
        assert_eq!(names, vec!["div", "p", "b", "i"]);
    }

    #[test]
    fn stray_end_tag_is_ignored() {
        let dom = parse("<div></span>text</div>");
        let Node::Document { children, .. } = &dom else {
            panic!("expected document root");
        };
        assert_eq!(
            children[0].children(),
            &[Node::Text {
                text: "text".to_string()
            }]
        );
    }

    #[test]
    fn void_elements_take_no_children() {
        let dom = parse("<p>a<br>b</p>");
        let Node::Document { children, .. } = &dom else {
            panic!("expected document root");
        };
        assert_eq!(children[0].children().len(), 3);
    }

    #[test]
    fn deep_nesting_does_not_recurse() {
        let depth = 10_000;
        let markup = "<div>".repeat(depth) + &"</div>".repeat(depth);
        let dom = parse(&markup);
        let mut current = &dom;
        let mut seen = 0usize;
        while let Some(child) = current.children().first() {
            seen += 1;
            current = child;
        }
        assert_eq!(seen, depth);
    }
}
