use crate::document::{Document, NodeId, NodeKind};

fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

/// Serialize the whole document back to markup.
pub fn to_html(doc: &Document) -> String {
    let mut out = String::new();
    if let Some(doctype) = doc.doctype() {
        out.push_str("<!");
        out.push_str(doctype);
        out.push('>');
    }
    for &child in doc.children(doc.root()).unwrap_or(&[]) {
        write_node(doc, child, false, &mut out);
    }
    out
}

/// Serialize one node and its subtree.
pub fn node_to_html(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, id, false, &mut out);
    out
}

fn write_node(doc: &Document, id: NodeId, raw: bool, out: &mut String) {
    let Ok(kind) = doc.kind(id) else {
        return;
    };
    match kind {
        NodeKind::Document { .. } => {
            for &child in doc.children(id).unwrap_or(&[]) {
                write_node(doc, child, false, out);
            }
        }
        NodeKind::Element { name, attributes } => {
            out.push('<');
            out.push_str(name);
            for (key, value) in attributes {
                out.push(' ');
                out.push_str(key);
                if let Some(value) = value {
                    out.push_str("=\"");
                    escape_attribute(value, out);
                    out.push('"');
                }
            }
            out.push('>');
            if html::is_void_element(name) {
                return;
            }
            let raw_children = html::is_rawtext_element(name);
            for &child in doc.children(id).unwrap_or(&[]) {
                write_node(doc, child, raw_children, out);
            }
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
        NodeKind::Text { text } => {
            if raw {
                out.push_str(text);
            } else {
                escape_text(text, out);
            }
        }
        NodeKind::Comment { text } => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
    }
}

/// Short human label: `div#faq.toggle.toggle-open`, `#text`, `#document`.
pub fn node_label(doc: &Document, id: NodeId) -> String {
    match doc.kind(id) {
        Ok(NodeKind::Element { name, .. }) => {
            let mut label = name.clone();
            if let Some(value) = doc.attribute(id, "id").filter(|v| !v.is_empty()) {
                label.push('#');
                label.push_str(value);
            }
            for class in doc.classes(id) {
                label.push('.');
                label.push_str(class);
            }
            label
        }
        Ok(NodeKind::Document { .. }) => "#document".to_string(),
        Ok(NodeKind::Text { .. }) => "#text".to_string(),
        Ok(NodeKind::Comment { .. }) => "#comment".to_string(),
        Err(_) => format!("<unknown {id}>"),
    }
}

fn shorten(text: &str) -> String {
    let flat = text.replace('\n', " ");
    let flat = flat.trim();
    match flat.char_indices().nth(40) {
        Some((cut, _)) => format!("{}…", &flat[..cut]),
        None => flat.to_string(),
    }
}

/// Indented outline of the tree, at most `cap` lines.
pub fn outline(doc: &Document, cap: usize) -> Vec<String> {
    fn walk(doc: &Document, id: NodeId, depth: usize, out: &mut Vec<String>, left: &mut usize) {
        if *left == 0 {
            return;
        }
        let indent = "  ".repeat(depth);
        let line = match doc.kind(id) {
            Ok(NodeKind::Document { doctype }) => match doctype {
                Some(dt) => format!("{indent}<!{dt}>"),
                None => format!("{indent}#document"),
            },
            Ok(NodeKind::Element { name, .. }) => {
                let mut line = format!("{indent}<{name}");
                if let Some(value) = doc.attribute(id, "id") {
                    line.push_str(&format!(r#" id="{value}""#));
                }
                if let Some(value) = doc.attribute(id, "class").filter(|v| !v.is_empty()) {
                    line.push_str(&format!(r#" class="{value}""#));
                }
                line.push('>');
                line
            }
            Ok(NodeKind::Text { text }) => {
                let t = shorten(text);
                if t.is_empty() {
                    return;
                }
                format!("{indent}\"{t}\"")
            }
            Ok(NodeKind::Comment { text }) => format!("{indent}<!-- {} -->", shorten(text)),
            Err(_) => return,
        };
        *left -= 1;
        out.push(line);
        for &child in doc.children(id).unwrap_or(&[]) {
            walk(doc, child, depth + 1, out, left);
        }
    }

    let mut out = Vec::new();
    let mut left = cap;
    walk(doc, doc.root(), 0, &mut out, &mut left);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_toggle_markup() {
        let markup = r#"<!doctype html><div class="toggle toggle-closed" data-x><span>More &amp; less</span><br></div>"#;
        let doc = Document::parse(markup);
        assert_eq!(to_html(&doc), markup);
    }

    #[test]
    fn escapes_attribute_quotes_and_keeps_script_raw() {
        let doc = Document::parse(r#"<p title='say "hi"'>a &lt; b</p><script>if (a < b) {}</script>"#);
        assert_eq!(
            to_html(&doc),
            r#"<p title="say &quot;hi&quot;">a &lt; b</p><script>if (a < b) {}</script>"#
        );
    }

    #[test]
    fn built_nodes_serialize_like_parsed_ones() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        let note = doc.create_comment(" note ");
        let text = doc.create_text("a < b");
        doc.append_child(NodeId::DOCUMENT, div).unwrap();
        doc.append_child(div, note).unwrap();
        doc.append_child(div, text).unwrap();
        assert_eq!(node_to_html(&doc, div), "<div><!-- note -->a &lt; b</div>");
        assert_eq!(doc.text_content(div), "a < b");
    }

    #[test]
    fn unterminated_doctype_is_not_dropped() {
        let doc = Document::parse("<!doctype html\nhello world");
        assert_eq!(to_html(&doc), "<!doctype html\nhello world>");
    }

    #[test]
    fn labels_and_outline() {
        let doc = Document::parse(
            "<div id=\"faq\" class=\"toggle toggle-open\"><span>Question?</span><!-- c --></div>",
        );
        let div = doc.find_by_id("faq").unwrap();
        assert_eq!(node_label(&doc, div), "div#faq.toggle.toggle-open");
        assert_eq!(node_label(&doc, doc.root()), "#document");
        assert_eq!(
            outline(&doc, 10),
            vec![
                "#document",
                r#"  <div id="faq" class="toggle toggle-open">"#,
                "    <span>",
                "      \"Question?\"",
                "    <!-- c -->",
            ]
        );
        assert_eq!(outline(&doc, 2).len(), 2);
    }

    #[test]
    fn outline_shortens_long_text() {
        let doc = Document::parse(&format!("<p>{}</p>", "é".repeat(50)));
        let lines = outline(&doc, 10);
        assert_eq!(lines[2], format!("    \"{}…\"", "é".repeat(40)));
    }
}
