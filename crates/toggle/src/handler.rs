use std::fmt;

use dom::{Document, Event, NodeId, node_label};

use crate::config::ToggleConfig;
use crate::error::ToggleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleState {
    Open,
    Closed,
}

impl ToggleState {
    pub fn as_str(self) -> &'static str {
        match self {
            ToggleState::Open => "open",
            ToggleState::Closed => "closed",
        }
    }

    /// Class name carrying this state under `config`.
    pub fn label(self, config: &ToggleConfig) -> &str {
        match self {
            ToggleState::Open => &config.open_class,
            ToggleState::Closed => &config.closed_class,
        }
    }
}

impl fmt::Display for ToggleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of `node`, or `None` when it carries neither label or both.
pub fn state_of(doc: &Document, node: NodeId, config: &ToggleConfig) -> Option<ToggleState> {
    let open = doc.has_class(node, &config.open_class);
    let closed = doc.has_class(node, &config.closed_class);
    match (open, closed) {
        (true, false) => Some(ToggleState::Open),
        (false, true) => Some(ToggleState::Closed),
        _ => None,
    }
}

/// Flip the parent of the clicked node.
///
/// The container is the parent of `event.target`, which is not necessarily the
/// element the listener sits on: clicking the toggle itself flips the toggle's
/// parent, and clicking a grandchild flips the intermediate child.
pub fn toggle_click(
    doc: &mut Document,
    event: &Event,
    config: &ToggleConfig,
) -> Result<ToggleState, ToggleError> {
    let target = event.target;
    let container = doc
        .parent(target)?
        .ok_or(ToggleError::DetachedTarget(target))?;
    log::debug!(target: "toggle", "container {}", node_label(doc, container));
    if !doc.is_element(container) {
        return Err(ToggleError::ContainerNotElement { target, container });
    }

    let mut classes = doc.class_list(container)?;
    let next = if classes.contains(&config.closed_class) {
        classes.remove(&config.closed_class)?;
        classes.add(&config.open_class)?;
        ToggleState::Open
    } else {
        classes.remove(&config.open_class)?;
        classes.add(&config.closed_class)?;
        ToggleState::Closed
    };
    log::trace!(
        target: "toggle",
        "{} is now {next}",
        node_label(doc, container)
    );
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom::EventType;

    fn click_on(doc: &Document, id: &str) -> Event {
        Event::new(EventType::Click, doc.find_by_id(id).unwrap())
    }

    #[test]
    fn closed_container_opens_and_open_container_closes() {
        let config = ToggleConfig::default();
        let mut doc = Document::parse(
            r#"<div id="t" class="toggle toggle-closed"><span id="s">More</span></div>"#,
        );
        let t = doc.find_by_id("t").unwrap();
        let event = click_on(&doc, "s");

        assert_eq!(toggle_click(&mut doc, &event, &config).unwrap(), ToggleState::Open);
        assert_eq!(doc.classes(t), vec!["toggle", "toggle-open"]);
        assert_eq!(toggle_click(&mut doc, &event, &config).unwrap(), ToggleState::Closed);
        assert_eq!(doc.classes(t), vec!["toggle", "toggle-closed"]);
    }

    #[test]
    fn unlabeled_container_becomes_closed() {
        let config = ToggleConfig::default();
        let mut doc = Document::parse(r#"<p id="p"><b id="b"></b></p>"#);
        let p = doc.find_by_id("p").unwrap();
        let event = click_on(&doc, "b");
        assert_eq!(toggle_click(&mut doc, &event, &config).unwrap(), ToggleState::Closed);
        assert_eq!(doc.attribute(p, "class"), Some("toggle-closed"));
    }

    #[test]
    fn container_with_both_labels_opens() {
        let config = ToggleConfig::default();
        let mut doc =
            Document::parse(r#"<div id="t" class="toggle-open toggle-closed"><i id="i"></i></div>"#);
        let t = doc.find_by_id("t").unwrap();
        assert_eq!(state_of(&doc, t, &config), None);
        let event = click_on(&doc, "i");
        toggle_click(&mut doc, &event, &config).unwrap();
        assert_eq!(state_of(&doc, t, &config), Some(ToggleState::Open));
        assert_eq!(doc.classes(t), vec!["toggle-open"]);
    }

    #[test]
    fn detached_target_is_an_error() {
        let config = ToggleConfig::default();
        let mut doc = Document::new();
        let orphan = doc.create_element("span");
        let event = Event::new(EventType::Click, orphan);
        assert!(matches!(
            toggle_click(&mut doc, &event, &config),
            Err(ToggleError::DetachedTarget(n)) if n == orphan
        ));
    }

    #[test]
    fn top_level_target_has_no_element_container() {
        let config = ToggleConfig::default();
        let mut doc = Document::parse(r#"<div id="t" class="toggle"></div>"#);
        let event = click_on(&doc, "t");
        assert!(matches!(
            toggle_click(&mut doc, &event, &config),
            Err(ToggleError::ContainerNotElement { container, .. }) if container == NodeId::DOCUMENT
        ));
    }

    #[test]
    fn custom_labels() {
        let config = ToggleConfig {
            marker_class: "faq".into(),
            open_class: "expanded".into(),
            closed_class: "collapsed".into(),
        };
        let mut doc = Document::parse(r#"<dl id="d" class="faq collapsed"><dt id="q"></dt></dl>"#);
        let d = doc.find_by_id("d").unwrap();
        let event = click_on(&doc, "q");
        toggle_click(&mut doc, &event, &config).unwrap();
        assert_eq!(doc.classes(d), vec!["faq", "expanded"]);
        assert_eq!(ToggleState::Open.label(&config), "expanded");
    }
}
