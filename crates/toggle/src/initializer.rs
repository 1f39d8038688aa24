use std::rc::Rc;

use dom::{EventType, ListenerId, NodeId, Page, node_label};

use crate::config::ToggleConfig;
use crate::error::ToggleError;
use crate::handler::toggle_click;

/// Name of the click listener placed on every toggle.
pub const CLICK_LISTENER: &str = "toggle-click";

/// Label every marker element closed and attach the click handler to it.
///
/// Returns how many elements carry the marker class. Calling it again
/// re-labels them all closed but never attaches a second handler.
pub fn add_toggle_listeners(page: &mut Page, config: &ToggleConfig) -> Result<usize, ToggleError> {
    config.validate()?;
    let toggles = page.document().elements_by_class_name(&config.marker_class);
    if toggles.is_empty() {
        log::debug!(target: "toggle", "no .{} elements", config.marker_class);
        return Ok(0);
    }

    let shared = Rc::new(config.clone());
    for &toggle in &toggles {
        let mut classes = page.document_mut().class_list(toggle)?;
        classes.remove(&config.open_class)?;
        classes.add(&config.closed_class)?;

        let config = Rc::clone(&shared);
        let added = page.add_named_listener(
            toggle,
            EventType::Click,
            CLICK_LISTENER,
            move |page, event| {
                toggle_click(page.document_mut(), event, &config)?;
                Ok(())
            },
        )?;
        if added.is_none() {
            log::debug!(
                target: "toggle",
                "{} already has a click handler",
                node_label(page.document(), toggle)
            );
        }
    }

    log::info!(target: "toggle", "initialized {} toggles", toggles.len());
    Ok(toggles.len())
}

/// Run [`add_toggle_listeners`] once the page fires `DOMContentLoaded`.
pub fn install(page: &mut Page, config: ToggleConfig) -> Result<ListenerId, ToggleError> {
    config.validate()?;
    let config = Rc::new(config);
    let id = page.add_event_listener(
        NodeId::DOCUMENT,
        EventType::DomContentLoaded,
        move |page, _| {
            add_toggle_listeners(page, &config)?;
            Ok(())
        },
    )?;
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{ToggleState, state_of};

    const FAQ: &str = r#"<section id="faq">
<div id="q1" class="toggle toggle-open"><span id="s1">First</span></div>
<div id="q2" class="toggle"><span id="s2">Second</span></div>
</section>
<p id="outside">Elsewhere</p>"#;

    fn node(page: &Page, id: &str) -> NodeId {
        page.document().find_by_id(id).unwrap()
    }

    fn state(page: &Page, id: &str) -> Option<ToggleState> {
        state_of(page.document(), node(page, id), &ToggleConfig::default())
    }

    #[test]
    fn every_marker_starts_closed() {
        let mut page = Page::parse(FAQ);
        let count = add_toggle_listeners(&mut page, &ToggleConfig::default()).unwrap();
        assert_eq!(count, 2);
        assert_eq!(state(&page, "q1"), Some(ToggleState::Closed));
        assert_eq!(state(&page, "q2"), Some(ToggleState::Closed));
        assert_eq!(page.document().classes(node(&page, "q1")), vec!["toggle", "toggle-closed"]);
        assert_eq!(page.listener_count(node(&page, "q1"), &EventType::Click), 1);
    }

    #[test]
    fn child_clicks_alternate() {
        let mut page = Page::parse(FAQ);
        add_toggle_listeners(&mut page, &ToggleConfig::default()).unwrap();
        for expected in [ToggleState::Open, ToggleState::Closed, ToggleState::Open] {
            let outcome = page.click_selector("#s2").unwrap();
            assert!(outcome.is_ok());
            assert_eq!(state(&page, "q2"), Some(expected));
        }
        assert_eq!(state(&page, "q1"), Some(ToggleState::Closed));
    }

    #[test]
    fn clicks_outside_change_nothing() {
        let mut page = Page::parse(FAQ);
        add_toggle_listeners(&mut page, &ToggleConfig::default()).unwrap();
        let outcome = page.click_selector("#outside").unwrap();
        assert_eq!(outcome.invoked, 0);
        assert_eq!(state(&page, "q1"), Some(ToggleState::Closed));
        assert_eq!(state(&page, "q2"), Some(ToggleState::Closed));
        assert_eq!(state(&page, "outside"), None);
    }

    #[test]
    fn no_markers_is_a_no_op() {
        let mut page = Page::parse("<p>plain</p>");
        assert_eq!(add_toggle_listeners(&mut page, &ToggleConfig::default()).unwrap(), 0);
        assert_eq!(page.total_listeners(), 0);
    }

    #[test]
    fn running_twice_does_not_double_the_handler() {
        let mut page = Page::parse(FAQ);
        let config = ToggleConfig::default();
        add_toggle_listeners(&mut page, &config).unwrap();
        page.click_selector("#s1").unwrap();
        assert_eq!(state(&page, "q1"), Some(ToggleState::Open));

        add_toggle_listeners(&mut page, &config).unwrap();
        assert_eq!(page.total_listeners(), 2);
        assert_eq!(state(&page, "q1"), Some(ToggleState::Closed));
        page.click_selector("#s1").unwrap();
        assert_eq!(state(&page, "q1"), Some(ToggleState::Open));
    }

    #[test]
    fn install_waits_for_ready() {
        let mut page = Page::parse(FAQ);
        install(&mut page, ToggleConfig::default()).unwrap();
        assert_eq!(state(&page, "q1"), Some(ToggleState::Open));
        assert!(page.click_selector("#s2").unwrap().is_ok());
        assert_eq!(state(&page, "q2"), None);

        let outcome = page.fire_ready().unwrap().unwrap();
        assert!(outcome.is_ok());
        assert_eq!(state(&page, "q1"), Some(ToggleState::Closed));
        assert!(page.fire_ready().unwrap().is_none());
    }

    #[test]
    fn invalid_config_is_refused_up_front() {
        let mut page = Page::parse(FAQ);
        let config = ToggleConfig {
            closed_class: "toggle-open".into(),
            ..ToggleConfig::default()
        };
        assert!(matches!(
            install(&mut page, config),
            Err(ToggleError::Config(_))
        ));
        assert_eq!(page.total_listeners(), 0);
    }

    #[test]
    fn clicking_the_toggle_itself_reports_its_parent() {
        let mut page = Page::parse(r#"<div id="t" class="toggle"></div>"#);
        add_toggle_listeners(&mut page, &ToggleConfig::default()).unwrap();
        let outcome = page.click_selector("#t").unwrap();
        assert_eq!(outcome.failures.len(), 1);
        let message = outcome.failures[0].error.to_string();
        assert!(message.contains("is not an element"), "{message}");
        assert_eq!(state(&page, "t"), Some(ToggleState::Closed));
    }
}
