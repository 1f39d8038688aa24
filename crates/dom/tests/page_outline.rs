use dom::{Event, EventType, Page, outline};
use toggle_test_support::assert_lines_eq;

const PAGE: &str = r#"<!doctype html><div id="faq" class="toggle"><span id="q">Question</span><p>Answer</p></div>"#;

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn bubbled_click_is_visible_in_outline() {
    let mut page = Page::parse(PAGE);
    let faq = page.document().find_by_id("faq").unwrap();
    page.add_event_listener(faq, EventType::Click, |page: &mut Page, event: &Event| {
        page.document_mut()
            .class_list(event.current_target)?
            .add("seen")?;
        Ok(())
    })
    .unwrap();

    assert_lines_eq(
        "before click",
        &lines(&[
            "<!doctype html>",
            r#"  <div id="faq" class="toggle">"#,
            "    <span id=\"q\">",
            "      \"Question\"",
            "    <p>",
            "      \"Answer\"",
        ]),
        &outline(page.document(), 50),
    );

    let outcome = page.click_selector("span#q").unwrap();
    assert!(outcome.is_ok());
    assert_eq!(outcome.invoked, 1);
    assert_lines_eq(
        "after click",
        &lines(&[
            "<!doctype html>",
            r#"  <div id="faq" class="toggle seen">"#,
            "    <span id=\"q\">",
            "      \"Question\"",
            "    <p>",
            "      \"Answer\"",
        ]),
        &outline(page.document(), 50),
    );
}

#[test]
fn listener_errors_are_collected_not_raised() {
    let mut page = Page::parse(PAGE);
    let faq = page.document().find_by_id("faq").unwrap();
    page.add_event_listener(faq, EventType::Click, |page: &mut Page, _: &Event| {
        page.document_mut().class_list(dom::NodeId::DOCUMENT)?;
        Ok(())
    })
    .unwrap();
    let outcome = page.click_selector("#q").unwrap();
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].current_target, faq);
    assert_eq!(
        outcome.failures[0].error.to_string(),
        "node #0 is not an element"
    );
}
