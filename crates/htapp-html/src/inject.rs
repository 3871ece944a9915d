//! Runtime script injection into the document head.

use scraper::{Html, Node};

use crate::dom::html_element;

/// URL of the runtime support script.
pub const RUNTIME_SCRIPT_URL: &str = "/embed/runtime.js";

/// URL of the live reload client script.
pub const LIVE_RELOAD_SCRIPT_URL: &str = "/embed/development.js";

/// Append the runtime scripts to the first `<head>` of `document`.
///
/// The runtime script is deferred. The live reload client, added only in
/// `dev_mode`, is not, so that it connects before the page finishes loading.
/// Documents without a `<head>` are left unchanged.
///
/// Returns whether a `<head>` was found.
pub fn inject_scripts(document: &mut Html, dev_mode: bool) -> bool {
    let Some(head_id) = find_first_head(document) else {
        tracing::debug!("No <head> element, skipping script injection");
        return false;
    };
    let Some(mut head) = document.tree.get_mut(head_id) else {
        return false;
    };

    head.append(Node::Element(html_element(
        "script",
        &[("src", RUNTIME_SCRIPT_URL), ("defer", "")],
    )));
    if dev_mode {
        head.append(Node::Element(html_element(
            "script",
            &[("src", LIVE_RELOAD_SCRIPT_URL)],
        )));
    }

    true
}

/// Depth-first, left-to-right search for the first `<head>` element.
fn find_first_head(document: &Html) -> Option<ego_tree::NodeId> {
    let mut stack = vec![document.tree.root()];

    while let Some(node) = stack.pop() {
        if node
            .value()
            .as_element()
            .is_some_and(|el| el.name() == "head")
        {
            return Some(node.id());
        }
        let children: Vec<_> = node.children().collect();
        stack.extend(children.into_iter().rev());
    }

    None
}
