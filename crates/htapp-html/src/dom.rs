//! Element construction helpers over the `scraper`/`html5ever` node types.

use html5ever::{Attribute, LocalName, Namespace, QualName};
use scraper::node::Element;

/// The HTML namespace URL.
const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Build an attribute in the null namespace.
fn attribute(name: &str, value: &str) -> Attribute {
    Attribute {
        name: QualName::new(None, Namespace::from(""), LocalName::from(name)),
        value: value.into(),
    }
}

/// Build an HTML element with the given attributes, in order.
pub(crate) fn html_element(name: &str, attrs: &[(&str, &str)]) -> Element {
    Element::new(
        QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from(name)),
        attrs
            .iter()
            .map(|(name, value)| attribute(name, value))
            .collect(),
    )
}

/// Copy of `element` with attribute `name` set to `value`.
///
/// Every other attribute is carried over unchanged.
pub(crate) fn with_attribute(element: &Element, name: &str, value: &str) -> Element {
    let attrs = element
        .attrs()
        .map(|(key, current)| attribute(key, if key == name { value } else { current }))
        .collect();
    Element::new(element.name.clone(), attrs)
}
