//! `<access origin="...">` primitives on [`ConfigXml`].

use std::collections::BTreeMap;

use serde::Serialize;

use crate::node::{Element, Node};
use crate::ConfigXml;

/// Element name of an access entry.
pub const ACCESS_ELEMENT: &str = "access";

/// Attribute holding the origin pattern.
pub const ORIGIN_ATTRIBUTE: &str = "origin";

/// A declared access origin and its extra attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessEntry {
    pub origin: String,

    /// Attributes other than `origin`, alphabetical
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

/// What [`ConfigXml::set_access_origin`] did to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessChange {
    /// A new entry was appended to the root.
    Added,
    /// An existing entry had its attributes replaced.
    Updated,
    /// An identical entry already existed.
    Unchanged,
}

fn is_access_for(node: &Node, origin: &str) -> bool {
    matches!(
        node,
        Node::Element(element)
            if element.name == ACCESS_ELEMENT && element.attribute(ORIGIN_ATTRIBUTE) == Some(origin)
    )
}

fn extra_attributes(element: &Element) -> BTreeMap<String, String> {
    element
        .attributes
        .iter()
        .filter(|(key, _)| key.as_str() != ORIGIN_ATTRIBUTE)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

impl ConfigXml {
    /// All access entries directly under the root, in document order.
    pub fn access_entries(&self) -> Vec<AccessEntry> {
        self.root
            .child_elements()
            .filter(|e| e.name == ACCESS_ELEMENT)
            .filter_map(|e| {
                e.attribute(ORIGIN_ATTRIBUTE).map(|origin| AccessEntry {
                    origin: origin.to_string(),
                    attributes: extra_attributes(e),
                })
            })
            .collect()
    }

    /// Declare `origin` with exactly `attributes` besides `origin` itself.
    ///
    /// An existing entry is updated in place; any further entries for the same
    /// origin are dropped. A missing entry is appended as the last child of
    /// the root.
    pub fn set_access_origin(
        &mut self,
        origin: &str,
        attributes: &BTreeMap<String, String>,
    ) -> AccessChange {
        let mut desired = Element::new(ACCESS_ELEMENT).with_attribute(ORIGIN_ATTRIBUTE, origin);
        for (key, value) in attributes {
            if key != ORIGIN_ATTRIBUTE {
                desired.attributes.insert(key.clone(), value.clone());
            }
        }

        let first = self.root.children.iter().position(|n| is_access_for(n, origin));
        let Some(index) = first else {
            self.root.children.push(Node::Element(desired));
            self.dirty = true;
            return AccessChange::Added;
        };

        let duplicates = self.drop_access_after(index, origin);

        let mut change = AccessChange::Unchanged;
        if let Some(existing) = self.root.children[index].as_element_mut() {
            if existing.attributes != desired.attributes {
                existing.attributes = desired.attributes;
                change = AccessChange::Updated;
            }
        }

        if duplicates > 0 && change == AccessChange::Unchanged {
            change = AccessChange::Updated;
        }
        if change == AccessChange::Updated {
            self.dirty = true;
        }
        change
    }

    /// Remove every access entry for `origin`; returns how many were removed.
    pub fn remove_access_origin(&mut self, origin: &str) -> usize {
        let before = self.root.children.len();
        self.root.children.retain(|n| !is_access_for(n, origin));
        let removed = before - self.root.children.len();
        if removed > 0 {
            self.dirty = true;
        }
        removed
    }

    fn drop_access_after(&mut self, index: usize, origin: &str) -> usize {
        let tail = self.root.children.split_off(index + 1);
        let before = tail.len();
        let kept: Vec<Node> = tail.into_iter().filter(|n| !is_access_for(n, origin)).collect();
        let dropped = before - kept.len();
        self.root.children.extend(kept);
        dropped
    }
}
