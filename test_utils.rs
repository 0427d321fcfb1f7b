/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! In-memory page for unit and scenario tests.
//!
//! [`FakePage`] implements both [`PageDom`] and [`BrowserHost`]. It models a
//! small element tree (`<html>` with a `<body>`) and records navigations,
//! opened URLs, clicks and scrolls. Selectors are single compound selectors:
//! a tag, `#id`, any number of `.class`, and `[attr]` / `[attr='value']`.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use crate::shell::host::{BrowserHost, PageDom};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FakeElementId(usize);

const ROOT: FakeElementId = FakeElementId(0);
const BODY: FakeElementId = FakeElementId(1);

#[derive(Debug, Default)]
struct FakeNode {
    tag: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    text: String,
    value: String,
    hidden: bool,
    parent: Option<FakeElementId>,
    children: Vec<FakeElementId>,
}

#[derive(Debug, Default)]
struct FakePageState {
    nodes: Vec<FakeNode>,
    focused: Option<FakeElementId>,
    url: String,
    navigations: Vec<String>,
    opened: Vec<String>,
    clicks: Vec<FakeElementId>,
    scrolled: Vec<FakeElementId>,
    storage: HashMap<String, String>,
}

impl FakePageState {
    fn node(&self, id: FakeElementId) -> &FakeNode {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: FakeElementId) -> &mut FakeNode {
        &mut self.nodes[id.0]
    }

    fn is_attached(&self, id: FakeElementId) -> bool {
        let mut current = id;
        loop {
            if current == ROOT {
                return true;
            }
            match self.node(current).parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    fn document_order(&self) -> Vec<FakeElementId> {
        let mut order = Vec::new();
        let mut stack = vec![ROOT];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        order
    }

    fn detach(&mut self, id: FakeElementId) {
        if let Some(parent) = self.node_mut(id).parent.take() {
            self.node_mut(parent).children.retain(|child| *child != id);
        }
        if self.focused.is_some_and(|focused| !self.is_attached(focused)) {
            self.focused = None;
        }
    }

    fn text_content(&self, id: FakeElementId) -> String {
        let node = self.node(id);
        let mut text = node.text.clone();
        for child in &node.children {
            text.push_str(&self.text_content(*child));
        }
        text
    }
}

#[derive(Debug, Default)]
struct CompoundSelector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, Option<String>)>,
}

impl CompoundSelector {
    fn parse(selector: &str) -> Self {
        let mut parsed = Self::default();
        let mut rest = selector.trim();

        let tag_len = rest
            .find(['.', '#', '['])
            .unwrap_or(rest.len());
        if tag_len > 0 {
            parsed.tag = Some(rest[..tag_len].to_ascii_lowercase());
        }
        rest = &rest[tag_len..];

        while let Some(marker) = rest.chars().next() {
            rest = &rest[1..];
            if marker == '[' {
                let end = rest.find(']').unwrap_or(rest.len());
                let body = &rest[..end];
                rest = rest.get(end + 1..).unwrap_or("");
                let attribute = match body.split_once('=') {
                    Some((name, value)) => (
                        name.trim().to_string(),
                        Some(value.trim().trim_matches(['\'', '"']).to_string()),
                    ),
                    None => (body.trim().to_string(), None),
                };
                parsed.attributes.push(attribute);
                continue;
            }

            let end = rest.find(['.', '#', '[']).unwrap_or(rest.len());
            let name = rest[..end].to_string();
            rest = &rest[end..];
            match marker {
                '#' => parsed.id = Some(name),
                _ => parsed.classes.push(name),
            }
        }
        parsed
    }

    fn matches(&self, node: &FakeNode) -> bool {
        self.tag.as_ref().is_none_or(|tag| *tag == node.tag)
            && self
                .id
                .as_ref()
                .is_none_or(|id| node.attributes.get("id") == Some(id))
            && self
                .classes
                .iter()
                .all(|class| node.classes.contains(class))
            && self.attributes.iter().all(|(name, value)| {
                match (node.attributes.get(name), value) {
                    (Some(actual), Some(expected)) => actual == expected,
                    (Some(_), None) => true,
                    (None, _) => false,
                }
            })
    }
}

pub struct FakePage {
    state: RefCell<FakePageState>,
}

impl FakePage {
    pub fn new(url: &str) -> Self {
        let html = FakeNode {
            tag: "html".to_string(),
            children: vec![BODY],
            ..FakeNode::default()
        };
        let body = FakeNode {
            tag: "body".to_string(),
            parent: Some(ROOT),
            ..FakeNode::default()
        };
        Self {
            state: RefCell::new(FakePageState {
                nodes: vec![html, body],
                url: url.to_string(),
                ..FakePageState::default()
            }),
        }
    }

    pub fn root_id(&self) -> FakeElementId {
        ROOT
    }

    pub fn body_id(&self) -> FakeElementId {
        BODY
    }

    /// Append a new element under `parent` (the body when `None`).
    pub fn add_element(
        &self,
        tag: &str,
        classes: &[&str],
        parent: Option<FakeElementId>,
    ) -> FakeElementId {
        let mut state = self.state.borrow_mut();
        let id = FakeElementId(state.nodes.len());
        let parent = parent.unwrap_or(BODY);
        state.nodes.push(FakeNode {
            tag: tag.to_ascii_lowercase(),
            classes: classes.iter().map(|class| class.to_string()).collect(),
            parent: Some(parent),
            ..FakeNode::default()
        });
        state.node_mut(parent).children.push(id);
        id
    }

    /// An `<a>` carrying `class`, appended to the body.
    pub fn add_anchor(&self, class: &str) -> FakeElementId {
        self.add_element("a", &[class], None)
    }

    pub fn remove_element(&self, id: FakeElementId) {
        self.state.borrow_mut().detach(id);
    }

    pub fn set_attribute_on(&self, id: FakeElementId, name: &str, value: &str) {
        self.state
            .borrow_mut()
            .node_mut(id)
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    pub fn add_class_to(&self, id: FakeElementId, class: &str) {
        let mut state = self.state.borrow_mut();
        let classes = &mut state.node_mut(id).classes;
        if !classes.iter().any(|existing| existing == class) {
            classes.push(class.to_string());
        }
    }

    pub fn has_class_on(&self, id: FakeElementId, class: &str) -> bool {
        self.state
            .borrow()
            .node(id)
            .classes
            .iter()
            .any(|existing| existing == class)
    }

    pub fn style(&self, id: FakeElementId, property: &str) -> Option<String> {
        self.state.borrow().node(id).styles.get(property).cloned()
    }

    pub fn text_content(&self, id: FakeElementId) -> String {
        self.state.borrow().text_content(id)
    }

    pub fn set_visible(&self, id: FakeElementId, visible: bool) {
        self.state.borrow_mut().node_mut(id).hidden = !visible;
    }

    /// Replace the value of a text input, as typing would.
    pub fn type_into(&self, id: FakeElementId, text: &str) {
        self.state.borrow_mut().node_mut(id).value = text.to_string();
    }

    pub fn set_url(&self, url: &str) {
        self.state.borrow_mut().url = url.to_string();
    }

    pub fn set_storage(&self, key: &str, value: &str) {
        self.state
            .borrow_mut()
            .storage
            .insert(key.to_string(), value.to_string());
    }

    pub fn focused(&self) -> Option<FakeElementId> {
        self.state.borrow().focused
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.borrow().navigations.clone()
    }

    pub fn opened(&self) -> Vec<String> {
        self.state.borrow().opened.clone()
    }

    pub fn clicks(&self) -> Vec<FakeElementId> {
        self.state.borrow().clicks.clone()
    }

    pub fn scrolled(&self) -> Vec<FakeElementId> {
        self.state.borrow().scrolled.clone()
    }
}

impl PageDom for FakePage {
    type Element = FakeElementId;

    fn query_all(&self, selector: &str) -> Vec<FakeElementId> {
        let selector = CompoundSelector::parse(selector);
        let state = self.state.borrow();
        state
            .document_order()
            .into_iter()
            .filter(|id| selector.matches(state.node(*id)))
            .collect()
    }

    fn root(&self) -> Option<FakeElementId> {
        Some(ROOT)
    }

    fn body(&self) -> Option<FakeElementId> {
        Some(BODY)
    }

    fn attribute(&self, element: &FakeElementId, name: &str) -> Option<String> {
        self.state.borrow().node(*element).attributes.get(name).cloned()
    }

    fn set_attribute(&self, element: &FakeElementId, name: &str, value: &str) {
        self.set_attribute_on(*element, name, value);
    }

    fn has_class(&self, element: &FakeElementId, class: &str) -> bool {
        self.has_class_on(*element, class)
    }

    fn add_class(&self, element: &FakeElementId, class: &str) {
        self.add_class_to(*element, class);
    }

    fn remove_class(&self, element: &FakeElementId, class: &str) {
        self.state
            .borrow_mut()
            .node_mut(*element)
            .classes
            .retain(|existing| existing != class);
    }

    fn set_style(&self, element: &FakeElementId, property: &str, value: &str) {
        let mut state = self.state.borrow_mut();
        let styles = &mut state.node_mut(*element).styles;
        if value.is_empty() {
            styles.remove(property);
        } else {
            styles.insert(property.to_string(), value.to_string());
        }
    }

    fn focus(&self, element: &FakeElementId) {
        let mut state = self.state.borrow_mut();
        if state.is_attached(*element) {
            state.focused = Some(*element);
        }
    }

    fn blur(&self, element: &FakeElementId) {
        let mut state = self.state.borrow_mut();
        if state.focused == Some(*element) {
            state.focused = None;
        }
    }

    fn click(&self, element: &FakeElementId) {
        self.state.borrow_mut().clicks.push(*element);
    }

    fn is_visible(&self, element: &FakeElementId) -> bool {
        let state = self.state.borrow();
        let node = state.node(*element);
        state.is_attached(*element)
            && !node.hidden
            && node.styles.get("display").is_none_or(|display| display != "none")
    }

    fn create_element(&self, tag: &str) -> Option<FakeElementId> {
        let mut state = self.state.borrow_mut();
        let id = FakeElementId(state.nodes.len());
        state.nodes.push(FakeNode {
            tag: tag.to_ascii_lowercase(),
            ..FakeNode::default()
        });
        Some(id)
    }

    fn append_child(&self, parent: &FakeElementId, child: &FakeElementId) {
        let mut state = self.state.borrow_mut();
        state.detach(*child);
        state.node_mut(*child).parent = Some(*parent);
        state.node_mut(*parent).children.push(*child);
    }

    fn remove(&self, element: &FakeElementId) {
        self.remove_element(*element);
    }

    fn set_text(&self, element: &FakeElementId, text: &str) {
        let mut state = self.state.borrow_mut();
        let children = std::mem::take(&mut state.node_mut(*element).children);
        for child in children {
            state.node_mut(child).parent = None;
        }
        state.node_mut(*element).text = text.to_string();
    }

    fn input_value(&self, element: &FakeElementId) -> String {
        let state = self.state.borrow();
        let node = state.node(*element);
        if node.tag == "input" {
            node.value.clone()
        } else {
            String::new()
        }
    }

    fn scroll_into_view(&self, element: &FakeElementId) {
        self.state.borrow_mut().scrolled.push(*element);
    }
}

impl BrowserHost for FakePage {
    fn navigate(&self, url: &str) {
        let mut state = self.state.borrow_mut();
        state.navigations.push(url.to_string());
    }

    fn open_new_context(&self, url: &str) {
        self.state.borrow_mut().opened.push(url.to_string());
    }

    fn current_url(&self) -> String {
        self.state.borrow().url.clone()
    }

    fn local_storage_get(&self, key: &str) -> Option<String> {
        self.state.borrow().storage.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compound_selectors_match_like_the_browser() {
        let page = FakePage::new("https://console.aws.amazon.com/");
        let input = page.add_element("input", &["inputAndSuggestions", "input"], None);
        let meta = page.add_element("meta", &[], None);
        page.set_attribute_on(meta, "name", "awsc-session-data");
        page.add_element("input", &["input"], None);

        assert_eq!(page.query_all(".inputAndSuggestions.input"), vec![input]);
        assert_eq!(page.query_all("meta[name='awsc-session-data']"), vec![meta]);
        assert_eq!(page.query_all("meta[name]"), vec![meta]);
        assert_eq!(page.query_all("input").len(), 2);
        assert!(page.query_all("meta[name=\"other\"]").is_empty());
    }

    #[test]
    fn query_follows_document_order_and_skips_detached() {
        let page = FakePage::new("https://console.aws.amazon.com/");
        let outer = page.add_element("div", &["x"], None);
        let inner = page.add_element("span", &["x"], Some(outer));
        let last = page.add_element("p", &["x"], None);
        let detached = page.create_element("div").unwrap();
        page.add_class_to(detached, "x");

        assert_eq!(page.query_all(".x"), vec![outer, inner, last]);
        page.remove_element(outer);
        assert_eq!(page.query_all(".x"), vec![last]);
    }

    #[test]
    fn removing_focused_subtree_clears_focus() {
        let page = FakePage::new("https://console.aws.amazon.com/");
        let outer = page.add_element("div", &[], None);
        let inner = page.add_element("input", &[], Some(outer));
        page.focus(&inner);
        assert_eq!(page.focused(), Some(inner));

        page.remove(&outer);
        assert_eq!(page.focused(), None);
    }
}
