/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Keyboard cursor over the page's navigation anchors.
//!
//! The anchor list is re-queried on every step and the selection is read
//! back from whichever anchor carries the marker class, so the navigator
//! never holds a stale index when the host page re-renders its links.
//! Movement stops at both ends; it never wraps.

use std::rc::Rc;

use crate::shell::host::PageDom;
use crate::shell::runtime::diagnostics::{
    CHANNEL_ANCHOR_ACTIVATED, CHANNEL_ANCHOR_SELECTED, Diagnostics,
};

const HIGHLIGHT_PROPERTY: &str = "background-color";

pub struct AnchorNavigator<D: PageDom> {
    dom: Rc<D>,
    selector: String,
    marker_class: String,
    highlight_color: String,
    anchors: Vec<D::Element>,
    diagnostics: Diagnostics,
}

impl<D: PageDom> AnchorNavigator<D> {
    pub fn new(
        dom: Rc<D>,
        selector: impl Into<String>,
        marker_class: impl Into<String>,
        highlight_color: impl Into<String>,
        diagnostics: Diagnostics,
    ) -> Self {
        Self {
            dom,
            selector: selector.into(),
            marker_class: marker_class.into(),
            highlight_color: highlight_color.into(),
            anchors: Vec::new(),
            diagnostics,
        }
    }

    pub fn refresh(&mut self) {
        self.anchors = self.dom.query_all(&self.selector);
    }

    /// Selected index after re-querying the page.
    pub fn current(&mut self) -> Option<usize> {
        self.refresh();
        self.selected_index()
    }

    fn selected_index(&self) -> Option<usize> {
        self.anchors
            .iter()
            .position(|anchor| self.dom.has_class(anchor, &self.marker_class))
    }

    /// Each step returns whether the page changed.
    pub fn next(&mut self) -> bool {
        self.refresh();
        let last = match self.anchors.len() {
            0 => return false,
            len => len - 1,
        };
        match self.selected_index() {
            None => self.highlight(0),
            Some(index) if index < last => self.highlight(index + 1),
            Some(_) => return false,
        }
        true
    }

    pub fn previous(&mut self) -> bool {
        self.refresh();
        let last = match self.anchors.len() {
            0 => return false,
            len => len - 1,
        };
        match self.selected_index() {
            None => self.highlight(last),
            Some(index) if index > 0 => self.highlight(index - 1),
            Some(_) => return false,
        }
        true
    }

    /// Activate the selected anchor as if clicked.
    pub fn select(&mut self) -> bool {
        self.refresh();
        let Some(index) = self.selected_index() else {
            return false;
        };
        self.diagnostics.emit(CHANNEL_ANCHOR_ACTIVATED, format!("activating anchor {index}"));
        self.dom.click(&self.anchors[index]);
        true
    }

    pub fn clear(&mut self) -> bool {
        self.refresh();
        let Some(index) = self.selected_index() else {
            return false;
        };
        let anchor = &self.anchors[index];
        self.dom.blur(anchor);
        self.unmark(anchor);
        true
    }

    fn unmark(&self, anchor: &D::Element) {
        self.dom.remove_class(anchor, &self.marker_class);
        self.dom.set_style(anchor, HIGHLIGHT_PROPERTY, "");
    }

    fn highlight(&self, index: usize) {
        for anchor in &self.anchors {
            self.unmark(anchor);
        }
        let anchor = &self.anchors[index];
        self.dom.set_style(anchor, HIGHLIGHT_PROPERTY, &self.highlight_color);
        self.dom.add_class(anchor, &self.marker_class);
        self.dom.focus(anchor);
        self.diagnostics.emit(
            CHANNEL_ANCHOR_SELECTED,
            format!("anchor {} of {}", index + 1, self.anchors.len()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FakeElementId, FakePage};

    const MARKER: &str = "paws-anchor-selected";

    fn setup(count: usize) -> (Rc<FakePage>, Vec<FakeElementId>, AnchorNavigator<FakePage>) {
        let page = Rc::new(FakePage::new("https://console.aws.amazon.com/"));
        let anchors = (0..count).map(|_| page.add_anchor("gwt-Anchor")).collect();
        let navigator = AnchorNavigator::new(
            page.clone(),
            ".gwt-Anchor",
            MARKER,
            "rgb(224, 255, 255)",
            Diagnostics::new(),
        );
        (page, anchors, navigator)
    }

    #[test]
    fn next_walks_forward_and_stops_at_the_end() {
        let (_, _, mut navigator) = setup(4);

        navigator.next();
        assert_eq!(navigator.current(), Some(0));
        for _ in 0..3 {
            navigator.next();
        }
        assert_eq!(navigator.current(), Some(3));
        assert!(!navigator.next());
        assert_eq!(navigator.current(), Some(3));
    }

    #[test]
    fn previous_starts_at_the_end_and_stops_at_zero() {
        let (_, _, mut navigator) = setup(3);

        navigator.previous();
        assert_eq!(navigator.current(), Some(2));
        navigator.previous();
        navigator.previous();
        assert_eq!(navigator.current(), Some(0));
        navigator.previous();
        assert_eq!(navigator.current(), Some(0));
    }

    #[test]
    fn empty_page_is_a_no_op() {
        let (page, _, mut navigator) = setup(0);
        assert!(!navigator.next());
        assert!(!navigator.previous());
        assert!(!navigator.select());
        assert!(!navigator.clear());
        assert_eq!(navigator.current(), None);
        assert!(page.clicks().is_empty());
        assert_eq!(page.focused(), None);
    }

    #[test]
    fn highlight_is_exclusive_and_focuses() {
        let (page, anchors, mut navigator) = setup(3);

        navigator.next();
        navigator.next();

        assert!(!page.has_class_on(anchors[0], MARKER));
        assert_eq!(page.style(anchors[0], HIGHLIGHT_PROPERTY), None);
        assert!(page.has_class_on(anchors[1], MARKER));
        assert_eq!(
            page.style(anchors[1], HIGHLIGHT_PROPERTY).as_deref(),
            Some("rgb(224, 255, 255)")
        );
        assert_eq!(page.focused(), Some(anchors[1]));
    }

    #[test]
    fn select_clicks_only_with_a_selection() {
        let (page, anchors, mut navigator) = setup(2);

        assert!(!navigator.select());
        assert!(page.clicks().is_empty());

        navigator.previous();
        assert!(navigator.select());
        assert_eq!(page.clicks(), vec![anchors[1]]);
    }

    #[test]
    fn clear_removes_marker_style_and_focus() {
        let (page, anchors, mut navigator) = setup(2);

        assert!(!navigator.clear());
        navigator.next();
        assert!(navigator.clear());

        assert!(!page.has_class_on(anchors[0], MARKER));
        assert_eq!(page.style(anchors[0], HIGHLIGHT_PROPERTY), None);
        assert_eq!(page.focused(), None);
        assert_eq!(navigator.current(), None);
        navigator.clear();
    }

    #[test]
    fn selection_follows_the_page_when_anchors_change() {
        let (page, anchors, mut navigator) = setup(3);

        navigator.next();
        navigator.next();
        page.remove_element(anchors[0]);

        assert_eq!(navigator.current(), Some(0));
        navigator.next();
        assert!(page.has_class_on(anchors[2], MARKER));
    }
}
