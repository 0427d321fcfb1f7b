/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Collaborator seams between the navigation core and the hosting page.
//!
//! The core never holds on to page state between calls: every operation
//! re-queries through [`PageDom`] so that it tolerates the host page
//! mutating its own DOM.

use std::fmt::Debug;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub mod web;

/// Element selection, inspection and mutation on the live page.
///
/// All methods take `&self`; implementations use interior mutability where
/// needed. Mutating calls on detached elements are silently ignored.
pub trait PageDom {
    type Element: Clone + PartialEq + Debug;

    /// Elements matching `selector`, in document order.
    fn query_all(&self, selector: &str) -> Vec<Self::Element>;

    fn query_first(&self, selector: &str) -> Option<Self::Element> {
        self.query_all(selector).into_iter().next()
    }

    /// The document element (`<html>`).
    fn root(&self) -> Option<Self::Element>;

    fn body(&self) -> Option<Self::Element>;

    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;

    fn set_attribute(&self, element: &Self::Element, name: &str, value: &str);

    fn has_class(&self, element: &Self::Element, class: &str) -> bool;

    fn add_class(&self, element: &Self::Element, class: &str);

    fn remove_class(&self, element: &Self::Element, class: &str);

    /// Set an inline style property; an empty `value` removes it.
    fn set_style(&self, element: &Self::Element, property: &str, value: &str);

    fn focus(&self, element: &Self::Element);

    fn blur(&self, element: &Self::Element);

    /// Primary activation, as if the user clicked the element.
    fn click(&self, element: &Self::Element);

    fn is_visible(&self, element: &Self::Element) -> bool;

    fn create_element(&self, tag: &str) -> Option<Self::Element>;

    fn append_child(&self, parent: &Self::Element, child: &Self::Element);

    fn remove(&self, element: &Self::Element);

    fn set_text(&self, element: &Self::Element, text: &str);

    /// Current value of a text input; empty for anything else.
    fn input_value(&self, element: &Self::Element) -> String;

    fn scroll_into_view(&self, element: &Self::Element);
}

/// Browser-level navigation primitives and read-only environment.
pub trait BrowserHost {
    /// Full-page navigation of the current browsing context.
    fn navigate(&self, url: &str);

    /// Open `url` in a new browsing context, leaving the current page alone.
    fn open_new_context(&self, url: &str);

    fn current_url(&self) -> String;

    fn local_storage_get(&self, key: &str) -> Option<String>;
}
