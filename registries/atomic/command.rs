/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Key sequence to action table.
//!
//! Key sequences are opaque strings here; parsing them into key symbols is
//! the capture layer's concern. Dispatch never fails outward: anything that
//! goes wrong is written to the diagnostics channel and described in the
//! returned [`DispatchOutcome`].

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::services::session::{NavigationError, ensure_navigable};
use crate::shell::host::{BrowserHost, PageDom};
use crate::shell::runtime::diagnostics::{
    CHANNEL_COMMAND_FOCUS, CHANNEL_COMMAND_INVOKE, CHANNEL_COMMAND_NAVIGATE, CHANNEL_COMMAND_OPEN,
    CHANNEL_COMMAND_UNBOUND, CHANNEL_COMMAND_UNRESOLVED, CHANNEL_FOCUS_SELECTOR_MISSING,
    Diagnostics,
};

pub type UrlResolver = Rc<dyn Fn() -> Result<String, NavigationError>>;
/// Builtin command; returns whether it had any effect on the page.
pub type Callback = Rc<dyn Fn() -> bool>;

#[derive(Clone)]
pub enum Action {
    /// Full-page navigation to a fixed URL, usually a path on the current origin.
    StaticUrl(String),
    /// Full-page navigation to a URL computed at dispatch time.
    ComputedUrl(UrlResolver),
    /// Open a fixed URL in a new browsing context.
    OpenUrl(String),
    /// Focus the first element matching a selector.
    FocusSelector(String),
    Invoke(Callback),
}

impl Action {
    pub fn computed(resolve: impl Fn() -> Result<String, NavigationError> + 'static) -> Self {
        Self::ComputedUrl(Rc::new(resolve))
    }

    pub fn invoke(callback: impl Fn() -> bool + 'static) -> Self {
        Self::Invoke(Rc::new(callback))
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaticUrl(url) => f.debug_tuple("StaticUrl").field(url).finish(),
            Self::ComputedUrl(_) => f.write_str("ComputedUrl(..)"),
            Self::OpenUrl(url) => f.debug_tuple("OpenUrl").field(url).finish(),
            Self::FocusSelector(selector) => {
                f.debug_tuple("FocusSelector").field(selector).finish()
            }
            Self::Invoke(_) => f.write_str("Invoke(..)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Unbound,
    Navigated { url: String },
    Opened { url: String },
    Focused { selector: String },
    Invoked,
    /// A builtin ran but found nothing to act on.
    NoEffect,
    Unresolved { reason: String },
    SelectorMissing { selector: String },
}

pub struct CommandRegistry<D: PageDom, B: BrowserHost> {
    commands: HashMap<String, Action>,
    dom: Rc<D>,
    browser: Rc<B>,
    diagnostics: Diagnostics,
}

impl<D: PageDom, B: BrowserHost> CommandRegistry<D, B> {
    pub fn new(dom: Rc<D>, browser: Rc<B>, diagnostics: Diagnostics) -> Self {
        Self {
            commands: HashMap::new(),
            dom,
            browser,
            diagnostics,
        }
    }

    /// Bind `key_sequence`, replacing any earlier binding for the same sequence.
    pub fn register(&mut self, key_sequence: impl Into<String>, action: Action) {
        let key_sequence = key_sequence.into();
        if self.commands.insert(key_sequence.clone(), action).is_some() {
            log::debug!("Paws: rebinding `{key_sequence}`");
        }
    }

    /// Bound key sequences, sorted for stable iteration.
    pub fn key_sequences(&self) -> Vec<&str> {
        let mut sequences: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        sequences.sort_unstable();
        sequences
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn dispatch(&self, key_sequence: &str) -> DispatchOutcome {
        let Some(action) = self.commands.get(key_sequence) else {
            self.diagnostics
                .emit(CHANNEL_COMMAND_UNBOUND, format!("no binding for `{key_sequence}`"));
            return DispatchOutcome::Unbound;
        };

        match action {
            Action::StaticUrl(url) => self.navigate(key_sequence, ensure_navigable(url.clone())),
            Action::ComputedUrl(resolve) => {
                self.navigate(key_sequence, resolve().and_then(ensure_navigable))
            }
            Action::OpenUrl(url) => {
                self.diagnostics.emit(CHANNEL_COMMAND_OPEN, format!("Opening {url}"));
                self.browser.open_new_context(url);
                DispatchOutcome::Opened { url: url.clone() }
            }
            Action::FocusSelector(selector) => match self.dom.query_first(selector) {
                Some(element) => {
                    self.diagnostics.emit(CHANNEL_COMMAND_FOCUS, format!("Selecting {selector}"));
                    self.dom.focus(&element);
                    DispatchOutcome::Focused {
                        selector: selector.clone(),
                    }
                }
                None => {
                    self.diagnostics.emit(
                        CHANNEL_FOCUS_SELECTOR_MISSING,
                        format!("element not found: {selector}"),
                    );
                    DispatchOutcome::SelectorMissing {
                        selector: selector.clone(),
                    }
                }
            },
            Action::Invoke(callback) => {
                self.diagnostics.emit(CHANNEL_COMMAND_INVOKE, format!("Calling `{key_sequence}`"));
                if callback() {
                    DispatchOutcome::Invoked
                } else {
                    DispatchOutcome::NoEffect
                }
            }
        }
    }

    fn navigate(
        &self,
        key_sequence: &str,
        target: Result<String, NavigationError>,
    ) -> DispatchOutcome {
        match target {
            Ok(url) => {
                self.diagnostics.emit(CHANNEL_COMMAND_NAVIGATE, format!("Redirecting to {url}"));
                self.browser.navigate(&url);
                DispatchOutcome::Navigated { url }
            }
            Err(err) => {
                let reason = err.to_string();
                self.diagnostics.emit(
                    CHANNEL_COMMAND_UNRESOLVED,
                    format!("unable to navigate for `{key_sequence}`: {reason}"),
                );
                DispatchOutcome::Unresolved { reason }
            }
        }
    }
}
