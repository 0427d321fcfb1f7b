/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Modal region picker: query, filter, highlight, commit.
//!
//! State exists only while the picker is open. Every open starts from an
//! empty query over the whole catalog; closing discards the state.

use std::rc::Rc;

use keyboard_types::{Key, Modifiers, NamedKey};

use crate::registries::atomic::catalog::{CatalogItem, RegionCatalog};
use crate::registries::atomic::theme::ThemeData;
use crate::services::region_url::{current_region, rewrite_region_url};
use crate::shell::host::{BrowserHost, PageDom};
use crate::shell::runtime::diagnostics::{
    CHANNEL_PICKER_CANCELLED, CHANNEL_PICKER_COMMITTED, CHANNEL_PICKER_MOUNT_FAILED,
    CHANNEL_PICKER_OPENED, CHANNEL_REGION_REWRITE_FAILED, CHANNEL_REGION_UNKNOWN, Diagnostics,
};
use crate::shell::ui::picker_view::PickerView;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerState {
    query: String,
    filtered: Vec<CatalogItem>,
    selected_index: Option<usize>,
}

impl PickerState {
    pub fn new(catalog: &RegionCatalog) -> Self {
        let mut state = Self {
            query: String::new(),
            filtered: Vec::new(),
            selected_index: None,
        };
        state.set_query(catalog, "");
        state
    }

    /// Refilter against `query`; the highlight returns to the first row.
    pub fn set_query(&mut self, catalog: &RegionCatalog, query: &str) {
        self.query = query.to_string();
        self.filtered = catalog.filter(query);
        self.selected_index = if self.filtered.is_empty() { None } else { Some(0) };
    }

    /// Move the highlight by `delta`, stopping at either end.
    pub fn move_selection(&mut self, delta: isize) {
        if let Some(index) = self.selected_index {
            let last = self.filtered.len().saturating_sub(1);
            self.selected_index = Some(index.saturating_add_signed(delta).min(last));
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn filtered(&self) -> &[CatalogItem] {
        &self.filtered
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    pub fn selected(&self) -> Option<&CatalogItem> {
        self.selected_index.and_then(|index| self.filtered.get(index))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    NotOpen,
    /// Nothing matches the query; the picker stays open.
    Empty,
    Navigated { url: String },
    /// The current URL could not be rewritten; the picker stays open.
    RewriteFailed { reason: String },
}

pub struct CatalogPicker<D: PageDom, B: BrowserHost> {
    catalog: RegionCatalog,
    state: Option<PickerState>,
    current_region: Option<String>,
    default_region: String,
    view: PickerView<D>,
    browser: Rc<B>,
    diagnostics: Diagnostics,
}

impl<D: PageDom, B: BrowserHost> CatalogPicker<D, B> {
    pub fn new(
        dom: Rc<D>,
        browser: Rc<B>,
        catalog: RegionCatalog,
        theme: ThemeData,
        default_region: impl Into<String>,
        diagnostics: Diagnostics,
    ) -> Self {
        Self {
            catalog,
            state: None,
            current_region: None,
            default_region: default_region.into(),
            view: PickerView::new(dom, theme),
            browser,
            diagnostics,
        }
    }

    pub fn catalog(&self) -> &RegionCatalog {
        &self.catalog
    }

    pub fn is_open(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<&PickerState> {
        self.state.as_ref()
    }

    /// Region marked as current in the open picker.
    pub fn current_region(&self) -> Option<&str> {
        self.current_region.as_deref()
    }

    pub fn open(&mut self) {
        self.close();
        if let Err(err) = self.view.mount() {
            self.diagnostics.emit(CHANNEL_PICKER_MOUNT_FAILED, err.to_string());
            return;
        }

        let url = self.browser.current_url();
        self.current_region = Some(current_region(&url).unwrap_or_else(|| {
            self.diagnostics.emit(
                CHANNEL_REGION_UNKNOWN,
                format!(
                    "Unable to determine AWS region from `{url}`, assuming {}",
                    self.default_region
                ),
            );
            self.default_region.clone()
        }));
        self.state = Some(PickerState::new(&self.catalog));
        self.diagnostics.emit(
            CHANNEL_PICKER_OPENED,
            format!("{} regions", self.catalog.len()),
        );
        self.render();
    }

    fn render(&mut self) {
        if let Some(state) = &self.state {
            self.view.render(state, self.current_region.as_deref());
        }
    }

    pub fn set_query(&mut self, query: &str) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if state.query() == query {
            return;
        }
        state.set_query(&self.catalog, query);
        self.render();
    }

    /// Pull the query from the view's input box after the user typed.
    pub fn sync_query_from_input(&mut self) {
        if let Some(query) = self.view.input_value() {
            self.set_query(&query);
        }
    }

    pub fn move_selection(&mut self, delta: isize) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        state.move_selection(delta);
        self.render();
    }

    /// Navigate to the highlighted region and close.
    pub fn commit(&mut self) -> CommitOutcome {
        let Some(state) = &self.state else {
            return CommitOutcome::NotOpen;
        };
        let Some(item) = state.selected() else {
            return CommitOutcome::Empty;
        };
        let code = item.code.clone();
        self.commit_code(&code)
    }

    /// Commit the row showing `code`, as when the user clicks it.
    pub fn commit_row(&mut self, code: &str) -> CommitOutcome {
        let Some(state) = self.state.as_mut() else {
            return CommitOutcome::NotOpen;
        };
        let Some(index) = state.filtered.iter().position(|item| item.code == code) else {
            return CommitOutcome::Empty;
        };
        state.selected_index = Some(index);
        self.commit_code(code)
    }

    fn commit_code(&mut self, code: &str) -> CommitOutcome {
        let current_url = self.browser.current_url();
        match rewrite_region_url(&current_url, code) {
            Ok(url) => {
                self.diagnostics.emit(CHANNEL_PICKER_COMMITTED, format!("switching to {code}"));
                self.close();
                self.browser.navigate(url.as_str());
                CommitOutcome::Navigated {
                    url: url.to_string(),
                }
            }
            Err(err) => {
                let reason = err.to_string();
                self.diagnostics.emit(CHANNEL_REGION_REWRITE_FAILED, reason.clone());
                CommitOutcome::RewriteFailed { reason }
            }
        }
    }

    pub fn cancel(&mut self) {
        if self.is_open() {
            self.diagnostics.emit(CHANNEL_PICKER_CANCELLED, "");
        }
        self.close();
    }

    pub fn close(&mut self) {
        self.state = None;
        self.current_region = None;
        self.view.unmount();
    }

    /// Open when closed, cancel when open. Returns `false` only when the
    /// picker could not be mounted.
    pub fn toggle(&mut self) -> bool {
        if self.is_open() {
            self.cancel();
            true
        } else {
            self.open();
            self.is_open()
        }
    }

    /// Picker navigation keys. Returns `false` for keys the input box
    /// should receive, and for everything while closed.
    pub fn handle_key(&mut self, key: &Key, modifiers: Modifiers) -> bool {
        if !self.is_open() {
            return false;
        }
        let ctrl = modifiers.contains(Modifiers::CONTROL);
        let shift = modifiers.contains(Modifiers::SHIFT);

        match key {
            Key::Named(NamedKey::ArrowDown) => self.move_selection(1),
            Key::Named(NamedKey::ArrowUp) => self.move_selection(-1),
            Key::Named(NamedKey::Tab) => self.move_selection(if shift { -1 } else { 1 }),
            Key::Character(text) if ctrl && text.eq_ignore_ascii_case("n") => {
                self.move_selection(1)
            }
            Key::Character(text) if ctrl && text.eq_ignore_ascii_case("p") => {
                self.move_selection(-1)
            }
            Key::Named(NamedKey::Enter) => {
                self.commit();
            }
            Key::Named(NamedKey::Escape) => self.cancel(),
            _ => return false,
        }
        true
    }
}
