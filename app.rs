/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Composition root.
//!
//! [`App`] owns one command registry, one sequence recognizer, one anchor
//! navigator and one region picker for the lifetime of the page, and wires
//! the configured command table to them. Builtin commands reach the
//! navigator and picker through shared `Rc<RefCell<_>>` handles; nothing
//! else holds them.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::{BuiltinCommand, CommandTarget, PawsConfig};
use crate::input::{KeyCapture, KeyInput, SequenceCapture, is_capturable, symbol_for_key};
use crate::registries::atomic::command::{Action, CommandRegistry, DispatchOutcome};
use crate::registries::atomic::theme::{
    ThemeRegistry, ThemeResolution, css_rgb, detect_theme_id,
};
use crate::services::region_url::current_region;
use crate::services::session::{origin_href, session_region_href};
use crate::shell::host::{BrowserHost, PageDom};
use crate::shell::runtime::diagnostics::{
    CHANNEL_INPUT_BINDING_REJECTED, CHANNEL_INPUT_SEQUENCE_RESOLVED, CHANNEL_REGION_UNKNOWN,
    CHANNEL_STARTUP_INITIALIZED, CHANNEL_THEME_FALLBACK_USED, Diagnostics,
};
use crate::shell::ui::anchor_nav::AnchorNavigator;
use crate::shell::ui::region_dropdown::toggle_region_dropdown;
use crate::shell::ui::region_picker::{CatalogPicker, CommitOutcome};

pub type SharedNavigator<D> = Rc<RefCell<AnchorNavigator<D>>>;
pub type SharedPicker<D, B> = Rc<RefCell<CatalogPicker<D, B>>>;

pub struct App<D: PageDom + 'static, B: BrowserHost + 'static> {
    config: PawsConfig,
    registry: CommandRegistry<D, B>,
    capture: SequenceCapture,
    navigator: SharedNavigator<D>,
    picker: SharedPicker<D, B>,
    theme: ThemeResolution,
    browser: Rc<B>,
    diagnostics: Diagnostics,
}

impl<D: PageDom + 'static, B: BrowserHost + 'static> App<D, B> {
    pub fn new(dom: Rc<D>, browser: Rc<B>, config: PawsConfig) -> Self {
        Self::with_diagnostics(dom, browser, config, Diagnostics::new())
    }

    pub fn with_diagnostics(
        dom: Rc<D>,
        browser: Rc<B>,
        config: PawsConfig,
        diagnostics: Diagnostics,
    ) -> Self {
        let theme_id = detect_theme_id(
            &*dom,
            &*browser,
            &config.theme_storage_key,
            &config.dark_mode_classes,
        );
        let theme = ThemeRegistry::default().resolve(theme_id);
        if theme.fallback_used {
            diagnostics.emit(
                CHANNEL_THEME_FALLBACK_USED,
                format!("{} -> {}", theme.requested_id, theme.resolved_id),
            );
        }

        let navigator = Rc::new(RefCell::new(AnchorNavigator::new(
            dom.clone(),
            config.anchor_selector.clone(),
            config.anchor_marker_class.clone(),
            css_rgb(theme.theme.anchor_highlight_rgb),
            diagnostics.clone(),
        )));
        let picker = Rc::new(RefCell::new(CatalogPicker::new(
            dom.clone(),
            browser.clone(),
            config.catalog(),
            theme.theme.clone(),
            config.default_region.clone(),
            diagnostics.clone(),
        )));

        let mut registry = CommandRegistry::new(dom.clone(), browser.clone(), diagnostics.clone());
        let mut capture = SequenceCapture::new(config.sequence_timeout_ms);
        let wiring = ActionWiring {
            dom: &dom,
            browser: &browser,
            navigator: &navigator,
            picker: &picker,
            config: &config,
            diagnostics: &diagnostics,
        };
        for command in &config.commands {
            registry.register(command.keys.clone(), wiring.action_for(&command.target));
            capture.bind(&command.keys, command.sequence.clone());
        }
        for rejected in &config.rejected_commands {
            diagnostics.emit(
                CHANNEL_INPUT_BINDING_REJECTED,
                format!("`{}` left unbound: {}", rejected.keys, rejected.reason),
            );
        }

        diagnostics.emit(
            CHANNEL_STARTUP_INITIALIZED,
            format!(
                "Initialized {} v{} with {} commands ({})",
                crate::NAME,
                crate::VERSION,
                registry.len(),
                theme.resolved_id
            ),
        );
        log::info!("Paws: Initialized");

        Self {
            config,
            registry,
            capture,
            navigator,
            picker,
            theme,
            browser,
            diagnostics,
        }
    }

    /// Route one keydown. Returns whether the host should suppress the
    /// key's default handling.
    ///
    /// While the picker is open it sees every key first; otherwise keys go to
    /// the sequence recognizer unless they are chorded or typed into an
    /// editable element.
    pub fn handle_key(&mut self, input: &KeyInput) -> bool {
        if self.picker.borrow().is_open() {
            return self.picker.borrow_mut().handle_key(&input.key, input.modifiers);
        }
        if input.editable_target || !is_capturable(input.modifiers) {
            return false;
        }
        let Some(symbol) = symbol_for_key(&input.key) else {
            return false;
        };

        let step = self.capture.feed(&symbol, input.timestamp_ms);
        let outcomes = self.dispatch_all(step.completed);
        if self.capture.is_pending() {
            return step.consumed;
        }
        // A builtin with nothing to act on leaves the key to the page.
        step.consumed && outcomes.last() != Some(&DispatchOutcome::NoEffect)
    }

    /// Timer tick: fire a pending sequence whose timeout has elapsed.
    pub fn handle_sequence_timeout(&mut self, now_ms: u64) {
        let completed = self.capture.flush_expired(now_ms);
        self.dispatch_all(completed);
    }

    fn dispatch_all(&mut self, key_sequences: Vec<String>) -> Vec<DispatchOutcome> {
        key_sequences
            .into_iter()
            .map(|key_sequence| {
                self.diagnostics.emit(CHANNEL_INPUT_SEQUENCE_RESOLVED, key_sequence.clone());
                self.dispatch(&key_sequence)
            })
            .collect()
    }

    /// Run one binding. A sequence half-typed before the picker opened does
    /// not survive it.
    pub fn dispatch(&mut self, key_sequence: &str) -> DispatchOutcome {
        let outcome = self.registry.dispatch(key_sequence);
        if self.picker.borrow().is_open() {
            self.capture.reset();
        }
        outcome
    }

    /// The picker's text box changed.
    pub fn picker_input_changed(&self) {
        self.picker.borrow_mut().sync_query_from_input();
    }

    pub fn picker_row_clicked(&self, code: &str) -> CommitOutcome {
        self.picker.borrow_mut().commit_row(code)
    }

    pub fn picker_is_open(&self) -> bool {
        self.picker.borrow().is_open()
    }

    /// Region of the current page, or the configured default when the URL
    /// names none.
    pub fn current_region(&self) -> String {
        let url = self.browser.current_url();
        current_region(&url).unwrap_or_else(|| {
            self.diagnostics.emit(
                CHANNEL_REGION_UNKNOWN,
                format!("Unable to determine AWS region from `{url}`"),
            );
            self.config.default_region.clone()
        })
    }

    pub fn config(&self) -> &PawsConfig {
        &self.config
    }

    pub fn registry(&self) -> &CommandRegistry<D, B> {
        &self.registry
    }

    pub fn navigator(&self) -> &SharedNavigator<D> {
        &self.navigator
    }

    pub fn picker(&self) -> &SharedPicker<D, B> {
        &self.picker
    }

    pub fn theme(&self) -> &ThemeResolution {
        &self.theme
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }
}

struct ActionWiring<'a, D: PageDom + 'static, B: BrowserHost + 'static> {
    dom: &'a Rc<D>,
    browser: &'a Rc<B>,
    navigator: &'a SharedNavigator<D>,
    picker: &'a SharedPicker<D, B>,
    config: &'a PawsConfig,
    diagnostics: &'a Diagnostics,
}

impl<D: PageDom + 'static, B: BrowserHost + 'static> ActionWiring<'_, D, B> {
    fn action_for(&self, target: &CommandTarget) -> Action {
        match target {
            CommandTarget::Href(url) => Action::StaticUrl(url.clone()),
            CommandTarget::Open(url) => Action::OpenUrl(url.clone()),
            CommandTarget::Focus(selector) => Action::FocusSelector(selector.clone()),
            CommandTarget::OriginHref(path) => {
                let browser = self.browser.clone();
                let path = path.clone();
                Action::computed(move || origin_href(&browser.current_url(), &path))
            }
            CommandTarget::SessionRegionHref(template) => {
                let dom = self.dom.clone();
                let template = template.clone();
                Action::computed(move || session_region_href(&*dom, &template))
            }
            CommandTarget::Invoke(builtin) => self.builtin(*builtin),
        }
    }

    fn builtin(&self, builtin: BuiltinCommand) -> Action {
        match builtin {
            BuiltinCommand::AnchorsNext => {
                let navigator = self.navigator.clone();
                Action::invoke(move || navigator.borrow_mut().next())
            }
            BuiltinCommand::AnchorsPrevious => {
                let navigator = self.navigator.clone();
                Action::invoke(move || navigator.borrow_mut().previous())
            }
            BuiltinCommand::AnchorsSelect => {
                let navigator = self.navigator.clone();
                Action::invoke(move || navigator.borrow_mut().select())
            }
            BuiltinCommand::AnchorsClear => {
                let navigator = self.navigator.clone();
                Action::invoke(move || navigator.borrow_mut().clear())
            }
            BuiltinCommand::RegionPicker => {
                let picker = self.picker.clone();
                Action::invoke(move || picker.borrow_mut().toggle())
            }
            BuiltinCommand::RegionDropdown => {
                let dom = self.dom.clone();
                let button = self.config.region_dropdown_button.clone();
                let list = self.config.region_dropdown_list.clone();
                let diagnostics = self.diagnostics.clone();
                Action::invoke(move || {
                    toggle_region_dropdown(&*dom, &button, &list, &diagnostics)
                })
            }
        }
    }
}
