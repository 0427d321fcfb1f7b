/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Browser build: `web-sys` implementations of the host traits and the
//! wasm entry point that installs the page listeners.

use std::cell::RefCell;
use std::rc::Rc;

use keyboard_types::{Key, Modifiers, NamedKey};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, HtmlElement, HtmlInputElement, KeyboardEvent, MouseEvent, Window,
};

use crate::app::App;
use crate::config::{CONFIG_STORAGE_KEY, PawsConfig};
use crate::input::KeyInput;
use crate::shell::host::{BrowserHost, PageDom};
use crate::shell::runtime::diagnostics::{CHANNEL_CONFIG_LOAD_FAILED, Diagnostics};
use crate::shell::ui::picker_view::{PICKER_INPUT_ID, PICKER_ROOT_ID, REGION_ATTRIBUTE};

const TIMER_INTERVAL_MS: i32 = 100;

pub struct WebPage {
    window: Window,
    document: Document,
}

impl WebPage {
    pub fn new(window: Window, document: Document) -> Self {
        Self { window, document }
    }

    fn now_ms(&self) -> u64 {
        self.window
            .performance()
            .map(|performance| performance.now() as u64)
            .unwrap_or_default()
    }
}

fn report(operation: &str, result: Result<impl Sized, JsValue>) {
    if let Err(err) = result {
        log::debug!("Paws: {operation} failed: {err:?}");
    }
}

impl PageDom for WebPage {
    type Element = Element;

    fn query_all(&self, selector: &str) -> Vec<Element> {
        let list = match self.document.query_selector_all(selector) {
            Ok(list) => list,
            Err(err) => {
                log::warn!("Paws: invalid selector `{selector}`: {err:?}");
                return Vec::new();
            }
        };
        (0..list.length())
            .filter_map(|index| list.item(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn root(&self) -> Option<Element> {
        self.document.document_element()
    }

    fn body(&self) -> Option<Element> {
        self.document.body().map(Element::from)
    }

    fn attribute(&self, element: &Element, name: &str) -> Option<String> {
        element.get_attribute(name)
    }

    fn set_attribute(&self, element: &Element, name: &str, value: &str) {
        report("set_attribute", element.set_attribute(name, value));
    }

    fn has_class(&self, element: &Element, class: &str) -> bool {
        element.class_list().contains(class)
    }

    fn add_class(&self, element: &Element, class: &str) {
        report("add_class", element.class_list().add_1(class));
    }

    fn remove_class(&self, element: &Element, class: &str) {
        report("remove_class", element.class_list().remove_1(class));
    }

    fn set_style(&self, element: &Element, property: &str, value: &str) {
        let Some(html) = element.dyn_ref::<HtmlElement>() else {
            return;
        };
        let style = html.style();
        if value.is_empty() {
            report("remove_property", style.remove_property(property));
        } else {
            report("set_property", style.set_property(property, value));
        }
    }

    fn focus(&self, element: &Element) {
        if let Some(html) = element.dyn_ref::<HtmlElement>() {
            report("focus", html.focus());
        }
    }

    fn blur(&self, element: &Element) {
        if let Some(html) = element.dyn_ref::<HtmlElement>() {
            report("blur", html.blur());
        }
    }

    fn click(&self, element: &Element) {
        if let Some(html) = element.dyn_ref::<HtmlElement>() {
            html.click();
        }
    }

    fn is_visible(&self, element: &Element) -> bool {
        element
            .dyn_ref::<HtmlElement>()
            .is_some_and(|html| html.offset_width() > 0 || html.offset_height() > 0)
    }

    fn create_element(&self, tag: &str) -> Option<Element> {
        self.document.create_element(tag).ok()
    }

    fn append_child(&self, parent: &Element, child: &Element) {
        report("append_child", parent.append_child(child));
    }

    fn remove(&self, element: &Element) {
        element.remove();
    }

    fn set_text(&self, element: &Element, text: &str) {
        element.set_text_content(Some(text));
    }

    fn input_value(&self, element: &Element) -> String {
        element
            .dyn_ref::<HtmlInputElement>()
            .map(HtmlInputElement::value)
            .unwrap_or_default()
    }

    fn scroll_into_view(&self, element: &Element) {
        element.scroll_into_view_with_bool(false);
    }
}

impl BrowserHost for WebPage {
    fn navigate(&self, url: &str) {
        report("navigate", self.window.location().set_href(url));
    }

    fn open_new_context(&self, url: &str) {
        report("open", self.window.open_with_url(url));
    }

    fn current_url(&self) -> String {
        self.window.location().href().unwrap_or_default()
    }

    fn local_storage_get(&self, key: &str) -> Option<String> {
        self.window
            .local_storage()
            .ok()
            .flatten()?
            .get_item(key)
            .ok()
            .flatten()
    }
}

fn key_from_event(event: &KeyboardEvent) -> Option<Key> {
    let key = event.key();
    match key.as_str() {
        "Enter" => Some(Key::Named(NamedKey::Enter)),
        "Escape" => Some(Key::Named(NamedKey::Escape)),
        "Backspace" => Some(Key::Named(NamedKey::Backspace)),
        "Tab" => Some(Key::Named(NamedKey::Tab)),
        "ArrowUp" => Some(Key::Named(NamedKey::ArrowUp)),
        "ArrowDown" => Some(Key::Named(NamedKey::ArrowDown)),
        "ArrowLeft" => Some(Key::Named(NamedKey::ArrowLeft)),
        "ArrowRight" => Some(Key::Named(NamedKey::ArrowRight)),
        _ => {
            if key.chars().count() == 1 {
                Some(Key::Character(key))
            } else {
                None
            }
        }
    }
}

fn modifiers_from_event(event: &KeyboardEvent) -> Modifiers {
    let mut modifiers = Modifiers::empty();
    modifiers.set(Modifiers::CONTROL, event.ctrl_key());
    modifiers.set(Modifiers::ALT, event.alt_key());
    modifiers.set(Modifiers::META, event.meta_key());
    modifiers.set(Modifiers::SHIFT, event.shift_key());
    modifiers
}

fn is_editable_target(event: &KeyboardEvent) -> bool {
    let Some(element) = event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok())
    else {
        return false;
    };
    matches!(
        element.tag_name().to_ascii_uppercase().as_str(),
        "INPUT" | "TEXTAREA" | "SELECT"
    ) || element
        .dyn_ref::<HtmlElement>()
        .is_some_and(HtmlElement::is_content_editable)
}

fn event_element(target: Option<web_sys::EventTarget>) -> Option<Element> {
    target.and_then(|target| target.dyn_into::<Element>().ok())
}

type SharedApp = Rc<RefCell<App<WebPage, WebPage>>>;

fn load_config(page: &WebPage, diagnostics: &Diagnostics) -> PawsConfig {
    let Some(source) = page.local_storage_get(CONFIG_STORAGE_KEY) else {
        return PawsConfig::default();
    };
    PawsConfig::from_toml_str(&source).unwrap_or_else(|err| {
        diagnostics.emit(
            CHANNEL_CONFIG_LOAD_FAILED,
            format!("{CONFIG_STORAGE_KEY}: {err}; using defaults"),
        );
        PawsConfig::default()
    })
}

fn install_keydown(window: &Window, app: SharedApp) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
        if event.is_composing() {
            return;
        }
        let Some(key) = key_from_event(&event) else {
            return;
        };
        let input = KeyInput {
            key,
            modifiers: modifiers_from_event(&event),
            editable_target: is_editable_target(&event),
            timestamp_ms: event.time_stamp() as u64,
        };
        let handled = app
            .try_borrow_mut()
            .map(|mut app| app.handle_key(&input))
            .unwrap_or(false);
        if handled {
            event.prevent_default();
            event.stop_propagation();
        }
    });
    // Capture phase, so the console's own shortcuts do not see consumed keys.
    window.add_event_listener_with_callback_and_bool(
        "keydown",
        closure.as_ref().unchecked_ref(),
        true,
    )?;
    closure.forget();
    Ok(())
}

fn install_sequence_timer(
    window: &Window,
    page: Rc<WebPage>,
    app: SharedApp,
) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut()>::new(move || {
        if let Ok(mut app) = app.try_borrow_mut() {
            app.handle_sequence_timeout(page.now_ms());
        }
    });
    window.set_interval_with_callback_and_timeout_and_arguments_0(
        closure.as_ref().unchecked_ref(),
        TIMER_INTERVAL_MS,
    )?;
    closure.forget();
    Ok(())
}

fn install_picker_listeners(document: &Document, app: SharedApp) -> Result<(), JsValue> {
    {
        let app = app.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
            let Some(target) = event_element(event.target()) else {
                return;
            };
            if target.id() != PICKER_INPUT_ID {
                return;
            }
            if let Ok(app) = app.try_borrow() {
                app.picker_input_changed();
            }
        });
        document.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
        let Some(target) = event_element(event.target()) else {
            return;
        };
        let Ok(app) = app.try_borrow() else {
            return;
        };
        if !app.picker_is_open() {
            return;
        }
        if target.id() == PICKER_ROOT_ID {
            app.picker().borrow_mut().cancel();
            return;
        }
        let row = target
            .closest(&format!("[{REGION_ATTRIBUTE}]"))
            .ok()
            .flatten();
        if let Some(code) = row.and_then(|row| row.get_attribute(REGION_ATTRIBUTE)) {
            event.prevent_default();
            app.picker_row_clicked(&code);
        }
    });
    document.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    if let Err(err) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("Paws: logger already set: {err}").into());
    }

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Paws: no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("Paws: no document"))?;

    let page = Rc::new(WebPage::new(window.clone(), document.clone()));
    let diagnostics = Diagnostics::new();
    let config = load_config(&page, &diagnostics);
    let app = Rc::new(RefCell::new(App::with_diagnostics(
        page.clone(),
        page.clone(),
        config,
        diagnostics,
    )));

    install_keydown(&window, app.clone())?;
    install_sequence_timer(&window, page, app.clone())?;
    install_picker_listeners(&document, app)?;
    Ok(())
}
