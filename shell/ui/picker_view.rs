/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! DOM rendering of the region picker modal.
//!
//! The view owns no picker state; [`PickerView::render`] rebuilds the rows
//! from a [`PickerState`] each time the picker changes.

use std::rc::Rc;

use crate::registries::atomic::theme::{ThemeData, css_rgb, css_rgba};
use crate::shell::host::PageDom;
use crate::shell::ui::region_picker::PickerState;

pub const PICKER_ROOT_ID: &str = "paws-region-picker";
pub const PICKER_INPUT_ID: &str = "paws-region-picker-input";
pub const PICKER_LIST_ID: &str = "paws-region-picker-list";
pub const ROW_CLASS: &str = "paws-region-row";
pub const SELECTED_ROW_CLASS: &str = "paws-region-row-selected";
pub const CURRENT_ROW_CLASS: &str = "paws-region-row-current";
pub const EMPTY_ROW_CLASS: &str = "paws-region-empty";
/// Row attribute carrying the region code, read back on click.
pub const REGION_ATTRIBUTE: &str = "data-paws-region";
pub const EMPTY_MESSAGE: &str = "No matching regions";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerMountError {
    NoBody,
    CreateFailed { tag: &'static str },
}

impl std::fmt::Display for PickerMountError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoBody => write!(f, "page has no body to attach the picker to"),
            Self::CreateFailed { tag } => write!(f, "could not create <{tag}>"),
        }
    }
}

impl std::error::Error for PickerMountError {}

struct MountedPicker<E> {
    overlay: E,
    input: E,
    list: E,
    rows: Vec<E>,
}

pub struct PickerView<D: PageDom> {
    dom: Rc<D>,
    theme: ThemeData,
    mounted: Option<MountedPicker<D::Element>>,
}

impl<D: PageDom> PickerView<D> {
    pub fn new(dom: Rc<D>, theme: ThemeData) -> Self {
        Self {
            dom,
            theme,
            mounted: None,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    fn create(&self, tag: &'static str) -> Result<D::Element, PickerMountError> {
        self.dom
            .create_element(tag)
            .ok_or(PickerMountError::CreateFailed { tag })
    }

    fn apply_styles(&self, element: &D::Element, styles: &[(&str, &str)]) {
        for (property, value) in styles {
            self.dom.set_style(element, property, value);
        }
    }

    /// Attach a fresh modal to the page body and focus its input.
    pub fn mount(&mut self) -> Result<(), PickerMountError> {
        self.unmount();
        let body = self.dom.body().ok_or(PickerMountError::NoBody)?;

        let overlay = self.create("div")?;
        let modal = self.create("div")?;
        let input = self.create("input")?;
        let list = self.create("ul")?;

        let overlay_color = css_rgba(self.theme.overlay_rgba);
        let background = css_rgb(self.theme.modal_background_rgb);
        let text = css_rgb(self.theme.text_rgb);
        let border = format!("1px solid {}", css_rgb(self.theme.border_rgb));

        self.dom.set_attribute(&overlay, "id", PICKER_ROOT_ID);
        self.apply_styles(
            &overlay,
            &[
                ("position", "fixed"),
                ("inset", "0"),
                ("z-index", "2147483647"),
                ("display", "flex"),
                ("align-items", "flex-start"),
                ("justify-content", "center"),
                ("padding-top", "15vh"),
                ("background-color", &overlay_color),
            ],
        );
        self.apply_styles(
            &modal,
            &[
                ("width", "min(480px, 90vw)"),
                ("border-radius", "8px"),
                ("border", &border),
                ("background-color", &background),
                ("color", &text),
                ("font-family", "sans-serif"),
                ("box-shadow", "0 12px 32px rgba(0, 0, 0, 0.25)"),
            ],
        );

        self.dom.set_attribute(&input, "id", PICKER_INPUT_ID);
        self.dom.set_attribute(&input, "type", "text");
        self.dom.set_attribute(&input, "autocomplete", "off");
        self.dom.set_attribute(&input, "placeholder", "Switch region (code or name)");
        self.apply_styles(
            &input,
            &[
                ("box-sizing", "border-box"),
                ("width", "100%"),
                ("padding", "10px 12px"),
                ("border", "none"),
                ("border-bottom", &border),
                ("background-color", "transparent"),
                ("color", &text),
                ("font-size", "15px"),
                ("outline", "none"),
            ],
        );

        self.dom.set_attribute(&list, "id", PICKER_LIST_ID);
        self.apply_styles(
            &list,
            &[
                ("list-style", "none"),
                ("margin", "0"),
                ("padding", "4px 0"),
                ("max-height", "50vh"),
                ("overflow-y", "auto"),
            ],
        );

        self.dom.append_child(&modal, &input);
        self.dom.append_child(&modal, &list);
        self.dom.append_child(&overlay, &modal);
        self.dom.append_child(&body, &overlay);
        self.dom.focus(&input);

        self.mounted = Some(MountedPicker {
            overlay,
            input,
            list,
            rows: Vec::new(),
        });
        Ok(())
    }

    pub fn render(&mut self, state: &PickerState, current_region: Option<&str>) {
        let Some(mounted) = self.mounted.as_mut() else {
            return;
        };
        let dom = &self.dom;
        for row in mounted.rows.drain(..) {
            dom.remove(&row);
        }

        let muted = css_rgb(self.theme.muted_text_rgb);
        let selected_background = css_rgb(self.theme.selected_row_rgb);

        if state.filtered().is_empty() {
            if let Some(row) = dom.create_element("li") {
                dom.add_class(&row, EMPTY_ROW_CLASS);
                dom.set_text(&row, EMPTY_MESSAGE);
                dom.set_style(&row, "padding", "8px 12px");
                dom.set_style(&row, "color", &muted);
                dom.append_child(&mounted.list, &row);
                mounted.rows.push(row);
            }
            return;
        }

        for (index, item) in state.filtered().iter().enumerate() {
            let Some(row) = dom.create_element("li") else {
                continue;
            };
            dom.add_class(&row, ROW_CLASS);
            dom.set_attribute(&row, REGION_ATTRIBUTE, &item.code);
            dom.set_style(&row, "display", "flex");
            dom.set_style(&row, "justify-content", "space-between");
            dom.set_style(&row, "padding", "6px 12px");
            dom.set_style(&row, "cursor", "pointer");

            if let Some(name) = dom.create_element("span") {
                dom.set_text(&name, &item.display_name);
                dom.append_child(&row, &name);
            }
            if let Some(code) = dom.create_element("span") {
                let label = if current_region == Some(item.code.as_str()) {
                    format!("{} (current)", item.code)
                } else {
                    item.code.clone()
                };
                dom.set_text(&code, &label);
                dom.set_style(&code, "color", &muted);
                dom.set_style(&code, "font-family", "monospace");
                dom.append_child(&row, &code);
            }

            if current_region == Some(item.code.as_str()) {
                dom.add_class(&row, CURRENT_ROW_CLASS);
                dom.set_style(&row, "font-weight", "bold");
            }

            dom.append_child(&mounted.list, &row);
            if state.selected_index() == Some(index) {
                dom.add_class(&row, SELECTED_ROW_CLASS);
                dom.set_style(&row, "background-color", &selected_background);
                dom.scroll_into_view(&row);
            }
            mounted.rows.push(row);
        }
    }

    pub fn input_value(&self) -> Option<String> {
        self.mounted
            .as_ref()
            .map(|mounted| self.dom.input_value(&mounted.input))
    }

    pub fn unmount(&mut self) {
        if let Some(mounted) = self.mounted.take() {
            self.dom.remove(&mounted.overlay);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registries::atomic::catalog::RegionCatalog;
    use crate::test_utils::FakePage;

    fn mounted_view() -> (Rc<FakePage>, PickerView<FakePage>) {
        let page = Rc::new(FakePage::new("https://us-east-1.console.aws.amazon.com/"));
        let mut view = PickerView::new(page.clone(), ThemeData::light());
        view.mount().unwrap();
        (page, view)
    }

    #[test]
    fn mount_attaches_overlay_and_focuses_input() {
        let (page, view) = mounted_view();

        assert_eq!(page.query_all(&format!("#{PICKER_ROOT_ID}")).len(), 1);
        let input = page.query_first(&format!("#{PICKER_INPUT_ID}")).unwrap();
        assert_eq!(page.focused(), Some(input));
        assert_eq!(view.input_value().as_deref(), Some(""));
    }

    #[test]
    fn render_marks_selected_and_current_rows() {
        let (page, mut view) = mounted_view();
        let catalog = RegionCatalog::default();
        let mut state = PickerState::new(&catalog);
        state.move_selection(1);

        view.render(&state, Some("us-east-1"));

        let rows = page.query_all(&format!(".{ROW_CLASS}"));
        assert_eq!(rows.len(), catalog.len());
        assert_eq!(
            page.attribute(&rows[0], REGION_ATTRIBUTE).as_deref(),
            Some("us-east-1")
        );
        assert!(page.has_class_on(rows[0], CURRENT_ROW_CLASS));
        assert!(page.has_class_on(rows[1], SELECTED_ROW_CLASS));
        assert_eq!(page.query_all(&format!(".{SELECTED_ROW_CLASS}")).len(), 1);
        assert_eq!(page.scrolled(), vec![rows[1]]);
    }

    #[test]
    fn render_replaces_previous_rows() {
        let (page, mut view) = mounted_view();
        let catalog = RegionCatalog::default();
        let mut state = PickerState::new(&catalog);
        view.render(&state, None);

        state.set_query(&catalog, "frankfurt");
        view.render(&state, None);
        let rows = page.query_all(&format!(".{ROW_CLASS}"));
        assert_eq!(rows.len(), 1);
        assert!(page.text_content(rows[0]).contains("Europe (Frankfurt)"));

        state.set_query(&catalog, "xyz123notfound");
        view.render(&state, None);
        assert!(page.query_all(&format!(".{ROW_CLASS}")).is_empty());
        let empty = page.query_first(&format!(".{EMPTY_ROW_CLASS}")).unwrap();
        assert_eq!(page.text_content(empty), EMPTY_MESSAGE);
    }

    #[test]
    fn unmount_removes_everything_and_is_idempotent() {
        let (page, mut view) = mounted_view();
        view.unmount();
        view.unmount();

        assert!(!view.is_mounted());
        assert!(page.query_first(&format!("#{PICKER_ROOT_ID}")).is_none());
        assert_eq!(view.input_value(), None);
    }
}
