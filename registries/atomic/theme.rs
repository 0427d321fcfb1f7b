/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::collections::HashMap;

use crate::shell::host::{BrowserHost, PageDom};

pub const THEME_ID_LIGHT: &str = "theme:light";
pub const THEME_ID_DARK: &str = "theme:dark";

#[derive(Debug, Clone, PartialEq)]
pub struct ThemeData {
    pub anchor_highlight_rgb: (u8, u8, u8),
    pub overlay_rgba: (u8, u8, u8, f32),
    pub modal_background_rgb: (u8, u8, u8),
    pub text_rgb: (u8, u8, u8),
    pub muted_text_rgb: (u8, u8, u8),
    pub border_rgb: (u8, u8, u8),
    pub selected_row_rgb: (u8, u8, u8),
}

impl ThemeData {
    pub fn light() -> Self {
        Self {
            anchor_highlight_rgb: (224, 255, 255),
            overlay_rgba: (0, 0, 0, 0.35),
            modal_background_rgb: (255, 255, 255),
            text_rgb: (22, 25, 31),
            muted_text_rgb: (95, 107, 122),
            border_rgb: (209, 213, 219),
            selected_row_rgb: (224, 242, 254),
        }
    }

    pub fn dark() -> Self {
        Self {
            anchor_highlight_rgb: (22, 78, 99),
            overlay_rgba: (0, 0, 0, 0.55),
            modal_background_rgb: (27, 35, 45),
            text_rgb: (230, 237, 243),
            muted_text_rgb: (139, 148, 158),
            border_rgb: (55, 65, 81),
            selected_row_rgb: (30, 58, 95),
        }
    }
}

pub fn css_rgb((r, g, b): (u8, u8, u8)) -> String {
    format!("rgb({r}, {g}, {b})")
}

pub fn css_rgba((r, g, b, a): (u8, u8, u8, f32)) -> String {
    format!("rgba({r}, {g}, {b}, {a})")
}

#[derive(Debug, Clone)]
pub struct ThemeResolution {
    pub requested_id: String,
    pub resolved_id: String,
    pub matched: bool,
    pub fallback_used: bool,
    pub theme: ThemeData,
}

pub struct ThemeRegistry {
    themes: HashMap<String, ThemeData>,
    fallback_id: String,
}

impl ThemeRegistry {
    pub fn register(&mut self, theme_id: &str, theme: ThemeData) {
        self.themes.insert(theme_id.to_ascii_lowercase(), theme);
    }

    pub fn register_core_seed_defaults(&mut self) {
        self.register(THEME_ID_LIGHT, ThemeData::light());
        self.register(THEME_ID_DARK, ThemeData::dark());
    }

    pub fn resolve(&self, theme_id: &str) -> ThemeResolution {
        let requested = theme_id.trim().to_ascii_lowercase();

        if let Some(theme) = self.themes.get(&requested).cloned() {
            return ThemeResolution {
                requested_id: requested.clone(),
                resolved_id: requested,
                matched: true,
                fallback_used: false,
                theme,
            };
        }

        let theme = self
            .themes
            .get(&self.fallback_id)
            .cloned()
            .unwrap_or_else(ThemeData::light);
        ThemeResolution {
            requested_id: requested,
            resolved_id: self.fallback_id.clone(),
            matched: false,
            fallback_used: true,
            theme,
        }
    }
}

impl Default for ThemeRegistry {
    fn default() -> Self {
        let mut registry = Self {
            themes: HashMap::new(),
            fallback_id: THEME_ID_LIGHT.to_string(),
        };
        registry.register_core_seed_defaults();
        registry
    }
}

/// Theme id the page should use.
///
/// A stored `light`/`dark` preference under `storage_key` wins; otherwise the
/// host page is dark when its root element carries one of `dark_classes` or
/// `data-theme="dark"`.
pub fn detect_theme_id<D: PageDom, B: BrowserHost>(
    dom: &D,
    browser: &B,
    storage_key: &str,
    dark_classes: &[String],
) -> &'static str {
    match browser
        .local_storage_get(storage_key)
        .map(|value| value.trim().to_ascii_lowercase())
        .as_deref()
    {
        Some("dark") => return THEME_ID_DARK,
        Some("light") => return THEME_ID_LIGHT,
        _ => {}
    }

    let Some(root) = dom.root() else {
        return THEME_ID_LIGHT;
    };
    let host_is_dark = dark_classes.iter().any(|class| dom.has_class(&root, class))
        || dom
            .attribute(&root, "data-theme")
            .is_some_and(|theme| theme.eq_ignore_ascii_case("dark"));

    if host_is_dark { THEME_ID_DARK } else { THEME_ID_LIGHT }
}
