/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use crate::shell::host::PageDom;
use crate::shell::runtime::diagnostics::{CHANNEL_REGION_DROPDOWN_MISSING, Diagnostics};

/// Click the console's own region menu button, then move focus into the
/// region list if the click revealed it. Returns whether the button existed.
pub fn toggle_region_dropdown<D: PageDom>(
    dom: &D,
    button_selector: &str,
    list_selector: &str,
    diagnostics: &Diagnostics,
) -> bool {
    let Some(button) = dom.query_first(button_selector) else {
        diagnostics.emit(
            CHANNEL_REGION_DROPDOWN_MISSING,
            format!("Region dropdown not found: {button_selector}"),
        );
        return false;
    };

    dom.click(&button);
    if let Some(list) = dom.query_first(list_selector)
        && dom.is_visible(&list)
    {
        dom.focus(&list);
    }
    true
}
