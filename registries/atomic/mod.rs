/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

pub mod catalog;
pub mod command;
pub mod theme;

pub use catalog::{CatalogItem, RegionCatalog};
pub use command::{Action, CommandRegistry, DispatchOutcome};
pub use theme::{ThemeData, ThemeRegistry, ThemeResolution};
