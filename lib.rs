/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Keyboard-driven navigation for the AWS console.
//!
//! Short key sequences are bound to page redirects, focus changes and
//! builtin commands; `j`/`k` walk the console's navigation links; `r` opens a
//! fuzzy region picker that rewrites the current URL into another region.
//! Page access goes through the [`shell::host::PageDom`] and
//! [`shell::host::BrowserHost`] traits so the whole engine runs against an
//! in-memory page in tests and against `web-sys` in the browser build.

pub mod app;
pub mod config;
pub mod input;
pub mod registries;
pub mod services;
pub mod shell;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use app::App;
pub use config::PawsConfig;

pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
