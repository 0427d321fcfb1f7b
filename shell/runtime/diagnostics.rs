/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Best-effort diagnostics channel.
//!
//! Every non-fatal condition (unresolvable navigation target, missing focus
//! selector, failed region rewrite) is reported here instead of being
//! returned to the caller. Events are written through the `log` facade at a
//! level chosen by the channel's declared severity, and are also counted per
//! channel with a bounded ring of recent events so tests and the browser
//! console can inspect what happened.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

pub const CHANNEL_STARTUP_INITIALIZED: &str = "startup.initialized";
pub const CHANNEL_CONFIG_LOAD_FAILED: &str = "config.load_failed";
pub const CHANNEL_INPUT_SEQUENCE_RESOLVED: &str = "input.sequence.resolved";
pub const CHANNEL_INPUT_BINDING_REJECTED: &str = "input.binding.rejected";
pub const CHANNEL_COMMAND_NAVIGATE: &str = "command.dispatch.navigate";
pub const CHANNEL_COMMAND_OPEN: &str = "command.dispatch.open";
pub const CHANNEL_COMMAND_FOCUS: &str = "command.dispatch.focus";
pub const CHANNEL_COMMAND_INVOKE: &str = "command.dispatch.invoke";
pub const CHANNEL_COMMAND_UNBOUND: &str = "command.dispatch.unbound";
pub const CHANNEL_COMMAND_UNRESOLVED: &str = "command.dispatch.unresolved";
pub const CHANNEL_FOCUS_SELECTOR_MISSING: &str = "command.focus.selector_missing";
pub const CHANNEL_ANCHOR_SELECTED: &str = "anchor.selected";
pub const CHANNEL_ANCHOR_ACTIVATED: &str = "anchor.activated";
pub const CHANNEL_PICKER_OPENED: &str = "picker.opened";
pub const CHANNEL_PICKER_COMMITTED: &str = "picker.committed";
pub const CHANNEL_PICKER_CANCELLED: &str = "picker.cancelled";
pub const CHANNEL_PICKER_MOUNT_FAILED: &str = "picker.mount_failed";
pub const CHANNEL_REGION_REWRITE_FAILED: &str = "region.rewrite_failed";
pub const CHANNEL_REGION_UNKNOWN: &str = "region.current_unknown";
pub const CHANNEL_REGION_DROPDOWN_MISSING: &str = "region.dropdown_missing";
pub const CHANNEL_THEME_FALLBACK_USED: &str = "theme.fallback_used";

const RECENT_EVENT_CAPACITY: usize = 64;

/// Severity tier; selects the `log` level an event is written at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelSeverity {
    #[default]
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticChannelDescriptor {
    pub channel_id: &'static str,
    pub severity: ChannelSeverity,
}

const fn info(channel_id: &'static str) -> DiagnosticChannelDescriptor {
    DiagnosticChannelDescriptor {
        channel_id,
        severity: ChannelSeverity::Info,
    }
}

const fn warn(channel_id: &'static str) -> DiagnosticChannelDescriptor {
    DiagnosticChannelDescriptor {
        channel_id,
        severity: ChannelSeverity::Warn,
    }
}

const fn error(channel_id: &'static str) -> DiagnosticChannelDescriptor {
    DiagnosticChannelDescriptor {
        channel_id,
        severity: ChannelSeverity::Error,
    }
}

pub const CHANNELS: [DiagnosticChannelDescriptor; 21] = [
    info(CHANNEL_STARTUP_INITIALIZED),
    error(CHANNEL_CONFIG_LOAD_FAILED),
    info(CHANNEL_INPUT_SEQUENCE_RESOLVED),
    warn(CHANNEL_INPUT_BINDING_REJECTED),
    info(CHANNEL_COMMAND_NAVIGATE),
    info(CHANNEL_COMMAND_OPEN),
    info(CHANNEL_COMMAND_FOCUS),
    info(CHANNEL_COMMAND_INVOKE),
    warn(CHANNEL_COMMAND_UNBOUND),
    error(CHANNEL_COMMAND_UNRESOLVED),
    warn(CHANNEL_FOCUS_SELECTOR_MISSING),
    info(CHANNEL_ANCHOR_SELECTED),
    info(CHANNEL_ANCHOR_ACTIVATED),
    info(CHANNEL_PICKER_OPENED),
    info(CHANNEL_PICKER_COMMITTED),
    info(CHANNEL_PICKER_CANCELLED),
    error(CHANNEL_PICKER_MOUNT_FAILED),
    error(CHANNEL_REGION_REWRITE_FAILED),
    warn(CHANNEL_REGION_UNKNOWN),
    warn(CHANNEL_REGION_DROPDOWN_MISSING),
    warn(CHANNEL_THEME_FALLBACK_USED),
];

/// Declared severity for `channel_id`; undeclared channels are treated as info.
pub fn channel_severity(channel_id: &str) -> ChannelSeverity {
    CHANNELS
        .iter()
        .find(|descriptor| descriptor.channel_id == channel_id)
        .map(|descriptor| descriptor.severity)
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticEvent {
    pub channel_id: &'static str,
    pub detail: String,
}

#[derive(Debug, Default)]
struct DiagnosticGraph {
    message_counts: HashMap<&'static str, u64>,
    recent: VecDeque<DiagnosticEvent>,
}

/// Cheaply clonable handle shared by every component of one [`crate::app::App`].
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    graph: Rc<RefCell<DiagnosticGraph>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self, channel_id: &'static str, detail: impl Into<String>) {
        let detail = detail.into();
        match channel_severity(channel_id) {
            ChannelSeverity::Info => log::debug!("Paws: [{channel_id}] {detail}"),
            ChannelSeverity::Warn => log::warn!("Paws: [{channel_id}] {detail}"),
            ChannelSeverity::Error => log::error!("Paws: [{channel_id}] {detail}"),
        }

        let mut graph = self.graph.borrow_mut();
        *graph.message_counts.entry(channel_id).or_default() += 1;
        if graph.recent.len() == RECENT_EVENT_CAPACITY {
            graph.recent.pop_front();
        }
        graph.recent.push_back(DiagnosticEvent { channel_id, detail });
    }

    pub fn count(&self, channel_id: &str) -> u64 {
        self.graph
            .borrow()
            .message_counts
            .get(channel_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn recent(&self) -> Vec<DiagnosticEvent> {
        self.graph.borrow().recent.iter().cloned().collect()
    }

    pub fn last(&self) -> Option<DiagnosticEvent> {
        self.graph.borrow().recent.back().cloned()
    }
}
