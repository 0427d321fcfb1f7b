/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Keyboard input for command sequences.
//!
//! Translating a host key event into a key symbol ([`symbol_for_key`]) is
//! kept apart from recognizing sequences of symbols ([`SequenceCapture`]), so
//! the recognizer is a plain state machine driven by symbols and timestamps
//! and can be tested without a browser.

use keyboard_types::{Key, Modifiers, NamedKey};

/// Default gap after which a partially typed sequence is abandoned.
pub const DEFAULT_SEQUENCE_TIMEOUT_MS: u64 = 1000;

const NAMED_SYMBOLS: [&str; 9] = [
    "enter",
    "escape",
    "tab",
    "space",
    "backspace",
    "up",
    "down",
    "left",
    "right",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySequenceError {
    Empty,
    UnknownKey { token: String },
}

impl std::fmt::Display for KeySequenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "key sequence is empty"),
            Self::UnknownKey { token } => write!(f, "`{token}` is not a key name"),
        }
    }
}

impl std::error::Error for KeySequenceError {}

/// Ordered key symbols making up one binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeySequence(Vec<String>);

impl KeySequence {
    /// Parse a binding string.
    ///
    /// `"e c 2"` is three symbols. Without whitespace the string is either a
    /// named key (`"enter"`, `"escape"`, `"up"`, ...) or one symbol per
    /// character (`"ec2"`). Named keys win, so `"up"` is the arrow key.
    pub fn parse(sequence: &str) -> Result<Self, KeySequenceError> {
        let sequence = sequence.trim();
        if sequence.is_empty() {
            return Err(KeySequenceError::Empty);
        }

        if sequence.contains(char::is_whitespace) {
            return sequence
                .split_whitespace()
                .map(|token| {
                    if token.chars().count() == 1 || NAMED_SYMBOLS.contains(&token) {
                        Ok(token.to_string())
                    } else {
                        Err(KeySequenceError::UnknownKey {
                            token: token.to_string(),
                        })
                    }
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self);
        }

        if NAMED_SYMBOLS.contains(&sequence) {
            return Ok(Self(vec![sequence.to_string()]));
        }
        Ok(Self(sequence.chars().map(String::from).collect()))
    }

    pub fn symbols(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One keydown, as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub modifiers: Modifiers,
    /// The event target accepts text (input, textarea, contenteditable).
    pub editable_target: bool,
    pub timestamp_ms: u64,
}

impl KeyInput {
    pub fn new(key: Key, timestamp_ms: u64) -> Self {
        Self {
            key,
            modifiers: Modifiers::empty(),
            editable_target: false,
            timestamp_ms,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn in_editable(mut self) -> Self {
        self.editable_target = true;
        self
    }

    pub fn character(text: &str, timestamp_ms: u64) -> Self {
        Self::new(Key::Character(text.to_string()), timestamp_ms)
    }
}

/// Key symbol for a host key event, or `None` for keys no binding can name.
pub fn symbol_for_key(key: &Key) -> Option<String> {
    let symbol = match key {
        Key::Character(text) if text == " " => "space",
        Key::Character(text) if !text.is_empty() => return Some(text.clone()),
        Key::Named(NamedKey::Enter) => "enter",
        Key::Named(NamedKey::Escape) => "escape",
        Key::Named(NamedKey::Tab) => "tab",
        Key::Named(NamedKey::Backspace) => "backspace",
        Key::Named(NamedKey::ArrowUp) => "up",
        Key::Named(NamedKey::ArrowDown) => "down",
        Key::Named(NamedKey::ArrowLeft) => "left",
        Key::Named(NamedKey::ArrowRight) => "right",
        _ => return None,
    };
    Some(symbol.to_string())
}

/// Chorded keys belong to the browser and the host page, never to a sequence.
/// Shift is allowed so that `?` and capitals can be bound.
pub fn is_capturable(modifiers: Modifiers) -> bool {
    !modifiers.intersects(Modifiers::CONTROL | Modifiers::ALT | Modifiers::META)
}

/// Result of feeding one key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureStep {
    /// The host should suppress its default handling of the key.
    pub consumed: bool,
    /// Binding ids recognized by this key, in firing order.
    pub completed: Vec<String>,
}

pub trait KeyCapture {
    fn bind(&mut self, id: &str, sequence: KeySequence);
    fn feed(&mut self, symbol: &str, now_ms: u64) -> CaptureStep;
    /// Abandon a sequence idle for longer than the timeout; returns a binding
    /// completed by the abandoned prefix, if any.
    fn flush_expired(&mut self, now_ms: u64) -> Vec<String>;
    fn reset(&mut self);
}

/// Buffering sequence recognizer.
///
/// While the buffer is a strict prefix of some binding the recognizer waits,
/// remembering an exact match if the buffer is also a complete binding (`l`
/// while `l a m` is bound). That remembered match fires when the next key
/// diverges or the timeout elapses.
#[derive(Debug)]
pub struct SequenceCapture {
    bindings: Vec<(String, KeySequence)>,
    buffer: Vec<String>,
    pending_exact: Option<String>,
    last_key_ms: Option<u64>,
    timeout_ms: u64,
}

impl SequenceCapture {
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            bindings: Vec::new(),
            buffer: Vec::new(),
            pending_exact: None,
            last_key_ms: None,
            timeout_ms,
        }
    }

    pub fn is_pending(&self) -> bool {
        !self.buffer.is_empty()
    }

    fn lookup(&self) -> (Option<String>, bool) {
        let mut exact = None;
        let mut extendable = false;
        for (id, sequence) in &self.bindings {
            let symbols = sequence.symbols();
            if symbols == self.buffer.as_slice() {
                exact = Some(id.clone());
            } else if symbols.len() > self.buffer.len() && symbols.starts_with(&self.buffer) {
                extendable = true;
            }
        }
        (exact, extendable)
    }

    fn flush(&mut self) -> Vec<String> {
        self.buffer.clear();
        self.pending_exact.take().into_iter().collect()
    }

    fn advance(&mut self, symbol: &str, completed: &mut Vec<String>) -> bool {
        let mid_sequence = !self.buffer.is_empty();
        self.buffer.push(symbol.to_string());

        let (exact, extendable) = self.lookup();
        if extendable {
            self.pending_exact = exact;
            return true;
        }
        if let Some(id) = exact {
            self.buffer.clear();
            self.pending_exact = None;
            completed.push(id);
            return true;
        }

        completed.extend(self.flush());
        if mid_sequence {
            return self.advance(symbol, completed);
        }
        false
    }
}

impl Default for SequenceCapture {
    fn default() -> Self {
        Self::new(DEFAULT_SEQUENCE_TIMEOUT_MS)
    }
}

impl KeyCapture for SequenceCapture {
    fn bind(&mut self, id: &str, sequence: KeySequence) {
        self.bindings.retain(|(existing_id, existing)| existing_id != id && *existing != sequence);
        self.bindings.push((id.to_string(), sequence));
    }

    fn feed(&mut self, symbol: &str, now_ms: u64) -> CaptureStep {
        let mut completed = self.flush_expired(now_ms);
        self.last_key_ms = Some(now_ms);
        let consumed = self.advance(symbol, &mut completed);
        CaptureStep {
            consumed,
            completed,
        }
    }

    fn flush_expired(&mut self, now_ms: u64) -> Vec<String> {
        match self.last_key_ms {
            Some(last)
                if !self.buffer.is_empty() && now_ms.saturating_sub(last) > self.timeout_ms =>
            {
                self.flush()
            }
            _ => Vec::new(),
        }
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.pending_exact = None;
        self.last_key_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn capture(bindings: &[&str]) -> SequenceCapture {
        let mut capture = SequenceCapture::default();
        for binding in bindings {
            capture.bind(binding, KeySequence::parse(binding).unwrap());
        }
        capture
    }

    fn completed(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[rstest]
    #[case("ec2", &["e", "c", "2"])]
    #[case("e c 2", &["e", "c", "2"])]
    #[case("enter", &["enter"])]
    #[case("g escape", &["g", "escape"])]
    #[case("?", &["?"])]
    #[case("home", &["h", "o", "m", "e"])]
    fn parses_binding_strings(#[case] input: &str, #[case] expected: &[&str]) {
        let sequence = KeySequence::parse(input).unwrap();
        assert_eq!(sequence.symbols(), expected);
    }

    #[test]
    fn rejects_empty_and_unknown_names() {
        assert_eq!(KeySequence::parse("  "), Err(KeySequenceError::Empty));
        assert_eq!(
            KeySequence::parse("g return"),
            Err(KeySequenceError::UnknownKey {
                token: "return".into()
            })
        );
    }

    #[test]
    fn maps_host_keys_to_symbols() {
        assert_eq!(symbol_for_key(&Key::Character("j".into())).as_deref(), Some("j"));
        assert_eq!(symbol_for_key(&Key::Character("R".into())).as_deref(), Some("R"));
        assert_eq!(symbol_for_key(&Key::Character(" ".into())).as_deref(), Some("space"));
        assert_eq!(symbol_for_key(&Key::Named(NamedKey::Enter)).as_deref(), Some("enter"));
        assert_eq!(symbol_for_key(&Key::Named(NamedKey::ArrowDown)).as_deref(), Some("down"));
        assert_eq!(symbol_for_key(&Key::Named(NamedKey::F5)), None);
    }

    #[test]
    fn chorded_keys_are_not_capturable() {
        assert!(is_capturable(Modifiers::empty()));
        assert!(is_capturable(Modifiers::SHIFT));
        assert!(!is_capturable(Modifiers::CONTROL));
        assert!(!is_capturable(Modifiers::ALT | Modifiers::SHIFT));
        assert!(!is_capturable(Modifiers::META));
    }

    #[test]
    fn multi_key_sequence_fires_on_last_key() {
        let mut capture = capture(&["ec2", "s3"]);

        let step = capture.feed("e", 0);
        assert!(step.consumed);
        assert!(step.completed.is_empty());
        assert!(capture.feed("c", 10).completed.is_empty());
        assert_eq!(capture.feed("2", 20).completed, completed(&["ec2"]));
        assert!(!capture.is_pending());
    }

    #[test]
    fn shorter_binding_waits_for_longer_one() {
        let mut capture = capture(&["l", "lam"]);

        assert!(capture.feed("l", 0).completed.is_empty());
        assert!(capture.feed("a", 50).completed.is_empty());
        assert_eq!(capture.feed("m", 100).completed, completed(&["lam"]));
    }

    #[test]
    fn diverging_key_fires_pending_match_then_retries() {
        let mut capture = capture(&["l", "lam", "j"]);

        capture.feed("l", 0);
        let step = capture.feed("j", 50);
        assert!(step.consumed);
        assert_eq!(step.completed, completed(&["l", "j"]));
    }

    #[test]
    fn pending_match_fires_when_timeout_elapses() {
        let mut capture = capture(&["l", "lam"]);

        capture.feed("l", 0);
        assert!(capture.flush_expired(1000).is_empty());
        assert_eq!(capture.flush_expired(1001), completed(&["l"]));
        assert!(!capture.is_pending());
    }

    #[test]
    fn stale_prefix_is_dropped_before_next_key() {
        let mut capture = capture(&["ec2", "cd"]);

        capture.feed("e", 0);
        let step = capture.feed("c", 5000);
        assert!(step.consumed);
        assert!(step.completed.is_empty());
        assert_eq!(capture.feed("d", 5010).completed, completed(&["cd"]));
    }

    #[test]
    fn unbound_key_passes_through() {
        let mut capture = capture(&["ec2"]);

        let step = capture.feed("x", 0);
        assert!(!step.consumed);
        assert!(step.completed.is_empty());

        capture.feed("e", 10);
        let step = capture.feed("x", 20);
        assert!(!step.consumed);
        assert!(!capture.is_pending());
    }

    #[test]
    fn rebinding_replaces_the_previous_sequence() {
        let mut capture = capture(&["j"]);
        capture.bind("next", KeySequence::parse("j").unwrap());

        assert_eq!(capture.feed("j", 0).completed, completed(&["next"]));
        assert_eq!(capture.feed("j", 10).completed, completed(&["next"]));
    }

    #[test]
    fn reset_discards_partial_input() {
        let mut capture = capture(&["ec2"]);
        capture.feed("e", 0);
        capture.reset();
        assert!(!capture.is_pending());
        assert!(!capture.feed("2", 10).consumed);
    }

    proptest! {
        #[test]
        fn only_bound_ids_ever_complete(keys in proptest::collection::vec("[a-z2]", 0..40)) {
            let bindings = ["ec2", "e", "s3", "lam", "l", "j", "k"];
            let mut capture = capture(&bindings);
            for (index, key) in keys.iter().enumerate() {
                let step = capture.feed(key, index as u64 * 10);
                for id in step.completed {
                    prop_assert!(bindings.contains(&id.as_str()));
                }
            }
        }
    }
}
