//! Key definitions for synthesized keyboard events.

/// What the DevTools protocol needs to replay a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyDefinition {
    pub key: &'static str,
    pub code: &'static str,
    pub key_code: i64,
    pub text: Option<&'static str>,
}

const KEYS: &[KeyDefinition] = &[
    KeyDefinition {
        key: "Enter",
        code: "Enter",
        key_code: 13,
        text: Some("\r"),
    },
    KeyDefinition {
        key: "Tab",
        code: "Tab",
        key_code: 9,
        text: None,
    },
    KeyDefinition {
        key: "Escape",
        code: "Escape",
        key_code: 27,
        text: None,
    },
    KeyDefinition {
        key: " ",
        code: "Space",
        key_code: 32,
        text: Some(" "),
    },
];

/// Look up a key by its DOM `key` name.
pub fn key_definition(key: &str) -> Option<KeyDefinition> {
    KEYS.iter().copied().find(|def| def.key == key)
}
