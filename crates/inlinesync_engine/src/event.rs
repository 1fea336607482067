//! Native editing events as delivered by the host.

use crate::dom::{DomRange, NodeId};
use inlinesync_core::constants::TEXT_PLAIN_MIME;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// `InputEvent.inputType`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InputType {
    InsertText,
    InsertReplacementText,
    InsertFromPaste,
    InsertFromDrop,
    InsertParagraph,
    InsertLineBreak,
    InsertCompositionText,
    DeleteContentBackward,
    DeleteContentForward,
    DeleteWordBackward,
    DeleteWordForward,
    DeleteByCut,
    Other(String),
}

impl InputType {
    /// The DOM `inputType` string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::InsertText => "insertText",
            Self::InsertReplacementText => "insertReplacementText",
            Self::InsertFromPaste => "insertFromPaste",
            Self::InsertFromDrop => "insertFromDrop",
            Self::InsertParagraph => "insertParagraph",
            Self::InsertLineBreak => "insertLineBreak",
            Self::InsertCompositionText => "insertCompositionText",
            Self::DeleteContentBackward => "deleteContentBackward",
            Self::DeleteContentForward => "deleteContentForward",
            Self::DeleteWordBackward => "deleteWordBackward",
            Self::DeleteWordForward => "deleteWordForward",
            Self::DeleteByCut => "deleteByCut",
            Self::Other(other) => other,
        }
    }

    /// `delete*` input types.
    pub fn is_deletion(&self) -> bool {
        self.as_str().starts_with("delete")
    }

    /// `insert*` input types.
    pub fn is_insertion(&self) -> bool {
        self.as_str().starts_with("insert")
    }
}

impl From<&str> for InputType {
    fn from(value: &str) -> Self {
        match value {
            "insertText" => Self::InsertText,
            "insertReplacementText" => Self::InsertReplacementText,
            "insertFromPaste" => Self::InsertFromPaste,
            "insertFromDrop" => Self::InsertFromDrop,
            "insertParagraph" => Self::InsertParagraph,
            "insertLineBreak" => Self::InsertLineBreak,
            "insertCompositionText" => Self::InsertCompositionText,
            "deleteContentBackward" => Self::DeleteContentBackward,
            "deleteContentForward" => Self::DeleteContentForward,
            "deleteWordBackward" => Self::DeleteWordBackward,
            "deleteWordForward" => Self::DeleteWordForward,
            "deleteByCut" => Self::DeleteByCut,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for InputType {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<InputType> for String {
    fn from(value: InputType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimal `DataTransfer`: typed string payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataTransfer {
    items: BTreeMap<String, String>,
}

impl DataTransfer {
    /// Creates a transfer holding `text/plain` data.
    pub fn plain_text(text: impl Into<String>) -> Self {
        let mut transfer = Self::default();
        transfer.set_data(TEXT_PLAIN_MIME, text);
        transfer
    }

    /// Stores `data` under `format`, replacing any earlier payload.
    pub fn set_data(&mut self, format: &str, data: impl Into<String>) {
        self.items.insert(format.to_string(), data.into());
    }

    /// Payload for `format`; empty when absent, like the DOM API.
    pub fn get_data(&self, format: &str) -> &str {
        self.items.get(format).map_or("", String::as_str)
    }
}

/// `beforeinput`: fired before the host applies an edit.
#[derive(Debug, Clone, PartialEq)]
pub struct BeforeInputEvent {
    pub input_type: InputType,
    pub data: Option<String>,
    /// Clipboard or drag payload for paste and drop.
    pub data_transfer: Option<DataTransfer>,
    /// `getTargetRanges()`.
    pub target_ranges: Vec<DomRange>,
    pub is_composing: bool,
    pub default_prevented: bool,
}

impl BeforeInputEvent {
    /// Event with no target ranges or data transfer.
    pub fn new(input_type: InputType, data: Option<&str>) -> Self {
        Self {
            input_type,
            data: data.map(str::to_string),
            data_transfer: None,
            target_ranges: Vec::new(),
            is_composing: false,
            default_prevented: false,
        }
    }

    /// `preventDefault()`: the engine owns the mutation.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }
}

/// `input`: fired after the host applied an edit. Only listened to on Android.
#[derive(Debug, Clone, PartialEq)]
pub struct InputEvent {
    pub input_type: InputType,
    pub data: Option<String>,
    pub is_composing: bool,
}

impl InputEvent {
    /// Non-composing event carrying `data`.
    pub fn new(input_type: InputType, data: Option<&str>) -> Self {
        Self {
            input_type,
            data: data.map(str::to_string),
            is_composing: false,
        }
    }
}

/// `compositionstart` / `compositionupdate` / `compositionend`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompositionEvent {
    /// Committed or in-progress IME text; often empty on commit.
    pub data: Option<String>,
    pub default_prevented: bool,
}

impl CompositionEvent {
    /// Event carrying `data`.
    pub fn new(data: Option<&str>) -> Self {
        Self {
            data: data.map(str::to_string),
            default_prevented: false,
        }
    }

    /// `preventDefault()`.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }
}

pub const KEY_ARROW_LEFT: &str = "ArrowLeft";
pub const KEY_ARROW_RIGHT: &str = "ArrowRight";

/// `keydown`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyboardEvent {
    /// `KeyboardEvent.key`.
    pub key: String,
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
    /// Set by the host while an IME session owns the keystroke.
    pub is_composing: bool,
    pub default_prevented: bool,
    pub propagation_stopped: bool,
}

impl KeyboardEvent {
    /// Unmodified press of `key`.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn with_shift(mut self, shift: bool) -> Self {
        self.shift = shift;
        self
    }

    pub fn with_ctrl(mut self, ctrl: bool) -> Self {
        self.ctrl = ctrl;
        self
    }

    pub fn with_alt(mut self, alt: bool) -> Self {
        self.alt = alt;
        self
    }

    pub fn with_meta(mut self, meta: bool) -> Self {
        self.meta = meta;
        self
    }

    /// True when any of shift, ctrl, alt, or meta is held.
    pub fn has_modifier(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }

    /// `preventDefault()`.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// `stopPropagation()`.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }
}

/// `click`, reduced to its target node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub target: NodeId,
}

/// An event routed through `InlineEditor::dispatch`.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeEvent {
    SelectionChange,
    BeforeInput(BeforeInputEvent),
    Input(InputEvent),
    CompositionStart(CompositionEvent),
    CompositionUpdate(CompositionEvent),
    CompositionEnd(CompositionEvent),
    KeyDown(KeyboardEvent),
    Click(MouseEvent),
}

/// Listener registration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    SelectionChange,
    BeforeInput,
    Input,
    CompositionStart,
    CompositionUpdate,
    CompositionEnd,
    KeyDown,
    Click,
}

impl EventKind {
    /// DOM event name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SelectionChange => "selectionchange",
            Self::BeforeInput => "beforeinput",
            Self::Input => "input",
            Self::CompositionStart => "compositionstart",
            Self::CompositionUpdate => "compositionupdate",
            Self::CompositionEnd => "compositionend",
            Self::KeyDown => "keydown",
            Self::Click => "click",
        }
    }
}

impl NativeEvent {
    /// Listener key for this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::SelectionChange => EventKind::SelectionChange,
            Self::BeforeInput(_) => EventKind::BeforeInput,
            Self::Input(_) => EventKind::Input,
            Self::CompositionStart(_) => EventKind::CompositionStart,
            Self::CompositionUpdate(_) => EventKind::CompositionUpdate,
            Self::CompositionEnd(_) => EventKind::CompositionEnd,
            Self::KeyDown(_) => EventKind::KeyDown,
            Self::Click(_) => EventKind::Click,
        }
    }

    /// True when a handler called `preventDefault()`.
    pub fn default_prevented(&self) -> bool {
        match self {
            Self::BeforeInput(event) => event.default_prevented,
            Self::CompositionEnd(event)
            | Self::CompositionStart(event)
            | Self::CompositionUpdate(event) => event.default_prevented,
            Self::KeyDown(event) => event.default_prevented,
            Self::SelectionChange | Self::Input(_) | Self::Click(_) => false,
        }
    }
}
