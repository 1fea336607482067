//! Replays recorded editing sessions against a headless editor.
//!
//! A script is JSON: the initial delta runs, an optional starting selection,
//! and an ordered list of native events. Time only moves on `advance_ms`.

use inlinesync_core::{DeltaBuffer, DeltaDocument, DeltaRun, InlineRange, SyncConfig, SyncError};
use inlinesync_engine::event::{KEY_ARROW_LEFT, KEY_ARROW_RIGHT};
use inlinesync_engine::render::ATTR_EMBED;
use inlinesync_engine::{
    BeforeInputEvent, CompositionEvent, DataTransfer, Document, InlineEditor, InputEvent,
    InputType, KeyboardEvent, ManualClock, MouseEvent, NativeEvent, NativeSurface,
};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid replay script: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("step {step}: {source}")]
    Step {
        step: usize,
        #[source]
        source: SyncError,
    },
    #[error(transparent)]
    Sync(#[from] SyncError),
}

/// One recorded native event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptEvent {
    /// User moves the native selection.
    Select {
        index: usize,
        #[serde(default)]
        length: usize,
    },
    BeforeInput {
        input_type: InputType,
        #[serde(default)]
        data: Option<String>,
        /// Logical form of `getTargetRanges()[0]`.
        #[serde(default)]
        target: Option<InlineRange>,
        /// `text/plain` payload of the event's data transfer.
        #[serde(default)]
        clipboard: Option<String>,
    },
    CompositionStart,
    /// IME writes `text` at the native caret.
    Compose { text: String },
    CompositionUpdate,
    CompositionEnd {
        #[serde(default)]
        data: Option<String>,
    },
    KeyDown {
        key: String,
        #[serde(default)]
        shift: bool,
        #[serde(default)]
        ctrl: bool,
        #[serde(default)]
        alt: bool,
        #[serde(default)]
        meta: bool,
    },
    /// Click on the `index`-th embed in document order.
    ClickEmbed { index: usize },
    Input {
        data: String,
        #[serde(default = "insert_text")]
        input_type: InputType,
    },
    AdvanceMs { ms: u64 },
    /// Removes the editable root from the document.
    Detach,
}

fn insert_text() -> InputType {
    InputType::InsertText
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReplayScript {
    #[serde(default)]
    pub initial: Vec<DeltaRun>,
    #[serde(default)]
    pub selection: Option<InlineRange>,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub events: Vec<ScriptEvent>,
}

/// Final editor state after a replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayReport {
    pub text: String,
    pub deltas: Vec<DeltaRun>,
    pub inline_range: Option<InlineRange>,
    /// Steps whose event had its default action prevented.
    pub prevented_steps: Vec<usize>,
    pub inputting_notifications: usize,
}

impl fmt::Display for ReplayReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "text: {:?}", self.text)?;
        match self.inline_range {
            Some(range) => writeln!(f, "range: index {} length {}", range.index, range.length)?,
            None => writeln!(f, "range: none")?,
        }
        writeln!(f, "prevented steps: {:?}", self.prevented_steps)?;
        writeln!(f, "inputting notifications: {}", self.inputting_notifications)
    }
}

/// Reads and parses a script file.
///
/// # Errors
/// Returns [`ReplayError::Read`] or [`ReplayError::Parse`].
pub fn load_script(path: &Path) -> Result<ReplayScript, ReplayError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ReplayError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&raw)?)
}

type Editor = InlineEditor<DeltaDocument, Document>;

fn select(editor: &mut Editor, range: InlineRange) -> Result<(), SyncError> {
    let dom = editor
        .to_dom_range(range)
        .ok_or(SyncError::InvalidInlineRange {
            range,
            len: editor.len(),
        })?;
    editor.surface_mut().set_selection(Some(dom));
    editor.flush_selection_changes();
    Ok(())
}

/// Applies one script event; returns whether its default was prevented.
fn apply_event(
    editor: &mut Editor,
    clock: &ManualClock,
    event: &ScriptEvent,
) -> Result<bool, SyncError> {
    let mut native = match event {
        ScriptEvent::Select { index, length } => {
            select(editor, InlineRange::new(*index, *length))?;
            return Ok(false);
        }
        ScriptEvent::BeforeInput {
            input_type,
            data,
            target,
            clipboard,
        } => {
            let mut before = BeforeInputEvent::new(input_type.clone(), data.as_deref());
            before.data_transfer = clipboard.as_deref().map(DataTransfer::plain_text);
            if let Some(target) = target {
                let dom = editor
                    .to_dom_range(*target)
                    .ok_or(SyncError::InvalidInlineRange {
                        range: *target,
                        len: editor.len(),
                    })?;
                before.target_ranges.push(dom);
            }
            NativeEvent::BeforeInput(before)
        }
        ScriptEvent::CompositionStart => NativeEvent::CompositionStart(CompositionEvent::default()),
        ScriptEvent::Compose { text } => {
            editor
                .surface_mut()
                .insert_at_selection(text)
                .ok_or_else(|| SyncError::Script("compose needs a caret in a text node".into()))?;
            editor.flush_selection_changes();
            return Ok(false);
        }
        ScriptEvent::CompositionUpdate => NativeEvent::CompositionUpdate(CompositionEvent::default()),
        ScriptEvent::CompositionEnd { data } => {
            NativeEvent::CompositionEnd(CompositionEvent::new(data.as_deref()))
        }
        ScriptEvent::KeyDown {
            key,
            shift,
            ctrl,
            alt,
            meta,
        } => {
            let key = match key.as_str() {
                "left" => KEY_ARROW_LEFT,
                "right" => KEY_ARROW_RIGHT,
                other => other,
            };
            NativeEvent::KeyDown(
                KeyboardEvent::new(key)
                    .with_shift(*shift)
                    .with_ctrl(*ctrl)
                    .with_alt(*alt)
                    .with_meta(*meta),
            )
        }
        ScriptEvent::ClickEmbed { index } => {
            let root = editor.root().ok_or(SyncError::NoRoot)?;
            let target = editor
                .surface()
                .query_all_with_attribute(root, ATTR_EMBED, "true")
                .get(*index)
                .copied()
                .ok_or_else(|| SyncError::Script(format!("no embed at position {index}")))?;
            NativeEvent::Click(MouseEvent { target })
        }
        ScriptEvent::Input { data, input_type } => {
            NativeEvent::Input(InputEvent::new(input_type.clone(), Some(data)))
        }
        ScriptEvent::AdvanceMs { ms } => {
            clock.advance(Duration::from_millis(*ms));
            return Ok(false);
        }
        ScriptEvent::Detach => {
            let root = editor.root().ok_or(SyncError::NoRoot)?;
            editor.surface_mut().detach(root);
            return Ok(false);
        }
    };
    editor.dispatch(&mut native);
    Ok(native.default_prevented())
}

/// Runs `script` against a fresh headless editor.
///
/// # Errors
/// Fails when the root cannot be mounted or a step names a range or embed
/// that does not exist. Events the engine ignores are not errors.
pub fn run_script(script: &ReplayScript, config: SyncConfig) -> Result<ReplayReport, ReplayError> {
    let mut doc = Document::new(script.user_agent.clone().unwrap_or_default());
    let body = doc.body();
    let root = doc.create_element("div");
    doc.append_child(body, root);

    let clock = ManualClock::new();
    let mut editor = InlineEditor::with_clock(
        DeltaDocument::from_deltas(&script.initial),
        doc,
        config,
        clock.clone(),
    );
    editor.mount(root)?;
    editor.set_read_only(script.read_only);

    let inputting = Rc::new(Cell::new(0usize));
    let counter = Rc::clone(&inputting);
    editor.slots_mut().inputting.subscribe(move |_| {
        counter.set(counter.get() + 1);
        Ok(())
    });

    if let Some(range) = script.selection {
        select(&mut editor, range).map_err(|source| ReplayError::Step { step: 0, source })?;
    }

    let mut prevented_steps = Vec::new();
    for (step, event) in script.events.iter().enumerate() {
        debug!(step, ?event, "replaying event");
        let prevented = apply_event(&mut editor, &clock, event)
            .map_err(|source| ReplayError::Step { step, source })?;
        if prevented {
            prevented_steps.push(step);
        }
    }

    Ok(ReplayReport {
        text: editor.buffer().to_plain_string(),
        deltas: editor.buffer().deltas(),
        inline_range: editor.get_inline_range(),
        prevented_steps,
        inputting_notifications: inputting.get(),
    })
}
