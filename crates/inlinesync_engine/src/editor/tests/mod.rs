//! Behaviour tests driving a mounted editor through native events.

use super::*;
use crate::clock::ManualClock;
use crate::dom::{Document, DomPoint};
use crate::event::{BeforeInputEvent, CompositionEvent, InputType, KeyboardEvent};
use inlinesync_core::{DeltaDocument, DeltaRun};
use std::cell::Cell;
use std::rc::Rc;

mod composition;
mod translation;

pub(super) type TestEditor = InlineEditor<DeltaDocument, Document>;

const DESKTOP_UA: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";
const ANDROID_UA: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36";

struct TestHarness {
    editor: TestEditor,
    clock: ManualClock,
    outside_text: NodeId,
}

impl TestHarness {
    fn new(deltas: &[DeltaRun]) -> Self {
        Self::with(deltas, DESKTOP_UA, SyncConfig::default())
    }

    fn android(deltas: &[DeltaRun]) -> Self {
        Self::with(deltas, ANDROID_UA, SyncConfig::default())
    }

    fn with(deltas: &[DeltaRun], user_agent: &str, config: SyncConfig) -> Self {
        let mut doc = Document::new(user_agent);
        let body = doc.body();
        let root = doc.create_element("div");
        let sidebar = doc.create_element("p");
        let outside_text = doc.create_text("outside");
        doc.append_child(body, root);
        doc.append_child(body, sidebar);
        doc.append_child(sidebar, outside_text);

        let clock = ManualClock::new();
        let mut editor = InlineEditor::with_clock(
            DeltaDocument::from_deltas(deltas),
            doc,
            config,
            clock.clone(),
        );
        editor.mount(root).expect("mount");
        Self {
            editor,
            clock,
            outside_text,
        }
    }

    fn root(&self) -> NodeId {
        self.editor.root().expect("mounted")
    }

    /// Moves the native selection like a user would and lets the editor react.
    fn select(&mut self, range: InlineRange) {
        let dom = self.editor.to_dom_range(range).expect("dom range");
        self.editor.surface_mut().set_selection(Some(dom));
        self.editor.flush_selection_changes();
    }

    fn text(&self) -> String {
        self.editor.buffer().to_plain_string()
    }

    fn inputting_counter(&mut self) -> Rc<Cell<usize>> {
        let count = Rc::new(Cell::new(0));
        let handle = Rc::clone(&count);
        self.editor.slots_mut().inputting.subscribe(move |_| {
            handle.set(handle.get() + 1);
            Ok(())
        });
        count
    }

    fn before_input(&mut self, input_type: InputType, data: Option<&str>) -> BeforeInputEvent {
        let mut event = NativeEvent::BeforeInput(BeforeInputEvent::new(input_type, data));
        self.editor.dispatch(&mut event);
        match event {
            NativeEvent::BeforeInput(event) => event,
            other => panic!("unexpected event {other:?}"),
        }
    }

    fn key_down(&mut self, key: KeyboardEvent) -> KeyboardEvent {
        let mut event = NativeEvent::KeyDown(key);
        self.editor.dispatch(&mut event);
        match event {
            NativeEvent::KeyDown(event) => event,
            other => panic!("unexpected event {other:?}"),
        }
    }

    fn composition_start(&mut self) {
        self.editor
            .dispatch(&mut NativeEvent::CompositionStart(CompositionEvent::default()));
    }

    fn composition_end(&mut self, data: Option<&str>) -> CompositionEvent {
        let mut event = NativeEvent::CompositionEnd(CompositionEvent::new(data));
        self.editor.dispatch(&mut event);
        match event {
            NativeEvent::CompositionEnd(event) => event,
            other => panic!("unexpected event {other:?}"),
        }
    }
}

fn embed() -> DeltaRun {
    DeltaRun::embed(inlinesync_core::Attributes::new())
}

fn text_embed_text() -> Vec<DeltaRun> {
    vec![DeltaRun::text("ab"), embed(), DeltaRun::text("cd")]
}
