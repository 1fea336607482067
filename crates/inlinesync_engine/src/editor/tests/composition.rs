use super::*;
use crate::composition::CommittedTextSource;
use crate::render::{ATTR_CONTENTEDITABLE, ATTR_EMBED};

/// Simulates an IME writing `text` at the native caret.
fn ime_write(harness: &mut TestHarness, text: &str) {
    harness
        .editor
        .surface_mut()
        .insert_at_selection(text)
        .expect("native caret");
    harness.editor.flush_selection_changes();
    harness
        .editor
        .dispatch(&mut NativeEvent::CompositionUpdate(CompositionEvent::default()));
}

#[test]
fn empty_event_data_recovers_committed_text_from_dom() {
    let mut harness = TestHarness::new(&[DeltaRun::text("Hello")]);
    let inputting = harness.inputting_counter();
    harness.select(InlineRange::caret(5));

    harness.composition_start();
    ime_write(&mut harness, "!");
    assert_eq!(harness.editor.surface().selection_text(), "!");
    let event = harness.composition_end(Some(""));

    assert!(event.default_prevented);
    assert_eq!(harness.text(), "Hello!");
    assert_eq!(harness.editor.get_inline_range(), Some(InlineRange::caret(6)));
    // One notification from the update, one from the commit.
    assert_eq!(inputting.get(), 2);
    assert!(!harness.editor.is_composing());
}

#[test]
fn dom_range_text_beats_empty_event_data() {
    let mut harness = TestHarness::new(&[DeltaRun::text("ab")]);
    harness.select(InlineRange::caret(1));
    harness.composition_start();
    ime_write(&mut harness, "xyz");

    let mut event = CompositionEvent::new(Some(""));
    let pending = harness
        .editor
        .handle_composition_end(&mut event)
        .expect("pending commit");
    assert_eq!(pending.text(), Some("xyz"));
    assert_eq!(pending.source(), Some(CommittedTextSource::DomRange));
    assert_eq!(pending.inline_range(), Some(InlineRange::caret(1)));
    // Re-render already dropped the uncommitted native text.
    assert_eq!(
        harness
            .editor
            .surface()
            .range_text(&harness.editor.to_dom_range(InlineRange::new(0, 2)).expect("range")),
        "ab"
    );

    harness.editor.resume_composition(pending);
    harness.editor.flush_selection_changes();
    assert_eq!(harness.text(), "axyzb");
    assert_eq!(harness.editor.get_inline_range(), Some(InlineRange::caret(4)));
}

#[test]
fn event_data_is_used_when_present() {
    let mut harness = TestHarness::new(&[DeltaRun::text("Hello")]);
    harness.select(InlineRange::caret(5));
    harness.composition_start();
    ime_write(&mut harness, "ni");
    harness.composition_end(Some("你"));
    assert_eq!(harness.text(), "Hello你");
    assert_eq!(harness.editor.get_inline_range(), Some(InlineRange::caret(6)));
}

#[test]
fn unrecoverable_text_still_settles_the_caret() {
    let mut harness = TestHarness::new(&[DeltaRun::text("Hello")]);
    let inputting = harness.inputting_counter();
    harness.select(InlineRange::caret(3));
    harness.composition_start();

    harness.composition_end(None);

    assert_eq!(harness.text(), "Hello");
    assert_eq!(harness.editor.get_inline_range(), Some(InlineRange::caret(3)));
    assert_eq!(inputting.get(), 1);
}

#[test]
fn nested_composition_start_keeps_first_snapshot() {
    let mut harness = TestHarness::new(&[DeltaRun::text("Hello")]);
    harness.select(InlineRange::caret(5));
    harness.composition_start();
    let session = harness.editor.reconciler().composition().session();

    harness.select(InlineRange::caret(1));
    harness.composition_start();
    assert_eq!(harness.editor.reconciler().composition().session(), session);

    harness.composition_end(Some("!"));
    assert_eq!(harness.text(), "Hello!");
}

#[test]
fn detached_root_cancels_pending_commit() {
    let mut harness = TestHarness::new(&[DeltaRun::text("Hello")]);
    harness.select(InlineRange::caret(5));
    harness.composition_start();
    ime_write(&mut harness, "!");
    let pending = harness
        .editor
        .handle_composition_end(&mut CompositionEvent::new(Some("!")))
        .expect("pending commit");

    let root = harness.root();
    harness.editor.surface_mut().detach(root);
    harness.editor.resume_composition(pending);

    assert_eq!(harness.text(), "Hello");
}

#[test]
fn restarted_composition_cancels_pending_commit() {
    let mut harness = TestHarness::new(&[DeltaRun::text("Hello")]);
    harness.select(InlineRange::caret(5));
    harness.composition_start();
    let pending = harness
        .editor
        .handle_composition_end(&mut CompositionEvent::new(Some("a")))
        .expect("pending commit");

    harness.composition_start();
    harness.editor.resume_composition(pending);
    assert_eq!(harness.text(), "Hello");

    harness.composition_end(Some("b"));
    assert_eq!(harness.text(), "Hellob");
}

#[test]
fn embeds_are_not_editable_targets_during_composition() {
    let mut harness = TestHarness::new(&text_embed_text());
    harness.select(InlineRange::caret(1));
    let root = harness.root();
    let editable_embeds = |harness: &TestHarness| {
        harness
            .editor
            .surface()
            .query_all_with_attribute(root, ATTR_EMBED, "true")
            .into_iter()
            .filter(|embed| {
                harness
                    .editor
                    .surface()
                    .attribute(*embed, ATTR_CONTENTEDITABLE)
                    .is_some()
            })
            .count()
    };
    assert_eq!(editable_embeds(&harness), 1);

    harness.composition_start();
    assert_eq!(editable_embeds(&harness), 0);

    harness.composition_end(Some("x"));
    assert_eq!(editable_embeds(&harness), 1);
    assert_eq!(harness.text(), "axb\u{FFFC}cd");
}

#[test]
fn beforeinput_is_left_to_the_ime_while_composing() {
    let mut harness = TestHarness::new(&[DeltaRun::text("Hello")]);
    harness.select(InlineRange::caret(5));
    harness.composition_start();
    let event = harness.before_input(InputType::InsertCompositionText, Some("!"));
    assert!(!event.default_prevented);
    assert_eq!(harness.text(), "Hello");
}

#[test]
fn composition_update_outside_root_is_silent() {
    let mut harness = TestHarness::new(&[DeltaRun::text("Hello")]);
    let inputting = harness.inputting_counter();
    let outside = harness.outside_text;
    harness
        .editor
        .surface_mut()
        .set_selection(Some(DomRange::collapsed(DomPoint::new(outside, 0))));
    harness
        .editor
        .dispatch(&mut NativeEvent::CompositionUpdate(CompositionEvent::default()));
    assert_eq!(inputting.get(), 0);
}
