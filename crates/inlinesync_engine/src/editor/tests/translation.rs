use super::*;
use crate::render::ATTR_EMBED;

fn mixed() -> Vec<DeltaRun> {
    vec![
        embed(),
        DeltaRun::text("ab"),
        embed(),
        embed(),
        DeltaRun::text("c\n\nde"),
        embed(),
    ]
}

#[test]
fn logical_to_native_and_back_is_identity() {
    let harness = TestHarness::new(&mixed());
    let total = harness.editor.len();
    assert_eq!(total, 11);
    for index in 0..=total {
        for length in 0..=(total - index) {
            let range = InlineRange::new(index, length);
            let dom = harness.editor.to_dom_range(range).expect("dom range");
            assert_eq!(
                harness.editor.to_inline_range(&dom),
                Some(range),
                "range: {:?}",
                range
            );
        }
    }
}

#[test]
fn carets_around_embeds_never_land_inside() {
    let harness = TestHarness::new(&text_embed_text());
    let doc = harness.editor.surface();
    let root = harness.root();
    let embed = doc.query_all_with_attribute(root, ATTR_EMBED, "true")[0];
    for text in doc.text_descendants(embed) {
        let len = doc.text(text).map_or(0, |text| text.chars().count());
        for offset in 0..=len {
            let caret = DomRange::collapsed(DomPoint::new(text, offset));
            let resolved = harness.editor.to_inline_range(&caret).expect("caret");
            assert!(
                resolved == InlineRange::caret(2) || resolved == InlineRange::caret(3),
                "offset {} resolved to {:?}",
                offset,
                resolved
            );
        }
    }
}

#[test]
fn out_of_buffer_ranges_have_no_native_form() {
    let harness = TestHarness::new(&[DeltaRun::text("abc")]);
    assert_eq!(harness.editor.to_dom_range(InlineRange::new(2, 2)), None);
}

#[test]
fn native_ranges_outside_the_root_do_not_translate() {
    let harness = TestHarness::new(&[DeltaRun::text("abc")]);
    let inside = harness
        .editor
        .to_dom_range(InlineRange::caret(1))
        .expect("dom range");
    let straddling = DomRange::new(inside.start, DomPoint::new(harness.outside_text, 3));
    assert_eq!(harness.editor.to_inline_range(&straddling), None);
}
