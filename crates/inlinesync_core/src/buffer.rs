//! Delta buffer boundary and the rope-backed in-memory document.

use crate::constants::EMBED_CHAR;
use crate::delta::{sanitize_text, Attributes, DeltaRun};
use crate::error::SyncError;
use crate::range::InlineRange;
use ropey::Rope;

/// Ordered delta storage the engine reads from and mutates.
///
/// Lengths and indices are logical units: one per char of text, one per embed.
pub trait DeltaBuffer {
    /// Total logical length.
    fn len(&self) -> usize;

    /// Snapshot of the ordered runs.
    fn deltas(&self) -> Vec<DeltaRun>;

    /// Logical unit at `index`; embeds report the reserved marker char.
    fn char_at(&self, index: usize) -> Option<char>;

    /// Replaces the content of `range` with `text` carrying `attributes`.
    fn insert_text(
        &mut self,
        range: InlineRange,
        text: &str,
        attributes: &Attributes,
    ) -> Result<(), SyncError>;

    /// Deletes the content of `range`.
    fn delete_text(&mut self, range: InlineRange) -> Result<(), SyncError>;

    /// True when the buffer holds no units.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when `run` is an atomic embed.
    fn is_embed(&self, run: &DeltaRun) -> bool {
        run.is_embed()
    }

    /// True when `range` lies within the current buffer length.
    fn is_valid_inline_range(&self, range: InlineRange) -> bool {
        range.fits(self.len())
    }

    /// Runs touching `range`, each paired with its own logical span.
    ///
    /// A run is reported when its end reaches `range.index` and it starts
    /// before `range.end()`. A caret additionally reports the run starting
    /// exactly at it, so a caret between two runs yields both neighbours.
    fn deltas_by_inline_range(&self, range: InlineRange) -> Vec<(DeltaRun, InlineRange)> {
        let mut out = Vec::new();
        let mut start = 0usize;
        for run in self.deltas() {
            let len = run.len();
            let reaches_start = start + len >= range.index;
            let before_end =
                start < range.end() || (range.is_collapsed() && start == range.index);
            if reaches_start && before_end {
                out.push((run, InlineRange::new(start, len)));
            }
            start += len;
        }
        out
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Span {
    len: usize,
    attributes: Attributes,
    embed: bool,
}

/// Rope-backed delta document: flattened text plus an attribute span list.
#[derive(Clone, Debug, Default)]
pub struct DeltaDocument {
    rope: Rope,
    spans: Vec<Span>,
    revision: u64,
}

impl DeltaDocument {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a document holding plain `text`.
    pub fn from_text(text: &str) -> Self {
        Self::from_deltas(&[DeltaRun::text(text)])
    }

    /// Creates a document from an ordered run list.
    pub fn from_deltas(runs: &[DeltaRun]) -> Self {
        let mut doc = Self::default();
        for run in runs {
            let at = doc.len();
            if run.is_embed() {
                doc.insert_span(at, &EMBED_CHAR.to_string(), run.attributes.clone(), true);
            } else {
                let text = sanitize_text(&run.insert);
                doc.insert_span(at, &text, run.attributes.clone(), false);
            }
        }
        doc.normalize();
        doc.revision = 0;
        doc
    }

    /// Returns the mutation counter.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns the flattened text; embeds appear as the reserved marker.
    pub fn to_plain_string(&self) -> String {
        self.rope.to_string()
    }

    /// Inserts one embed at `index`.
    pub fn insert_embed(&mut self, index: usize, attributes: Attributes) -> Result<(), SyncError> {
        let len = self.len();
        if index > len {
            return Err(SyncError::OutOfBounds { index, len });
        }
        self.insert_span(index, &EMBED_CHAR.to_string(), attributes, true);
        self.normalize();
        self.revision = self.revision.wrapping_add(1);
        Ok(())
    }

    fn check_range(&self, range: InlineRange) -> Result<(), SyncError> {
        if self.is_valid_inline_range(range) {
            Ok(())
        } else {
            Err(SyncError::InvalidInlineRange {
                range,
                len: self.len(),
            })
        }
    }

    /// Splits spans so one starts exactly at `index`; returns its position.
    fn split_at(&mut self, index: usize) -> usize {
        let mut start = 0usize;
        for i in 0..self.spans.len() {
            if start == index {
                return i;
            }
            let len = self.spans[i].len;
            if index < start + len {
                let head = index - start;
                let mut tail = self.spans[i].clone();
                tail.len = len - head;
                self.spans[i].len = head;
                self.spans.insert(i + 1, tail);
                return i + 1;
            }
            start += len;
        }
        self.spans.len()
    }

    fn insert_span(&mut self, index: usize, text: &str, attributes: Attributes, embed: bool) {
        let len = text.chars().count();
        if len == 0 {
            return;
        }
        let at = self.split_at(index);
        self.rope.insert(index, text);
        self.spans.insert(
            at,
            Span {
                len,
                attributes,
                embed,
            },
        );
    }

    fn remove_range(&mut self, range: InlineRange) {
        if range.is_collapsed() {
            return;
        }
        let first = self.split_at(range.index);
        let last = self.split_at(range.end());
        self.spans.drain(first..last);
        self.rope.remove(range.index..range.end());
    }

    fn normalize(&mut self) {
        self.spans.retain(|span| span.len > 0);
        let mut merged: Vec<Span> = Vec::with_capacity(self.spans.len());
        for span in self.spans.drain(..) {
            match merged.last_mut() {
                Some(prev) if !prev.embed && !span.embed && prev.attributes == span.attributes => {
                    prev.len += span.len;
                }
                _ => merged.push(span),
            }
        }
        self.spans = merged;
    }
}

impl DeltaBuffer for DeltaDocument {
    fn len(&self) -> usize {
        self.rope.len_chars()
    }

    fn deltas(&self) -> Vec<DeltaRun> {
        let mut start = 0usize;
        self.spans
            .iter()
            .map(|span| {
                let run = if span.embed {
                    DeltaRun::embed(span.attributes.clone())
                } else {
                    DeltaRun::with_attributes(
                        self.rope.slice(start..start + span.len).to_string(),
                        span.attributes.clone(),
                    )
                };
                start += span.len;
                run
            })
            .collect()
    }

    fn char_at(&self, index: usize) -> Option<char> {
        (index < self.len()).then(|| self.rope.char(index))
    }

    fn insert_text(
        &mut self,
        range: InlineRange,
        text: &str,
        attributes: &Attributes,
    ) -> Result<(), SyncError> {
        self.check_range(range)?;
        let text = sanitize_text(text);
        if range.is_collapsed() && text.is_empty() {
            return Ok(());
        }
        self.remove_range(range);
        self.insert_span(range.index, &text, attributes.clone(), false);
        self.normalize();
        self.revision = self.revision.wrapping_add(1);
        Ok(())
    }

    fn delete_text(&mut self, range: InlineRange) -> Result<(), SyncError> {
        self.check_range(range)?;
        if range.is_collapsed() {
            return Ok(());
        }
        self.remove_range(range);
        self.normalize();
        self.revision = self.revision.wrapping_add(1);
        Ok(())
    }
}
