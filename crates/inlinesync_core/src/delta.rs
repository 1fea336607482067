//! Delta runs: contiguous text sharing attributes, or a single embed.

use crate::constants::{EMBED_CHAR, EMBED_INSERT};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute map attached to a run. Semantics belong to the embedding model.
pub type Attributes = BTreeMap<String, serde_json::Value>;

/// One run of the delta sequence.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DeltaRun {
    pub insert: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: Attributes,
}

impl DeltaRun {
    /// Creates a plain text run.
    pub fn text(insert: impl Into<String>) -> Self {
        Self {
            insert: insert.into(),
            attributes: Attributes::new(),
        }
    }

    /// Creates a text run carrying attributes.
    pub fn with_attributes(insert: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            insert: insert.into(),
            attributes,
        }
    }

    /// Creates an embed run.
    pub fn embed(attributes: Attributes) -> Self {
        Self {
            insert: EMBED_INSERT.to_string(),
            attributes,
        }
    }

    /// True when the run is the reserved embed marker.
    pub fn is_embed(&self) -> bool {
        self.insert == EMBED_INSERT
    }

    /// Logical length of the run in units.
    pub fn len(&self) -> usize {
        if self.is_embed() {
            1
        } else {
            self.insert.chars().count()
        }
    }

    /// True when the run carries no logical units.
    pub fn is_empty(&self) -> bool {
        self.insert.is_empty()
    }
}

/// Strips reserved embed markers from user-supplied text.
pub(crate) fn sanitize_text(text: &str) -> String {
    text.chars().filter(|ch| *ch != EMBED_CHAR).collect()
}
