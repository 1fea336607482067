//! Generic input-to-mutation transform.

use crate::event::InputType;
use inlinesync_core::InlineRange;

/// Replace `range` with `text`, then put the caret at `caret`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPlan {
    pub range: InlineRange,
    pub text: String,
    pub caret: usize,
}

/// Mutation implied by an input type and payload, if any.
pub fn plan_input(
    input_type: &InputType,
    data: Option<&str>,
    range: InlineRange,
) -> Option<InputPlan> {
    match input_type {
        InputType::InsertText => {
            let text = data.filter(|data| !data.is_empty())?;
            Some(InputPlan {
                range,
                text: text.to_string(),
                caret: range.index + text.chars().count(),
            })
        }
        InputType::InsertParagraph | InputType::InsertLineBreak => Some(InputPlan {
            range,
            text: "\n".to_string(),
            caret: range.index + 1,
        }),
        other if other.is_insertion() => {
            let text = data.unwrap_or_default().to_string();
            let caret = range.index + text.chars().count();
            Some(InputPlan { range, text, caret })
        }
        other if other.is_deletion() => Some(InputPlan {
            range,
            text: String::new(),
            caret: range.index,
        }),
        _ => None,
    }
}
