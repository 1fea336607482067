//! Mutable-context hooks run before the default input transform.

use crate::event::InputType;
use inlinesync_core::{Attributes, InlineRange};

/// Context handed to `beforeinput` hooks.
#[derive(Debug, Clone, PartialEq)]
pub struct BeforeInputContext {
    pub input_type: InputType,
    pub inline_range: InlineRange,
    pub data: Option<String>,
    pub attributes: Attributes,
    vetoed: bool,
}

impl BeforeInputContext {
    pub fn new(input_type: InputType, inline_range: InlineRange, data: Option<String>) -> Self {
        Self {
            input_type,
            inline_range,
            data,
            attributes: Attributes::new(),
            vetoed: false,
        }
    }

    /// Skips the default transform for this event.
    pub fn veto(&mut self) {
        self.vetoed = true;
    }

    pub fn is_vetoed(&self) -> bool {
        self.vetoed
    }
}

/// Context handed to `compositionend` hooks.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionEndContext {
    pub inline_range: InlineRange,
    pub data: Option<String>,
    pub attributes: Attributes,
}

type Hook<C> = Box<dyn FnMut(&mut C)>;

/// Ordered hook lists; every hook sees the edits of the previous one.
#[derive(Default)]
pub struct Hooks {
    before_input: Vec<Hook<BeforeInputContext>>,
    composition_end: Vec<Hook<CompositionEndContext>>,
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("before_input", &self.before_input.len())
            .field("composition_end", &self.composition_end.len())
            .finish()
    }
}

impl Hooks {
    pub fn on_before_input(&mut self, hook: impl FnMut(&mut BeforeInputContext) + 'static) {
        self.before_input.push(Box::new(hook));
    }

    pub fn on_composition_end(&mut self, hook: impl FnMut(&mut CompositionEndContext) + 'static) {
        self.composition_end.push(Box::new(hook));
    }

    pub(crate) fn run_before_input(&mut self, ctx: &mut BeforeInputContext) {
        for hook in &mut self.before_input {
            hook(ctx);
            if ctx.is_vetoed() {
                break;
            }
        }
    }

    pub(crate) fn run_composition_end(&mut self, ctx: &mut CompositionEndContext) {
        for hook in &mut self.composition_end {
            hook(ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hooks_run_in_order_and_see_prior_edits() {
        let mut hooks = Hooks::default();
        hooks.on_before_input(|ctx| ctx.data = Some("a".to_string()));
        hooks.on_before_input(|ctx| {
            let data = ctx.data.take().unwrap_or_default();
            ctx.data = Some(format!("{data}b"));
        });
        let mut ctx = BeforeInputContext::new(InputType::InsertText, InlineRange::caret(0), None);
        hooks.run_before_input(&mut ctx);
        assert_eq!(ctx.data.as_deref(), Some("ab"));
    }

    #[test]
    fn veto_stops_later_hooks() {
        let mut hooks = Hooks::default();
        hooks.on_before_input(BeforeInputContext::veto);
        hooks.on_before_input(|ctx| ctx.inline_range = InlineRange::caret(9));
        let mut ctx = BeforeInputContext::new(InputType::InsertText, InlineRange::caret(1), None);
        hooks.run_before_input(&mut ctx);
        assert!(ctx.is_vetoed());
        assert_eq!(ctx.inline_range, InlineRange::caret(1));
    }
}
