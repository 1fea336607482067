//! Input synchronization engine: keeps a logical inline range and a delta
//! buffer in step with native selection and editing events.

pub mod clock;
pub mod composition;
pub mod dom;
pub mod editor;
pub mod event;
pub mod hooks;
pub mod platform;
pub mod reconciler;
pub mod render;
pub mod slot;
pub mod surface;
pub mod transform;
pub mod translate;

pub use clock::{Clock, ManualClock, SystemClock};
pub use composition::{
    CommittedTextSource, CompositionSnapshot, CompositionState, CompositionTracker,
    PendingComposition,
};
pub use dom::{Document, DomPoint, DomRange, NodeId};
pub use editor::InlineEditor;
pub use event::{
    BeforeInputEvent, CompositionEvent, DataTransfer, EventKind, InputEvent, InputType,
    KeyboardEvent, MouseEvent, NativeEvent,
};
pub use hooks::{BeforeInputContext, CompositionEndContext, Hooks};
pub use platform::{AndroidInputFingerprint, AndroidInputGuard, Platform};
pub use reconciler::EventReconciler;
pub use slot::{Slot, Slots};
pub use surface::NativeSurface;
