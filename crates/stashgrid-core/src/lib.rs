//! Stashgrid Core Library
//!
//! Pointer-driven drag and drop: long-press to pick up an element, a floating
//! clone that follows the pointer, and typed dropzones that accept or refuse
//! what is released over them. Rendering is delegated to an [`ElementHost`].

pub mod context;
pub mod drag;
pub mod draggable;
pub mod dropzone;
pub mod error;
pub mod ghost;
pub mod input;
pub mod options;
pub mod registry;
pub mod scene;
pub mod timer;

pub use context::DragDropContext;
pub use drag::{DragController, DragHandlers, DragKey, DragState, DropOutcome, ReleaseOutcome};
pub use draggable::{DragSubject, Draggable};
pub use dropzone::{DropHandlers, Dropzone};
pub use error::{DndError, DndResult};
pub use input::{MouseButton, PointerEvent, PointerTracker};
pub use options::{DEFAULT_START_DELAY_MS, DragOptions, DropOptions};
pub use registry::Registry;
pub use scene::{ElementHost, ElementId, GhostStyle, MemoryScene};
pub use timer::{TimerId, TimerQueue};
