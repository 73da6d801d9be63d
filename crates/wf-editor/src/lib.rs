pub mod align;
pub mod clipboard;
pub mod config;
pub mod history;
pub mod hit;
pub mod render;
pub mod shortcuts;
pub mod store;
pub mod tools;

pub use align::Alignment;
pub use config::EditorConfig;
pub use render::{RenderModel, RenderNode};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use store::DiagramStore;
pub use tools::ToolKind;
