//! Core types for agentwire.

pub mod message;
pub mod tool_result;
pub mod ui;
pub mod update;
pub mod usage;

pub use message::*;
pub use tool_result::*;
pub use ui::*;
pub use update::*;
pub use usage::*;
