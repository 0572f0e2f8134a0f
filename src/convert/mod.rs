//! Conversions between canonical messages and persisted UI turns.

pub mod content;
pub mod expand;
pub mod fold;

pub use content::{data_part_type, to_ui_part, PartMapping};
pub use expand::{expand_message, expand_messages};
pub use fold::{fold_messages, FoldTurns, TurnFolder};
