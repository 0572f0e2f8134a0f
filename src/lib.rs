//! agentwire: message translation and UI stream aggregation for LLM agents.
//!
//! Converts between three representations of a conversation:
//!
//! - the canonical role + content model ([`types::Message`]) agents run on,
//! - AI SDK UI messages and UI stream parts ([`types::UIMessage`], [`types::UIPart`]),
//! - the chat-completions wire JSON ([`wire`]).
//!
//! # Quick Start
//!
//! ```
//! use agentwire::prelude::*;
//! use serde_json::json;
//!
//! let messages = vec![
//!     Message::new(
//!         Role::Assistant,
//!         vec![ContentItem::function_call("c1", "lookup", json!({"q": "x"}))],
//!     ),
//!     Message::tool_result("c1", json!({"a": 1})),
//! ];
//! let turns: Vec<UIMessage> = fold_messages(messages, SequentialIds::default()).collect();
//! assert_eq!(turns.len(), 1);
//! assert_eq!(turns[0].tool_invocations()[0].tool_name(), "lookup");
//! ```

pub mod config;
pub mod convert;
pub mod error;
pub mod prelude;
pub mod state;
pub mod stream;
pub mod types;
pub mod util;
pub mod wire;

#[cfg(feature = "cli")]
pub mod cli;
