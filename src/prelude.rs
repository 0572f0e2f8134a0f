//! Convenience re-exports for common use.

pub use crate::config::{AgentwireConfig, StreamConfig, WireConfig};
pub use crate::convert::{expand_message, expand_messages, fold_messages, TurnFolder};
pub use crate::error::{AgentwireError, Result};
pub use crate::stream::{
    aggregate_agent_updates, aggregate_workflow_events, replay_parts, sse_frames,
    ReplayContext, StreamAggregator,
};
pub use crate::types::{
    AgentUpdate, ContentItem, FunctionCall, FunctionResult, Message, Role, UIMessage, UIPart,
    UIRole, UsageDetails, WorkflowEvent,
};
pub use crate::util::{IdGenerator, SequentialIds, UuidIds};
pub use crate::wire::{decode_response, encode_request, CompletionResponse, RequestOptions, ToolDefinition};
