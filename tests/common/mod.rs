//! Shared test helpers.
#![allow(dead_code)]

use futures::stream::{self, BoxStream};
use futures::StreamExt;
use serde_json::Value;

use agentwire::types::*;
use agentwire::util::SequentialIds;

/// Deterministic ids: `gen-1`, `gen-2`, ...
pub fn ids() -> SequentialIds {
    SequentialIds::new("gen-")
}

pub fn assistant(content: Vec<ContentItem>) -> Message {
    Message::new(Role::Assistant, content)
}

pub fn tool(content: Vec<ContentItem>) -> Message {
    Message::new(Role::Tool, content)
}

/// An infallible update stream.
pub fn updates(items: Vec<AgentUpdate>) -> BoxStream<'static, Result<AgentUpdate, String>> {
    stream::iter(items.into_iter().map(Ok)).boxed()
}

pub async fn collect(parts: BoxStream<'static, UIPart>) -> Vec<UIPart> {
    parts.collect().await
}

/// Split off the trailing `finish` part, returning its reason and metadata.
pub fn split_finish(mut parts: Vec<UIPart>) -> (Vec<UIPart>, Option<String>, Value) {
    match parts.pop() {
        Some(UIPart::Finish {
            finish_reason,
            metadata,
        }) => (parts, finish_reason, metadata.unwrap_or(Value::Null)),
        other => panic!("expected trailing finish part, got {other:?}"),
    }
}
