//! Tests for single-agent UI stream aggregation.

mod common;

use std::time::Duration;

use agentwire::config::StreamConfig;
use agentwire::stream::{aggregate_agent_updates, StreamAggregator};
use agentwire::types::*;
use common::{collect, split_finish, updates};
use futures::StreamExt;
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio_util::sync::CancellationToken;

async fn aggregate(items: Vec<AgentUpdate>) -> Vec<UIPart> {
    collect(aggregate_agent_updates(
        updates(items),
        StreamConfig::default(),
        CancellationToken::new(),
    ))
    .await
}

#[tokio::test]
async fn deltas_sharing_an_id_are_framed_once() {
    let parts = aggregate(vec![
        AgentUpdate::text("m1", "a"),
        AgentUpdate::text("m1", "b"),
        AgentUpdate::text("m1", "c"),
    ])
    .await;

    let (body, reason, _) = split_finish(parts);
    assert_eq!(
        body,
        vec![
            UIPart::text_start("m1"),
            UIPart::text_delta("m1", "a"),
            UIPart::text_delta("m1", "b"),
            UIPart::text_delta("m1", "c"),
            UIPart::text_end("m1"),
        ]
    );
    assert_eq!(reason.as_deref(), Some("stop"));
}

#[tokio::test]
async fn open_streams_close_in_open_order() {
    let parts = aggregate(vec![
        AgentUpdate::text("A", "first"),
        AgentUpdate::text("B", "second"),
        AgentUpdate::text("A", "third"),
    ])
    .await;

    let (body, _, _) = split_finish(parts);
    assert_eq!(
        &body[body.len() - 2..],
        &[UIPart::text_end("A"), UIPart::text_end("B")]
    );
}

#[tokio::test]
async fn reasoning_closes_after_text() {
    let parts = aggregate(vec![
        AgentUpdate::reasoning("r1", "thinking"),
        AgentUpdate::text("m1", "answer"),
    ])
    .await;

    let (body, _, _) = split_finish(parts);
    assert_eq!(
        body,
        vec![
            UIPart::reasoning_start("r1"),
            UIPart::reasoning_delta("r1", "thinking"),
            UIPart::text_start("m1"),
            UIPart::text_delta("m1", "answer"),
            UIPart::text_end("m1"),
            UIPart::reasoning_end("r1"),
        ]
    );
}

#[tokio::test]
async fn finish_carries_latest_author_and_timestamp() {
    let parts = aggregate(vec![
        AgentUpdate::text("m1", "hi").with_author("planner"),
        AgentUpdate::text("m1", "!").with_author("writer"),
        AgentUpdate::text("m1", "?").with_author(""),
    ])
    .await;

    let (_, _, metadata) = split_finish(parts);
    assert_eq!(metadata["author"], json!("writer"));
    let timestamp = metadata["timestamp"].as_str().expect("timestamp string");
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[tokio::test]
async fn empty_input_still_finishes() {
    let parts = aggregate(Vec::new()).await;

    let (body, reason, metadata) = split_finish(parts);
    assert!(body.is_empty());
    assert_eq!(reason.as_deref(), Some("stop"));
    assert_eq!(metadata["author"], json!(""));
}

#[tokio::test]
async fn tool_call_and_result_are_correlated() {
    let parts = aggregate(vec![
        AgentUpdate::new(vec![ContentItem::function_call(
            "c1",
            "lookup",
            json!({"q": "x"}),
        )]),
        AgentUpdate::new(vec![ContentItem::function_result("c1", json!({"a": 1}))])
            .with_role(Role::Tool),
    ])
    .await;

    let (body, _, _) = split_finish(parts);
    assert_eq!(
        body,
        vec![
            UIPart::ToolCall(ToolCallPart {
                tool_call_id: "c1".into(),
                tool_name: "lookup".into(),
                input: json!({"q": "x"}),
                provider_executed: true,
            }),
            UIPart::ToolOutputAvailable {
                tool_call_id: "c1".into(),
                output: json!({"a": 1}),
                provider_executed: true,
            },
        ]
    );
}

#[tokio::test]
async fn orphan_and_anonymous_tool_items_are_dropped() {
    let parts = aggregate(vec![AgentUpdate::new(vec![
        ContentItem::function_result("missing", json!({})),
        ContentItem::function_call("", "lookup", json!({})),
        ContentItem::function_result("", json!({})),
    ])])
    .await;

    let (body, _, _) = split_finish(parts);
    assert!(body.is_empty());
}

#[tokio::test]
async fn resource_links_in_results_become_sources() {
    let result = json!({
        "content": [
            {"type": "text", "text": "found two docs"},
            {"type": "resource", "resource": {"uri": "file:///a.md", "text": "alpha"}},
            {"type": "resource_link", "uri": "https://example.com/b", "name": "Beta"},
        ]
    });
    let parts = aggregate(vec![AgentUpdate::new(vec![
        ContentItem::function_call("c1", "search", json!({})),
        ContentItem::function_result("c1", result.clone()),
    ])])
    .await;

    let (body, _, _) = split_finish(parts);
    assert_eq!(body.len(), 4);
    assert_eq!(
        body[1],
        UIPart::ToolOutputAvailable {
            tool_call_id: "c1".into(),
            output: result,
            provider_executed: true,
        }
    );
    assert_eq!(body[2], UIPart::source("file:///a.md", "file:///a.md", None));
    assert_eq!(
        body[3],
        UIPart::source("https://example.com/b", "https://example.com/b", Some("Beta".into()))
    );
}

#[tokio::test]
async fn usage_uri_and_error_items_map_directly() {
    let parts = aggregate(vec![AgentUpdate::new(vec![
        ContentItem::Usage(UsageDetails {
            input_tokens: Some(3),
            output_tokens: None,
            total_tokens: Some(3),
        }),
        ContentItem::uri("https://example.com"),
        ContentItem::error("quota exceeded"),
        ContentItem::Unsupported,
    ])])
    .await;

    let (body, _, _) = split_finish(parts);
    assert_eq!(
        body,
        vec![
            UIPart::MessageMetadata {
                metadata: json!({"inputTokens": 3, "outputTokens": 0, "totalTokens": 3}),
            },
            UIPart::source(
                "https://example.com",
                "https://example.com",
                Some("https://example.com".into())
            ),
            UIPart::error("quota exceeded"),
        ]
    );
}

#[tokio::test]
async fn image_data_with_uri_becomes_file_part() {
    let image = ContentItem::Data(DataContent {
        bytes: Vec::new(),
        media_type: "image/png".into(),
        name: None,
        uri: Some("https://example.com/cat.png".into()),
    });
    let parts = aggregate(vec![AgentUpdate::new(vec![image])]).await;

    let (body, _, _) = split_finish(parts);
    assert_eq!(
        body,
        vec![UIPart::File {
            url: "https://example.com/cat.png".into(),
            media_type: "image/png".into(),
        }]
    );
}

#[tokio::test]
async fn upstream_errors_become_error_parts_and_stream_continues() {
    let input = futures::stream::iter(vec![
        Ok(AgentUpdate::text("m1", "partial")),
        Err("connection reset".to_string()),
        Ok(AgentUpdate::text("m1", " more")),
    ]);
    let parts = collect(aggregate_agent_updates(
        input,
        StreamConfig::default(),
        CancellationToken::new(),
    ))
    .await;

    let (body, _, _) = split_finish(parts);
    assert_eq!(
        body,
        vec![
            UIPart::text_start("m1"),
            UIPart::text_delta("m1", "partial"),
            UIPart::error("connection reset"),
            UIPart::text_delta("m1", " more"),
            UIPart::text_end("m1"),
        ]
    );
}

#[tokio::test]
async fn configured_finish_reason_is_used() {
    let config = StreamConfig {
        finish_reason: "length".into(),
    };
    let parts = collect(aggregate_agent_updates(
        updates(vec![AgentUpdate::text("m1", "x")]),
        config,
        CancellationToken::new(),
    ))
    .await;

    let (_, reason, _) = split_finish(parts);
    assert_eq!(reason.as_deref(), Some("length"));
}

#[tokio::test(start_paused = true)]
async fn cancellation_ends_without_closing_parts() {
    let cancel = CancellationToken::new();
    let input = async_stream::stream! {
        yield Ok::<_, String>(AgentUpdate::text("m1", "hello"));
        tokio::time::sleep(Duration::from_secs(60)).await;
        yield Ok(AgentUpdate::text("m1", "never"));
    };

    let mut parts = aggregate_agent_updates(input, StreamConfig::default(), cancel.clone());
    assert_eq!(parts.next().await, Some(UIPart::text_start("m1")));
    assert_eq!(parts.next().await, Some(UIPart::text_delta("m1", "hello")));

    cancel.cancel();
    assert_eq!(parts.next().await, None);
}

#[test]
fn duplicate_call_ids_re_emit_the_call() {
    let mut aggregator = StreamAggregator::default();

    let first = aggregator.map_content(
        &ContentItem::function_call("c1", "lookup", json!({"q": 1})),
        "m1",
        true,
    );
    let second = aggregator.map_content(
        &ContentItem::function_call("c1", "lookup", json!({"q": 2})),
        "m1",
        true,
    );

    assert_eq!(first.len(), 1);
    match &second[..] {
        [UIPart::ToolCall(call)] => assert_eq!(call.input, json!({"q": 2})),
        other => panic!("expected one tool call, got {other:?}"),
    }
}

#[test]
fn separate_aggregators_share_no_state() {
    let mut first = StreamAggregator::default();
    let mut second = StreamAggregator::default();

    first.map_content(&ContentItem::text("x"), "m1", true);

    assert_eq!(first.open_text_streams(), 1);
    assert_eq!(second.open_text_streams(), 0);
    assert_eq!(
        second.map_content(&ContentItem::text("y"), "m1", true)[0],
        UIPart::text_start("m1")
    );
}
