//! Tests for expanding UI turns back into canonical messages.

mod common;

use agentwire::convert::{expand_message, expand_messages, fold_messages};
use agentwire::types::*;
use common::{assistant, ids, tool};
use pretty_assertions::assert_eq;
use serde_json::json;

fn invocation(id: &str, kind: &str, input: serde_json::Value, output: Option<serde_json::Value>) -> UIPart {
    UIPart::ToolInvocation(ToolInvocationPart {
        tool_call_id: id.to_string(),
        kind: kind.to_string(),
        input,
        output,
        provider_executed: true,
    })
}

#[test]
fn invocation_expands_to_call_then_result() {
    let turn = UIMessage::new(
        "a1",
        UIRole::Assistant,
        vec![
            UIPart::text("checking"),
            invocation("c1", "tool-lookup", json!({"q": "x"}), Some(json!({"a": 1}))),
        ],
    );

    let expanded = expand_message(&turn);

    assert_eq!(
        expanded,
        vec![
            Message::new(
                Role::Assistant,
                vec![
                    ContentItem::text("checking"),
                    ContentItem::function_call("c1", "lookup", json!({"q": "x"})),
                ],
            )
            .with_id("a1"),
            Message::tool_result("c1", json!({"a": 1})),
        ]
    );
}

#[test]
fn results_follow_the_assistant_message_in_call_order() {
    let turn = UIMessage::new(
        "a1",
        UIRole::Assistant,
        vec![
            invocation("c1", "tool-first", json!({}), Some(json!(1))),
            invocation("c2", "tool-second", json!({}), Some(json!(2))),
        ],
    );

    let expanded = expand_message(&turn);

    assert_eq!(expanded.len(), 3);
    assert_eq!(expanded[0].role, Role::Assistant);
    assert_eq!(expanded[0].function_calls().len(), 2);
    let result_ids: Vec<&str> = expanded[1..]
        .iter()
        .flat_map(|m| m.function_results())
        .map(|r| r.call_id.as_str())
        .collect();
    assert_eq!(result_ids, vec!["c1", "c2"]);
}

#[test]
fn pending_invocation_gets_empty_result() {
    let turn = UIMessage::new(
        "a1",
        UIRole::Assistant,
        vec![invocation("c1", "tool-lookup", json!({}), None)],
    );

    let expanded = expand_message(&turn);

    assert_eq!(expanded[1].function_results()[0].result, json!({}));
}

#[test]
fn unprefixed_or_empty_kinds_map_to_names() {
    let turn = UIMessage::new(
        "a1",
        UIRole::Assistant,
        vec![
            invocation("c1", "tool-", json!({}), None),
            invocation("c2", "", json!({}), None),
            invocation("c3", "lookup", json!({}), None),
        ],
    );

    let names: Vec<String> = expand_message(&turn)[0]
        .function_calls()
        .iter()
        .map(|call| call.name.clone())
        .collect();

    assert_eq!(names, vec!["unknown", "unknown", "lookup"]);
}

#[test]
fn tool_call_part_becomes_function_call_only() {
    let turn = UIMessage::new(
        "a1",
        UIRole::Assistant,
        vec![UIPart::ToolCall(ToolCallPart {
            tool_call_id: "c1".into(),
            tool_name: "search".into(),
            input: json!(r#"{"q":"rust"}"#),
            provider_executed: false,
        })],
    );

    let expanded = expand_message(&turn);

    assert_eq!(
        expanded,
        vec![Message::new(
            Role::Assistant,
            vec![ContentItem::function_call("c1", "search", json!({"q": "rust"}))],
        )
        .with_id("a1")]
    );
}

#[test]
fn user_messages_keep_text_only() {
    let turn = UIMessage::new(
        "u1",
        UIRole::User,
        vec![
            UIPart::text("look at this"),
            UIPart::File {
                url: "https://example.com/cat.png".into(),
                media_type: "image/png".into(),
            },
        ],
    );

    assert_eq!(
        expand_message(&turn),
        vec![Message::user("look at this").with_id("u1")]
    );
}

#[test]
fn streamed_text_deltas_become_text() {
    let turn = UIMessage::new(
        "a1",
        UIRole::Assistant,
        vec![
            UIPart::text_start("m1"),
            UIPart::text_delta("m1", "hel"),
            UIPart::text_delta("m1", "lo"),
            UIPart::text_end("m1"),
        ],
    );

    assert_eq!(expand_message(&turn)[0].text(), "hello");
}

#[test]
fn fold_then_expand_restores_call_and_result() {
    let original = vec![
        Message::user("find x").with_id("u1"),
        assistant(vec![ContentItem::function_call("c1", "lookup", json!({"q": "x"}))])
            .with_id("a1"),
        tool(vec![ContentItem::function_result("c1", json!({"a": 1}))]),
    ];

    let folded: Vec<UIMessage> = fold_messages(original, ids()).collect();
    let expanded = expand_messages(&folded);

    assert_eq!(
        expanded,
        vec![
            Message::user("find x").with_id("u1"),
            assistant(vec![ContentItem::function_call("c1", "lookup", json!({"q": "x"}))])
                .with_id("a1"),
            Message::tool_result("c1", json!({"a": 1})),
        ]
    );
}

#[test]
fn persisted_turns_with_stream_like_tool_names_reload_and_expand() {
    for name in ["output-available", "input-available"] {
        let original = vec![
            assistant(vec![ContentItem::function_call("c1", name, json!({"q": 1}))]).with_id("a1"),
            tool(vec![ContentItem::function_result("c1", json!({"a": 1}))]),
        ];

        let folded: Vec<UIMessage> = fold_messages(original, ids()).collect();
        let stored = serde_json::to_string(&folded).unwrap();
        let reloaded: Vec<UIMessage> = serde_json::from_str(&stored).unwrap();
        assert_eq!(reloaded, folded, "{name}");

        assert_eq!(
            expand_messages(&reloaded),
            vec![
                assistant(vec![ContentItem::function_call("c1", name, json!({"q": 1}))])
                    .with_id("a1"),
                Message::tool_result("c1", json!({"a": 1})),
            ],
            "{name}"
        );
    }
}
