//! Subcommand handlers. Each reads from `input` and writes to `output`.

use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde_json::json;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_stream::wrappers::LinesStream;
use tokio_util::sync::CancellationToken;

use crate::config::AgentwireConfig;
use crate::convert::{expand_messages, fold_messages};
use crate::error::{AgentwireError, Result};
use crate::stream::{
    aggregate_agent_updates, aggregate_workflow_events, decode_parts, replay_parts, sse_frames,
    ReplayContext,
};
use crate::types::{AgentUpdate, Message, UIMessage, WorkflowEvent};
use crate::util::UuidIds;
use crate::wire::{decode_response_str, encode_request, RequestOptions, ToolDefinition};

use super::{AggregateArgs, Commands, EncodeArgs, ReplayArgs};

/// Run one subcommand to completion or until `cancel` fires.
pub async fn run<R, W>(
    command: Commands,
    config: &AgentwireConfig,
    input: R,
    output: &mut W,
    cancel: CancellationToken,
) -> Result<()>
where
    R: AsyncBufRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin,
{
    match command {
        Commands::Fold => {
            let messages: Vec<Message> = read_json(input).await?;
            let folded: Vec<UIMessage> = fold_messages(messages, UuidIds).collect();
            write_json(output, &folded).await
        }
        Commands::Expand => {
            let messages: Vec<UIMessage> = read_json(input).await?;
            write_json(output, &expand_messages(&messages)).await
        }
        Commands::Encode(args) => encode(args, config, input, output).await,
        Commands::Decode => {
            let mut body = String::new();
            let mut input = input;
            input.read_to_string(&mut body).await?;
            let response = decode_response_str(&body, &config.wire)?;
            let rendered = json!({
                "id": response.id,
                "created": response.created.map(|c| c.to_rfc3339()),
                "finish_reason": response.finish_reason,
                "usage": response.usage,
                "message": response.message,
            });
            write_json(output, &rendered).await
        }
        Commands::Aggregate(args) => aggregate(args, config, input, output, cancel).await,
        Commands::Replay(args) => replay(args, input, output).await,
    }
}

async fn encode<R, W>(
    args: EncodeArgs,
    config: &AgentwireConfig,
    input: R,
    output: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let messages: Vec<Message> = read_json(input).await?;
    let tools: Vec<ToolDefinition> = match &args.tools {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path).await?;
            serde_json::from_str(&raw)?
        }
        None => Vec::new(),
    };
    let options = RequestOptions::builder()
        .maybe_model(args.model)
        .maybe_temperature(args.temperature)
        .build();
    let body = encode_request(&messages, &tools, &config.wire, &options);
    write_json(output, &body).await
}

async fn aggregate<R, W>(
    args: AggregateArgs,
    config: &AgentwireConfig,
    input: R,
    output: &mut W,
    cancel: CancellationToken,
) -> Result<()>
where
    R: AsyncBufRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin,
{
    let lines = LinesStream::new(input.lines());
    let parts = if args.workflow {
        let events = lines.filter_map(|line| async move {
            match parse_line::<WorkflowEvent>(line)? {
                Ok(event) => Some(event),
                Err(e) => Some(WorkflowEvent::error(e.to_string())),
            }
        });
        aggregate_workflow_events(events, config.stream.clone(), cancel)
    } else {
        let updates = lines.filter_map(|line| async move { parse_line::<AgentUpdate>(line) });
        aggregate_agent_updates(updates, config.stream.clone(), cancel)
    };

    let mut frames = sse_frames(parts);
    while let Some(frame) = frames.next().await {
        output.write_all(frame.as_bytes()).await?;
        output.flush().await?;
    }
    Ok(())
}

async fn replay<R, W>(args: ReplayArgs, input: R, output: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin,
{
    let lines = LinesStream::new(input.lines())
        .filter_map(|line| async move { line.ok() });
    let ctx = ReplayContext {
        author_name: args.author,
        model_id: args.model,
    };

    let mut updates = replay_parts(decode_parts(lines), ctx, UuidIds);
    while let Some(update) = updates.next().await {
        let mut line = serde_json::to_string(&update)?;
        line.push('\n');
        output.write_all(line.as_bytes()).await?;
    }
    output.flush().await?;
    Ok(())
}

/// One JSON-lines record; blank lines are skipped.
fn parse_line<T: DeserializeOwned>(
    line: std::io::Result<String>,
) -> Option<std::result::Result<T, AgentwireError>> {
    match line {
        Ok(line) if line.trim().is_empty() => None,
        Ok(line) => Some(serde_json::from_str(&line).map_err(AgentwireError::from)),
        Err(e) => Some(Err(e.into())),
    }
}

async fn read_json<T, R>(mut input: R) -> Result<T>
where
    T: DeserializeOwned,
    R: AsyncBufRead + Unpin,
{
    let mut raw = String::new();
    input.read_to_string(&mut raw).await?;
    if raw.trim().is_empty() {
        return Err(AgentwireError::InvalidArgument(
            "expected JSON on stdin".to_string(),
        ));
    }
    Ok(serde_json::from_str(&raw)?)
}

async fn write_json<W, T>(output: &mut W, value: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: serde::Serialize,
{
    let mut rendered = serde_json::to_string_pretty(value)?;
    rendered.push('\n');
    output.write_all(rendered.as_bytes()).await?;
    output.flush().await?;
    Ok(())
}
