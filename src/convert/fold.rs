//! Folding canonical messages into UI turns.
//!
//! Consecutive assistant and tool messages make up one assistant turn. The
//! turn stays open until a user or system message arrives (or the input ends)
//! and is emitted right before that boundary message.

use std::collections::VecDeque;

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::state::CorrelationTable;
use crate::types::{
    ContentItem, FunctionCall, FunctionResult, Message, Role, ToolInvocationPart, UIMessage,
    UIPart, UIRole,
};
use crate::util::ids::IdGenerator;
use crate::util::json::{normalize_arguments, DEFAULT_UNWRAP_DEPTH};

use super::content::to_ui_part;

/// Assistant turn being accumulated.
#[derive(Debug)]
struct OpenTurn {
    id: String,
    parts: Vec<UIPart>,
    /// Call id → position of its invocation part in `parts`.
    calls: CorrelationTable<usize>,
}

/// Incremental turn folder. Feed messages with [`push`](Self::push) and call
/// [`flush`](Self::flush) once the input is exhausted.
#[derive(Debug)]
pub struct TurnFolder<G> {
    ids: G,
    open: Option<OpenTurn>,
    unwrap_depth: usize,
}

impl<G: IdGenerator> TurnFolder<G> {
    pub fn new(ids: G) -> Self {
        Self {
            ids,
            open: None,
            unwrap_depth: DEFAULT_UNWRAP_DEPTH,
        }
    }

    /// Limit for unwrapping string-encoded call arguments.
    pub fn with_unwrap_depth(mut self, depth: usize) -> Self {
        self.unwrap_depth = depth;
        self
    }

    pub fn has_open_turn(&self) -> bool {
        self.open.is_some()
    }

    /// Fold one message. Returns the UI messages it completes, in order.
    pub fn push(&mut self, message: Message) -> Vec<UIMessage> {
        if message.content.is_empty() {
            return Vec::new();
        }

        match message.role {
            Role::Tool => {
                self.fold_tool(message);
                Vec::new()
            }
            Role::Assistant => {
                self.fold_assistant(message);
                Vec::new()
            }
            Role::User | Role::System => {
                let mut emitted: Vec<UIMessage> = self.flush().into_iter().collect();
                emitted.push(self.boundary_message(message));
                emitted
            }
        }
    }

    /// Close the open assistant turn, if any.
    pub fn flush(&mut self) -> Option<UIMessage> {
        let turn = self.open.take()?;
        trace!(id = %turn.id, parts = turn.parts.len(), "flushing assistant turn");
        Some(UIMessage::new(turn.id, UIRole::Assistant, turn.parts))
    }

    fn fold_tool(&mut self, message: Message) {
        let turn = open_turn(&mut self.open, &self.ids, None);
        for item in message.content {
            match item {
                ContentItem::FunctionResult(result) => attach_result(turn, result),
                other => {
                    if let Some(part) = to_ui_part(&other).into_part() {
                        turn.parts.push(part);
                    }
                }
            }
        }
    }

    fn fold_assistant(&mut self, message: Message) {
        let Self {
            ids,
            open,
            unwrap_depth,
        } = self;
        let turn = open_turn(open, ids, message.id);
        for item in message.content {
            match item {
                ContentItem::FunctionCall(mut call) => {
                    if call.call_id.is_empty() {
                        call.call_id = ids.next_id();
                    }
                    register_call(turn, call, *unwrap_depth);
                }
                other => {
                    if let Some(part) = to_ui_part(&other).into_part() {
                        turn.parts.push(part);
                    }
                }
            }
        }
    }

    fn boundary_message(&self, message: Message) -> UIMessage {
        let role = match message.role {
            Role::System => UIRole::System,
            _ => UIRole::User,
        };
        let parts = message
            .content
            .iter()
            .filter_map(|item| to_ui_part(item).into_part())
            .collect();
        UIMessage::new(
            message.id.unwrap_or_else(|| self.ids.next_id()),
            role,
            parts,
        )
    }
}

fn open_turn<'a, G: IdGenerator>(
    open: &'a mut Option<OpenTurn>,
    ids: &G,
    id: Option<String>,
) -> &'a mut OpenTurn {
    open.get_or_insert_with(|| OpenTurn {
        id: id.unwrap_or_else(|| ids.next_id()),
        parts: Vec::new(),
        calls: CorrelationTable::new(),
    })
}

fn register_call(turn: &mut OpenTurn, call: FunctionCall, depth: usize) {
    let index = turn.parts.len();
    if !turn.calls.register(call.call_id.clone(), index) {
        debug!(call_id = %call.call_id, "ignoring duplicate function call");
        return;
    }
    let input = normalize_arguments(&call.arguments, depth);
    turn.parts.push(UIPart::ToolInvocation(ToolInvocationPart::pending(
        call.call_id,
        &call.name,
        input,
    )));
}

fn attach_result(turn: &mut OpenTurn, result: FunctionResult) {
    let Some(&index) = turn.calls.get(&result.call_id) else {
        debug!(call_id = %result.call_id, "dropping function result without a matching call");
        return;
    };

    let output = match result.result {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };
    let updated = match turn.parts.get(index) {
        Some(UIPart::ToolInvocation(existing)) if !existing.is_completed() => {
            existing.completed(output)
        }
        Some(UIPart::ToolInvocation(_)) => {
            debug!(call_id = %result.call_id, "ignoring repeated function result");
            return;
        }
        _ => return,
    };
    turn.parts[index] = UIPart::ToolInvocation(updated);
}

/// Lazy iterator returned by [`fold_messages`].
pub struct FoldTurns<I, G> {
    inner: I,
    folder: TurnFolder<G>,
    pending: VecDeque<UIMessage>,
    done: bool,
}

impl<I, G> Iterator for FoldTurns<I, G>
where
    I: Iterator<Item = Message>,
    G: IdGenerator,
{
    type Item = UIMessage;

    fn next(&mut self) -> Option<UIMessage> {
        loop {
            if let Some(message) = self.pending.pop_front() {
                return Some(message);
            }
            if self.done {
                return None;
            }
            match self.inner.next() {
                Some(message) => self.pending.extend(self.folder.push(message)),
                None => {
                    self.done = true;
                    return self.folder.flush();
                }
            }
        }
    }
}

/// Fold a message sequence into UI messages.
pub fn fold_messages<I, G>(messages: I, ids: G) -> FoldTurns<I::IntoIter, G>
where
    I: IntoIterator<Item = Message>,
    G: IdGenerator,
{
    FoldTurns {
        inner: messages.into_iter(),
        folder: TurnFolder::new(ids),
        pending: VecDeque::new(),
        done: false,
    }
}
