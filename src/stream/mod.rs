//! Live UI stream production, replay, and framing.

pub mod aggregator;
pub mod replay;
pub mod sse;

pub use aggregator::{aggregate_agent_updates, aggregate_workflow_events, StreamAggregator};
pub use replay::{part_to_updates, replay_parts, ReplayContext};
pub use sse::{decode_parts, encode_frame, parse_data_line, sse_frames};
