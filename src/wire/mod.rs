//! Chat-completions wire translation.

pub mod format;
pub mod openai;

pub use format::{arguments_to_string, decode_arguments, tool_result_to_string};
pub use openai::{
    decode_response, decode_response_str, encode_message, encode_messages, encode_request,
    CompletionResponse, RequestOptions, ToolDefinition,
};
