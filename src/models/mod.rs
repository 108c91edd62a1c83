//! Data model shared by the stream decoder, the conversation store and the
//! query client.

mod message;
mod request;
mod response;

pub use message::{Message, MessageRole};
pub use request::QueryRequest;
pub use response::{Metadata, QueryResponse, Source, TokenUsage};
