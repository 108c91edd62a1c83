//! SSE (Server-Sent Events) stream decoding
//!
//! Turns the body of `POST /query/stream` into typed events.
//! The body is a sequence of blocks separated by a blank line:
//! - `data: <json>` - the frame payload
//! - any other line - ignored
//! - `\n\n` - frame boundary
//!
//! # Module structure
//! - `decoder` - FrameDecoder, incremental bytes to payload strings
//! - `events` - StreamEvent, the tagged frame variants
//! - `payloads` - Internal payload deserialization structs

mod decoder;
mod events;
mod payloads;

pub use decoder::{decode_stream, FrameDecoder, PayloadStream};
pub use events::StreamEvent;
