//! JSON-lines transport
//!
//! Inbound gateway events are read one JSON object per line from stdin or
//! a file; outbound order commands are written the same way to stdout or a
//! file. Logs never go to stdout.

mod feed;
mod gateway;

pub use feed::JsonLinesFeed;
pub use gateway::JsonLinesGateway;
