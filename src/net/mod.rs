//! TCP transport: newline-delimited JSON in front of the arena task

pub mod protocol;
pub mod server;

pub use protocol::{decode_line, encode_line, ClientMsg, ServerMsg, StatePayload, TileRef};
pub use server::{ArenaServer, Inbound};
