//! Network module: JSON-lines classification service over TCP
//!
//! Maps classifier outcomes onto the historical status codes: 200 mutant,
//! 403 human, 400 invalid input, 500 internal failure.

mod protocol;
mod server;

pub use protocol::{Request, RequestKind, Response};
pub use server::{respond, Server};
