//! nREPL client: bencode framing and the per-call session transport

pub mod bencode;
mod client;

pub use bencode::{scan_fields, Request, ResponseFields};
pub use client::{NreplClient, NreplError, Outcome};

#[cfg(test)]
pub(crate) use client::testing;
