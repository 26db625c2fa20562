//! Streaming extraction of simulation windows from fepout log text.
//!
//! The fepout format is treated as an external line-oriented protocol: the parser
//! recognises its three markers defensively and reports every violation as a
//! diagnostic instead of aborting the pass.

mod fepout;

pub use fepout::{FepoutParser, ParsedStream};
