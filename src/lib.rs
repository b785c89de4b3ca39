//! # dhcpd-leases
//!
//! A reader and writer for the ISC dhcpd `dhcpd.leases` file, see
//! `dhcpd.leases(5)`.
//!
//! ## Features
//!
//! - Lazy block tokenizer over any [`std::io::Read`]
//! - `lease` and `host` declarations, IPv4 and IPv6 addresses
//! - Day-of-week prefixed times with zone names, numeric offsets or `epoch` seconds
//! - Failover fields (`tstp`, `tsfp`, `atsfp`, rewind binding state)
//! - Relay agent circuit-id/remote-id and vendor class values
//! - Rendering leases back into block syntax
//!
//! Unknown statements are ignored and malformed values leave single fields
//! unset, so only a failing stream can make a parse fail.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::fs::File;
//!
//! fn main() -> dhcpd_leases::Result<()> {
//!     let leases = dhcpd_leases::parse(File::open("/var/lib/dhcp/dhcpd.leases")?)?;
//!     for lease in &leases {
//!         print!("{}", lease);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`Blocks`] - Splits the stream into raw `lease`/`host` blocks
//! - [`DecoderRegistry`] - Ordered statement decoders filling a [`Lease`]
//! - [`timestamp`] - The lease-file time grammar
//! - [`parse`] - Tokenizer and decoders wired together
//! - [`Config`] - Filters and output settings for the command-line tool

pub mod config;
pub mod decoder;
pub mod error;
pub mod hardware;
pub mod lease;
pub mod parser;
pub mod timestamp;
pub mod tokenizer;

pub use config::Config;
pub use decoder::{DecoderRegistry, Field, Rule, registry};
pub use error::{Error, Result};
pub use hardware::{Hardware, MacAddr};
pub use lease::Lease;
pub use parser::{parse, parse_with};
pub use tokenizer::{BlockKind, Blocks, RawBlock};
