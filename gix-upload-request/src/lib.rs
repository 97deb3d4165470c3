//! Encoding of the upload-request sent by a fetching client.
//!
//! An upload-request names the objects a client *wants*, the *shallow* boundaries of its
//! history and an optional *deepen* directive, and negotiates capabilities on its first
//! line. It is written as a sequence of pkt-lines terminated by a flush packet:
//!
//! ```text
//! want <hex> <capabilities>\n
//! want <hex>\n
//! shallow <hex>\n
//! deepen <n>\n | deepen-since <seconds>\n | deepen-not <ref>\n
//! 0000
//! ```
//!
//! Wants and shallows are sorted by their hexadecimal representation, so equal requests
//! always produce identical bytes.
//!
//! # Example
//!
//! ```no_run
//! use gix_upload_request::{encode, Depth, PacketLineSink, UploadRequest};
//!
//! let want = gix_hash::ObjectId::empty_tree(gix_hash::Kind::Sha1);
//! let request = UploadRequest::new().with_want(want).with_depth(Depth::Commits(1));
//!
//! let mut out = Vec::new();
//! encode::Encoder::new(PacketLineSink::new(&mut out)).encode(&request)?;
//! # Ok::<(), gix_upload_request::Error>(())
//! ```
#![deny(rust_2018_idioms, missing_docs)]
#![forbid(unsafe_code)]

pub mod capabilities;
pub mod depth;
pub mod encode;
pub mod error;
pub mod order;
pub mod request;
pub mod sink;

pub use capabilities::{Capabilities, Capability};
pub use depth::Depth;
pub use error::{Error, Result};
pub use request::UploadRequest;
pub use sink::{LineSink, PacketLineSink};

/// The version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The value of the `agent` capability sent by [`UploadRequest::from_advertised()`].
pub fn agent() -> String {
    format!("git/gitoxide-{VERSION}")
}
