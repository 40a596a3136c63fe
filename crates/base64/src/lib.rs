//! Base64 encoding/decoding for ion-kit.
//!
//! Blob values travel as base64 text between `{{` and `}}`; this crate
//! provides the one-shot conversions plus an incremental encoder that lets
//! the text writer stream lob bytes of any granularity.
//!
//! # Example
//!
//! ```
//! use ion_kit_base64::{from_base64, to_base64};
//!
//! let encoded = to_base64(b"ion");
//! assert_eq!(encoded, "aW9u");
//! assert_eq!(from_base64(encoded.as_bytes()).unwrap(), b"ion");
//! ```

mod constants;
mod encoder;
mod from_base64;
mod to_base64;

pub use constants::{ALPHABET, PAD};
pub use encoder::Base64Encoder;
pub use from_base64::{from_base64, Base64Error};
pub use to_base64::to_base64;
