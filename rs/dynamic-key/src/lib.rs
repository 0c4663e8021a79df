//! Dynamic key generation and verification for media relay authentication.
//!
//! A dynamic key (protocol `003`) is a short-lived token proving the holder may join a channel
//! until a given expiry. The wire format is:
//!
//! ```text
//! "003" ++ hex(HMAC-SHA256) ++ app_id ++ issued_at(10) ++ salt(8, hex) ++ uid(10) ++ expires_at(10)
//! ```
//!
//! Every numeric field is rendered at a fixed width so the signer and verifier hash identical bytes.
//! See [`generate()`] to create a token and [`Token`] to decode and verify one.

mod config;
mod error;
mod field;
mod generate;
mod secret;
mod signature;
mod token;

pub use config::*;
pub use error::*;
pub use field::*;
pub use generate::*;
pub use secret::*;
pub use signature::*;
pub use token::*;
