//! Credential hashing and bearer-token issuance.
//!
//! The token's `(email, role)` claims are the sole authority source for
//! every downstream authorization decision; there is no session store
//! and no expiry.

pub mod password;
pub mod token;

pub use token::{Claims, TokenSigner};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Malformed token")]
    MalformedToken,

    #[error("Token signature mismatch")]
    BadSignature,
}
