//! # Authorization gate for the rally functions
//!
//! - [`verifier`]: [`IdentityVerifier`] trait and the [`GoTrueVerifier`] that
//!   resolves a token through the identity provider's `/user` endpoint.
//! - [`gate`]: the [`AuthUser`] extractor, token placement rules
//!   ([`bearer_token`]) and the [`require_permission`] check.

pub mod gate;
pub mod verifier;

pub use gate::{bearer_token, require_permission, AuthUser, ACCESS_TOKEN_HEADER};
pub use verifier::{GoTrueVerifier, IdentityVerifier, SharedVerifier, VerifiedUser, VerifyError};
