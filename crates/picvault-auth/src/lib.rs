//! # picvault-auth
//!
//! Verification of bearer tokens issued by the external identity provider.
//! PicVault never manages sessions or passwords; it only checks the
//! token signature and reads the subject, which becomes the owner id of
//! every node the caller touches.
//!
//! ## Modules
//!
//! - `jwt`: claims, HS256 verification, and dev token issuing

pub mod jwt;

pub use jwt::{Claims, JwtDecoder, JwtEncoder, UserProfile};
