//! JWT decoding, dev token encoding, and claims.

pub mod claims;
pub mod decoder;
pub mod encoder;

pub use claims::{Claims, UserProfile};
pub use decoder::JwtDecoder;
pub use encoder::JwtEncoder;
