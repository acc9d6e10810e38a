//! # furrow-core
//! Foundation types, wide integers and storage traits for the Furrow protocol.

pub mod codec;
pub mod constants;
pub mod error;
pub mod kv;
pub mod traits;
pub mod types;
pub mod wide;
