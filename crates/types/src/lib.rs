//! Identity and query types shared by the ENS lookup crates.
//!
//! Covers Ethereum addresses, normalized ENS names and their namehash, the
//! lookup mode/query pair published by the input form, and the text record
//! keys the profile view displays.

pub mod address;
pub mod hash;
pub mod name;
pub mod query;
pub mod records;

pub use address::*;
pub use hash::*;
pub use name::*;
pub use query::*;
pub use records::*;
