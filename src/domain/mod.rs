//! Pure parsing and validation helpers
//!
//! Provides the property-block parser for `systemctl show` output and the
//! defaults applied at the query boundary.

pub mod properties;
pub mod utils;
