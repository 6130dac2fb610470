//! Command implementations

pub mod pm1;
