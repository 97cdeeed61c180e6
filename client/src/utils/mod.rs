//! Collection of small helpers shared across the client core.

pub mod jwt;
