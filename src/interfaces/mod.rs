//! Outward-facing interfaces: rendering lookup results for consumers.

pub mod csv;
