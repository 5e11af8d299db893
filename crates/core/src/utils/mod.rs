//! Small shared helpers.

pub mod coerce;
