//! Inbound adapters feeding the flow from outside the process.

pub mod csv;
