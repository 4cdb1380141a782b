//! Domain types and the ports the application layer depends on.

pub mod address;
pub mod flow;
pub mod form;
pub mod payer;
pub mod payment;
pub mod ports;
pub mod profile;
pub mod verification;
