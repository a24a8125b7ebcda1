//! Oracle-versus-order-book arbitrage agent for DeepBook pools on Sui.
//!
//! The library holds the pure pieces (scaling, order decoding, detection,
//! sizing) and the settlement workflow behind async ports; the binary wires
//! the Pyth and Sui adapters into a fixed-delay loop.

pub mod arbitrage;
pub mod chain;
pub mod config;
pub mod deepbook;
pub mod errors;
pub mod markets;
pub mod models;
pub mod oracle;
pub mod runner;
pub mod settlement;
pub mod utils;

#[cfg(test)]
pub(crate) mod testkit;
