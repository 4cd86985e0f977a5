//! # lease-payout-lib
//!
//! `lease-payout-lib` is a collection of utilities used by the various `lease-payout-*` crates.

#![deny(unused_crate_dependencies)]

pub mod config;
pub mod defaults;
pub mod utils;
