//! Broadleaf application library
//!
//! Layered configuration and the headless simulation loop used by the
//! `broadleaf` binary.

pub mod config;
pub mod simulation;
