// src/trigger/mod.rs

//! Operator-initiated triggers.

pub mod manual;

pub use manual::{listen, spawn_manual_listener};
