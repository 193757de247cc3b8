// src/watch/mod.rs

//! Change detection for the watched source tree.
//!
//! - [`fingerprint`] summarises a directory tree into a single value.
//! - [`poller`] re-computes that value on an interval and turns transitions
//!   into runtime triggers.
//!
//! Nothing here knows about builds or deployments.

pub mod fingerprint;
pub mod poller;

pub use fingerprint::{file_value, fingerprint, Fingerprint, Fingerprinter};
pub use poller::{spawn_poller, ChangeDetector, PollerHandle};
