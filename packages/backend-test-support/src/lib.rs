//! Backend test support utilities
//!
//! Shared helpers for the backend's integration tests, currently the unified
//! logging initialization used by every test binary.

pub mod logging;
