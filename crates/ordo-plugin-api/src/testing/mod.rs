//! Testing utilities for plugin developers
//!
//! This module provides mocks to make orchestration testing easier.

pub mod mocks;

pub use mocks::{CallLog, MockFactory};
