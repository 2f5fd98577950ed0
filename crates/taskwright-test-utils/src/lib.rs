// SPDX-FileCopyrightText: 2026 Taskwright Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for taskwright integration tests.
//!
//! Provides a scripted oracle and a harness wiring it to temp SQLite storage
//! and a real agent, for fast deterministic tests without network access.
//!
//! # Components
//!
//! - [`MockOracle`] - Oracle with scripted replies, scripted failures and request capture
//! - [`TestHarness`] - Temp database plus mock oracle plus [`taskwright_agent::TaskAgent`]

pub mod harness;
pub mod mock_oracle;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_oracle::{MockOracle, direct_reply, intent_reply};
