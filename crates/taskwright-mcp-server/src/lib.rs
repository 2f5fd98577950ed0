// SPDX-FileCopyrightText: 2026 Taskwright Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model Context Protocol tool server.
//!
//! Speaks newline-delimited JSON-RPC 2.0 and exposes the five task tools.
//! Arguments are checked against each tool's JSON Schema before dispatch,
//! and results are the dispatcher's `ToolResult` serialized as text content.

pub mod protocol;
pub mod server;
pub mod tools;

pub use server::{McpServer, serve_stdio};
pub use tools::ToolCatalog;
