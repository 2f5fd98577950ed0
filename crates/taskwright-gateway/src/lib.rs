// SPDX-FileCopyrightText: 2026 Taskwright Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for taskwright.
//!
//! A thin REST layer over the storage adapter plus `POST /api/chat` for the
//! conversational agent. All `/api` routes require a bearer token verified
//! by an `AuthAdapter`; the verified `user_id` scopes every operation.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;

pub use error::{ApiError, ErrorResponse};
pub use server::{GatewayState, ServerConfig, build_router, start_server};
