// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relational Guard - Request-scoped authentication for Axum services
//!
//! Validates signed tokens or API keys once per request, keeps the resulting
//! claims in a task-local slot for the handler, and gates routes on role sets.
//!
//! ## Modules
//!
//! - `api` - Demo HTTP API wired with every authentication mode
//! - `auth` - Guard, middleware, claims store and role gates
//! - `config` - Guard configuration from the environment
//! - `store` - In-memory principal and reference-token directory

pub mod api;
pub mod auth;
pub mod config;
pub mod state;
pub mod store;
