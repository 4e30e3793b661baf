// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;
use std::time::Instant;

use crate::auth::Guard;
use crate::config::{ConfigError, GuardConfig};
use crate::store::InMemoryDirectory;

#[derive(Clone)]
pub struct AppState {
    pub guard: Guard,
    pub directory: Arc<InMemoryDirectory>,
    pub started_at: Instant,
}

impl AppState {
    /// Build the state, wiring the directory in as both lookup adapters.
    pub fn new(config: GuardConfig, directory: InMemoryDirectory) -> Result<Self, ConfigError> {
        let directory = Arc::new(directory);
        let guard = Guard::new(config, directory.clone(), directory.clone())?;
        Ok(Self {
            guard,
            directory,
            started_at: Instant::now(),
        })
    }
}
