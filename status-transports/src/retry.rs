/********************************************************************************
 * Copyright (c) 2024 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Bounded exponential backoff for startup checks.

use crate::events;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{error, warn};

const COMPONENT: &str = "retry";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    #[serde(default = "default_initial_interval_ms")]
    pub initial_interval_ms: u64,
    #[serde(default = "default_max_interval_ms")]
    pub max_interval_ms: u64,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_interval_ms: default_initial_interval_ms(),
            max_interval_ms: default_max_interval_ms(),
            multiplier: default_multiplier(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_initial_interval_ms() -> u64 {
    1_000
}

fn default_max_interval_ms() -> u64 {
    10_000
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_max_attempts() -> u32 {
    3
}

impl RetryConfig {
    /// Sleep before attempt `attempt + 1`, where `attempt` counts failures so far (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let scaled = self.initial_interval_ms as f64 * self.multiplier.max(1.0).powi(exponent);
        let capped = scaled.min(self.max_interval_ms as f64);
        Duration::from_millis(capped as u64)
    }
}

/// Runs `operation` until it succeeds or `config.max_attempts` is spent.
///
/// At least one attempt is always made. The last error is returned as-is.
pub async fn retry_with_backoff<T, E, F, Fut>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= max_attempts => {
                error!(
                    event = events::RETRY_EXHAUSTED,
                    component = COMPONENT,
                    operation = operation_name,
                    attempts = attempt,
                    err = %err,
                    "giving up"
                );
                return Err(err);
            }
            Err(err) => {
                let delay = config.delay_after(attempt);
                warn!(
                    event = events::RETRY_ATTEMPT_FAILED,
                    component = COMPONENT,
                    operation = operation_name,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    err = %err,
                    "attempt failed; retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
