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

use status_streamer::StreamConfig;
use std::time::Duration;
use tokio::time::{sleep, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Installs a test subscriber once per process; later calls are no-ops.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Polls `condition` until it holds or `timeout` elapses. Returns the final value.
pub async fn wait_until<F>(timeout: Duration, condition: F) -> bool
where
    F: Fn() -> bool,
{
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        sleep(POLL_INTERVAL).await;
    }
}

pub fn synthetic_config(keywords: &[&str], length: usize, delay_ms: u64) -> StreamConfig {
    StreamConfig {
        enable_synthetic_mode: true,
        keywords: keywords.iter().map(|keyword| keyword.to_string()).collect(),
        synthetic_min_length: length,
        synthetic_max_length: length,
        synthetic_delay_ms: delay_ms,
        target_topics: vec!["status-topic".to_string()],
    }
}

pub fn live_config(keywords: &[&str]) -> StreamConfig {
    StreamConfig {
        enable_synthetic_mode: false,
        keywords: keywords.iter().map(|keyword| keyword.to_string()).collect(),
        synthetic_min_length: 5,
        synthetic_max_length: 15,
        synthetic_delay_ms: 10_000,
        target_topics: vec!["status-topic".to_string()],
    }
}
