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

//! Live event source backed by an external keyword-filtered status feed.

use crate::error::SourceError;
use crate::observability::{events, fields};
use crate::status_listener::StatusListener;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

const COMPONENT: &str = "live_source";

///
/// [`StatusFeed`] is the client side of an external status stream.
///
/// `filter` opens a filtered stream for `keywords` and returns once the
/// connection is established; statuses are pushed to `listener` from the
/// feed's own task afterwards. `shutdown` closes the stream and must be
/// safe to call when nothing is open.
///
#[async_trait]
pub trait StatusFeed: Send + Sync {
    async fn filter(
        &self,
        keywords: &[String],
        listener: Arc<dyn StatusListener>,
    ) -> Result<(), SourceError>;

    async fn shutdown(&self);
}

/// What a feed does after its stream drops.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconnectPolicy {
    /// Report the disconnect and stay down.
    #[default]
    Degrade,
    /// Reopen the stream up to `max_attempts` times, `delay_ms` apart.
    Backoff { max_attempts: u32, delay_ms: u64 },
}

impl ReconnectPolicy {
    /// Delay before reconnect attempt `attempt` (1-based), or `None` once exhausted.
    pub fn next_delay(&self, attempt: u32) -> Option<Duration> {
        match *self {
            ReconnectPolicy::Degrade => None,
            ReconnectPolicy::Backoff {
                max_attempts,
                delay_ms,
            } => (attempt <= max_attempts).then(|| Duration::from_millis(delay_ms)),
        }
    }
}

pub struct LiveEventSource {
    feed: Arc<dyn StatusFeed>,
    keywords: Vec<String>,
    listener: Arc<dyn StatusListener>,
    streaming: bool,
}

impl LiveEventSource {
    pub fn new(
        feed: Arc<dyn StatusFeed>,
        keywords: Vec<String>,
        listener: Arc<dyn StatusListener>,
    ) -> Self {
        Self {
            feed,
            keywords,
            listener,
            streaming: false,
        }
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    pub async fn start(&mut self) -> Result<(), SourceError> {
        if self.streaming {
            return Ok(());
        }
        if self.keywords.is_empty() {
            error!(
                event = events::SOURCE_START_FAILED,
                component = COMPONENT,
                err = %SourceError::NoKeywords,
                "refusing to open an unfiltered status stream"
            );
            return Err(SourceError::NoKeywords);
        }

        self.feed
            .filter(&self.keywords, self.listener.clone())
            .await
            .inspect_err(|err| {
                error!(
                    event = events::SOURCE_START_FAILED,
                    component = COMPONENT,
                    keywords = fields::format_keywords(&self.keywords).as_str(),
                    err = %err,
                    "unable to open status stream"
                );
            })?;

        self.streaming = true;
        info!(
            event = events::SOURCE_START,
            component = COMPONENT,
            keywords = fields::format_keywords(&self.keywords).as_str(),
            "started filtering status stream for keywords"
        );
        Ok(())
    }

    pub async fn stop(&mut self) {
        if !self.streaming {
            return;
        }
        info!(
            event = events::SOURCE_STOP,
            component = COMPONENT,
            "closing status stream"
        );
        self.feed.shutdown().await;
        self.streaming = false;
    }
}
