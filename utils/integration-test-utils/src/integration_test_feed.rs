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

use async_trait::async_trait;
use status_streamer::{SourceError, StatusEvent, StatusFeed, StatusListener};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::debug;

/// Feed double that replays raw wire lines once the filter is opened.
///
/// Lines that fail to parse are reported through `on_error`, the same way a
/// real feed client reports an undecodable frame.
#[derive(Default)]
pub struct ScriptedStatusFeed {
    lines: Vec<String>,
    connect_error: Option<SourceError>,
    disconnect_after: Option<String>,
    filter_calls: AtomicUsize,
    shutdown_calls: AtomicUsize,
    keywords: Mutex<Vec<String>>,
}

impl ScriptedStatusFeed {
    pub fn with_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn refusing(err: SourceError) -> Self {
        Self {
            connect_error: Some(err),
            ..Self::default()
        }
    }

    /// Reports a disconnect after the scripted lines are replayed.
    pub fn then_disconnect(mut self, reason: &str) -> Self {
        self.disconnect_after = Some(reason.to_string());
        self
    }

    pub fn filter_calls(&self) -> usize {
        self.filter_calls.load(Ordering::SeqCst)
    }

    pub fn shutdown_calls(&self) -> usize {
        self.shutdown_calls.load(Ordering::SeqCst)
    }

    pub fn filtered_keywords(&self) -> Vec<String> {
        self.keywords.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatusFeed for ScriptedStatusFeed {
    async fn filter(
        &self,
        keywords: &[String],
        listener: std::sync::Arc<dyn StatusListener>,
    ) -> Result<(), SourceError> {
        self.filter_calls.fetch_add(1, Ordering::SeqCst);
        *self.keywords.lock().unwrap() = keywords.to_vec();

        if let Some(err) = &self.connect_error {
            return Err(err.clone());
        }

        for line in &self.lines {
            match StatusEvent::from_wire_json(line) {
                Ok(status) => listener.on_status(status),
                Err(err) => {
                    debug!("scripted feed: skipping line: {err}");
                    listener.on_error(&err);
                }
            }
        }

        if let Some(reason) = &self.disconnect_after {
            listener.on_error(&SourceError::Disconnected(reason.clone()));
        }
        Ok(())
    }

    async fn shutdown(&self) {
        self.shutdown_calls.fetch_add(1, Ordering::SeqCst);
    }
}
