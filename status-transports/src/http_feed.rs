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

//! Streaming HTTP client for a keyword-filtered status feed.
//!
//! The feed answers a `track=<keywords>` form POST with a long-lived response
//! carrying one JSON status per line. Blank lines are keep-alives.

use crate::events;
use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use status_streamer::{ReconnectPolicy, SourceError, StatusEvent, StatusFeed, StatusListener};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const COMPONENT: &str = "http_feed";

pub const DEFAULT_MAX_LINE_BYTES: usize = 1024 * 1024;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FeedConfig {
    pub url: String,
    #[serde(default)]
    pub bearer_token: Option<String>,
    /// Extra form parameters sent alongside `track`.
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Longest accepted status line; longer lines are dropped.
    #[serde(default = "default_max_line_bytes")]
    pub max_line_bytes: usize,
    #[serde(default)]
    pub reconnect: ReconnectPolicy,
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_max_line_bytes() -> usize {
    DEFAULT_MAX_LINE_BYTES
}

/// One newline-terminated unit read off the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedLine {
    /// Trimmed, non-blank line.
    Complete(String),
    /// Line over the length limit; only its size in bytes is kept.
    Oversized(usize),
}

/// Splits a byte stream into trimmed, non-blank lines of bounded length.
#[derive(Debug)]
pub struct LineBuffer {
    pending: Vec<u8>,
    max_line_bytes: usize,
    /// Set while skipping the remainder of an oversized line.
    discarded: Option<usize>,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_BYTES)
    }
}

impl LineBuffer {
    pub fn new(max_line_bytes: usize) -> Self {
        Self {
            pending: Vec::new(),
            max_line_bytes,
            discarded: None,
        }
    }

    /// Appends `chunk` and drains every line it completes.
    ///
    /// Each byte is scanned once. A partial line never holds more than
    /// `max_line_bytes` bytes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<FeedLine> {
        let mut lines = Vec::new();
        let mut rest = chunk;

        while let Some(end) = rest.iter().position(|byte| *byte == b'\n') {
            let line = &rest[..end];
            rest = &rest[end + 1..];

            let length = self.pending.len() + line.len() + self.discarded.take().unwrap_or(0);
            if length > self.max_line_bytes {
                self.pending.clear();
                lines.push(FeedLine::Oversized(length));
                continue;
            }

            self.pending.extend_from_slice(line);
            let text = String::from_utf8_lossy(&self.pending);
            let text = text.trim();
            if !text.is_empty() {
                lines.push(FeedLine::Complete(text.to_string()));
            }
            self.pending.clear();
        }

        self.hold(rest);
        lines
    }

    fn hold(&mut self, partial: &[u8]) {
        if let Some(discarded) = self.discarded.as_mut() {
            *discarded += partial.len();
        } else if self.pending.len() + partial.len() > self.max_line_bytes {
            self.discarded = Some(self.pending.len() + partial.len());
            self.pending.clear();
        } else {
            self.pending.extend_from_slice(partial);
        }
    }

    /// Bytes of a partial line still waiting for its terminator.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

struct FeedSession {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

#[derive(Clone)]
struct StreamContext {
    client: reqwest::Client,
    config: FeedConfig,
    keywords: Vec<String>,
    listener: Arc<dyn StatusListener>,
    cancel: CancellationToken,
}

///
/// [`HttpStatusFeed`] implements [`StatusFeed`] over `reqwest`.
///
/// `filter` returns once the feed accepted the request; the response body is
/// then read on a spawned task that pushes statuses to the listener. A dropped
/// stream is reported through `on_error` and then handled by the configured
/// [`ReconnectPolicy`].
///
pub struct HttpStatusFeed {
    config: FeedConfig,
    client: reqwest::Client,
    session: Mutex<Option<FeedSession>>,
}

impl HttpStatusFeed {
    pub fn new(config: FeedConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()
            .map_err(|err| SourceError::InvalidConfig(format!("feed client: {err}")))?;

        Ok(Self {
            config,
            client,
            session: Mutex::new(None),
        })
    }

    fn lock_session(&self) -> MutexGuard<'_, Option<FeedSession>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn connect(
    client: &reqwest::Client,
    config: &FeedConfig,
    keywords: &[String],
) -> Result<reqwest::Response, SourceError> {
    let mut form: Vec<(&str, String)> = vec![("track", keywords.join(","))];
    form.extend(
        config
            .params
            .iter()
            .map(|(key, value)| (key.as_str(), value.clone())),
    );

    let mut request = client.post(&config.url).form(&form);
    if let Some(token) = &config.bearer_token {
        request = request.bearer_auth(token);
    }

    let response = request
        .send()
        .await
        .map_err(|err| SourceError::Connection(err.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Connection(format!(
            "{} answered {status}",
            config.url
        )));
    }
    Ok(response)
}

fn dispatch_line(line: FeedLine, listener: &dyn StatusListener) {
    match line {
        FeedLine::Complete(line) => match StatusEvent::from_wire_json(&line) {
            Ok(status) => listener.on_status(status),
            Err(err) => warn!(
                event = events::FEED_LINE_SKIPPED,
                component = COMPONENT,
                err = %err,
                "skipping undecodable feed line"
            ),
        },
        FeedLine::Oversized(bytes) => warn!(
            event = events::FEED_LINE_SKIPPED,
            component = COMPONENT,
            bytes,
            "skipping oversized feed line"
        ),
    }
}

/// Reads one response body to its end. `None` means the stream was cancelled.
async fn pump(ctx: &StreamContext, response: reqwest::Response) -> Option<String> {
    let mut body = response.bytes_stream();
    let mut lines = LineBuffer::new(ctx.config.max_line_bytes);

    loop {
        let chunk = tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => return None,
            chunk = body.next() => chunk,
        };

        match chunk {
            None => return Some("stream closed by server".to_string()),
            Some(Err(err)) => return Some(err.to_string()),
            Some(Ok(bytes)) => {
                for line in lines.push(&bytes) {
                    dispatch_line(line, ctx.listener.as_ref());
                }
            }
        }
    }
}

async fn reconnect(ctx: &StreamContext) -> Option<reqwest::Response> {
    let mut attempt = 1;
    loop {
        let Some(delay) = ctx.config.reconnect.next_delay(attempt) else {
            error!(
                event = events::FEED_DEGRADED,
                component = COMPONENT,
                policy = ?ctx.config.reconnect,
                attempts = attempt - 1,
                "status stream is down; not reconnecting"
            );
            return None;
        };

        tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => return None,
            _ = tokio::time::sleep(delay) => {}
        }

        info!(
            event = events::FEED_RECONNECT,
            component = COMPONENT,
            attempt,
            "reconnecting status stream"
        );
        match connect(&ctx.client, &ctx.config, &ctx.keywords).await {
            Ok(response) => return Some(response),
            Err(err) => {
                warn!(
                    event = events::FEED_CONNECT_FAILED,
                    component = COMPONENT,
                    attempt,
                    err = %err,
                    "reconnect attempt failed"
                );
                attempt += 1;
            }
        }
    }
}

async fn run_stream(ctx: StreamContext, mut response: reqwest::Response) {
    loop {
        let Some(reason) = pump(&ctx, response).await else {
            debug!(
                event = events::FEED_SHUTDOWN,
                component = COMPONENT,
                "status stream cancelled"
            );
            return;
        };

        warn!(
            event = events::FEED_DISCONNECTED,
            component = COMPONENT,
            reason = reason.as_str(),
            "status stream disconnected"
        );
        ctx.listener.on_error(&SourceError::Disconnected(reason));

        match reconnect(&ctx).await {
            Some(next) => response = next,
            None => return,
        }
    }
}

#[async_trait]
impl StatusFeed for HttpStatusFeed {
    async fn filter(
        &self,
        keywords: &[String],
        listener: Arc<dyn StatusListener>,
    ) -> Result<(), SourceError> {
        self.shutdown().await;

        info!(
            event = events::FEED_CONNECT,
            component = COMPONENT,
            url = self.config.url.as_str(),
            keywords = keywords.join(",").as_str(),
            "opening status stream"
        );
        let response = connect(&self.client, &self.config, keywords)
            .await
            .inspect_err(|err| {
                error!(
                    event = events::FEED_CONNECT_FAILED,
                    component = COMPONENT,
                    url = self.config.url.as_str(),
                    err = %err,
                    "unable to open status stream"
                );
            })?;

        let cancel = CancellationToken::new();
        let ctx = StreamContext {
            client: self.client.clone(),
            config: self.config.clone(),
            keywords: keywords.to_vec(),
            listener,
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(run_stream(ctx, response));

        *self.lock_session() = Some(FeedSession { cancel, task });
        Ok(())
    }

    async fn shutdown(&self) {
        let Some(session) = self.lock_session().take() else {
            return;
        };

        info!(
            event = events::FEED_SHUTDOWN,
            component = COMPONENT,
            url = self.config.url.as_str(),
            "shutting down status stream"
        );
        session.cancel.cancel();
        let _ = session.task.await;
    }
}
