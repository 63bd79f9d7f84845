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

//! Synthetic event source that fabricates keyword-bearing statuses on a timer.

use crate::error::SourceError;
use crate::observability::events;
use crate::observability::fields::{self, WorkerContext};
use crate::runtime::worker_runtime::{
    spawn_source_loop, SourceLoopHandle, DEFAULT_SOURCE_RUNTIME_THREAD_NAME,
};
use crate::source::generator::StatusGenerator;
use crate::status_event::StatusEvent;
use crate::status_listener::StatusListener;
use crate::stream_config::StreamConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use uuid::Uuid;

const SYNTHETIC_THREAD_NAME_PREFIX: &str = "status-gen-";
const SYNTHETIC_THREAD_NAME_MAX_LEN: usize = 15;
const COMPONENT: &str = "synthetic_source";

/// Produces the raw wire payload for the next status.
type WireSource = Box<dyn FnMut() -> Result<String, SourceError> + Send + Sync>;

/// Emits one generated status per `synthetic_delay_ms` until stopped.
pub struct SyntheticEventSource {
    config: Arc<StreamConfig>,
    listener: Arc<dyn StatusListener>,
    seed: Option<u64>,
    wire_source: Option<WireSource>,
    cancel: CancellationToken,
    worker: Option<SourceLoopHandle>,
    worker_id: String,
}

impl SyntheticEventSource {
    pub fn new(config: Arc<StreamConfig>, listener: Arc<dyn StatusListener>) -> Self {
        Self {
            config,
            listener,
            seed: None,
            wire_source: None,
            cancel: CancellationToken::new(),
            worker: None,
            worker_id: Uuid::new_v4().hyphenated().to_string(),
        }
    }

    /// Makes the generated sequence reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replaces the generator for the next `start`.
    #[cfg(test)]
    pub(crate) fn with_wire_source<F>(mut self, wire_source: F) -> Self
    where
        F: FnMut() -> Result<String, SourceError> + Send + Sync + 'static,
    {
        self.wire_source = Some(Box::new(wire_source));
        self
    }

    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    /// True while the generation loop is alive.
    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.is_finished())
    }

    fn build_thread_name(worker_id: &str) -> String {
        let suffix_len = SYNTHETIC_THREAD_NAME_MAX_LEN - SYNTHETIC_THREAD_NAME_PREFIX.len();
        let suffix: String = worker_id
            .chars()
            .filter(|ch| ch.is_ascii_hexdigit())
            .take(suffix_len)
            .collect();

        if suffix.len() == suffix_len {
            format!("{SYNTHETIC_THREAD_NAME_PREFIX}{suffix}")
        } else {
            DEFAULT_SOURCE_RUNTIME_THREAD_NAME.to_string()
        }
    }

    fn build_wire_source(&mut self) -> Result<WireSource, SourceError> {
        if self.config.keywords.is_empty() {
            return Err(SourceError::NoKeywords);
        }
        if let Some(wire_source) = self.wire_source.take() {
            return Ok(wire_source);
        }

        let keywords = self.config.keywords.clone();
        let min_length = self.config.synthetic_min_length;
        let max_length = self.config.synthetic_max_length;
        let mut generator = match self.seed {
            Some(seed) => StatusGenerator::seeded(keywords, min_length, max_length, seed),
            None => StatusGenerator::from_entropy(keywords, min_length, max_length),
        }?;
        Ok(Box::new(move || generator.next_wire_json()))
    }

    pub async fn start(&mut self) -> Result<(), SourceError> {
        if self.is_running() {
            return Ok(());
        }
        // A loop that ended on its own leaves a finished handle behind.
        if let Some(worker) = self.worker.take() {
            worker.join();
        }

        let prepared = self
            .config
            .validate()
            .and_then(|()| self.build_wire_source());
        let next_wire = prepared.inspect_err(|err| {
            error!(
                event = events::SOURCE_START_FAILED,
                component = COMPONENT,
                worker_id = self.worker_id.as_str(),
                err = %err,
                "synthetic source configuration rejected"
            );
        })?;

        info!(
            event = events::SOURCE_START,
            component = COMPONENT,
            worker_id = self.worker_id.as_str(),
            keywords = fields::format_keywords(&self.config.keywords).as_str(),
            delay_ms = self.config.synthetic_delay_ms,
            "starting synthetic status stream"
        );

        self.cancel = CancellationToken::new();
        let cancel = self.cancel.clone();
        let listener = self.listener.clone();
        let delay = self.config.synthetic_delay();
        let worker_id = self.worker_id.clone();

        let worker = spawn_source_loop(Self::build_thread_name(&self.worker_id), move || {
            Self::generation_loop(worker_id, next_wire, listener, delay, cancel)
        })
        .map_err(|err| SourceError::WorkerSpawn(err.to_string()))?;

        self.worker = Some(worker);
        Ok(())
    }

    async fn generation_loop(
        worker_id: String,
        mut next_wire: WireSource,
        listener: Arc<dyn StatusListener>,
        delay: Duration,
        cancel: CancellationToken,
    ) {
        let worker_context = WorkerContext::with_current_thread(worker_id);

        while !cancel.is_cancelled() {
            let status = match next_wire().and_then(|raw| StatusEvent::from_wire_json(&raw)) {
                Ok(status) => status,
                Err(err) => {
                    error!(
                        event = events::SYNTHETIC_CONSTRUCTION_FAILED,
                        component = COMPONENT,
                        worker_id = worker_context.worker_id.as_str(),
                        worker_thread = worker_context.worker_thread.as_str(),
                        err = %err,
                        "unable to construct synthetic status; stopping generation"
                    );
                    listener.on_error(&err);
                    break;
                }
            };

            listener.on_status(status);

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(
                        event = events::SYNTHETIC_LOOP_CANCELLED,
                        component = COMPONENT,
                        worker_id = worker_context.worker_id.as_str(),
                        worker_thread = worker_context.worker_thread.as_str(),
                        reason = fields::REASON_CANCELLED,
                        "synthetic generation cancelled"
                    );
                    break;
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// Cancels the generation loop and waits for its thread to exit.
    pub async fn stop(&mut self) {
        self.cancel.cancel();
        let Some(worker) = self.worker.take() else {
            return;
        };

        info!(
            event = events::SOURCE_STOP,
            component = COMPONENT,
            worker_id = self.worker_id.as_str(),
            worker_thread = worker.worker_thread(),
            "stopping synthetic status stream"
        );
        // The loop wakes on cancellation, so the join is short.
        let _ = tokio::task::spawn_blocking(move || worker.join()).await;
    }
}

impl Drop for SyntheticEventSource {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::SyntheticEventSource;
    use crate::error::SourceError;
    use crate::source::generator::StatusGenerator;
    use crate::status_event::StatusEvent;
    use crate::status_listener::StatusListener;
    use crate::stream_config::StreamConfig;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Default)]
    struct CollectingListener {
        statuses: Mutex<Vec<StatusEvent>>,
        errors: Mutex<Vec<SourceError>>,
    }

    impl CollectingListener {
        fn status_count(&self) -> usize {
            self.statuses.lock().unwrap().len()
        }
    }

    impl StatusListener for CollectingListener {
        fn on_status(&self, status: StatusEvent) {
            self.statuses.lock().unwrap().push(status);
        }

        fn on_error(&self, err: &SourceError) {
            self.errors.lock().unwrap().push(err.clone());
        }
    }

    fn config(keywords: &[&str], delay_ms: u64) -> Arc<StreamConfig> {
        Arc::new(StreamConfig {
            enable_synthetic_mode: true,
            keywords: keywords.iter().map(|word| word.to_string()).collect(),
            synthetic_min_length: 2,
            synthetic_max_length: 2,
            synthetic_delay_ms: delay_ms,
            target_topics: vec!["status-topic".to_string()],
        })
    }

    async fn wait_for<F: Fn() -> bool>(condition: F) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while !condition() && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    #[test]
    fn thread_name_fits_platform_limit() {
        let name = SyntheticEventSource::build_thread_name("0a1b2c3d-4e5f-6789-abcd-ef0123456789");
        assert_eq!(name, "status-gen-0a1b");
        assert!(name.len() <= 15);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn emits_keyword_statuses_until_stopped() {
        let listener = Arc::new(CollectingListener::default());
        let mut source =
            SyntheticEventSource::new(config(&["kafka"], 0), listener.clone()).with_seed(17);

        source.start().await.unwrap();
        wait_for(|| listener.status_count() >= 3).await;
        source.stop().await;

        let emitted = listener.status_count();
        assert!(emitted >= 3);
        assert!(!source.is_running());
        for status in listener.statuses.lock().unwrap().iter() {
            assert_eq!(status.text.matches("kafka").count(), 1);
        }

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(listener.status_count(), emitted);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn stop_interrupts_long_delay() {
        let listener = Arc::new(CollectingListener::default());
        let mut source = SyntheticEventSource::new(config(&["kafka"], 60_000), listener.clone());

        source.start().await.unwrap();
        wait_for(|| listener.status_count() == 1).await;

        let stopped = tokio::time::timeout(Duration::from_secs(5), source.stop()).await;
        assert!(stopped.is_ok());
        assert_eq!(listener.status_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn start_is_idempotent_while_running() {
        let listener = Arc::new(CollectingListener::default());
        let mut source = SyntheticEventSource::new(config(&["kafka"], 60_000), listener.clone());

        source.start().await.unwrap();
        source.start().await.unwrap();
        wait_for(|| listener.status_count() >= 1).await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(listener.status_count(), 1);
        source.stop().await;
    }

    #[tokio::test]
    async fn empty_keywords_fail_start() {
        let listener = Arc::new(CollectingListener::default());
        let mut source = SyntheticEventSource::new(config(&[], 0), listener.clone());

        assert_eq!(source.start().await, Err(SourceError::NoKeywords));
        assert!(!source.is_running());
        assert_eq!(listener.status_count(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn construction_error_ends_worker_only() {
        let listener = Arc::new(CollectingListener::default());
        let mut generator =
            StatusGenerator::seeded(vec!["kafka".to_string()], 2, 2, 5).unwrap();
        let mut produced = 0;
        let mut source = SyntheticEventSource::new(config(&["kafka"], 0), listener.clone())
            .with_wire_source(move || {
                produced += 1;
                if produced == 1 {
                    generator.next_wire_json()
                } else {
                    Ok(r#"{"createdAt":"Mon Oct 19 14:03:22 +0000 2026","id":"#.to_string())
                }
            });

        source.start().await.unwrap();
        wait_for(|| !source.is_running()).await;

        assert!(!source.is_running());
        assert_eq!(listener.status_count(), 1);
        assert!(matches!(
            listener.errors.lock().unwrap().as_slice(),
            [SourceError::MalformedPayload(_)]
        ));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(listener.status_count(), 1);
        source.stop().await;
    }

    #[tokio::test]
    async fn stop_without_start_is_a_noop() {
        let listener = Arc::new(CollectingListener::default());
        let mut source = SyntheticEventSource::new(config(&["kafka"], 0), listener);

        source.stop().await;
        assert!(!source.is_running());
    }
}
