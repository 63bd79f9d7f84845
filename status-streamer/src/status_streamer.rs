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

//! Pipeline orchestrator: readiness checks first, then exactly one source.

use crate::error::{SourceError, StreamerError};
use crate::initializer::StreamInitializer;
use crate::observability::{events, fields};
use crate::publisher::AsyncPublisher;
use crate::source::live::StatusFeed;
use crate::source::{EventSource, SourceKind};
use crate::status_listener::StatusKafkaListener;
use crate::stream_config::StreamConfig;
use std::sync::Arc;
use tracing::{error, info};

const STATUS_STREAMER_TAG: &str = "StatusStreamer";
const COMPONENT: &str = "status_streamer";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Lifecycle {
    Idle,
    Running,
    Stopped,
}

///
/// [`StatusStreamer`] wires a [`StreamInitializer`], one [`EventSource`] and
/// the [`AsyncPublisher`] into a single pipeline.
///
/// `start` provisions topics and checks the schema registry before the source
/// is started; a failed prerequisite leaves the source untouched. `stop`
/// stops the source and then closes the publisher. Both are idempotent.
///
pub struct StatusStreamer {
    name: String,
    config: Arc<StreamConfig>,
    initializer: Arc<dyn StreamInitializer>,
    source: EventSource,
    publisher: Arc<AsyncPublisher>,
    lifecycle: Lifecycle,
}

impl StatusStreamer {
    /// Builds the listener and the source variant selected by `config`.
    ///
    /// `feed` is only consulted in live mode.
    pub fn new(
        name: &str,
        config: StreamConfig,
        initializer: Arc<dyn StreamInitializer>,
        publisher: Arc<AsyncPublisher>,
        feed: Option<Arc<dyn StatusFeed>>,
    ) -> Result<Self, SourceError> {
        config.validate()?;
        let config = Arc::new(config);
        let topic = config.publish_topic().ok_or_else(|| {
            SourceError::InvalidConfig("target_topics must name at least one topic".to_string())
        })?;

        let listener = Arc::new(StatusKafkaListener::new(topic, publisher.clone()));
        let source = EventSource::from_config(config.clone(), feed, listener)?;

        Ok(Self::from_parts(name, config, initializer, source, publisher))
    }

    /// Assembles a streamer from an already built source.
    pub fn from_parts(
        name: &str,
        config: Arc<StreamConfig>,
        initializer: Arc<dyn StreamInitializer>,
        source: EventSource,
        publisher: Arc<AsyncPublisher>,
    ) -> Self {
        Self {
            name: format!("{STATUS_STREAMER_TAG}:{name}"),
            config,
            initializer,
            source,
            publisher,
            lifecycle: Lifecycle::Idle,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source_kind(&self) -> SourceKind {
        self.source.kind()
    }

    pub fn publisher(&self) -> Arc<AsyncPublisher> {
        self.publisher.clone()
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }

    pub async fn start(&mut self) -> Result<(), StreamerError> {
        match self.lifecycle {
            Lifecycle::Running => return Ok(()),
            Lifecycle::Stopped => return Err(StreamerError::Stopped),
            Lifecycle::Idle => {}
        }

        info!(
            event = events::STREAMER_INIT_START,
            component = COMPONENT,
            streamer = self.name.as_str(),
            topics = fields::format_keywords(&self.config.target_topics).as_str(),
            "running readiness checks"
        );

        let readiness = async {
            self.initializer.ensure_topics_exist().await?;
            self.initializer.check_registry_reachable().await
        };
        if let Err(err) = readiness.await {
            error!(
                event = events::STREAMER_INIT_FAILED,
                component = COMPONENT,
                streamer = self.name.as_str(),
                err = %err,
                "readiness checks failed; source not started"
            );
            return Err(err.into());
        }

        info!(
            event = events::STREAMER_INIT_OK,
            component = COMPONENT,
            streamer = self.name.as_str(),
            "topics ready for operations"
        );

        self.source.start().await?;
        self.lifecycle = Lifecycle::Running;
        Ok(())
    }

    pub async fn stop(&mut self) {
        if self.lifecycle == Lifecycle::Stopped {
            return;
        }

        info!(
            event = events::STREAMER_STOP,
            component = COMPONENT,
            streamer = self.name.as_str(),
            in_flight = self.publisher.stats().in_flight(),
            "stopping streamer"
        );
        self.source.stop().await;
        self.publisher.close();
        self.lifecycle = Lifecycle::Stopped;
    }
}
