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

//! Event sources: the live feed or the synthetic generator, chosen once from config.

pub mod generator;
pub mod live;
pub mod synthetic;

use crate::error::SourceError;
use crate::status_listener::StatusListener;
use crate::stream_config::StreamConfig;
use live::{LiveEventSource, StatusFeed};
use std::sync::Arc;
use synthetic::SyntheticEventSource;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Live,
    Synthetic,
}

/// The single producer of statuses for one pipeline.
pub enum EventSource {
    Live(LiveEventSource),
    Synthetic(SyntheticEventSource),
}

impl EventSource {
    /// Picks the variant from `enable_synthetic_mode`. Live mode needs a feed.
    pub fn from_config(
        config: Arc<StreamConfig>,
        feed: Option<Arc<dyn StatusFeed>>,
        listener: Arc<dyn StatusListener>,
    ) -> Result<Self, SourceError> {
        if config.enable_synthetic_mode {
            return Ok(EventSource::Synthetic(SyntheticEventSource::new(
                config, listener,
            )));
        }

        let feed = feed.ok_or_else(|| {
            SourceError::InvalidConfig(
                "live mode requires a status feed client".to_string(),
            )
        })?;
        Ok(EventSource::Live(LiveEventSource::new(
            feed,
            config.keywords.clone(),
            listener,
        )))
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            EventSource::Live(_) => SourceKind::Live,
            EventSource::Synthetic(_) => SourceKind::Synthetic,
        }
    }

    pub async fn start(&mut self) -> Result<(), SourceError> {
        match self {
            EventSource::Live(source) => source.start().await,
            EventSource::Synthetic(source) => source.start().await,
        }
    }

    pub async fn stop(&mut self) {
        match self {
            EventSource::Live(source) => source.stop().await,
            EventSource::Synthetic(source) => source.stop().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EventSource, SourceKind};
    use crate::error::SourceError;
    use crate::status_event::StatusEvent;
    use crate::status_listener::StatusListener;
    use crate::stream_config::StreamConfig;
    use std::sync::Arc;

    struct NullListener;

    impl StatusListener for NullListener {
        fn on_status(&self, _status: StatusEvent) {}

        fn on_error(&self, _err: &SourceError) {}
    }

    fn config(synthetic: bool) -> Arc<StreamConfig> {
        Arc::new(StreamConfig {
            enable_synthetic_mode: synthetic,
            keywords: vec!["kafka".to_string()],
            synthetic_min_length: 1,
            synthetic_max_length: 3,
            synthetic_delay_ms: 0,
            target_topics: vec!["status-topic".to_string()],
        })
    }

    #[test]
    fn synthetic_flag_selects_generator_without_feed() {
        let source = EventSource::from_config(config(true), None, Arc::new(NullListener)).unwrap();
        assert_eq!(source.kind(), SourceKind::Synthetic);
    }

    #[test]
    fn live_mode_without_feed_is_rejected() {
        let source = EventSource::from_config(config(false), None, Arc::new(NullListener));
        assert!(matches!(source, Err(SourceError::InvalidConfig(_))));
    }
}
