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

//! # status-streamer
//!
//! `status-streamer` ingests short keyword-bearing text statuses and republishes
//! each one, keyed by its author, on a message-broker topic.
//!
//! Statuses come from exactly one [`EventSource`]: a live keyword-filtered feed
//! behind the [`StatusFeed`] trait, or a synthetic generator that fabricates
//! statuses on a timer. Each status is handed to a [`StatusKafkaListener`],
//! encoded as a [`StatusRecord`] and sent through the [`AsyncPublisher`],
//! which reports broker acknowledgments without blocking the source.
//!
//! The broker and the readiness prerequisites sit behind the
//! [`BrokerClient`] and [`StreamInitializer`] traits; concrete clients live in
//! `status-transports`.
//!
//! ## Synthetic Mode
//!
//! ```
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use status_streamer::{
//!     ready_delivery, AsyncPublisher, BrokerClient, DeliveryFuture, InitError, SendError,
//!     StatusStreamer, StreamConfig, StreamInitializer,
//! };
//!
//! struct Ready;
//!
//! #[async_trait]
//! impl StreamInitializer for Ready {
//!     async fn ensure_topics_exist(&self) -> Result<(), InitError> { Ok(()) }
//!     async fn check_registry_reachable(&self) -> Result<(), InitError> { Ok(()) }
//! }
//!
//! struct Discard;
//!
//! impl BrokerClient for Discard {
//!     fn send_async(&self, _topic: &str, _key: i64, _payload: &[u8]) -> DeliveryFuture {
//!         ready_delivery(Err(SendError::Canceled))
//!     }
//!     fn close(&self) {}
//! }
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let config = StreamConfig {
//!     enable_synthetic_mode: true,
//!     keywords: vec!["kafka".to_string()],
//!     synthetic_min_length: 2,
//!     synthetic_max_length: 4,
//!     synthetic_delay_ms: 100,
//!     target_topics: vec!["statuses".to_string()],
//! };
//! let publisher = Arc::new(AsyncPublisher::new(
//!     Arc::new(Discard),
//!     tokio::runtime::Handle::current(),
//! ));
//! let mut streamer =
//!     StatusStreamer::new("quick-start", config, Arc::new(Ready), publisher, None).unwrap();
//!
//! streamer.start().await.unwrap();
//! streamer.stop().await;
//! # });
//! ```

mod broker;
mod error;
mod initializer;
pub mod observability;
mod publisher;
mod runtime;
pub mod source;
mod status_event;
mod status_listener;
mod status_streamer;
mod stream_config;

pub use broker::{BrokerClient, DeliveryFuture, DeliveryResult};
pub use error::{InitError, SendError, SourceError, StreamerError};
pub use initializer::StreamInitializer;
pub use publisher::{ready_delivery, AsyncPublisher, DeliveryStats};
pub use source::generator::StatusGenerator;
pub use source::live::{LiveEventSource, ReconnectPolicy, StatusFeed};
pub use source::synthetic::SyntheticEventSource;
pub use source::{EventSource, SourceKind};
pub use status_event::{
    encode_status, format_status_timestamp, parse_status_timestamp, OutboundMessage,
    StatusEvent, StatusRecord, WireId, WireStatus, WireUser, STATUS_DATE_FORMAT,
};
pub use status_listener::{StatusKafkaListener, StatusListener};
pub use status_streamer::StatusStreamer;
pub use stream_config::StreamConfig;
