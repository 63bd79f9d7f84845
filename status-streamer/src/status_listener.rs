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

use crate::error::SourceError;
use crate::observability::{events, fields};
use crate::publisher::AsyncPublisher;
use crate::status_event::{OutboundMessage, StatusEvent};
use std::sync::Arc;
use tracing::{debug, error};

const COMPONENT: &str = "status_listener";

/// Receives statuses pushed by an event source.
///
/// Calls arrive in source order from a single source, possibly on a thread
/// owned by the source or its feed client. Implementations must not block.
pub trait StatusListener: Send + Sync {
    fn on_status(&self, status: StatusEvent);

    fn on_error(&self, err: &SourceError);
}

/// Maps each status to an [`OutboundMessage`] and hands it to the publisher.
#[derive(Clone)]
pub struct StatusKafkaListener {
    topic: String,
    publisher: Arc<AsyncPublisher>,
}

impl StatusKafkaListener {
    pub fn new(topic: &str, publisher: Arc<AsyncPublisher>) -> Self {
        Self {
            topic: topic.to_string(),
            publisher,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl StatusListener for StatusKafkaListener {
    fn on_status(&self, status: StatusEvent) {
        debug!(
            event = events::STATUS_RECEIVE,
            component = COMPONENT,
            topic = self.topic.as_str(),
            status_id = status.id,
            author_id = status.author_id,
            "received status"
        );

        let message = match OutboundMessage::from_status(&status) {
            Ok(message) => message,
            Err(err) => {
                error!(
                    event = events::STATUS_ENCODE_FAILED,
                    component = COMPONENT,
                    topic = self.topic.as_str(),
                    status_id = status.id,
                    text = status.text.as_str(),
                    err = %err,
                    "unable to encode status"
                );
                return;
            }
        };

        // Rejections are reported by the publisher itself.
        if self.publisher.send(&self.topic, message).is_err() {
            debug!(
                event = events::PUBLISH_REJECTED,
                component = COMPONENT,
                topic = self.topic.as_str(),
                status_id = status.id,
                "status was not dispatched"
            );
        }
    }

    fn on_error(&self, err: &SourceError) {
        error!(
            event = events::SOURCE_FAULT,
            component = COMPONENT,
            topic = self.topic.as_str(),
            err = %err,
            reason = fields::NONE,
            "status source reported a fault"
        );
    }
}
