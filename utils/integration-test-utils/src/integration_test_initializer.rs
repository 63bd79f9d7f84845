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
use status_streamer::{InitError, StreamInitializer};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Initializer double with scripted outcomes and call counters.
#[derive(Default)]
pub struct ScriptedInitializer {
    topics_error: Mutex<Option<InitError>>,
    registry_error: Mutex<Option<InitError>>,
    topic_calls: AtomicUsize,
    registry_calls: AtomicUsize,
}

impl ScriptedInitializer {
    pub fn ready() -> Self {
        Self::default()
    }

    pub fn failing_topics(err: InitError) -> Self {
        Self {
            topics_error: Mutex::new(Some(err)),
            ..Self::default()
        }
    }

    pub fn failing_registry(err: InitError) -> Self {
        Self {
            registry_error: Mutex::new(Some(err)),
            ..Self::default()
        }
    }

    pub fn topic_calls(&self) -> usize {
        self.topic_calls.load(Ordering::SeqCst)
    }

    pub fn registry_calls(&self) -> usize {
        self.registry_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StreamInitializer for ScriptedInitializer {
    async fn ensure_topics_exist(&self) -> Result<(), InitError> {
        self.topic_calls.fetch_add(1, Ordering::SeqCst);
        match self.topics_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn check_registry_reachable(&self) -> Result<(), InitError> {
        self.registry_calls.fetch_add(1, Ordering::SeqCst);
        match self.registry_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
