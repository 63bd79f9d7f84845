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

use status_streamer::{SourceError, StatusEvent, StatusListener};
use std::sync::{Arc, Mutex};
use tracing::debug;

#[derive(Clone, Default)]
pub struct RecordingStatusListener {
    status_store: Arc<Mutex<Vec<StatusEvent>>>,
    error_store: Arc<Mutex<Vec<SourceError>>>,
}

impl RecordingStatusListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statuses(&self) -> Vec<StatusEvent> {
        self.status_store.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<SourceError> {
        self.error_store.lock().unwrap().clone()
    }
}

impl StatusListener for RecordingStatusListener {
    fn on_status(&self, status: StatusEvent) {
        debug!("within recording_status_listener! status: {:?}", status);
        self.status_store.lock().unwrap().push(status);
    }

    fn on_error(&self, err: &SourceError) {
        debug!("within recording_status_listener! err: {:?}", err);
        self.error_store.lock().unwrap().push(err.clone());
    }
}
