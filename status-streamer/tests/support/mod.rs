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

use integration_test_utils::{RecordingBrokerClient, ScriptedInitializer};
use status_streamer::{AsyncPublisher, StatusFeed, StatusStreamer, StreamConfig};
use std::sync::Arc;

pub(crate) struct Pipeline {
    pub streamer: StatusStreamer,
    pub broker: RecordingBrokerClient,
    pub initializer: Arc<ScriptedInitializer>,
}

pub(crate) fn make_pipeline(
    name: &str,
    config: StreamConfig,
    initializer: ScriptedInitializer,
    feed: Option<Arc<dyn StatusFeed>>,
) -> Pipeline {
    let broker = RecordingBrokerClient::new();
    let initializer = Arc::new(initializer);
    let publisher = Arc::new(AsyncPublisher::new(
        Arc::new(broker.clone()),
        tokio::runtime::Handle::current(),
    ));

    let streamer = StatusStreamer::new(name, config, initializer.clone(), publisher, feed)
        .expect("streamer creation should succeed");

    Pipeline {
        streamer,
        broker,
        initializer,
    }
}
