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

mod support;

use integration_test_utils::{live_config, wait_until, ScriptedInitializer, ScriptedStatusFeed};
use status_streamer::{
    encode_status, SourceError, StatusEvent, StatusFeed, StreamerError,
};
use std::sync::Arc;
use std::time::Duration;

const FIRST: &str = r#"{"createdAt":"Mon Oct 19 14:03:22 +0000 2026","id":"101","text":"learning kafka today","user":{"id":"7"}}"#;
const SECOND: &str = r#"{"created_at":"Mon Oct 19 14:03:25 +0000 2026","id":202,"text":"kafka streams and rust","user":{"id":9}}"#;
const BROKEN: &str = r#"{"createdAt":"yesterday","id":"303","text":"kafka","user":{"id":"7"}}"#;

#[tokio::test]
async fn feed_statuses_are_published_in_order() {
    integration_test_utils::init_logging();

    let feed = Arc::new(ScriptedStatusFeed::with_lines([FIRST, BROKEN, SECOND]));
    let feed_obj: Arc<dyn StatusFeed> = feed.clone();
    let mut pipeline = support::make_pipeline(
        "live",
        live_config(&["kafka", "rust"]),
        ScriptedInitializer::ready(),
        Some(feed_obj),
    );

    pipeline.streamer.start().await.unwrap();
    let broker = pipeline.broker.clone();
    assert!(wait_until(Duration::from_secs(5), || broker.send_count() == 2).await);

    let expected: Vec<StatusEvent> = [FIRST, SECOND]
        .iter()
        .map(|line| StatusEvent::from_wire_json(line).unwrap())
        .collect();
    let sends = pipeline.broker.sends();

    assert_eq!(feed.filtered_keywords(), vec!["kafka", "rust"]);
    assert_eq!(sends.len(), expected.len());
    for (send, status) in sends.iter().zip(expected.iter()) {
        assert_eq!(send.key, status.author_id);
        assert_eq!(send.payload, encode_status(status).unwrap());
    }

    pipeline.streamer.stop().await;
    assert_eq!(feed.shutdown_calls(), 1);
    assert_eq!(pipeline.broker.close_count(), 1);
}

#[tokio::test]
async fn refused_connection_is_surfaced_as_source_error() {
    integration_test_utils::init_logging();

    let feed = Arc::new(ScriptedStatusFeed::refusing(SourceError::Connection(
        "420 Enhance Your Calm".to_string(),
    )));
    let feed_obj: Arc<dyn StatusFeed> = feed.clone();
    let mut pipeline = support::make_pipeline(
        "live",
        live_config(&["kafka"]),
        ScriptedInitializer::ready(),
        Some(feed_obj),
    );

    let result = pipeline.streamer.start().await;

    assert!(matches!(
        result,
        Err(StreamerError::Source(SourceError::Connection(_)))
    ));
    assert_eq!(feed.filter_calls(), 1);
    assert_eq!(pipeline.broker.send_count(), 0);
}

#[tokio::test]
async fn disconnect_after_delivery_keeps_published_statuses() {
    integration_test_utils::init_logging();

    let feed = Arc::new(ScriptedStatusFeed::with_lines([FIRST]).then_disconnect("stream reset"));
    let feed_obj: Arc<dyn StatusFeed> = feed.clone();
    let mut pipeline = support::make_pipeline(
        "live",
        live_config(&["kafka"]),
        ScriptedInitializer::ready(),
        Some(feed_obj),
    );

    pipeline.streamer.start().await.unwrap();

    assert_eq!(pipeline.broker.send_count(), 1);
    pipeline.streamer.stop().await;
}
