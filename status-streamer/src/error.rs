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

//! Failure taxonomy shared by sources, publisher and orchestrator.

use thiserror::Error;

/// Readiness prerequisite failed. Fatal to pipeline startup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InitError {
    #[error("unable to provision topics {topics:?}: {reason}")]
    TopicProvisioning { topics: Vec<String>, reason: String },
    #[error("schema registry at {url} is unreachable: {reason}")]
    RegistryUnreachable { url: String, reason: String },
    #[error("initializer client error: {0}")]
    Client(String),
}

/// Event source failed to start or hit a fatal internal fault.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("keyword list is empty, nothing to filter or inject")]
    NoKeywords,
    #[error("invalid stream configuration: {0}")]
    InvalidConfig(String),
    #[error("unable to establish status feed connection: {0}")]
    Connection(String),
    #[error("status feed disconnected: {0}")]
    Disconnected(String),
    #[error("malformed status payload: {0}")]
    MalformedPayload(String),
    #[error("unable to spawn source worker: {0}")]
    WorkerSpawn(String),
}

/// One message failed to reach the broker. Terminal for that message only.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SendError {
    #[error("broker rejected message: {0}")]
    Broker(String),
    #[error("unable to enqueue message: {0}")]
    Enqueue(String),
    #[error("delivery outcome was dropped before completion")]
    Canceled,
    #[error("publisher is closed")]
    PublisherClosed,
    #[error("publisher has no broker client")]
    NotConnected,
}

/// Startup failures reported by [`crate::StatusStreamer`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StreamerError {
    #[error(transparent)]
    Init(#[from] InitError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("streamer was stopped and cannot be restarted")]
    Stopped,
}
