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

//! Shared field values and value-format helpers for structured logs.

use crate::status_event::OutboundMessage;

pub const NONE: &str = "none";
pub const REASON_CANCELLED: &str = "cancelled";
pub const REASON_ALREADY_CLOSED: &str = "already_closed";
pub const REASON_NEVER_CONNECTED: &str = "never_connected";
pub const DEFAULT_WORKER_THREAD: &str = "unknown-thread";

/// Payload bytes beyond this are elided from per-message log lines.
pub const MESSAGE_LOG_LIMIT: usize = 512;

/// Identity of the worker thread a log line was emitted from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WorkerContext {
    pub worker_id: String,
    pub worker_thread: String,
}

impl WorkerContext {
    pub fn with_current_thread(worker_id: impl Into<String>) -> Self {
        Self {
            worker_id: worker_id.into(),
            worker_thread: current_thread_name_or_default(),
        }
    }
}

pub fn thread_name_or_default(thread_name: Option<&str>) -> String {
    thread_name.unwrap_or(DEFAULT_WORKER_THREAD).to_string()
}

pub fn current_thread_name_or_default() -> String {
    thread_name_or_default(std::thread::current().name())
}

pub fn format_message(message: &OutboundMessage) -> String {
    let payload = String::from_utf8_lossy(&message.payload);
    if payload.len() <= MESSAGE_LOG_LIMIT {
        return format!("key={} payload={payload}", message.key);
    }

    let mut cut = MESSAGE_LOG_LIMIT;
    while !payload.is_char_boundary(cut) {
        cut -= 1;
    }
    format!(
        "key={} payload={}... ({} bytes)",
        message.key,
        &payload[..cut],
        message.payload.len()
    )
}

pub fn format_optional_timestamp(timestamp: Option<i64>) -> String {
    timestamp
        .map(|millis| millis.to_string())
        .unwrap_or_else(|| NONE.to_string())
}

pub fn format_keywords(keywords: &[String]) -> String {
    format!("[{}]", keywords.join(", "))
}
