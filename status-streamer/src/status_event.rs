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

//! Status event model, its inbound wire shape and the outbound broker record.

use crate::error::SourceError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp layout used by the status feed, e.g. `Mon Oct 19 14:03:22 +0000 2026`.
pub const STATUS_DATE_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// One ingested status. Immutable once produced by a source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusEvent {
    pub id: i64,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
    pub text: String,
}

/// Inbound wire shape shared by the live feed and the synthetic generator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireStatus {
    #[serde(rename = "createdAt", alias = "created_at")]
    pub created_at: String,
    pub id: WireId,
    pub text: String,
    pub user: WireUser,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireUser {
    pub id: WireId,
}

/// Ids are stringified on the wire; some feeds send them as bare numbers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Text(String),
    Number(i64),
}

impl WireId {
    fn parse(&self, field: &str) -> Result<i64, SourceError> {
        match self {
            WireId::Number(value) => Ok(*value),
            WireId::Text(text) => text.trim().parse::<i64>().map_err(|e| {
                SourceError::MalformedPayload(format!("{field} `{text}` is not an integer: {e}"))
            }),
        }
    }
}

pub fn format_status_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(STATUS_DATE_FORMAT).to_string()
}

pub fn parse_status_timestamp(text: &str) -> Result<DateTime<Utc>, SourceError> {
    DateTime::parse_from_str(text.trim(), STATUS_DATE_FORMAT)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|e| SourceError::MalformedPayload(format!("createdAt `{text}`: {e}")))
}

impl StatusEvent {
    /// Parses one raw status payload as delivered by a feed.
    pub fn from_wire_json(raw: &str) -> Result<Self, SourceError> {
        let wire: WireStatus = serde_json::from_str(raw)
            .map_err(|e| SourceError::MalformedPayload(e.to_string()))?;
        Self::try_from(wire)
    }

    pub fn to_wire(&self) -> WireStatus {
        WireStatus {
            created_at: format_status_timestamp(&self.created_at),
            id: WireId::Text(self.id.to_string()),
            text: self.text.clone(),
            user: WireUser {
                id: WireId::Text(self.author_id.to_string()),
            },
        }
    }
}

impl TryFrom<WireStatus> for StatusEvent {
    type Error = SourceError;

    fn try_from(wire: WireStatus) -> Result<Self, Self::Error> {
        Ok(Self {
            id: wire.id.parse("id")?,
            author_id: wire.user.id.parse("user.id")?,
            created_at: parse_status_timestamp(&wire.created_at)?,
            text: wire.text,
        })
    }
}

/// Record layout published to the broker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRecord {
    pub user_id: i64,
    pub id: i64,
    pub text: String,
    /// Epoch milliseconds.
    pub created_at: i64,
}

impl From<&StatusEvent> for StatusRecord {
    fn from(status: &StatusEvent) -> Self {
        Self {
            user_id: status.author_id,
            id: status.id,
            text: status.text.clone(),
            created_at: status.created_at.timestamp_millis(),
        }
    }
}

/// Serialized status ready for the broker, keyed by author id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundMessage {
    pub key: i64,
    pub payload: Vec<u8>,
}

impl OutboundMessage {
    pub fn from_status(status: &StatusEvent) -> Result<Self, serde_json::Error> {
        Ok(Self {
            key: status.author_id,
            payload: encode_status(status)?,
        })
    }
}

/// Canonical payload encoding of a status.
pub fn encode_status(status: &StatusEvent) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&StatusRecord::from(status))
}
