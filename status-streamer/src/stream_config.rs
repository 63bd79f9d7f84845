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
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Process-wide streaming configuration, resolved once before startup.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct StreamConfig {
    #[serde(default)]
    pub enable_synthetic_mode: bool,
    pub keywords: Vec<String>,
    #[serde(default = "default_synthetic_min_length")]
    pub synthetic_min_length: usize,
    #[serde(default = "default_synthetic_max_length")]
    pub synthetic_max_length: usize,
    #[serde(default = "default_synthetic_delay_ms")]
    pub synthetic_delay_ms: u64,
    pub target_topics: Vec<String>,
}

fn default_synthetic_min_length() -> usize {
    5
}

fn default_synthetic_max_length() -> usize {
    15
}

fn default_synthetic_delay_ms() -> u64 {
    10_000
}

impl StreamConfig {
    /// Topic every transformed status is published on.
    pub fn publish_topic(&self) -> Option<&str> {
        self.target_topics.first().map(String::as_str)
    }

    pub fn synthetic_delay(&self) -> Duration {
        Duration::from_millis(self.synthetic_delay_ms)
    }

    /// Structural checks that do not depend on which source variant runs.
    pub fn validate(&self) -> Result<(), SourceError> {
        if self.target_topics.is_empty() {
            return Err(SourceError::InvalidConfig(
                "target_topics must name at least one topic".to_string(),
            ));
        }
        if let Some(position) = self
            .target_topics
            .iter()
            .position(|topic| topic.trim().is_empty())
        {
            return Err(SourceError::InvalidConfig(format!(
                "target_topics[{position}] is blank"
            )));
        }
        if self.synthetic_min_length == 0 {
            return Err(SourceError::InvalidConfig(
                "synthetic_min_length must be at least 1".to_string(),
            ));
        }
        if self.synthetic_min_length > self.synthetic_max_length {
            return Err(SourceError::InvalidConfig(format!(
                "synthetic_min_length ({}) exceeds synthetic_max_length ({})",
                self.synthetic_min_length, self.synthetic_max_length
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> StreamConfig {
        StreamConfig {
            enable_synthetic_mode: true,
            keywords: vec!["kafka".to_string()],
            synthetic_min_length: 2,
            synthetic_max_length: 4,
            synthetic_delay_ms: 0,
            target_topics: vec!["status-topic".to_string()],
        }
    }

    #[test]
    fn defaults_fill_synthetic_bounds() {
        let parsed: StreamConfig =
            serde_json::from_str(r#"{ "keywords": ["rust"], "target_topics": ["t"] }"#).unwrap();

        assert!(!parsed.enable_synthetic_mode);
        assert_eq!(parsed.synthetic_min_length, 5);
        assert_eq!(parsed.synthetic_max_length, 15);
        assert_eq!(parsed.synthetic_delay(), Duration::from_secs(10));
        assert_eq!(parsed.publish_topic(), Some("t"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let parsed: Result<StreamConfig, _> = serde_json::from_str(
            r#"{ "keywords": [], "target_topics": ["t"], "mock_sleep": 3 }"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn validate_accepts_equal_bounds() {
        let mut config = config();
        config.synthetic_max_length = config.synthetic_min_length;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_inverted_bounds() {
        let mut config = config();
        config.synthetic_min_length = 5;
        assert!(matches!(
            config.validate(),
            Err(SourceError::InvalidConfig(_))
        ));
    }

    #[test]
    fn validate_rejects_zero_min_length() {
        let mut config = config();
        config.synthetic_min_length = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_missing_topics() {
        let mut config = config();
        config.target_topics.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_blank_first_topic() {
        let mut config = config();
        config.target_topics = vec!["".to_string(), "statuses".to_string()];
        assert_eq!(
            config.validate(),
            Err(SourceError::InvalidConfig(
                "target_topics[0] is blank".to_string()
            ))
        );
    }

    #[test]
    fn validate_rejects_blank_trailing_topic() {
        let mut config = config();
        config.target_topics.push("  ".to_string());
        assert!(matches!(
            config.validate(),
            Err(SourceError::InvalidConfig(_))
        ));
    }
}
