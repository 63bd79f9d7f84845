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

//! Pseudo-random status construction for the synthetic source.

use crate::error::SourceError;
use crate::status_event::{format_status_timestamp, WireId, WireStatus, WireUser};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const FILLER_PHRASES: [&str; 10] = [
    "Lorem ipsum dolor",
    "sit amet consectetur",
    "cold brew fixie letterpress",
    "small batch raw denim",
    "vinyl chambray kombucha",
    "sriracha tousled. Selvage flannel",
    "artisan lumbersexual pickled meditation",
    "heirloom tote bag pour-over brunch.",
    "Fanny pack street art before they sold out",
    "kale chips typewriter. Shoreditch vegan listicle.",
];

/// Body of one synthetic status, kept as its ordered segments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntheticBody {
    pub segments: Vec<String>,
    /// Position of the injected keyword within `segments`.
    pub keyword_position: usize,
}

impl SyntheticBody {
    pub fn keyword(&self) -> &str {
        &self.segments[self.keyword_position]
    }

    pub fn filler_count(&self) -> usize {
        self.segments.len() - 1
    }

    pub fn text(&self) -> String {
        self.segments.join(" ")
    }
}

/// Component-local status generator. Seed it for reproducible output.
pub struct StatusGenerator<R: Rng = StdRng> {
    keywords: Vec<String>,
    min_length: usize,
    max_length: usize,
    rng: R,
}

impl StatusGenerator<StdRng> {
    pub fn from_entropy(
        keywords: Vec<String>,
        min_length: usize,
        max_length: usize,
    ) -> Result<Self, SourceError> {
        Self::new(keywords, min_length, max_length, StdRng::from_entropy())
    }

    pub fn seeded(
        keywords: Vec<String>,
        min_length: usize,
        max_length: usize,
        seed: u64,
    ) -> Result<Self, SourceError> {
        Self::new(keywords, min_length, max_length, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> StatusGenerator<R> {
    pub fn new(
        keywords: Vec<String>,
        min_length: usize,
        max_length: usize,
        rng: R,
    ) -> Result<Self, SourceError> {
        if keywords.is_empty() {
            return Err(SourceError::NoKeywords);
        }
        if min_length == 0 || min_length > max_length {
            return Err(SourceError::InvalidConfig(format!(
                "synthetic length bounds [{min_length}, {max_length}] are not usable"
            )));
        }

        Ok(Self {
            keywords,
            min_length,
            max_length,
            rng,
        })
    }

    /// Uniform in `[min_length, max_length]`.
    pub fn next_length(&mut self) -> usize {
        self.rng.gen_range(self.min_length..=self.max_length)
    }

    /// `length` filler phrases with one keyword placed right after the filler
    /// at iteration `length / 2`.
    pub fn compose_body(&mut self, length: usize) -> SyntheticBody {
        // At least one filler so the keyword always has a slot.
        let length = length.max(1);
        let mut segments = Vec::with_capacity(length + 1);
        let mut keyword_position = 0;

        for i in 0..length {
            let filler = FILLER_PHRASES[self.rng.gen_range(0..FILLER_PHRASES.len())];
            segments.push(filler.to_string());
            if i == length / 2 {
                let keyword = &self.keywords[self.rng.gen_range(0..self.keywords.len())];
                keyword_position = segments.len();
                segments.push(keyword.clone());
            }
        }

        SyntheticBody {
            segments,
            keyword_position,
        }
    }

    fn next_id(&mut self) -> i64 {
        self.rng.gen_range(1..=i64::MAX)
    }

    /// Builds the next status in the same wire shape the live feed delivers.
    pub fn next_wire_status(&mut self, created_at: DateTime<Utc>) -> WireStatus {
        let length = self.next_length();
        let body = self.compose_body(length);

        WireStatus {
            created_at: format_status_timestamp(&created_at),
            id: WireId::Text(self.next_id().to_string()),
            text: body.text(),
            user: WireUser {
                id: WireId::Text(self.next_id().to_string()),
            },
        }
    }

    pub fn next_wire_json(&mut self) -> Result<String, SourceError> {
        let wire = self.next_wire_status(Utc::now());
        serde_json::to_string(&wire).map_err(|e| SourceError::MalformedPayload(e.to_string()))
    }
}
