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

use crate::error::InitError;
use async_trait::async_trait;

/// One-time readiness actions run before any event source starts.
///
/// Both operations must be idempotent: topics or schemas that already exist
/// count as ready.
#[async_trait]
pub trait StreamInitializer: Send + Sync {
    async fn ensure_topics_exist(&self) -> Result<(), InitError>;

    async fn check_registry_reachable(&self) -> Result<(), InitError>;
}
