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

mod integration_test_broker;
pub use integration_test_broker::{RecordedSend, RecordingBrokerClient};
mod integration_test_initializer;
pub use integration_test_initializer::ScriptedInitializer;
mod integration_test_listeners;
pub use integration_test_listeners::RecordingStatusListener;
mod integration_test_feed;
pub use integration_test_feed::ScriptedStatusFeed;
mod integration_test_utils;
pub use integration_test_utils::{init_logging, live_config, synthetic_config, wait_until};
