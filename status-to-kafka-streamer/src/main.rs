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

mod config;

use crate::config::Config;
use anyhow::{anyhow, Context};
use clap::Parser;
use status_streamer::{AsyncPublisher, StatusFeed, StatusStreamer};
use status_transports::{HttpStatusFeed, KafkaBrokerClient, KafkaStreamInitializer};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command()]
struct StreamerArgs {
    #[arg(short, long, value_name = "FILE")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init();

    info!("Started status-to-kafka-streamer");

    // Get the config file.
    let args = StreamerArgs::parse();
    let contents = std::fs::read_to_string(&args.config)
        .with_context(|| format!("Unable to read config file {}", args.config))?;
    let config = Config::from_json5(&contents)
        .with_context(|| format!("Unable to parse config file {}", args.config))?;

    // Build the broker-side clients.
    let broker = KafkaBrokerClient::new(&config.kafka_config)
        .context("Unable to create kafka producer")?;
    let initializer = KafkaStreamInitializer::new(
        &config.kafka_config,
        config.stream_config.target_topics.clone(),
        config.retry_config.clone(),
    )
    .context("Unable to create kafka stream initializer")?;
    let publisher = Arc::new(AsyncPublisher::new(
        Arc::new(broker),
        tokio::runtime::Handle::current(),
    ));

    // The live feed is only built when it will be used.
    let feed: Option<Arc<dyn StatusFeed>> = if config.stream_config.enable_synthetic_mode {
        None
    } else {
        let feed_config = config
            .feed_config
            .clone()
            .ok_or_else(|| anyhow!("feed_config is required when synthetic mode is off"))?;
        Some(Arc::new(
            HttpStatusFeed::new(feed_config).context("Unable to create status feed client")?,
        ))
    };

    let mut streamer = StatusStreamer::new(
        "status-to-kafka",
        config.stream_config,
        Arc::new(initializer),
        publisher.clone(),
        feed,
    )
    .context("Invalid stream configuration")?;

    streamer.start().await.context("Unable to start streamer")?;
    info!("{} running; press Ctrl-C to stop", streamer.name());

    tokio::signal::ctrl_c()
        .await
        .context("Unable to listen for shutdown signal")?;

    streamer.stop().await;
    let stats = publisher.stats();
    info!(
        accepted = stats.accepted(),
        delivered = stats.delivered(),
        failed = stats.failed(),
        rejected = stats.rejected(),
        "Stopped status-to-kafka-streamer"
    );

    Ok(())
}
