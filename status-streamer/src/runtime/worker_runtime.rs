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

//! Runtime helper for spawning source generation loops on a dedicated thread.

use crate::observability::{events, fields};
use std::future::Future;
use std::io;
use std::thread;
use tokio::runtime::Builder;
use tracing::{debug, error, warn};

pub(crate) const DEFAULT_SOURCE_RUNTIME_THREAD_NAME: &str = "status-source-runtime";
const COMPONENT: &str = "worker_runtime";

/// Handle to one dedicated worker thread running a current-thread runtime.
pub(crate) struct SourceLoopHandle {
    worker_thread: String,
    join_handle: thread::JoinHandle<()>,
}

impl SourceLoopHandle {
    pub(crate) fn worker_thread(&self) -> &str {
        &self.worker_thread
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.join_handle.is_finished()
    }

    /// Waits for the loop to return. The loop must already have been told to stop.
    pub(crate) fn join(self) {
        if self.join_handle.join().is_err() {
            warn!(
                event = events::SOURCE_STOP,
                component = COMPONENT,
                worker_thread = self.worker_thread.as_str(),
                "source worker thread panicked"
            );
        }
    }
}

pub(crate) fn spawn_source_loop<F, Fut>(
    thread_name: String,
    run_loop: F,
) -> io::Result<SourceLoopHandle>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + 'static,
{
    let worker_thread = if thread_name.is_empty() {
        DEFAULT_SOURCE_RUNTIME_THREAD_NAME.to_string()
    } else {
        thread_name
    };

    debug!(
        event = events::RUNTIME_SPAWN_START,
        component = COMPONENT,
        worker_thread = worker_thread.as_str(),
        "spawning source runtime thread"
    );

    let thread_label = worker_thread.clone();
    let join_handle = thread::Builder::new()
        .name(worker_thread.clone())
        .spawn(move || {
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    error!(
                        event = events::RUNTIME_SPAWN_FAILED,
                        component = COMPONENT,
                        worker_thread = thread_label.as_str(),
                        err = %err,
                        "unable to build source runtime"
                    );
                    return;
                }
            };

            runtime.block_on(run_loop());
        })
        .inspect_err(|err| {
            error!(
                event = events::RUNTIME_SPAWN_FAILED,
                component = COMPONENT,
                worker_thread = worker_thread.as_str(),
                err = %err,
                "unable to spawn source runtime thread"
            );
        })?;

    debug!(
        event = events::RUNTIME_SPAWN_OK,
        component = COMPONENT,
        worker_thread = worker_thread.as_str(),
        "source runtime thread spawned"
    );

    Ok(SourceLoopHandle {
        worker_thread: fields::thread_name_or_default(Some(&worker_thread)),
        join_handle,
    })
}

#[cfg(test)]
mod tests {
    use super::{spawn_source_loop, DEFAULT_SOURCE_RUNTIME_THREAD_NAME};
    use std::sync::mpsc;

    #[test]
    fn loop_runs_on_named_thread() {
        let (tx, rx) = mpsc::channel();
        let handle = spawn_source_loop("status-gen-test".to_string(), move || async move {
            let name = std::thread::current().name().map(str::to_string);
            tx.send(name).expect("test receiver should be alive");
        })
        .expect("worker thread should spawn");

        assert_eq!(handle.worker_thread(), "status-gen-test");
        assert_eq!(rx.recv().unwrap().as_deref(), Some("status-gen-test"));
        handle.join();
    }

    #[test]
    fn empty_name_falls_back_to_default() {
        let handle = spawn_source_loop(String::new(), || async {}).expect("worker thread should spawn");

        assert_eq!(handle.worker_thread(), DEFAULT_SOURCE_RUNTIME_THREAD_NAME);
        handle.join();
    }

    #[test]
    fn loop_can_use_tokio_timers() {
        let handle = spawn_source_loop("status-gen-timer".to_string(), || async {
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        })
        .expect("worker thread should spawn");

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while !handle.is_finished() && std::time::Instant::now() < deadline {
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
        assert!(handle.is_finished());
        handle.join();
    }
}
