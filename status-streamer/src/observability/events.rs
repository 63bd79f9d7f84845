//! Canonical structured event names used across `status-streamer`.

// Publisher events.
pub const PUBLISH_ATTEMPT: &str = "publish_attempt";
pub const PUBLISH_REJECTED: &str = "publish_rejected";
pub const DELIVERY_OK: &str = "delivery_ok";
pub const DELIVERY_FAILED: &str = "delivery_failed";
pub const PUBLISHER_CLOSE: &str = "publisher_close";
pub const PUBLISHER_CLOSE_SKIPPED: &str = "publisher_close_skipped";

// Listener events.
pub const STATUS_RECEIVE: &str = "status_receive";
pub const STATUS_ENCODE_FAILED: &str = "status_encode_failed";
pub const SOURCE_FAULT: &str = "source_fault";

// Source lifecycle events.
pub const SOURCE_START: &str = "source_start";
pub const SOURCE_START_FAILED: &str = "source_start_failed";
pub const SOURCE_STOP: &str = "source_stop";
pub const SYNTHETIC_CONSTRUCTION_FAILED: &str = "synthetic_construction_failed";
pub const SYNTHETIC_LOOP_CANCELLED: &str = "synthetic_loop_cancelled";

// Runtime events.
pub const RUNTIME_SPAWN_START: &str = "runtime_spawn_start";
pub const RUNTIME_SPAWN_OK: &str = "runtime_spawn_ok";
pub const RUNTIME_SPAWN_FAILED: &str = "runtime_spawn_failed";

// Orchestrator events.
pub const STREAMER_INIT_START: &str = "streamer_init_start";
pub const STREAMER_INIT_OK: &str = "streamer_init_ok";
pub const STREAMER_INIT_FAILED: &str = "streamer_init_failed";
pub const STREAMER_STOP: &str = "streamer_stop";
