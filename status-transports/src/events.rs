//! Structured event names emitted by `status-transports`.

// Kafka producer.
pub(crate) const PRODUCER_CREATED: &str = "producer_created";
pub(crate) const PRODUCER_ENQUEUE_FAILED: &str = "producer_enqueue_failed";
pub(crate) const PRODUCER_FLUSH: &str = "producer_flush";
pub(crate) const PRODUCER_FLUSH_FAILED: &str = "producer_flush_failed";

// Initializer.
pub(crate) const TOPIC_CREATED: &str = "topic_created";
pub(crate) const TOPIC_EXISTS: &str = "topic_exists";
pub(crate) const TOPICS_VERIFIED: &str = "topics_verified";
pub(crate) const REGISTRY_REACHABLE: &str = "registry_reachable";
pub(crate) const RETRY_ATTEMPT_FAILED: &str = "retry_attempt_failed";
pub(crate) const RETRY_EXHAUSTED: &str = "retry_exhausted";

// HTTP feed.
pub(crate) const FEED_CONNECT: &str = "feed_connect";
pub(crate) const FEED_CONNECT_FAILED: &str = "feed_connect_failed";
pub(crate) const FEED_LINE_SKIPPED: &str = "feed_line_skipped";
pub(crate) const FEED_DISCONNECTED: &str = "feed_disconnected";
pub(crate) const FEED_RECONNECT: &str = "feed_reconnect";
pub(crate) const FEED_DEGRADED: &str = "feed_degraded";
pub(crate) const FEED_SHUTDOWN: &str = "feed_shutdown";
