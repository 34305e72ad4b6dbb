use uuid::Uuid;

/// Broker-level configuration.
///
/// Controls the response deadline and the in-process worker queue depth.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    /// Unique identifier for this broker instance, carried in log events.
    pub instance_id: String,
    /// Deadline for a pending request in milliseconds. A request with no
    /// matching response within this window rejects with `Timeout`.
    pub response_timeout_ms: u64,
    /// Bounded queue depth for the in-process worker context.
    pub worker_queue_capacity: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
            response_timeout_ms: 30_000,
            worker_queue_capacity: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_deadline_is_thirty_seconds() {
        let config = BrokerConfig::default();
        assert_eq!(config.response_timeout_ms, 30_000);
    }

    #[test]
    fn instance_ids_are_unique() {
        assert_ne!(
            BrokerConfig::default().instance_id,
            BrokerConfig::default().instance_id
        );
    }
}
