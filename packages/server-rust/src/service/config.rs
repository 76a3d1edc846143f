/// Default name of the counter that issues worker ids.
pub const DEFAULT_SEQUENCE_NAME: &str = "workers_sequence";

/// Settings for the registration service and its middleware.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Counter that worker ids are allocated from.
    pub sequence_name: String,
    /// Operations admitted at once before new ones are shed.
    pub max_concurrent_operations: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            sequence_name: DEFAULT_SEQUENCE_NAME.to_string(),
            max_concurrent_operations: 1000,
        }
    }
}
