use serde::Deserialize;

use crate::broker::Broker;

/// Top-level configuration settings for the application.
///
/// Includes settings for the broker, the message store and logging.
/// `Settings::default()` fills anything the sources leave out.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct Settings {
    pub broker: BrokerSettings,
    pub store: StoreSettings,
    pub logging: LoggingSettings,
}

/// Configuration settings for the broker.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BrokerSettings {
    /// Number of messages the ingestion queue holds before producers wait.
    pub queue_capacity: usize,
}

/// Configuration settings for the message store.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct StoreSettings {
    /// Oldest records are evicted past this count. `None` keeps everything.
    pub max_messages: Option<usize>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LoggingSettings {
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub broker: Option<PartialBrokerSettings>,
    pub store: Option<PartialStoreSettings>,
    pub logging: Option<PartialLoggingSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialBrokerSettings {
    pub queue_capacity: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct PartialStoreSettings {
    pub max_messages: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLoggingSettings {
    pub level: Option<String>,
}

impl Default for BrokerSettings {
    fn default() -> Self {
        Self {
            queue_capacity: Broker::DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl PartialSettings {
    /// Fill every missing value from `Settings::default()`.
    pub fn merge_with_defaults(self) -> Settings {
        let default = Settings::default();

        Settings {
            broker: BrokerSettings {
                queue_capacity: self
                    .broker
                    .as_ref()
                    .and_then(|b| b.queue_capacity)
                    .unwrap_or(default.broker.queue_capacity),
            },
            store: StoreSettings {
                max_messages: self
                    .store
                    .as_ref()
                    .and_then(|s| s.max_messages)
                    .or(default.store.max_messages),
            },
            logging: LoggingSettings {
                level: self
                    .logging
                    .and_then(|l| l.level)
                    .unwrap_or(default.logging.level),
            },
        }
    }
}
