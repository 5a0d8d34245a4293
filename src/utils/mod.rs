//! The `utils` module provides shared definitions used across `chatrelay`:
//! the error types returned by the broker and the store, and the tracing
//! subscriber setup.

pub mod error;
pub mod logging;

#[cfg(test)]
mod tests {
    use super::logging;

    #[test]
    fn logging_init_accepts_levels() {
        // Should not panic
        logging::init("info");
        logging::init("debug");
        logging::init("warn");
        logging::init("nonsense");
        logging::init_with_settings(&crate::config::LoggingSettings::default());
    }

    #[test]
    fn parse_level_falls_back_to_info() {
        assert_eq!(logging::parse_level("WARNING"), tracing::Level::WARN);
        assert_eq!(logging::parse_level("trace"), tracing::Level::TRACE);
        assert_eq!(logging::parse_level(""), tracing::Level::INFO);
    }
}
