//! Timer service configuration.

use serde::{Deserialize, Serialize};

use crate::error::{TimerError, TimerResult};

/// Configuration for a [`TimerService`](crate::TimerService).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerServiceConfig {
    /// Name given to the dispatch worker thread.
    pub worker_thread_name: String,
    /// Maximum number of retired timer records kept for reuse.
    pub freelist_capacity: usize,
    /// Whether the service installs the OS timer-resolution controller for
    /// its lifetime.
    pub manage_timer_resolution: bool,
}

impl Default for TimerServiceConfig {
    fn default() -> Self {
        Self {
            worker_thread_name: "monotick-timer".to_string(),
            freelist_capacity: 256,
            manage_timer_resolution: true,
        }
    }
}

impl TimerServiceConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> TimerResult<()> {
        if self.worker_thread_name.is_empty() {
            return Err(TimerError::InvalidConfig(
                "worker_thread_name must not be empty",
            ));
        }
        if self.worker_thread_name.contains('\0') {
            return Err(TimerError::InvalidConfig(
                "worker_thread_name must not contain NUL",
            ));
        }
        Ok(())
    }

    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> TimerServiceConfigBuilder {
        TimerServiceConfigBuilder::default()
    }
}

/// Builder for [`TimerServiceConfig`].
#[derive(Debug, Default)]
pub struct TimerServiceConfigBuilder {
    config: TimerServiceConfig,
}

impl TimerServiceConfigBuilder {
    /// Set the worker thread name.
    #[must_use]
    pub fn worker_thread_name(mut self, name: impl Into<String>) -> Self {
        self.config.worker_thread_name = name.into();
        self
    }

    /// Set the retired-record retention cap.
    #[must_use]
    pub fn freelist_capacity(mut self, capacity: usize) -> Self {
        self.config.freelist_capacity = capacity;
        self
    }

    /// Enable or disable timer-resolution management.
    #[must_use]
    pub fn manage_timer_resolution(mut self, enabled: bool) -> Self {
        self.config.manage_timer_resolution = enabled;
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> TimerResult<TimerServiceConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = TimerServiceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.worker_thread_name, "monotick-timer");
        assert!(config.manage_timer_resolution);
    }

    #[test]
    fn test_builder() {
        let config = TimerServiceConfig::builder()
            .worker_thread_name("dispatch")
            .freelist_capacity(8)
            .manage_timer_resolution(false)
            .build()
            .expect("valid config");

        assert_eq!(config.worker_thread_name, "dispatch");
        assert_eq!(config.freelist_capacity, 8);
        assert!(!config.manage_timer_resolution);
    }

    #[test]
    fn test_empty_thread_name_rejected() {
        let result = TimerServiceConfig::builder().worker_thread_name("").build();
        assert!(matches!(result, Err(TimerError::InvalidConfig(_))));
    }

    #[test]
    fn test_nul_in_thread_name_rejected() {
        let result = TimerServiceConfig::builder()
            .worker_thread_name("bad\0name")
            .build();
        assert!(matches!(result, Err(TimerError::InvalidConfig(_))));
    }
}
