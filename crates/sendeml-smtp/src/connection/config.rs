//! Session configuration types.

use std::time::Duration;

/// Per-session settings that are not part of the SMTP dialogue itself.
///
/// Each session owns its copy; concurrent sessions never share one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Hostname announced with EHLO.
    pub client_hostname: String,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Maximum wait for each reply line.
    pub read_timeout: Duration,
    /// Worker identifier prefixed to trace lines when sessions run in parallel.
    pub worker_id: Option<usize>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            client_hostname: "localhost".to_string(),
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(1),
            worker_id: None,
        }
    }
}

impl SessionConfig {
    /// Creates a configuration builder.
    #[must_use]
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }

    /// Returns the prefix for trace lines: `id: N, ` or nothing.
    #[must_use]
    pub fn trace_prefix(&self) -> String {
        self.worker_id
            .map_or_else(String::new, |id| format!("id: {id}, "))
    }

    /// Returns a copy of this configuration tagged with `worker_id`.
    #[must_use]
    pub fn for_worker(&self, worker_id: usize) -> Self {
        Self {
            worker_id: Some(worker_id),
            ..self.clone()
        }
    }
}

/// Builder for session configuration.
#[derive(Debug, Clone, Default)]
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    /// Sets the hostname announced with EHLO.
    #[must_use]
    pub fn client_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.config.client_hostname = hostname.into();
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Sets the reply read timeout.
    #[must_use]
    pub const fn read_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_timeout = timeout;
        self
    }

    /// Sets the worker identifier.
    #[must_use]
    pub const fn worker_id(mut self, id: usize) -> Self {
        self.config.worker_id = Some(id);
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> SessionConfig {
        self.config
    }
}
