//! Host session configuration

/// Configuration for the host session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioConfig {
    /// Client name requested from the server (the server may rename it)
    pub client_name: String,

    /// Let the client library start a server if none is running
    ///
    /// Off by default: a measurement run against an unexpected server
    /// configuration is worse than no run at all.
    pub start_server: bool,
}

impl AudioConfig {
    pub fn new(client_name: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
            start_server: false,
        }
    }

    pub fn with_start_server(mut self, start: bool) -> Self {
        self.start_server = start;
        self
    }
}
