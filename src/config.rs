//! Configuration for mongowire
//!
//! Centralized codec limits with wire-compatible defaults.

/// Default port assumed for peers whose address carries none
pub const DEFAULT_PORT: u16 = 27017;

/// Main configuration for the codecs
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Framing Configuration
    // -------------------------------------------------------------------------
    /// Largest frame accepted from a peer, header included (in bytes)
    pub max_message_size: usize,

    // -------------------------------------------------------------------------
    // Document Configuration
    // -------------------------------------------------------------------------
    /// Largest single document accepted inside a frame (in bytes)
    pub max_document_size: usize,

    // -------------------------------------------------------------------------
    // Addressing Configuration
    // -------------------------------------------------------------------------
    /// Port used when a `host[:port]` string has no port
    pub default_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_message_size: 48_000_000,
            max_document_size: 16 * 1024 * 1024, // 16 MB
            default_port: DEFAULT_PORT,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the maximum frame size (in bytes)
    pub fn max_message_size(mut self, size: usize) -> Self {
        self.config.max_message_size = size;
        self
    }

    /// Set the maximum document size (in bytes)
    pub fn max_document_size(mut self, size: usize) -> Self {
        self.config.max_document_size = size;
        self
    }

    /// Set the port assumed for addresses without one
    pub fn default_port(mut self, port: u16) -> Self {
        self.config.default_port = port;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
