//! Logger Backends and Transports
//!
//! ## Overview
//!
//! Every backend implements `templog_core::Logger`: given a timestamp and the
//! readings of one sampling run, record them somewhere.
//!
//! | Backend | Keeps | Validates |
//! |---------|-------|-----------|
//! | [`CsvLogger`] | every reading, one row per run | no |
//! | [`StdoutLogger`] | every reading, one line per run | no |
//! | [`SheetsLogger`] | every reading, one spreadsheet row per run | no |
//! | [`CloudLogger`] | one reduced `Measurement` per run | yes, always |
//!
//! The row-oriented backends never build a `Measurement`; they write what the
//! sensor said. The cloud backend sends records, and a record is never sent
//! before it has passed validation.
//!
//! ## Transports
//!
//! The cloud backend doesn't care how bytes leave the device. It talks to a
//! [`Connector`]:
//!
//! - [`HttpConnector`]: POST to an ingestion endpoint (ureq, blocking)
//! - [`MemoryConnector`]: keep everything in memory (tests, dry runs)
//!
//! ## Offline Operation
//!
//! When a send fails with a retryable error and a [`PendingStore`] is
//! configured, the validated record is written to disk instead.
//! `CloudLogger::publish_pending` sends stored records later, stamping each
//! with its upload time. Records the receiver refuses are never queued.
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use templog_connectors::{CloudLogger, MemoryConnector};
//! use templog_core::Logger;
//!
//! let mut cloud = CloudLogger::new("my-project", "attic-1", MemoryConnector::new());
//! cloud.log(Utc::now(), &[21.0, 21.5])?;
//! assert_eq!(cloud.connector().sent().len(), 1);
//! # Ok::<(), templog_core::LoggerError>(())
//! ```

pub mod cloud;
pub mod csv;
pub mod http;
pub mod memory;
pub mod pending;
pub mod sheets;
pub mod stdout;

// Re-export common types
pub use cloud::CloudLogger;
pub use csv::CsvLogger;
pub use http::{AuthMethod, HttpConfig, HttpConnector, HttpError};
pub use memory::MemoryConnector;
pub use pending::PendingStore;
pub use sheets::SheetsLogger;
pub use stdout::StdoutLogger;

use thiserror::Error;

/// Common connector errors
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("Not connected")]
    NotConnected,

    #[error("Rejected: {0}")]
    Rejected(String),
}

/// Transport failures that know whether a later attempt could succeed
pub trait TransportError: std::fmt::Display {
    /// `false` when the receiver refused the data itself
    fn is_retryable(&self) -> bool;
}

impl TransportError for ConnectorError {
    fn is_retryable(&self) -> bool {
        matches!(self, ConnectorError::NotConnected)
    }
}

/// Trait for all transports
pub trait Connector {
    type Error: TransportError;

    /// Send an encoded record
    fn send(&mut self, topic: &str, data: &[u8]) -> Result<(), Self::Error>;

    /// Get connection statistics
    fn stats(&self) -> ConnectionStats;
}

/// Connection statistics common to all connectors
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConnectionStats {
    /// Total messages sent successfully
    pub messages_sent: u64,
    /// Total messages failed to send
    pub messages_failed: u64,
    /// Total bytes sent
    pub bytes_sent: u64,
    /// Last error message
    pub last_error: Option<String>,
}

impl ConnectionStats {
    pub(crate) fn record_sent(&mut self, bytes: usize) {
        self.messages_sent += 1;
        self.bytes_sent += bytes as u64;
    }

    pub(crate) fn record_failed(&mut self, error: impl ToString) {
        self.messages_failed += 1;
        self.last_error = Some(error.to_string());
    }
}
