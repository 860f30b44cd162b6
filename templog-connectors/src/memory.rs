//! In-memory connector
//!
//! Keeps every message instead of sending it. Can be taken offline to make
//! sends fail with a retryable error, or set to refuse everything.

use crate::{ConnectionStats, Connector, ConnectorError};

/// Connector that records sends in memory
#[derive(Debug, Clone)]
pub struct MemoryConnector {
    sent: Vec<(String, Vec<u8>)>,
    online: bool,
    rejecting: Option<String>,
    stats: ConnectionStats,
}

impl MemoryConnector {
    /// Online connector with nothing sent yet
    pub fn new() -> Self {
        Self {
            sent: Vec::new(),
            online: true,
            rejecting: None,
            stats: ConnectionStats::default(),
        }
    }

    /// Make subsequent sends succeed (`true`) or fail (`false`)
    pub fn set_online(&mut self, online: bool) {
        self.online = online;
    }

    /// Refuse subsequent sends with `reason`, or accept them again with `None`
    pub fn set_rejecting(&mut self, reason: Option<String>) {
        self.rejecting = reason;
    }

    /// Everything sent so far as `(topic, payload)`
    pub fn sent(&self) -> &[(String, Vec<u8>)] {
        &self.sent
    }
}

impl Default for MemoryConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl Connector for MemoryConnector {
    type Error = ConnectorError;

    fn send(&mut self, topic: &str, data: &[u8]) -> Result<(), Self::Error> {
        if !self.online {
            self.stats.record_failed(ConnectorError::NotConnected);
            return Err(ConnectorError::NotConnected);
        }
        if let Some(reason) = &self.rejecting {
            let err = ConnectorError::Rejected(reason.clone());
            self.stats.record_failed(&err);
            return Err(err);
        }

        self.sent.push((topic.to_string(), data.to_vec()));
        self.stats.record_sent(data.len());
        Ok(())
    }

    fn stats(&self) -> ConnectionStats {
        self.stats.clone()
    }
}
