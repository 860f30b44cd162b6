//! Cloud backend
//!
//! Reduces each sampling run to one `Measurement`, validates it against the
//! schema's field rules and sends it Avro-encoded over a [`Connector`].
//!
//! ## Delivery
//!
//! ```text
//! readings ──build──▶ Measurement ──validate──▶ encode ──send──▶ connector
//!                                                         │
//!                                              retryable failure
//!                                                         ▼
//!                                                   PendingStore
//! ```
//!
//! Only retryable transport failures end up in the pending store. A record
//! that fails validation or that the receiver refuses is reported to the
//! caller and dropped: it would fail again on replay. The same goes for
//! stored files during replay; those are quarantined so they don't block the
//! rest of the queue.

use chrono::{DateTime, Utc};
use std::path::Path;
use templog_core::{
    Logger, LoggerError, LoggerResult, Measurement, MeasurementBuilder, MeasurementValidator,
};
use templog_schemas::{codec, default_validator};

use crate::{pending::PendingStore, Connector, TransportError};

/// Logs validated measurements to a cloud ingestion endpoint
pub struct CloudLogger<C: Connector> {
    project_id: String,
    builder: MeasurementBuilder,
    validator: MeasurementValidator,
    connector: C,
    pending: Option<PendingStore>,
}

impl<C: Connector> CloudLogger<C> {
    /// Logger for `device_id` in `project_id`, validating with the built-in schema's rules
    pub fn new(project_id: impl Into<String>, device_id: impl Into<String>, connector: C) -> Self {
        Self {
            project_id: project_id.into(),
            builder: MeasurementBuilder::new(device_id),
            validator: default_validator(),
            connector,
            pending: None,
        }
    }

    /// Replace the validator
    pub fn with_validator(mut self, validator: MeasurementValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Save measurements here when they cannot be sent
    pub fn with_pending(mut self, store: PendingStore) -> Self {
        self.pending = Some(store);
        self
    }

    /// Project the device belongs to
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Device stamped on every measurement
    pub fn device_id(&self) -> &str {
        self.builder.device_id()
    }

    /// Transport in use
    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Transport in use, mutably
    pub fn connector_mut(&mut self) -> &mut C {
        &mut self.connector
    }

    /// Topic measurements are sent to
    pub fn topic(&self) -> String {
        format!("/projects/{}/devices/{}/events", self.project_id, self.device_id())
    }

    /// Build a measurement from `values` and validate it
    pub fn measurement(&self, timestamp: DateTime<Utc>, values: &[f32]) -> LoggerResult<Measurement> {
        let m = self.builder.build(timestamp, values)?;
        self.validator.validate(&m)?;
        Ok(m)
    }

    /// Encode and send an already validated measurement
    pub fn send(&mut self, m: &Measurement) -> LoggerResult<()> {
        let bytes = codec::encode(m).map_err(|e| LoggerError::Encode(e.to_string()))?;
        let topic = self.topic();

        self.connector
            .send(&topic, &bytes)
            .map_err(|e| {
                if e.is_retryable() {
                    LoggerError::Transport(e.to_string())
                } else {
                    LoggerError::Rejected(e.to_string())
                }
            })?;

        log::info!("sent {m} to {topic}");
        Ok(())
    }

    /// Send every saved measurement, stamping it with `now` as its upload time
    ///
    /// Each file is deleted once its measurement is sent. A file that can
    /// never be sent (unreadable, invalid, refused) is quarantined and replay
    /// moves on. Stops at the first retryable failure, leaving that file and
    /// the rest in place. Returns how many were sent.
    pub fn publish_pending(&mut self, now: DateTime<Utc>) -> LoggerResult<usize> {
        let Some(store) = self.pending.clone() else {
            return Ok(0);
        };

        let mut sent = 0;
        for path in store.list()? {
            match self.replay(&store, &path, now) {
                Ok(()) => {
                    store.remove(&path)?;
                    sent += 1;
                }
                Err(
                    e @ (LoggerError::Encode(_)
                    | LoggerError::Measurement(_)
                    | LoggerError::Rejected(_)),
                ) => {
                    log::warn!("dropping {} from the queue: {e}", path.display());
                    store.quarantine(&path)?;
                }
                Err(e) => return Err(e),
            }
        }

        if sent > 0 {
            log::info!("published {sent} pending measurement(s)");
        }
        Ok(sent)
    }

    fn replay(&mut self, store: &PendingStore, path: &Path, now: DateTime<Utc>) -> LoggerResult<()> {
        let m = store.load(path)?.with_upload_timestamp(now);
        self.validator.validate(&m)?;
        self.send(&m)
    }
}

impl<C: Connector> Logger for CloudLogger<C> {
    fn log(&mut self, timestamp: DateTime<Utc>, values: &[f32]) -> LoggerResult<()> {
        let m = self.measurement(timestamp, values)?;

        match self.send(&m) {
            Err(LoggerError::Transport(reason)) if self.pending.is_some() => {
                log::warn!("send failed, saving for later: {reason}");
                if let Some(store) = &self.pending {
                    store.save(&m)?;
                }
                Ok(())
            }
            result => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryConnector;
    use chrono::{Duration, TimeZone};
    use templog_core::MeasurementError;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2018, 3, 25, 0, 0, 0).unwrap()
    }

    fn logger(device_id: &str) -> CloudLogger<MemoryConnector> {
        CloudLogger::new("my-project", device_id, MemoryConnector::new())
    }

    #[test]
    fn topic_names_project_and_device() {
        assert_eq!(logger("attic-1").topic(), "/projects/my-project/devices/attic-1/events");
    }

    #[test]
    fn logs_mean_of_readings() {
        let mut cloud = logger("attic-1");
        cloud.log(ts(), &[18.0, 19.0]).unwrap();

        let (topic, bytes) = &cloud.connector().sent()[0];
        assert_eq!(topic, "/projects/my-project/devices/attic-1/events");

        let m = codec::decode(bytes).unwrap();
        assert_eq!(m, Measurement::new("attic-1", ts(), 18.5));
    }

    #[test]
    fn invalid_device_id_never_sent() {
        let mut cloud = logger("1-bad");
        let err = cloud.log(ts(), &[18.0]).unwrap_err();

        assert!(matches!(
            err,
            LoggerError::Measurement(MeasurementError::InvalidProto { field: "device_id", .. })
        ));
        assert!(cloud.connector().sent().is_empty());
    }

    #[test]
    fn no_readings_is_invalid_input() {
        let mut cloud = logger("attic-1");
        assert!(matches!(
            cloud.log(ts(), &[]),
            Err(LoggerError::Measurement(MeasurementError::InvalidInput { .. }))
        ));
    }

    #[test]
    fn offline_without_store_fails() {
        let mut cloud = logger("attic-1");
        cloud.connector_mut().set_online(false);

        assert!(matches!(cloud.log(ts(), &[18.0]), Err(LoggerError::Transport(_))));
    }

    #[test]
    fn offline_saves_then_replays() {
        let dir = tempfile::tempdir().unwrap();
        let mut cloud = logger("attic-1").with_pending(PendingStore::new(dir.path()));

        cloud.connector_mut().set_online(false);
        cloud.log(ts(), &[18.0]).unwrap();
        cloud.log(ts() + Duration::minutes(1), &[19.0]).unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);

        cloud.connector_mut().set_online(true);
        let uploaded = ts() + Duration::hours(1);
        assert_eq!(cloud.publish_pending(uploaded).unwrap(), 2);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

        let sent: Vec<_> = cloud
            .connector()
            .sent()
            .iter()
            .map(|(_, bytes)| codec::decode(bytes).unwrap())
            .collect();
        assert_eq!(sent[0].timestamp(), ts());
        assert_eq!(sent[0].upload_timestamp(), Some(uploaded));
        assert_eq!(sent[1].upload_delay(), Some(Duration::minutes(59)));
    }

    #[test]
    fn replay_stops_at_first_failure() {
        let dir = tempfile::tempdir().unwrap();
        let store = PendingStore::new(dir.path());
        store.save(&Measurement::new("attic-1", ts(), 18.0)).unwrap();

        let mut cloud = logger("attic-1").with_pending(store);
        cloud.connector_mut().set_online(false);

        assert!(matches!(cloud.publish_pending(ts()), Err(LoggerError::Transport(_))));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn refused_record_is_not_queued() {
        let dir = tempfile::tempdir().unwrap();
        let mut cloud = logger("attic-1").with_pending(PendingStore::new(dir.path()));
        cloud.connector_mut().set_rejecting(Some("400 bad request".into()));

        assert!(matches!(cloud.log(ts(), &[18.0]), Err(LoggerError::Rejected(_))));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn refused_pending_file_does_not_block_queue() {
        let dir = tempfile::tempdir().unwrap();
        let store = PendingStore::new(dir.path());
        store.save(&Measurement::new("attic-1", ts(), 18.0)).unwrap();
        store.save(&Measurement::new("attic-1", ts() + Duration::minutes(1), 19.0)).unwrap();

        let mut cloud = logger("attic-1").with_pending(store.clone());
        cloud.connector_mut().set_rejecting(Some("400 bad request".into()));
        assert_eq!(cloud.publish_pending(ts()).unwrap(), 0);
        assert!(store.list().unwrap().is_empty());

        // Quarantined files stay out of later replays
        cloud.connector_mut().set_rejecting(None);
        assert_eq!(cloud.publish_pending(ts()).unwrap(), 0);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn unreadable_pending_file_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let store = PendingStore::new(dir.path());
        std::fs::write(dir.path().join("attic-1_0.json"), "{truncated").unwrap();
        store.save(&Measurement::new("attic-1", ts(), 18.0)).unwrap();

        let mut cloud = logger("attic-1").with_pending(store.clone());
        assert_eq!(cloud.publish_pending(ts()).unwrap(), 1);
        assert!(store.list().unwrap().is_empty());
        assert!(dir.path().join("attic-1_0.rejected").exists());
    }

    #[test]
    fn publish_without_store_is_noop() {
        assert_eq!(logger("attic-1").publish_pending(ts()).unwrap(), 0);
    }
}
