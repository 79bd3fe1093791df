//! Session records and the collaborators they are handed to.
//!
//! A [`SessionRecord`] is the immutable result of one extraction. It is
//! persisted in a [`SessionStore`] under a fresh [`SessionId`], a
//! [`Presenter`] is asked to open a view for that id, and if either step
//! fails the already-encoded CSV goes straight to the [`ExportSink`].

use crate::bias::AlignmentBias;
use crate::error::{FrError, Result};
use crate::export::{encode_csv, export_filename};
use crate::metadata::ExtractionMetadata;
use crate::model::MeasurementSeries;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Mutex;
use tracing::{info, warn};

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_RANDOM_LEN: usize = 11;

/// Opaque key of a stored session record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// `fr_{unix_millis}_{random base-36}`.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..ID_RANDOM_LEN)
            .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
            .collect();
        Self(format!("fr_{}_{}", Utc::now().timestamp_millis(), suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything one extraction produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub series: MeasurementSeries,
    pub bias: AlignmentBias,
    pub metadata: ExtractionMetadata,
    pub csv: String,
    pub filename: String,
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Build a record, deriving the CSV and filename.
    pub fn new(
        series: MeasurementSeries,
        bias: AlignmentBias,
        metadata: ExtractionMetadata,
    ) -> Self {
        Self::at(series, bias, metadata, Utc::now())
    }

    /// Build a record with an explicit creation time.
    pub fn at(
        series: MeasurementSeries,
        bias: AlignmentBias,
        metadata: ExtractionMetadata,
        created_at: DateTime<Utc>,
    ) -> Self {
        let csv = encode_csv(&series, &bias);
        let filename = export_filename(&metadata);
        Self {
            series,
            bias,
            metadata,
            csv,
            filename,
            created_at,
        }
    }
}

/// Key-value store for session records.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn put(&self, id: &SessionId, record: &SessionRecord) -> Result<()>;

    /// `Ok(None)` when no record exists under `id`.
    async fn get(&self, id: &SessionId) -> Result<Option<SessionRecord>>;

    /// All stored ids, oldest first.
    async fn ids(&self) -> Result<Vec<SessionId>>;
}

/// "Save as file" action.
#[async_trait]
pub trait ExportSink: Send + Sync {
    /// Save `contents` under `filename`, never overwriting an existing file.
    /// Returns where the file ended up.
    async fn save(&self, filename: &str, contents: &[u8]) -> Result<String>;
}

/// Opens a presentation view for a stored record.
#[async_trait]
pub trait Presenter: Send + Sync {
    /// Returns the address the view was opened at.
    async fn open(&self, id: &SessionId) -> Result<String>;
}

/// View address for a session id.
pub fn view_address(id: &SessionId) -> String {
    format!("frscope://view?dataId={id}")
}

/// How a record reached the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Stored and opened in a view.
    Presented { id: SessionId, address: String },
    /// Storage or presentation failed; the CSV was saved directly.
    Exported { location: String, reason: String },
}

/// Persist a record and open it, falling back to the export sink.
pub async fn deliver(
    record: &SessionRecord,
    store: &dyn SessionStore,
    presenter: &dyn Presenter,
    sink: &dyn ExportSink,
) -> Result<Delivery> {
    let id = SessionId::generate();

    let failure = match store.put(&id, record).await {
        Ok(()) => {
            info!("stored session {id}");
            match presenter.open(&id).await {
                Ok(address) => return Ok(Delivery::Presented { id, address }),
                Err(e) => e,
            }
        }
        Err(e) => e,
    };

    warn!("delivery fell back to export sink: {failure}");
    let location = sink.save(&record.filename, record.csv.as_bytes()).await?;
    Ok(Delivery::Exported {
        location,
        reason: failure.to_string(),
    })
}

/// Fetch a record for a view. Missing records and storage failures both
/// surface as [`FrError::DataNotFound`].
pub async fn retrieve(store: &dyn SessionStore, id: &SessionId) -> Result<SessionRecord> {
    match store.get(id).await {
        Ok(Some(record)) => Ok(record),
        Ok(None) => Err(FrError::DataNotFound(id.to_string())),
        Err(e) => {
            warn!("retrieving {id} failed: {e}");
            Err(FrError::DataNotFound(id.to_string()))
        }
    }
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<SessionId, SessionRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn put(&self, id: &SessionId, record: &SessionRecord) -> Result<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|e| FrError::Storage(e.to_string()))?;
        records.insert(id.clone(), record.clone());
        Ok(())
    }

    async fn get(&self, id: &SessionId) -> Result<Option<SessionRecord>> {
        let records = self
            .records
            .lock()
            .map_err(|e| FrError::Storage(e.to_string()))?;
        Ok(records.get(id).cloned())
    }

    async fn ids(&self) -> Result<Vec<SessionId>> {
        let records = self
            .records
            .lock()
            .map_err(|e| FrError::Storage(e.to_string()))?;
        let mut entries: Vec<(&SessionId, &SessionRecord)> = records.iter().collect();
        entries.sort_by_key(|(_, r)| r.created_at);
        Ok(entries.into_iter().map(|(id, _)| id.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::VariantTag;
    use crate::model::MeasurementPoint as P;
    use crate::normalize::normalize;

    fn record() -> SessionRecord {
        let series = normalize(vec![P::new(20.0, 0.0), P::new(500.0, 1.2), P::new(20000.0, -3.0)]);
        let bias = AlignmentBias::compute(&series);
        SessionRecord::new(
            series,
            bias,
            ExtractionMetadata {
                product_name: "model".into(),
                variant: VariantTag::RawFrLeft,
            },
        )
    }

    struct FailingStore;

    #[async_trait]
    impl SessionStore for FailingStore {
        async fn put(&self, _: &SessionId, _: &SessionRecord) -> Result<()> {
            Err(FrError::Storage("disk full".into()))
        }
        async fn get(&self, _: &SessionId) -> Result<Option<SessionRecord>> {
            Err(FrError::Storage("disk gone".into()))
        }
        async fn ids(&self) -> Result<Vec<SessionId>> {
            Ok(Vec::new())
        }
    }

    struct StubPresenter {
        fail: bool,
    }

    #[async_trait]
    impl Presenter for StubPresenter {
        async fn open(&self, id: &SessionId) -> Result<String> {
            if self.fail {
                Err(FrError::Transport("no view".into()))
            } else {
                Ok(view_address(id))
            }
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        saved: Mutex<Vec<(String, Vec<u8>)>>,
    }

    #[async_trait]
    impl ExportSink for RecordingSink {
        async fn save(&self, filename: &str, contents: &[u8]) -> Result<String> {
            self.saved
                .lock()
                .unwrap()
                .push((filename.to_string(), contents.to_vec()));
            Ok(format!("/downloads/{filename}"))
        }
    }

    #[test]
    fn test_record_derives_fields() {
        let rec = record();
        assert_eq!(rec.filename, "model_raw-fr-l.csv");
        assert!(rec.csv.starts_with("Frequency_Hz,Amplitude_dB\n20,3.800000\n"));
    }

    #[test]
    fn test_record_json_roundtrip() {
        let rec = record();
        let json = serde_json::to_string(&rec).unwrap();
        assert!(json.contains("\"raw-fr-l\""));
        let back: SessionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rec);
    }

    #[test]
    fn test_session_id_shape() {
        let id = SessionId::generate();
        let parts: Vec<&str> = id.as_str().split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "fr");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), ID_RANDOM_LEN);
        assert_ne!(SessionId::generate(), SessionId::generate());
    }

    #[tokio::test]
    async fn test_deliver_presents() {
        let store = MemoryStore::new();
        let sink = RecordingSink::default();
        let outcome = deliver(&record(), &store, &StubPresenter { fail: false }, &sink)
            .await
            .unwrap();

        let Delivery::Presented { id, address } = outcome else {
            panic!("expected presented");
        };
        assert_eq!(address, format!("frscope://view?dataId={id}"));
        let stored = retrieve(&store, &id).await.unwrap();
        assert_eq!(stored.filename, "model_raw-fr-l.csv");
        assert_eq!(store.ids().await.unwrap(), vec![id]);
        assert!(sink.saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deliver_falls_back_on_store_failure() {
        let sink = RecordingSink::default();
        let rec = record();
        let outcome = deliver(&rec, &FailingStore, &StubPresenter { fail: false }, &sink)
            .await
            .unwrap();

        assert!(matches!(outcome, Delivery::Exported { ref reason, .. } if reason.contains("disk full")));
        let saved = sink.saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].0, "model_raw-fr-l.csv");
        assert_eq!(saved[0].1, rec.csv.as_bytes());
    }

    #[tokio::test]
    async fn test_deliver_falls_back_on_presenter_failure() {
        let store = MemoryStore::new();
        let sink = RecordingSink::default();
        let outcome = deliver(&record(), &store, &StubPresenter { fail: true }, &sink)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            Delivery::Exported {
                location: "/downloads/model_raw-fr-l.csv".into(),
                reason: "transport failure: no view".into(),
            }
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_retrieve_missing_and_failing() {
        let id = SessionId::from("fr_0_missing");
        assert!(matches!(
            tokio_test::block_on(retrieve(&MemoryStore::new(), &id)),
            Err(FrError::DataNotFound(_))
        ));
        assert!(matches!(
            tokio_test::block_on(retrieve(&FailingStore, &id)),
            Err(FrError::DataNotFound(_))
        ));
    }
}
