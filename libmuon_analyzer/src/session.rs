use fxhash::FxHashMap;
use std::path::Path;
use std::sync::Arc;

use super::error::{EventFileError, SessionError};
use super::event_file::{parse_event_log, DetectorSeries, FirstRowPolicy};

/// Identity of an uploaded file, as seen by the parse cache.
///
/// The same bytes parsed under a different first row policy give a different series, so the
/// policy is part of the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileKey {
    pub content_hash: u64,
    pub length: usize,
    pub policy: FirstRowPolicy,
}

impl FileKey {
    pub fn new(bytes: &[u8], policy: FirstRowPolicy) -> Self {
        Self {
            content_hash: fxhash::hash64(bytes),
            length: bytes.len(),
            policy,
        }
    }
}

/// Parsed detector data owned by one user session.
///
/// Parsing is memoized by file identity. Derived series are never cached here; they are cheap
/// to rebuild and depend on settings that change between renders. Everything cached is evicted
/// when the session is dropped.
#[derive(Debug, Default)]
pub struct Session {
    cache: FxHashMap<FileKey, Arc<DetectorSeries>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an uploaded file, or return the cached parse if these bytes were seen before
    pub fn load(
        &mut self,
        label: &str,
        bytes: &[u8],
        policy: FirstRowPolicy,
    ) -> Result<Arc<DetectorSeries>, SessionError> {
        let key = FileKey::new(bytes, policy);
        if let Some(series) = self.cache.get(&key) {
            log::debug!("Using cached parse for {label}");
            return Ok(series.clone());
        }

        let series = parse_event_log(bytes, policy).map_err(|source| SessionError::LoadFailed {
            label: label.to_string(),
            source,
        })?;
        log::info!("Parsed {} events for {label}", series.len());
        let series = Arc::new(series);
        self.cache.insert(key, series.clone());
        Ok(series)
    }

    /// Read a file from disk and load it
    pub fn load_file(
        &mut self,
        label: &str,
        path: &Path,
        policy: FirstRowPolicy,
    ) -> Result<Arc<DetectorSeries>, SessionError> {
        let fail = |source: EventFileError| SessionError::LoadFailed {
            label: label.to_string(),
            source,
        };
        if !path.exists() {
            return Err(fail(EventFileError::BadFilePath(path.to_path_buf())));
        }
        let bytes = std::fs::read(path).map_err(|e| fail(EventFileError::IOError(e)))?;
        log::info!(
            "Read {} from {}",
            human_bytes::human_bytes(bytes.len() as f64),
            path.display()
        );
        self.load(label, &bytes, policy)
    }

    pub fn contains(&self, key: &FileKey) -> bool {
        self.cache.contains_key(key)
    }

    /// Drop a single cached parse. Returns true if it was present.
    pub fn evict(&mut self, key: &FileKey) -> bool {
        self.cache.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.cache.is_empty() {
            log::debug!("Session ended; evicting {} cached files", self.cache.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const LOG: &str = "Device: Muon1\nM1 x 1 100 5 40.0 2 20.0\nM1 x 2 200 5 50.0 2 20.5\n";

    #[test]
    fn test_load_is_memoized() {
        let mut session = Session::new();
        let first = session.load("a", LOG.as_bytes(), FirstRowPolicy::Keep).unwrap();
        let second = session.load("b", LOG.as_bytes(), FirstRowPolicy::Keep).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(session.len(), 1);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_policy_is_part_of_key() {
        let mut session = Session::new();
        let kept = session.load("a", LOG.as_bytes(), FirstRowPolicy::Keep).unwrap();
        let dropped = session
            .load("a", LOG.as_bytes(), FirstRowPolicy::DropFirst)
            .unwrap();
        assert_eq!(kept.len(), 2);
        assert_eq!(dropped.len(), 1);
        assert_eq!(session.len(), 2);
    }

    #[test]
    fn test_evict_and_clear() {
        let mut session = Session::new();
        session.load("a", LOG.as_bytes(), FirstRowPolicy::Keep).unwrap();
        let key = FileKey::new(LOG.as_bytes(), FirstRowPolicy::Keep);
        assert!(session.contains(&key));
        assert!(session.evict(&key));
        assert!(!session.evict(&key));
        session.load("a", LOG.as_bytes(), FirstRowPolicy::Keep).unwrap();
        session.clear();
        assert!(session.is_empty());
    }

    #[test]
    fn test_failed_parse_names_detector() {
        let mut session = Session::new();
        match session.load("Muon2", b"Device\n", FirstRowPolicy::Keep) {
            Err(SessionError::LoadFailed { label, source }) => {
                assert_eq!(label, "Muon2");
                assert!(matches!(source, EventFileError::NoDataRows));
            }
            other => panic!("Expected load failure, got {other:?}"),
        }
        assert!(session.is_empty());
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(LOG.as_bytes()).unwrap();
        let mut session = Session::new();
        let series = session
            .load_file("disk", file.path(), FirstRowPolicy::DropFirst)
            .unwrap();
        assert_eq!(series.event_number, vec![2.0]);

        let missing = session.load_file(
            "gone",
            Path::new("/definitely/not/here.txt"),
            FirstRowPolicy::Keep,
        );
        assert!(matches!(
            missing,
            Err(SessionError::LoadFailed {
                source: EventFileError::BadFilePath(_),
                ..
            })
        ));
    }
}
