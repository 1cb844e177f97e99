//! Application-level store for loaded recordings.
//!
//! An explicit create/list/delete store that callers construct and inject
//! where needed; recordings never live in a hidden process-wide singleton.
//! Sample buffers are shared via `Arc` so a recording can be analyzed and
//! played back without copying.

use std::collections::BTreeMap;
use std::sync::Arc;

/// One loaded recording.
#[derive(Debug, Clone)]
pub struct Recording {
    pub id: u64,
    pub name: String,
    pub samples: Arc<Vec<f32>>,
    pub sample_rate: u32,
}

impl Recording {
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Id-keyed recording store.
#[derive(Debug, Default)]
pub struct RecordingStore {
    next_id: u64,
    recordings: BTreeMap<u64, Recording>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a recording and returns its id.
    pub fn create(&mut self, name: impl Into<String>, samples: Vec<f32>, sample_rate: u32) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.recordings.insert(
            id,
            Recording {
                id,
                name: name.into(),
                samples: Arc::new(samples),
                sample_rate,
            },
        );
        id
    }

    pub fn get(&self, id: u64) -> Option<&Recording> {
        self.recordings.get(&id)
    }

    /// Recordings in insertion (id) order.
    pub fn list(&self) -> impl Iterator<Item = &Recording> {
        self.recordings.values()
    }

    /// Removes a recording, returning it if it existed.
    pub fn delete(&mut self, id: u64) -> Option<Recording> {
        self.recordings.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.recordings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recordings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_list_delete_round_trip() {
        let mut store = RecordingStore::new();
        let a = store.create("a.wav", vec![0.0; 100], 44100);
        let b = store.create("b.wav", vec![0.0; 200], 48000);
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);

        let names: Vec<&str> = store.list().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a.wav", "b.wav"]);

        let removed = store.delete(a).unwrap();
        assert_eq!(removed.name, "a.wav");
        assert!(store.get(a).is_none());
        assert_eq!(store.len(), 1);
        assert!(store.delete(a).is_none());
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let mut store = RecordingStore::new();
        let a = store.create("a.wav", vec![], 44100);
        store.delete(a);
        let b = store.create("b.wav", vec![], 44100);
        assert_ne!(a, b);
    }

    #[test]
    fn duration_follows_sample_rate() {
        let mut store = RecordingStore::new();
        let id = store.create("a.wav", vec![0.0; 44100], 44100);
        assert!((store.get(id).unwrap().duration_secs() - 1.0).abs() < 1e-9);
    }
}
