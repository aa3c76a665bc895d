use super::FingerprintHistory;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::sync::Mutex;

/// In-process history. The mutex serializes check-and-store pairs so FIFO
/// eviction holds with concurrent callers.
pub struct MemoryHistory {
    entries: Mutex<VecDeque<String>>,
    capacity: usize,
}

impl MemoryHistory {
    pub fn new(capacity: usize) -> Self {
        MemoryHistory {
            entries: Mutex::new(VecDeque::with_capacity(capacity + 1)),
            capacity,
        }
    }

    fn push_bounded(entries: &mut VecDeque<String>, fingerprint: &str, capacity: usize) {
        entries.push_back(fingerprint.to_string());
        while entries.len() > capacity {
            if let Some(evicted) = entries.pop_front() {
                tracing::trace!("Evicted fingerprint {} from history", evicted);
            }
        }
    }
}

#[async_trait]
impl FingerprintHistory for MemoryHistory {
    async fn fingerprints(&self) -> Result<Vec<String>> {
        Ok(self.entries.lock().await.iter().cloned().collect())
    }

    async fn contains(&self, fingerprint: &str) -> Result<bool> {
        Ok(self.entries.lock().await.iter().any(|fp| fp == fingerprint))
    }

    async fn append(&self, fingerprint: &str) -> Result<()> {
        let mut entries = self.entries.lock().await;
        Self::push_bounded(&mut entries, fingerprint, self.capacity);
        Ok(())
    }

    async fn insert_if_absent(&self, fingerprint: &str) -> Result<bool> {
        let mut entries = self.entries.lock().await;
        if entries.iter().any(|fp| fp == fingerprint) {
            return Ok(false);
        }
        Self::push_bounded(&mut entries, fingerprint, self.capacity);
        Ok(true)
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
