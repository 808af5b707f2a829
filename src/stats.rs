use std::sync::atomic::{AtomicU64, Ordering};

/// Counters collected while rows move through the pipeline
#[derive(Default)]
pub struct PipelineStats {
    pub rows_seeded: AtomicU64,
    pub rows_transformed: AtomicU64,
    pub fields_normalized: AtomicU64,
    pub rows_collected: AtomicU64,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_seeded(&self, count: u64) {
        self.rows_seeded.fetch_add(count, Ordering::Relaxed);
    }

    pub fn inc_transformed(&self) {
        self.rows_transformed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_fields_normalized(&self, count: u64) {
        self.fields_normalized.fetch_add(count, Ordering::Relaxed);
    }

    pub fn inc_collected(&self) {
        self.rows_collected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn seeded(&self) -> u64 {
        self.rows_seeded.load(Ordering::Relaxed)
    }

    pub fn transformed(&self) -> u64 {
        self.rows_transformed.load(Ordering::Relaxed)
    }

    pub fn normalized(&self) -> u64 {
        self.fields_normalized.load(Ordering::Relaxed)
    }

    pub fn collected(&self) -> u64 {
        self.rows_collected.load(Ordering::Relaxed)
    }
}
