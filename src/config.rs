/// Label appended to the header row for the generated identifier column
pub const ID_COLUMN_LABEL: &str = "uuid";

/// Buffer capacity for the output CSV writer
pub const WRITER_BUFFER_CAPACITY: usize = 128 * 1024;

/// Worker pool size used when the caller does not pick one
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
