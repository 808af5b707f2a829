//! phonecsv: phone-column normalization and row tagging for CSV files
//!
//! Reads a CSV file, strips every non-digit character from a chosen set of
//! columns, appends a random v4 UUID to each data row and writes the result
//! to a new CSV file.
//!
//! # Pipeline
//!
//! The row transformation is a fan-out/fan-in over two bounded queues:
//!
//! 1. **Seeding** -- every data row, tagged with its input position, goes
//!    into the input queue, which is then closed
//! 2. **Running** -- a pool of worker threads pulls rows, normalizes the
//!    target columns and appends an identifier
//! 3. **Draining** -- the coordinator joins every worker; any failure
//!    aborts the run before output is produced
//! 4. **Done** -- the output queue is drained behind the augmented header
//!
//! Output order follows worker completion unless
//! [`models::OutputOrder::Input`] is requested.
//!
//! # Key Modules
//!
//! - [`fields`] -- Column name to position resolution
//! - [`normalize`] -- Digit-only field extraction
//! - [`identifier`] -- UUID generation and row augmentation
//! - [`worker`] -- Per-thread row worker
//! - [`pipeline`] -- Coordinator owning the queues and worker pool
//! - [`source`] / [`sink`] -- CSV reading and writing
//! - [`prompt`] -- Interactive questions for paths and columns
//! - [`stats`] -- Atomic counters for the run summary
//! - [`config`] -- Constants and defaults
//!
//! # Example Usage
//!
//! ```bash
//! phonecsv -i contacts.csv -o tagged.csv -c phone mobile --preserve-order
//! ```

pub mod config;
pub mod fields;
pub mod identifier;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod prompt;
pub mod sink;
pub mod source;
pub mod stats;
pub mod worker;
