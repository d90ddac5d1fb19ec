//! # scribe-core
//!
//! Foundation types for the scribe transcription job server:
//!
//! - **Job records**: [`job::JobRecord`] — the persistent representation of
//!   one submitted transcription job
//! - **Status machine**: [`status::JobStatus`] with a closed transition table
//! - **Text**: transport-safe error message sanitation in [`text`]
//! - **Timecodes**: transcript timestamp formatting in [`timecode`]
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by all other scribe crates.

#![deny(unsafe_code)]

pub mod job;
pub mod status;
pub mod text;
pub mod timecode;

pub use job::{JobRecord, NewJob, new_job_id, now_utc};
pub use status::JobStatus;
