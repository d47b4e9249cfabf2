//! Data model shared between the merge engine and its host shell.
//!
//! Everything here is plain data: serializable, cheap to clone and free of any
//! document or spreadsheet plumbing.

pub mod jobs;
pub mod model;
pub mod requests;
pub mod responses;
