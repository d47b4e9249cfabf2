//! Background job bookkeeping for merge batches.

pub mod state;
