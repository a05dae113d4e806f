//! Iteration engine module
//!
//! Moves data across the host/device boundary and drives the ping-pong
//! passes over the device buffer set.

mod iteration;
mod role;
mod transfer;

pub use iteration::{IterationOutcome, run_passes};
pub use role::{BufferRole, IterationPlan, WorkBuffer};
pub use transfer::{PendingUploads, download_result, upload_inputs};
