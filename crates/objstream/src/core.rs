//! Pure transformations: resume bookkeeping, backoff and range handling.
//!
//! Nothing in here touches the network. The buffer and the HTTP adapter feed
//! these functions and act on their answers.

mod range;
mod resume;
mod retry;

pub use range::{RangeStatus, check_range_status, content_range_start, range_header};
pub use resume::ResumeState;
pub use retry::resume_delay;
