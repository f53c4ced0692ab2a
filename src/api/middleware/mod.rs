//! API middleware.
//!
//! Execution order (outermost → innermost):
//! 1. CORS (only when origins are configured)
//! 2. Request log — assigns a request id, logs status and latency

pub mod request_log;
