//! Observability subsystem for fastpage
//!
//! Structured JSON logging only. The rewrite logs its decisions (rewrite applied,
//! fallback taken, statements executed) at TRACE, which is below the default
//! threshold, so callers see nothing unless they lower it.
//!
//! # Usage
//!
//! ```ignore
//! use fastpage::observability::{Logger, Severity};
//!
//! Logger::set_min_severity(Severity::Trace);
//! Logger::trace("FAST_PAGINATE_FALLBACK", &[("code", "FAST_PAGINATE_UNION")]);
//! ```

mod logger;

pub use logger::{Logger, Severity};
