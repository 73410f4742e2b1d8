//! Output module for crawl summaries
//!
//! This module handles:
//! - Rendering the end-of-run report
//! - Listing the identifiers held by the ledger

mod summary;

pub use summary::{format_ledger, format_report, print_ledger, print_report, success_rate};
