//! CLI library components for lazycsv.

pub mod commands;
pub mod logging;
pub mod record;
pub mod report;
