pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::CliConfig;

pub use crate::adapters::{
    ConsolePresenter, ConsoleSelector, FixedSelector, LocalStorage, SyrveClient,
};
pub use crate::config::AuditConfig;
pub use crate::core::{
    aggregator::{OrderAggregator, WindowErrorPolicy},
    audit::{AuditEngine, AuditOutcome},
    date_chunker::DateChunker,
    phone::{is_valid_phone, PhoneValidator},
    summary::SummaryEngine,
};
pub use crate::utils::error::{AuditError, Result};
