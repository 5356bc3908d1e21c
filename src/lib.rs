#![allow(clippy::collapsible_if)]
#![allow(clippy::collapsible_match)]
#![allow(clippy::collapsible_else_if)]

pub mod combinator;
pub mod config;
pub mod core;
pub mod error;
pub mod filters;
pub mod logging;
pub mod predicate;
pub mod scanner;
pub mod view;

// Re-export commonly used types
pub use combinator::{FilterCombinator, FilterEvent, RefreshMode};
pub use config::{Config, FilterSettings};
pub use error::{FilterError, Result};
pub use filters::{FilterStrategy, GridFilter, StrategyKind};
pub use view::{DataView, FrameView, MemoryView};
