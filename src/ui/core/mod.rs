pub mod apply;
pub mod charts;
pub mod dates;
pub mod debounce;
pub mod export;
pub mod format;
pub mod orchestrator;
pub mod registry;
pub mod section;
pub mod widgets;
