//! CLI command implementations

pub mod export;
pub mod serve;
pub mod themes;

pub use export::ExportCommand;
pub use serve::ServeCommand;
pub use themes::ThemesCommand;
