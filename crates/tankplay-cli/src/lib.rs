pub mod cli;
pub mod output;
pub mod play;

pub use cli::Cli;
