pub mod env;
pub mod error;
pub mod io;
pub mod launch;
pub mod offset;
pub mod paths;
pub mod player;
pub mod settings;
pub mod sniff;
pub mod stream;
pub mod wavefile;

pub use error::{Result, TankplayError};
pub use stream::Stream;
