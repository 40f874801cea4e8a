pub mod config;
pub mod error;
pub mod events;
pub mod io;
pub mod metrics;
pub mod plot;
pub mod report;
pub mod summary;

pub use error::*;
pub use events::*;
pub use summary::*;
