//! Domain models for the protocol desk.

mod activity;
mod protocol;
mod settings;
mod stopwatch;
mod tally;

pub use activity::*;
pub use protocol::*;
pub use settings::*;
pub use stopwatch::*;
pub use tally::*;
