//! Generation - procedural creation of maps and their inhabitants.

mod map;
mod population;

pub use map::*;
pub use population::*;
