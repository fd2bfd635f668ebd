//! **mazegen** generates, solves and saves rectangular grid mazes with a "42" shaped block
//! carved out of the middle.

// `error_chain!` can recurse deeply
#![recursion_limit = "1024"]

pub mod cells;
pub mod errors;
pub mod generators;
pub mod grid;
pub mod grid_displays;
pub mod maze;
pub mod pathing;
pub mod pattern;
pub mod serializer;
pub mod units;
pub mod utils;
