//! Application services of the graph subsystem.

pub mod files;
pub mod object;
pub mod resolver;
