//! Route handlers

pub mod citations;
pub mod frames;
pub mod nodes;
pub mod priority;
pub mod stats;
pub mod violations;
