//! Configuration priority resolution.
//!
//! - `merge`: the JSON merge primitive (objects key-wise, higher priority
//!   wins, `null` removes)
//! - `resolver`: scope layering and the agent inheritance chain

mod error;
mod merge;
mod resolver;


pub use error::{ResolveError, ResolveResult};
pub use merge::merge_values;
pub use resolver::{ResolvedAgent, ResolvedClient, Resolver};
