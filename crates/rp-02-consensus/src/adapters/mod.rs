//! Adapters layer (Hexagonal Architecture)

mod chain;
mod fork_rules;
mod miners;
mod state;

pub use chain::*;
pub use fork_rules::*;
pub use miners::*;
pub use state::*;
