//! Domain layer for the reputation-weighted PoW engine
//!
//! - chain_config: fork schedule and difficulty constants
//! - difficulty: epoch-dependent retargeting
//! - reputation: reward, decay and authorship windows
//! - seal: reputation-adjusted targets
//! - rewards: monetary block and uncle rewards
//! - fork_rules: DAO extra-data and fork-hash pinning

mod chain_config;
mod difficulty;
mod error;
pub mod fork_rules;
pub mod reputation;
mod rewards;
pub mod seal;

pub use chain_config::*;
pub use difficulty::*;
pub use error::*;
pub use rewards::*;
