//! # Integration Flows
//!
//! Chains are mined with real (tiny) ethash through `rp_02_consensus::testing`
//! and then verified as a separate node would see them.

pub mod batch_import;
pub mod chain_flow;
pub mod reputation_lifecycle;
