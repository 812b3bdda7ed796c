//! Driving ports (Inbound API)
//!
//! What the block-import pipeline calls.

use super::outbound::{ChainReader, StateLedger};
use crate::domain::ConsensusResult;
use num_bigint::BigUint;
use shared_types::{Address, Block, Hash, Header};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Ordered stream of per-header verdicts from a batch verification.
pub type VerifyResults = mpsc::Receiver<ConsensusResult<()>>;

/// Cancels an in-progress batch verification.
///
/// Dropping the handle without calling [`AbortHandle::abort`] lets the
/// batch run to completion.
#[derive(Debug)]
pub struct AbortHandle {
    tx: Option<oneshot::Sender<()>>,
}

impl AbortHandle {
    pub(crate) fn new(tx: oneshot::Sender<()>) -> Self {
        Self { tx: Some(tx) }
    }

    /// A handle for a batch that is already complete.
    pub(crate) fn detached() -> Self {
        Self { tx: None }
    }

    /// Stop dispatching and close the result stream.
    pub fn abort(mut self) {
        if let Some(tx) = self.tx.take() {
            // Receiver gone means the batch already finished.
            let _ = tx.send(());
        }
    }
}

/// Primary consensus engine API
pub trait ConsensusEngine: Send + Sync {
    /// Address credited with the block; the header's coinbase.
    fn author(&self, header: &Header) -> Address;

    /// Verify one header against its parent in `chain`.
    fn verify_header(
        &self,
        chain: &dyn ChainReader,
        header: &Header,
        seal: bool,
    ) -> ConsensusResult<()>;

    /// Verify a contiguous batch concurrently.
    ///
    /// Results arrive in input order. Must be called from within a Tokio
    /// runtime. `seals[i]` selects seal verification for `headers[i]` and
    /// defaults to `true` when absent.
    fn verify_headers(
        &self,
        chain: Arc<dyn ChainReader>,
        headers: Vec<Header>,
        seals: Vec<bool>,
    ) -> (AbortHandle, VerifyResults);

    /// Verify the uncle set of `block`.
    fn verify_uncles(&self, chain: &dyn ChainReader, block: &Block) -> ConsensusResult<()>;

    /// Verify the PoW seal and reputation gate of `header`.
    fn verify_seal(&self, chain: &dyn ChainReader, header: &Header) -> ConsensusResult<()>;

    /// Fill in the difficulty of a header about to be sealed.
    fn prepare(&self, chain: &dyn ChainReader, header: &mut Header) -> ConsensusResult<()>;

    /// Apply rewards and reputation changes, set the state root and
    /// assemble the block.
    fn finalize(
        &self,
        chain: &dyn ChainReader,
        header: Header,
        state: &mut dyn StateLedger,
        transactions: Vec<Vec<u8>>,
        uncles: Vec<Header>,
    ) -> ConsensusResult<Block>;

    /// Expected difficulty of a child of `parent` at `time`.
    fn calc_difficulty(&self, chain: &dyn ChainReader, time: u64, parent: &Header) -> BigUint;

    /// Hash of the header without its seal.
    fn seal_hash(&self, header: &Header) -> Hash;
}
