//! Concurrent batch header verification
//!
//! ```text
//!              indices                 (index, verdict)
//! dispatcher ──────────→ N workers ─────────────────────→ dispatcher
//!     │                 (blocking pool)                       │
//!     │ abort                                                 ↓
//!     └──────────────────────────────────────────→ ordered result stream
//! ```
//!
//! Workers finish in any order; the dispatcher parks out-of-order verdicts
//! until the next expected index arrives, then flushes the contiguous run.

use super::{observe, ReputationEngine};
use crate::config::PowMode;
use crate::domain::{ConsensusError, ConsensusResult};
use crate::ports::{AbortHandle, ChainReader, VerifyResults};
use shared_types::Header;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, error, warn};

type Completion = (usize, ConsensusResult<()>);

pub(super) fn verify_headers(
    engine: &ReputationEngine,
    chain: Arc<dyn ChainReader>,
    headers: Vec<Header>,
    seals: Vec<bool>,
) -> (AbortHandle, VerifyResults) {
    let total = headers.len();
    if engine.config.pow_mode == PowMode::FullFake || total == 0 {
        let (tx, rx) = mpsc::channel(total.max(1));
        for _ in 0..total {
            // Capacity equals the batch length.
            let _ = tx.try_send(Ok(()));
        }
        return (AbortHandle::detached(), rx);
    }

    let workers = engine
        .config
        .verify_threads
        .unwrap_or_else(num_cpus::get)
        .clamp(1, total);
    debug!(total, workers, "Verifying header batch");

    let headers = Arc::new(headers);
    let seals = Arc::new(seals);
    let (abort_tx, abort_rx) = oneshot::channel();
    let (results_tx, results_rx) = mpsc::channel(total);
    let (inputs_tx, inputs_rx) = mpsc::channel::<usize>(workers);
    let (done_tx, done_rx) = mpsc::channel::<Completion>(workers);
    let inputs_rx = Arc::new(Mutex::new(inputs_rx));

    for _ in 0..workers {
        tokio::spawn(worker(
            engine.clone(),
            Arc::clone(&chain),
            Arc::clone(&headers),
            Arc::clone(&seals),
            Arc::clone(&inputs_rx),
            done_tx.clone(),
        ));
    }
    drop(done_tx);

    tokio::spawn(dispatch(total, inputs_tx, done_rx, abort_rx, results_tx));
    (AbortHandle::new(abort_tx), results_rx)
}

async fn worker(
    engine: ReputationEngine,
    chain: Arc<dyn ChainReader>,
    headers: Arc<Vec<Header>>,
    seals: Arc<Vec<bool>>,
    inputs: Arc<Mutex<mpsc::Receiver<usize>>>,
    done: mpsc::Sender<Completion>,
) {
    loop {
        let next = inputs.lock().await.recv().await;
        let Some(index) = next else {
            break;
        };

        let (engine, chain, headers, seals) = (
            engine.clone(),
            Arc::clone(&chain),
            Arc::clone(&headers),
            Arc::clone(&seals),
        );
        let verdict = tokio::task::spawn_blocking(move || {
            let result = engine.verify_batch_member(chain.as_ref(), &headers, &seals, index);
            observe(headers[index].number, &result);
            result
        })
        .await;

        // A panicking check fails its own header; the batch still completes.
        let result = verdict.unwrap_or_else(|err| {
            error!(index, error = %err, "Header verification task failed");
            Err(ConsensusError::VerificationTask(err.to_string()))
        });
        if done.send((index, result)).await.is_err() {
            break;
        }
    }
}

async fn dispatch(
    total: usize,
    inputs: mpsc::Sender<usize>,
    mut done: mpsc::Receiver<Completion>,
    mut abort: oneshot::Receiver<()>,
    results: mpsc::Sender<ConsensusResult<()>>,
) {
    let mut parked: Vec<Option<ConsensusResult<()>>> = vec![None; total];
    let mut next_input = 0;
    let mut next_output = 0;
    let mut abortable = true;

    loop {
        tokio::select! {
            biased;

            signal = &mut abort, if abortable => match signal {
                Ok(()) => {
                    warn!(delivered = next_output, total, "Header batch aborted");
                    return;
                }
                // Handle dropped without aborting.
                Err(_) => abortable = false,
            },

            Some((index, result)) = done.recv() => {
                if let Err(err) = &result {
                    warn!(index, error = %err, "Header in batch failed verification");
                }
                parked[index] = Some(result);
                while let Some(result) = parked.get_mut(next_output).and_then(Option::take) {
                    if results.send(result).await.is_err() {
                        return;
                    }
                    next_output += 1;
                }
                if next_output == total {
                    return;
                }
            },

            permit = inputs.reserve(), if next_input < total => match permit {
                Ok(permit) => {
                    permit.send(next_input);
                    next_input += 1;
                }
                Err(_) => return,
            },

            else => return,
        }
    }
}
