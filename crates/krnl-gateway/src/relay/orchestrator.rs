//! Transaction relay orchestrator.
//!
//! ```text
//! raw hex ─► decode ─► extract directives ─► dispatch (in order) ─► submit
//!              │               │                    │                 │
//!         DecodeError     DecodeError        DirectiveFailure     RelayError
//! ```
//!
//! Steps run strictly in sequence. Submission is the last step and happens
//! at most once, only after every directive succeeded and only if no
//! cancellation was observed.

use crate::domain::error::{RelayError, SendTransactionError};
use crate::middleware::GatewayMetrics;
use crate::ports::ExecutionClient;
use crate::relay::Dispatcher;
use crate::tx::{decode_hex_transaction, extract_directives, DecodedTransaction};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

pub struct Relayer {
    dispatcher: Dispatcher,
    execution: Arc<dyn ExecutionClient>,
    submit_timeout: Duration,
    max_transaction_size: usize,
    metrics: Option<Arc<GatewayMetrics>>,
}

impl Relayer {
    pub fn new(
        dispatcher: Dispatcher,
        execution: Arc<dyn ExecutionClient>,
        submit_timeout: Duration,
        max_transaction_size: usize,
    ) -> Self {
        Self {
            dispatcher,
            execution,
            submit_timeout,
            max_transaction_size,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<GatewayMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Relay a hex-encoded signed transaction. Returns its 0x-prefixed hash.
    pub async fn relay(&self, raw_tx_hex: &str) -> Result<String, SendTransactionError> {
        self.run(raw_tx_hex, None).await
    }

    /// Like [`relay`](Self::relay), aborting once `cancel` turns `true`.
    ///
    /// An in-flight directive invocation is dropped on cancellation and the
    /// transaction is never submitted afterwards.
    pub async fn relay_with_cancel(
        &self,
        raw_tx_hex: &str,
        cancel: watch::Receiver<bool>,
    ) -> Result<String, SendTransactionError> {
        self.run(raw_tx_hex, Some(cancel)).await
    }

    async fn run(
        &self,
        raw_tx_hex: &str,
        mut cancel: Option<watch::Receiver<bool>>,
    ) -> Result<String, SendTransactionError> {
        let span = info_span!("relay", relay_id = %Uuid::new_v4());

        async move {
            let tx = decode_hex_transaction(raw_tx_hex, self.max_transaction_size)
                .and_then(|tx| extract_directives(&tx.calldata).map(|d| (tx, d)));
            let (tx, directives) = match tx {
                Ok(decoded) => decoded,
                Err(e) => {
                    debug!(error = %e, "Rejected undecodable transaction");
                    self.record(GatewayMetrics::record_decode_failure);
                    return Err(e.into());
                }
            };

            info!(
                hash = %tx.hash_hex(),
                directives = directives.len(),
                "Relaying transaction"
            );

            for directive in &directives {
                if is_cancelled(&cancel) {
                    return Err(SendTransactionError::Cancelled);
                }

                let outcome = tokio::select! {
                    biased;
                    _ = wait_cancelled(&mut cancel) => {
                        warn!(index = directive.index(), "Relay cancelled during directive");
                        return Err(SendTransactionError::Cancelled);
                    }
                    outcome = self.dispatcher.dispatch(directive, &tx) => outcome,
                };

                if let Err(failure) = outcome {
                    self.record(GatewayMetrics::record_relay_rejected);
                    return Err(failure.into());
                }
                self.record(GatewayMetrics::record_directive_dispatched);
            }

            if is_cancelled(&cancel) {
                warn!("Relay cancelled before submission");
                return Err(SendTransactionError::Cancelled);
            }

            self.submit(&tx).await
        }
        .instrument(span)
        .await
    }

    async fn submit(&self, tx: &DecodedTransaction) -> Result<String, SendTransactionError> {
        let hash = tx.hash_hex();

        let result = tokio::time::timeout(self.submit_timeout, self.execution.send_transaction(tx))
            .await
            .unwrap_or(Err(RelayError::Timeout(self.submit_timeout)));

        match result {
            Ok(node_hash) => {
                if !node_hash.eq_ignore_ascii_case(&hash) {
                    warn!(
                        hash = %hash,
                        node_hash = %node_hash,
                        "Execution node reported a different transaction hash"
                    );
                }
                self.record(GatewayMetrics::record_relay_submitted);
                info!(hash = %hash, "Transaction relayed");
                Ok(hash)
            }
            Err(e) => {
                warn!(hash = %hash, error = %e, "Transaction submission failed");
                self.record(GatewayMetrics::record_relay_failed);
                Err(e.into())
            }
        }
    }

    fn record(&self, f: impl FnOnce(&GatewayMetrics)) {
        if let Some(metrics) = &self.metrics {
            f(metrics);
        }
    }
}

fn is_cancelled(cancel: &Option<watch::Receiver<bool>>) -> bool {
    cancel.as_ref().is_some_and(|rx| *rx.borrow())
}

/// Resolves once cancellation is requested. Never resolves without a
/// receiver or after the sender is dropped without cancelling.
async fn wait_cancelled(cancel: &mut Option<watch::Receiver<bool>>) {
    if let Some(rx) = cancel {
        let closed = rx.wait_for(|cancelled| *cancelled).await.is_err();
        if !closed {
            return;
        }
    }
    std::future::pending::<()>().await
}
