//! Directive dispatcher.
//!
//! Turns a single directive into one bounded call on the [`ServiceInvoker`]
//! and reports any failure as a [`DirectiveFailure`] tagged with the
//! directive's position.

use crate::domain::error::{DirectiveFailure, InvocationError};
use crate::ports::ServiceInvoker;
use crate::tx::{DecodedTransaction, Directive};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub struct Dispatcher {
    invoker: Arc<dyn ServiceInvoker>,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(invoker: Arc<dyn ServiceInvoker>, timeout: Duration) -> Self {
        Self { invoker, timeout }
    }

    /// Run one directive.
    ///
    /// Empty and non-UTF-8 directives are rejected as malformed without
    /// reaching the invoker.
    pub async fn dispatch(
        &self,
        directive: &Directive,
        tx: &DecodedTransaction,
    ) -> Result<(), DirectiveFailure> {
        let fail = |cause: InvocationError| {
            warn!(
                index = directive.index(),
                directive = %directive.to_string_lossy(),
                error = %cause,
                "Directive failed"
            );
            DirectiveFailure {
                index: directive.index(),
                directive: directive.to_string_lossy().into_owned(),
                cause,
            }
        };

        if directive.is_empty() {
            return Err(fail(InvocationError::Malformed("empty directive".into())));
        }
        if directive.as_str().is_none() {
            return Err(fail(InvocationError::Malformed(
                "directive is not valid UTF-8".into(),
            )));
        }

        match tokio::time::timeout(self.timeout, self.invoker.invoke(directive, tx)).await {
            Ok(Ok(())) => {
                debug!(
                    index = directive.index(),
                    service = directive.service().unwrap_or_default(),
                    "Directive completed"
                );
                Ok(())
            }
            Ok(Err(cause)) => Err(fail(cause)),
            Err(_) => Err(fail(InvocationError::Timeout(self.timeout))),
        }
    }
}
