//! Per-call ambient state.

use relay_core::TraceContext;
use relay_error::{ClassifiedError, ProviderError, ProviderErrorKind};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Trace correlation, cancellation and deadline for one call.
///
/// The deadline bounds the whole call: every retry and every fallback
/// candidate together. Cloning shares the cancellation token.
///
/// # Examples
///
/// ```
/// use relay_client::CallContext;
/// use relay_core::TraceContext;
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() {
/// let ctx = CallContext::new()
///     .with_trace(TraceContext::new("trace-1").with_loop("loop-1"))
///     .with_timeout(Duration::from_secs(30));
///
/// assert_eq!(ctx.trace().trace_id.as_deref(), Some("trace-1"));
/// assert!(ctx.deadline().is_some());
/// ctx.cancel();
/// assert!(ctx.is_cancelled());
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    trace: TraceContext,
    cancellation: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    /// Context with no trace, no deadline and a fresh cancellation token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach trace correlation.
    pub fn with_trace(mut self, trace: TraceContext) -> Self {
        self.trace = trace;
        self
    }

    /// Use an externally owned cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Bound the call by an absolute deadline.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Bound the call by a timeout starting now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Trace correlation.
    pub fn trace(&self) -> &TraceContext {
        &self.trace
    }

    /// Cancellation token.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Cancel the call.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// Whether the call was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Run `future` unless the call is cancelled or its deadline passes first.
    ///
    /// Cancellation and deadline expiry are fatal: the caller stops without
    /// further retries or fallbacks.
    pub async fn guard<F: Future>(
        &self,
        provider: &str,
        future: F,
    ) -> Result<F::Output, ClassifiedError> {
        tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => {
                Err(ClassifiedError::fatal(ProviderError::new(
                    provider,
                    ProviderErrorKind::Cancelled,
                )))
            }
            _ = deadline_elapsed(self.deadline) => {
                Err(ClassifiedError::fatal(ProviderError::new(
                    provider,
                    ProviderErrorKind::DeadlineExceeded,
                )))
            }
            output = future => Ok(output),
        }
    }
}

async fn deadline_elapsed(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
