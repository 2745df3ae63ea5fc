//! Request-scoped context
//!
//! A [`Context`] travels with every repository call. It carries the request id used
//! for log correlation, a cancellation token, an optional deadline and, inside a
//! unit of work, the active database transaction.
//!
//! The transaction slot is private to this crate: only
//! [`Transaction::run`](crate::transaction::Transaction::run) can bind it and only
//! repositories read it.

use std::sync::Arc;
use std::time::Duration;

use sqlx::Postgres;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{DomainError, DomainResult, ErrorCode};

/// Shared handle to an open transaction
///
/// The slot becomes `None` once the owning unit of work commits or rolls back.
pub(crate) type TxHandle = Arc<Mutex<Option<sqlx::Transaction<'static, Postgres>>>>;

/// Request-scoped values passed explicitly through the call chain
#[derive(Clone, Default)]
pub struct Context {
    request_id: Option<String>,
    cancellation: CancellationToken,
    deadline: Option<Instant>,
    tx: Option<TxHandle>,
}

impl Context {
    /// Empty context: no request id, never canceled, no deadline
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Tie this context to an externally owned cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) if current < deadline => current,
            _ => deadline,
        });
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Context for work that must outlive the current request
    ///
    /// Keeps the request id for logging but drops cancellation, deadline and any
    /// transaction binding.
    pub fn detached(&self) -> Self {
        Self {
            request_id: self.request_id.clone(),
            ..Self::default()
        }
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_canceled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Fail fast when the context is already canceled or past its deadline
    pub fn check(&self) -> DomainResult<()> {
        if self.cancellation.is_cancelled() {
            return Err(canceled());
        }
        if matches!(self.deadline, Some(deadline) if deadline <= Instant::now()) {
            return Err(deadline_exceeded());
        }
        Ok(())
    }

    pub(crate) fn transaction(&self) -> Option<&TxHandle> {
        self.tx.as_ref()
    }

    pub(crate) fn with_transaction(&self, tx: TxHandle) -> Self {
        Self {
            tx: Some(tx),
            ..self.clone()
        }
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("request_id", &self.request_id)
            .field("canceled", &self.cancellation.is_cancelled())
            .field("deadline", &self.deadline)
            .field("in_transaction", &self.tx.is_some())
            .finish()
    }
}

pub(crate) fn canceled() -> DomainError {
    DomainError::wrap(ErrorCode::Canceled, "context canceled")
}

pub(crate) fn deadline_exceeded() -> DomainError {
    DomainError::wrap(ErrorCode::DeadlineExceeded, "context deadline exceeded")
}

/// Race `fut` against the context's cancellation and deadline
pub(crate) async fn guard<T, F>(ctx: &Context, fut: F) -> DomainResult<T>
where
    F: std::future::Future<Output = DomainResult<T>>,
{
    ctx.check()?;

    let deadline = async {
        match ctx.deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        _ = ctx.cancellation.cancelled() => Err(canceled()),
        _ = deadline => Err(deadline_exceeded()),
        result = fut => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_context_is_live() {
        let ctx = Context::background().with_request_id("req-1");
        assert_eq!(ctx.request_id(), Some("req-1"));
        assert!(ctx.check().is_ok());
        assert!(ctx.transaction().is_none());
    }

    #[test]
    fn test_canceled_context_fails_check() {
        let token = CancellationToken::new();
        let ctx = Context::background().with_cancellation(token.clone());
        token.cancel();

        let err = ctx.check().unwrap_err();
        assert_eq!(err.code(), ErrorCode::Canceled);
    }

    #[tokio::test]
    async fn test_elapsed_deadline_fails_check() {
        let ctx = Context::background().with_deadline(Instant::now() - Duration::from_millis(1));
        let err = ctx.check().unwrap_err();
        assert_eq!(err.code(), ErrorCode::DeadlineExceeded);
    }

    #[tokio::test]
    async fn test_deadline_only_tightens() {
        let soon = Instant::now() + Duration::from_secs(1);
        let later = soon + Duration::from_secs(60);
        let ctx = Context::background().with_deadline(soon).with_deadline(later);
        assert_eq!(ctx.deadline(), Some(soon));
    }

    #[tokio::test]
    async fn test_guard_aborts_on_cancel() {
        let token = CancellationToken::new();
        let ctx = Context::background().with_cancellation(token.clone());

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let result: DomainResult<()> = guard(&ctx, std::future::pending()).await;
        assert_eq!(result.unwrap_err().code(), ErrorCode::Canceled);
    }

    #[tokio::test]
    async fn test_guard_aborts_on_deadline() {
        let ctx = Context::background().with_timeout(Duration::from_millis(10));
        let result: DomainResult<()> = guard(&ctx, std::future::pending()).await;
        assert_eq!(result.unwrap_err().code(), ErrorCode::DeadlineExceeded);
    }

    #[tokio::test]
    async fn test_detached_drops_cancellation() {
        let token = CancellationToken::new();
        let ctx = Context::background()
            .with_request_id("req-2")
            .with_cancellation(token.clone());
        token.cancel();

        let detached = ctx.detached();
        assert!(detached.check().is_ok());
        assert_eq!(detached.request_id(), Some("req-2"));
    }
}
