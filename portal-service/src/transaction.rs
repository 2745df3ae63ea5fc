//! Unit of work
//!
//! [`Transaction::run`] begins a database transaction, hands the callback a child
//! [`Context`] carrying it, then commits when the callback returns `Ok` and rolls back
//! when it returns `Err`. Every repository call made with the child context runs
//! inside that transaction.
//!
//! Calling `run` with a context that is already transactional joins the outer unit of
//! work: no savepoint is created and only the outermost call commits or rolls back.
//! If the callback panics the transaction handle is dropped and sqlx rolls it back.

use std::future::Future;
use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::Mutex;

use crate::context::{self, Context};
use crate::error::{DomainError, DomainResult};

/// Factory for units of work over a shared pool
#[derive(Clone, Debug)]
pub struct Transaction {
    pool: PgPool,
}

impl Transaction {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn run<T, F, Fut>(&self, ctx: &Context, f: F) -> DomainResult<T>
    where
        F: FnOnce(Context) -> Fut,
        Fut: Future<Output = DomainResult<T>>,
    {
        if ctx.transaction().is_some() {
            tracing::debug!(request_id = ?ctx.request_id(), "Joining active transaction");
            return f(ctx.clone()).await;
        }

        let tx = context::guard(ctx, async {
            self.pool.begin().await.map_err(DomainError::internal)
        })
        .await?;

        let handle = Arc::new(Mutex::new(Some(tx)));
        let result = f(ctx.with_transaction(handle.clone())).await;

        let Some(tx) = handle.lock().await.take() else {
            return result;
        };

        match result {
            Ok(value) => {
                tx.commit().await.map_err(DomainError::internal)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(
                        request_id = ?ctx.request_id(),
                        error = %rollback_err,
                        "Transaction rollback failed"
                    );
                }
                Err(err)
            }
        }
    }
}
