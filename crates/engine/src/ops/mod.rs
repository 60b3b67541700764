use std::{future::Future, time::Duration};

use sea_orm::DatabaseConnection;

use crate::{EngineError, ResultEngine};

mod access;
mod balances;
mod expenses;
mod groups;
mod settlements;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
///
/// The transaction rolls back when it is dropped without a commit, which also
/// covers the block being cancelled by a deadline.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result: ResultEngine<_> = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    operation_timeout: Option<Duration>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Bound an operation by the configured deadline.
    ///
    /// On expiry the operation future is dropped, its open transaction rolls
    /// back, and the caller gets a retryable [`EngineError::Transient`].
    async fn with_deadline<T, F>(&self, operation: F) -> ResultEngine<T>
    where
        F: Future<Output = ResultEngine<T>>,
    {
        match self.operation_timeout {
            Some(limit) => tokio::time::timeout(limit, operation)
                .await
                .map_err(|_| EngineError::Transient("operation timed out".to_string()))?,
            None => operation.await,
        }
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    operation_timeout: Option<Duration>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Upper bound for a single operation, transaction included.
    pub fn operation_timeout(mut self, timeout: Duration) -> EngineBuilder {
        self.operation_timeout = Some(timeout);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            operation_timeout: self.operation_timeout.filter(|t| !t.is_zero()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn expired_deadline_is_transient() {
        let engine = Engine::builder()
            .operation_timeout(Duration::from_millis(10))
            .build()
            .await
            .unwrap();
        let err = engine
            .with_deadline(std::future::pending::<ResultEngine<()>>())
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(err, EngineError::Transient("operation timed out".to_string()));
    }

    #[tokio::test]
    async fn operations_without_deadline_run_to_completion() {
        let engine = Engine::builder().build().await.unwrap();
        let value = engine.with_deadline(async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);
    }
}
