use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::domain::repositories::RepositoryError;

/// Optional point in time by which an operation must complete.
///
/// When it elapses the wrapped future is dropped, cancelling any in-flight
/// store call, and the operation fails with `RepositoryError::Timeout`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    /// No deadline
    pub fn none() -> Self {
        Self(None)
    }

    pub fn at(instant: Instant) -> Self {
        Self(Some(instant))
    }

    pub fn after(duration: Duration) -> Self {
        Self(Some(Instant::now() + duration))
    }

    pub fn is_expired(&self) -> bool {
        self.0.is_some_and(|at| Instant::now() >= at)
    }

    /// Run `fut` to completion or until the deadline elapses
    pub async fn run<F, T, E>(&self, fut: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: From<RepositoryError>,
    {
        match self.0 {
            None => fut.await,
            Some(at) => match tokio::time::timeout_at(at, fut).await {
                Ok(result) => result,
                Err(_) => Err(E::from(RepositoryError::Timeout)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_deadline_runs_to_completion() {
        let result: Result<u32, RepositoryError> = Deadline::none().run(async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_elapsed_deadline_cancels() {
        let deadline = Deadline::after(Duration::from_millis(20));
        let result: Result<(), RepositoryError> = deadline
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(RepositoryError::Timeout)));
        assert!(deadline.is_expired());
    }
}
