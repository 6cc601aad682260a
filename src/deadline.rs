//! Explicit request deadlines.
//!
//! A `Deadline` is created by whoever owns the request (an HTTP handler, a test) and is passed
//! by value into every usecase and store call. Callees either check it before doing work or
//! race their futures against it with [`Deadline::run`]; a future that loses the race is
//! dropped, which cancels it at its next await point.

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    /// A deadline `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Self {
            at: Some(Instant::now() + timeout),
        }
    }

    /// A deadline that never elapses.
    pub fn none() -> Self {
        Self { at: None }
    }

    pub fn is_expired(&self) -> bool {
        matches!(self.at, Some(at) if Instant::now() >= at)
    }

    /// Fails with `AppError::Timeout` once the deadline has passed.
    pub fn check(&self) -> Result<(), AppError> {
        if self.is_expired() {
            return Err(AppError::Timeout("request deadline exceeded".into()));
        }
        Ok(())
    }

    /// Drives `fut` to completion unless the deadline passes first.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        self.check()?;
        match self.at {
            Some(at) => tokio::time::timeout_at(at, fut)
                .await
                .map_err(|_| AppError::Timeout("request deadline exceeded".into()))?,
            None => fut.await,
        }
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::none()
    }
}
