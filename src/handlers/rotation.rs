// src/handlers/rotation.rs

use crate::error::AppError;
use crate::key_manager::{KeySelector, SelectedKey};
use std::fmt::{Debug, Display};
use std::future::Future;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum RotationError<E>
where
    E: Display + Debug,
{
    /// No key could be selected at all.
    #[error(transparent)]
    Selection(#[from] AppError),

    #[error("call failed after {attempts} attempt(s): {last_error}")]
    AttemptsExhausted { attempts: u32, last_error: E },
}

/// Runs `op` with a selected key, marking the key failed and selecting again
/// whenever `op` returns an error.
///
/// At most `max_attempts` calls are made (at least one). Selection errors are
/// returned immediately.
pub async fn call_with_rotation<T, E, F, Fut>(
    selector: &KeySelector,
    max_attempts: u32,
    mut op: F,
) -> Result<T, RotationError<E>>
where
    E: Display + Debug,
    F: FnMut(SelectedKey) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        let key = selector.select().await?;
        let label = key.label.clone();
        info!(key.label = %label, attempt, max_attempts, "Attempting call with key");

        match op(key).await {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!(key.label = %label, attempt, error = %e, "Call failed with key");
                selector.mark_failed(&label, &e.to_string());

                if attempt >= max_attempts {
                    return Err(RotationError::AttemptsExhausted {
                        attempts: attempt,
                        last_error: e,
                    });
                }
            }
        }
    }
}
