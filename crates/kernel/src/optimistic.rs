//! Optimistic local mutation with rollback on failed commit.

use std::future::Future;

/// Apply `mutate` right away, then run `commit`. If the commit fails, the
/// snapshot returned by `mutate` is handed to `rollback` and the error is
/// returned.
///
/// `commit` is only invoked after `mutate` has run.
pub async fn apply_optimistic<S, T, E, M, C, Fut, R>(
    mutate: M,
    commit: C,
    rollback: R,
) -> Result<T, E>
where
    M: FnOnce() -> S,
    C: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: FnOnce(S),
{
    let snapshot = mutate();
    match commit().await {
        Ok(value) => Ok(value),
        Err(err) => {
            rollback(snapshot);
            Err(err)
        }
    }
}
