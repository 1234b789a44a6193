//! Poll-until-condition loops.
//!
//! While a case is BUSY or RUNNING the server expects clients to re-fetch
//! its metadata until it settles. This module provides that as an explicit
//! loop with a caller-supplied interval and cancellation token instead of a
//! self-rescheduling timer: the caller decides the cadence and owns the
//! token's lifetime.

use crate::client::Client;
use arachne_api::CaseRecord;
use eyre::Result;
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

/// A cancellation token pair for [`poll_until`]. Send `true` (or drop the
/// sender) to stop polling.
pub fn cancel_pair() -> (watch::Sender<bool>, watch::Receiver<bool>) {
    watch::channel(false)
}

/// Run `op` every `interval` until it produces a value, fails, or the
/// cancellation token fires.
///
/// Returns `Ok(Some(value))` when `op` produces a value, `Ok(None)` on
/// cancellation, and the error as soon as `op` fails. With `cancel = None`
/// the loop runs until `op` settles it.
pub async fn poll_until<T, F>(
    interval: Duration,
    mut cancel: Option<watch::Receiver<bool>>,
    mut op: F,
) -> Result<Option<T>>
where
    F: AsyncFnMut() -> Result<Option<T>>,
{
    loop {
        if let Some(rx) = &cancel
            && *rx.borrow()
        {
            return Ok(None);
        }

        if let Some(value) = op().await? {
            return Ok(Some(value));
        }

        match &mut cancel {
            None => tokio::time::sleep(interval).await,
            Some(rx) => {
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    changed = rx.changed() => {
                        if changed.is_err() || *rx.borrow() {
                            return Ok(None);
                        }
                    }
                }
            }
        }
    }
}

/// Follow a case through a lock, unlock, or time advance: re-fetch its
/// metadata until it leaves BUSY/RUNNING, then return the settled record.
pub async fn wait_while_busy(
    client: &Client,
    case: &str,
    interval: Duration,
    cancel: Option<watch::Receiver<bool>>,
) -> Result<Option<CaseRecord>> {
    poll_until(interval, cancel, async || {
        let meta = client.case_meta(case).await?;
        debug!(case = %meta.id, state = %meta.state, "polled case");
        Ok((!meta.state.is_busy()).then_some(meta))
    })
    .await
}
