//! Server-sent events for configuration changes.

use std::convert::Infallible;

use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::Stream;
use futures_util::stream;
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use super::notifier::ChangeNotifier;

/// Subscribe to the notifier and stream every update as an SSE event.
///
/// Lagged receivers skip ahead rather than terminating the stream; the
/// stream ends only when the notifier is dropped.
pub fn event_stream(
    notifier: &ChangeNotifier,
) -> Sse<impl Stream<Item = Result<Event, Infallible>> + use<>> {
    let rx = notifier.subscribe();
    let stream = stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(msg) => {
                    let event = match serde_json::to_string(&msg) {
                        Ok(data) => Event::default().event("update").data(data),
                        Err(e) => {
                            debug!(error = %e, "skipping unserializable update");
                            continue;
                        }
                    };
                    return Some((Ok(event), rx));
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "subscriber lagged behind notifier");
                    continue;
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
