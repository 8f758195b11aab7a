//! Bridges a driver run to an SSE response.
//!
//! Event order: one `seeded` event (cleared input + history sent to the
//! model), then `delta` events, then exactly one `done` or `error`.

use std::sync::Arc;

use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::stream::{self, BoxStream, StreamExt};
use tokio::sync::mpsc;
use tracing::debug;

use super::driver::{ResponseDriver, StreamMode, TurnEvent};
use crate::llm_client::ChatProvider;
use crate::session::{Conversation, SeededTurn, SharedSession};

const EVENT_BUFFER: usize = 64;

pub type TurnSse = Sse<BoxStream<'static, Result<Event, axum::Error>>>;

/// Runs the turn in a background task and returns its event stream.
///
/// The session must already have the turn marked as started; the task
/// commits the resulting history and releases the turn when the driver
/// returns, including when the client disconnects.
pub fn spawn_turn(
    mode: StreamMode,
    provider: Arc<dyn ChatProvider>,
    session: SharedSession,
    history: Conversation,
    seeded: SeededTurn,
) -> TurnSse {
    let (tx, rx) = mpsc::channel::<TurnEvent>(EVENT_BUFFER);

    tokio::spawn(async move {
        let driver = ResponseDriver::new(provider, mode);
        let outcome = driver.run(history, &tx).await;
        debug!("Turn ended with {:?}", outcome.status);
        session.lock().await.finish_turn(outcome.conversation);
    });

    let seeded = Event::default().event("seeded").json_data(&seeded);
    let turn_events = stream::unfold(rx, |mut rx| async move {
        let event = rx.recv().await?;
        let sse = Event::default().event(event.name()).json_data(&event);
        Some((sse, rx))
    });

    Sse::new(stream::once(async move { seeded }).chain(turn_events).boxed())
        .keep_alive(KeepAlive::default())
}
