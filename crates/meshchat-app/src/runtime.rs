//! Generic runtime for application orchestration.
//!
//! The Runtime drives two event sources against one [`App`]:
//! - the keyboard stream, awaited on the caller's task;
//! - the packet channel, drained by a spawned receive task.
//!
//! Both dispatch under the same session lock, and each dispatch ends with a
//! single render of the panes it touched before the lock is released.

use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio::sync::{Mutex, mpsc};
use tracing::{info, warn};

use crate::{App, AppAction, AppEvent, Driver, Pane, mesh::MeshPacket};

/// Capacity of the packet channel between the transport and the runtime.
pub const PACKET_CHANNEL_CAPACITY: usize = 64;

/// App and driver, guarded together.
struct Session<D> {
    app: App,
    driver: D,
}

enum Flow {
    Continue,
    Quit,
}

impl<D: Driver> Session<D> {
    /// Feed one event through the app, execute its actions and render once.
    fn dispatch(&mut self, event: AppEvent) -> Result<Flow, D::Error> {
        let mut panes: Vec<Pane> = Vec::new();
        let mut pending = self.app.handle(event);
        let mut quit = false;

        while !pending.is_empty() {
            let actions = std::mem::take(&mut pending);

            for action in actions {
                match action {
                    AppAction::Render(pane) => {
                        if !panes.contains(&pane) {
                            panes.push(pane);
                        }
                    },
                    AppAction::SendText { body, destination, channel_index } => {
                        if let Err(error) = self.driver.send_text(&body, destination, channel_index)
                        {
                            warn!(%error, ?destination, "failed to queue text message");
                            self.app.set_status(format!("Send failed: {error}"));
                            pending.push(AppAction::Render(Pane::Status));
                        }
                    },
                    AppAction::RefreshRoster => {
                        let nodes = self.driver.node_snapshot();
                        pending.extend(self.app.handle(AppEvent::RosterSnapshot(nodes)));
                    },
                    AppAction::Quit => quit = true,
                }
            }
        }

        if quit {
            return Ok(Flow::Quit);
        }
        if !panes.is_empty() {
            self.driver.render(&self.app, &panes)?;
        }
        Ok(Flow::Continue)
    }
}

/// Generic runtime that orchestrates App and Driver.
///
/// # Type Parameters
///
/// - `D`: Platform-specific I/O driver
pub struct Runtime<D: Driver> {
    session: Arc<Mutex<Session<D>>>,
}

impl<D> Runtime<D>
where
    D: Driver + 'static,
{
    /// Create a new runtime around an initialized app.
    pub fn new(app: App, driver: D) -> Self {
        Self { session: Arc::new(Mutex::new(Session { app, driver })) }
    }

    /// Run until Escape or the end of the key stream.
    ///
    /// Renders every pane once, spawns the receive task on `packets`, then
    /// dispatches keys as they arrive. Returns the final app state.
    ///
    /// # Errors
    ///
    /// Returns the first key stream error or keyboard-path render error.
    pub async fn run<K>(
        self,
        mut keys: K,
        packets: mpsc::Receiver<MeshPacket>,
    ) -> Result<App, D::Error>
    where
        K: Stream<Item = Result<AppEvent, D::Error>> + Unpin,
    {
        {
            let mut session = self.session.lock().await;
            let Session { app, driver } = &mut *session;
            driver.render(app, &[Pane::All])?;
        }

        let receiver = tokio::spawn(receive_loop(Arc::clone(&self.session), packets));

        let result = loop {
            let Some(event) = keys.next().await else {
                info!("key stream ended");
                break Ok(());
            };
            let event = match event {
                Ok(event) => event,
                Err(error) => break Err(error),
            };

            let mut session = self.session.lock().await;
            match session.dispatch(event) {
                Ok(Flow::Continue) => {},
                Ok(Flow::Quit) => break Ok(()),
                Err(error) => break Err(error),
            }
        };

        receiver.abort();
        let _ = receiver.await;

        let mut session = self.session.lock().await;
        session.driver.stop();
        result.map(|()| session.app.clone())
    }
}

/// Dispatch every received packet, then report the closed link.
async fn receive_loop<D: Driver>(
    session: Arc<Mutex<Session<D>>>,
    mut packets: mpsc::Receiver<MeshPacket>,
) {
    while let Some(packet) = packets.recv().await {
        let mut session = session.lock().await;
        if let Err(error) = session.dispatch(AppEvent::PacketReceived(packet)) {
            warn!(%error, "render failed on receive path");
        }
    }

    info!("packet channel closed");
    let mut session = session.lock().await;
    if let Err(error) = session.dispatch(AppEvent::LinkClosed) {
        warn!(%error, "render failed on receive path");
    }
}
