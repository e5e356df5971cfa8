//! Heartbeat driver
//!
//! Plays the host side of the plugin contract: arms the heartbeat returned by
//! `on_start`, runs the network phases as background tasks and feeds their
//! outcome back to the plugin on the driver's own task, so the plugin itself
//! is only ever touched from one place.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};

use crate::error::AppError;
use crate::host::{DeviceRegistry, ImageRegistry, Parameters};
use crate::plugin::SteamPlugin;
use crate::steam::{ProfileRequest, ProfileSource};

/// Callback produced by a fetch task
#[derive(Debug)]
enum HostEvent {
    Connected(Result<(), AppError>),
    Message(String),
    Disconnected(AppError),
}

pub struct HostRuntime<H, S> {
    plugin: SteamPlugin<H>,
    source: Arc<S>,
}

impl<H, S> HostRuntime<H, S>
where
    H: DeviceRegistry + ImageRegistry,
    S: ProfileSource,
{
    pub fn new(plugin: SteamPlugin<H>, source: S) -> Self {
        Self {
            plugin,
            source: Arc::new(source),
        }
    }

    /// Run until `shutdown` resolves, then stop the plugin and hand it back.
    pub async fn run<F>(mut self, params: &dyn Parameters, shutdown: F) -> SteamPlugin<H>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let Some(period) = self.plugin.on_start(params) else {
            tracing::warn!("[Host] Heartbeat not armed, idling until shutdown");
            shutdown.await;
            self.plugin.on_stop();
            return self.plugin;
        };

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut heartbeat = interval(period);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = heartbeat.tick() => {
                    if let Some(request) = self.plugin.on_heartbeat() {
                        self.spawn_fetch(request, tx.clone());
                    }
                }
                Some(event) = rx.recv() => self.dispatch(event),
            }
        }

        tracing::info!("[Host] Shutting down");
        self.plugin.on_stop();
        self.plugin
    }

    fn dispatch(&mut self, event: HostEvent) {
        match event {
            HostEvent::Connected(result) => self.plugin.on_connect(result),
            HostEvent::Message(body) => {
                if let Some(report) = self.plugin.on_message(&body) {
                    tracing::debug!(
                        "[Host] Reconciled: {} (created {:?})",
                        report.view.display_text,
                        report.created
                    );
                }
            }
            HostEvent::Disconnected(e) => self.plugin.on_disconnect(e),
        }
    }

    fn spawn_fetch(&self, request: ProfileRequest, tx: mpsc::UnboundedSender<HostEvent>) {
        let source = self.source.clone();
        tokio::spawn(async move {
            let connection = match source.connect(&request).await {
                Ok(connection) => connection,
                Err(e) => {
                    let _ = tx.send(HostEvent::Connected(Err(e)));
                    return;
                }
            };
            let _ = tx.send(HostEvent::Connected(Ok(())));

            let event = match source.receive(connection).await {
                Ok(body) => HostEvent::Message(body),
                Err(e) => HostEvent::Disconnected(e),
            };
            let _ = tx.send(event);
        });
    }
}
