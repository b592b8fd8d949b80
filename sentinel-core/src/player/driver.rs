use super::decoder::{Decoder, DecoderFactory};
use super::machine::PlayerMachine;
use super::state::{PlayerSnapshot, PlayerState, SurfaceSize};
use super::transport::TransportKind;
use crate::backoff::Backoff;
use crate::error::MonitorError;

use sentinel_model::{Camera, CameraId, CameraStatus};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use url::Url;

#[derive(Debug)]
enum Command {
    Retry,
}

enum Phase {
    Connect,
    Backoff(Duration),
    Stop,
}

/// Playback unit of one camera.
///
/// A background task drives [`PlayerMachine`] against a [`Decoder`] and
/// publishes every transition as a [`PlayerSnapshot`]. The task, its decoder
/// and any pending reconnect timer die with the player.
pub struct StreamPlayer {
    camera_id: CameraId,
    url: Option<Url>,
    snapshot: Arc<watch::Sender<PlayerSnapshot>>,
    commands: Option<mpsc::UnboundedSender<Command>>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl fmt::Debug for StreamPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamPlayer")
            .field("camera_id", &self.camera_id)
            .field("url", &self.url.as_ref().map(Url::as_str))
            .field("snapshot", &*self.snapshot.borrow())
            .finish()
    }
}

impl StreamPlayer {
    /// Start playing `url` immediately.
    pub fn spawn(
        camera_id: CameraId,
        url: Url,
        factory: Arc<dyn DecoderFactory>,
        backoff: Backoff,
    ) -> Self {
        let kind = TransportKind::detect(&url);
        let (snapshot, _) = watch::channel(PlayerSnapshot::default());
        let snapshot = Arc::new(snapshot);
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        tracing::info!(camera_id = %camera_id, url = %url, transport = %kind, "starting player");
        let driver = Driver {
            camera_id: camera_id.clone(),
            url: url.clone(),
            kind,
            factory,
            machine: PlayerMachine::new(backoff),
            snapshot: Arc::clone(&snapshot),
            commands: rx,
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(driver.run());

        Self {
            camera_id,
            url: Some(url),
            snapshot,
            commands: Some(tx),
            cancel,
            task: Some(task),
        }
    }

    /// A player that never connects.
    pub fn offline(camera_id: CameraId) -> Self {
        let (snapshot, _) = watch::channel(PlayerSnapshot::offline());
        Self {
            camera_id,
            url: None,
            snapshot: Arc::new(snapshot),
            commands: None,
            cancel: CancellationToken::new(),
            task: None,
        }
    }

    /// Player for a roster entry: offline cameras and cameras without a
    /// stream get an offline player.
    pub fn for_camera(
        camera: &Camera,
        factory: Arc<dyn DecoderFactory>,
        backoff: Backoff,
    ) -> Self {
        match (&camera.stream_url, camera.status) {
            (Some(url), CameraStatus::Online | CameraStatus::Alert) => {
                Self::spawn(camera.id.clone(), url.clone(), factory, backoff)
            }
            _ => {
                tracing::debug!(camera_id = %camera.id, "camera has no playable stream");
                Self::offline(camera.id.clone())
            }
        }
    }

    pub fn camera_id(&self) -> &CameraId {
        &self.camera_id
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PlayerSnapshot> {
        self.snapshot.subscribe()
    }

    pub fn surface(&self) -> SurfaceSize {
        self.snapshot.borrow().surface
    }

    /// Record the size the player is currently rendered at.
    pub fn resize(&self, width: u32, height: u32) {
        let size = SurfaceSize::new(width, height);
        self.snapshot.send_if_modified(|snapshot| {
            if snapshot.surface == size {
                return false;
            }
            snapshot.surface = size;
            true
        });
    }

    /// Cancel any pending backoff and reconnect now with a fresh attempt
    /// counter. Ignored for offline or disposed players.
    pub fn retry(&self) {
        if let Some(commands) = &self.commands {
            let _ = commands.send(Command::Retry);
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Stop playback. The decoder and any reconnect timer are released by
    /// the time the returned future completes.
    pub async fn dispose(&mut self) {
        self.cancel.cancel();
        self.commands = None;
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                tracing::warn!(camera_id = %self.camera_id, error = %err, "player task ended abnormally");
            }
        }
        self.snapshot.send_modify(|snapshot| {
            snapshot.state = PlayerState::Offline;
            snapshot.next_retry_in = None;
        });
    }
}

impl Drop for StreamPlayer {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct Driver {
    camera_id: CameraId,
    url: Url,
    kind: TransportKind,
    factory: Arc<dyn DecoderFactory>,
    machine: PlayerMachine,
    snapshot: Arc<watch::Sender<PlayerSnapshot>>,
    commands: mpsc::UnboundedReceiver<Command>,
    cancel: CancellationToken,
}

impl Driver {
    async fn run(mut self) {
        let mut phase = Phase::Connect;
        loop {
            phase = match phase {
                Phase::Connect => self.connect().await,
                Phase::Backoff(delay) => self.wait(delay).await,
                Phase::Stop => break,
            };
        }

        self.machine.dispose();
        self.publish(|snapshot| snapshot.next_retry_in = None);
        tracing::debug!(camera_id = %self.camera_id, "player stopped");
    }

    async fn connect(&mut self) -> Phase {
        self.publish(|snapshot| snapshot.next_retry_in = None);
        tracing::debug!(
            camera_id = %self.camera_id,
            attempt = self.machine.attempt(),
            "connecting"
        );

        let mut decoder: Box<dyn Decoder> = self.factory.create(self.kind, &self.url);

        let opened = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Phase::Stop,
            command = self.commands.recv() => return self.on_command(command),
            opened = decoder.open() => opened,
        };

        match opened {
            Ok(info) => {
                self.machine.connected();
                self.publish(|snapshot| {
                    snapshot.frame = info.frame;
                    snapshot.last_error = None;
                });
                tracing::info!(camera_id = %self.camera_id, "stream playing");
            }
            Err(err) => return self.fault(err),
        }

        let fault = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Phase::Stop,
            command = self.commands.recv() => return self.on_command(command),
            fault = decoder.pump() => fault,
        };
        self.fault(fault)
    }

    async fn wait(&mut self, delay: Duration) -> Phase {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Phase::Stop,
            command = self.commands.recv() => self.on_command(command),
            _ = tokio::time::sleep(delay) => {
                self.machine.reconnect();
                Phase::Connect
            }
        }
    }

    fn on_command(&mut self, command: Option<Command>) -> Phase {
        match command {
            Some(Command::Retry) => {
                tracing::info!(camera_id = %self.camera_id, "manual retry");
                self.machine.manual_retry();
                Phase::Connect
            }
            None => Phase::Stop,
        }
    }

    fn fault(&mut self, err: MonitorError) -> Phase {
        let Some(delay) = self.machine.fault() else {
            return Phase::Stop;
        };
        tracing::warn!(
            camera_id = %self.camera_id,
            error = %err,
            transient = err.is_transient(),
            attempt = self.machine.attempt(),
            delay_secs = delay.as_secs(),
            "stream fault, scheduling reconnect"
        );
        let message = err.to_string();
        self.publish(|snapshot| {
            snapshot.next_retry_in = Some(delay);
            snapshot.last_error = Some(message);
        });
        Phase::Backoff(delay)
    }

    /// Sync state and attempt from the machine, then apply `extra`.
    fn publish(&self, extra: impl FnOnce(&mut PlayerSnapshot)) {
        let state = self.machine.state();
        let attempt = self.machine.attempt();
        self.snapshot.send_modify(|snapshot| {
            snapshot.state = state;
            snapshot.attempt = attempt;
            extra(snapshot);
        });
    }
}
