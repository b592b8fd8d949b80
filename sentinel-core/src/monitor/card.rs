use crate::backoff::Backoff;
use crate::bus::{EventMultiplexer, Subscription, Topic};
use crate::overlay::{DisplayList, OverlayRenderer};
use crate::player::{DecoderFactory, PlayerSnapshot, PlayerStatus, StreamPlayer};

use parking_lot::Mutex;
use sentinel_model::{Camera, Event};
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Default)]
struct OverlayState {
    list: DisplayList,
    last_event: Option<Event>,
    redraws: u64,
}

impl OverlayState {
    fn redraw(&mut self, renderer: &OverlayRenderer, snapshot: &PlayerSnapshot) {
        self.list.resize(snapshot.surface);
        if let Some(event) = &self.last_event {
            renderer.render_event(&mut self.list, event);
            self.redraws += 1;
        }
    }
}

/// One camera tile: its player, its overlay and the subscription feeding it.
///
/// Each event for the camera repaints the overlay at the player's current
/// surface size. Dropping the card unsubscribes and stops the player.
pub struct CameraCard {
    camera: Camera,
    player: StreamPlayer,
    renderer: OverlayRenderer,
    overlay: Arc<Mutex<OverlayState>>,
    subscription: Subscription,
}

impl fmt::Debug for CameraCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CameraCard")
            .field("camera", &self.camera.id)
            .field("status", &self.status())
            .field("subscription", &self.subscription)
            .finish()
    }
}

impl CameraCard {
    pub fn new(
        camera: Camera,
        mux: &EventMultiplexer,
        factory: Arc<dyn DecoderFactory>,
        backoff: Backoff,
    ) -> Self {
        let player = StreamPlayer::for_camera(&camera, factory, backoff);
        Self::with_player(camera, mux, player)
    }

    pub fn with_player(camera: Camera, mux: &EventMultiplexer, player: StreamPlayer) -> Self {
        let renderer = OverlayRenderer::default();
        let overlay = Arc::new(Mutex::new(OverlayState::default()));

        let frame: watch::Receiver<PlayerSnapshot> = player.subscribe();
        let target = Arc::clone(&overlay);
        let subscription = mux.subscribe(Topic::from(&camera.id), move |event: &Event| {
            let snapshot = frame.borrow().clone();
            let mut overlay = target.lock();
            overlay.last_event = Some(event.clone());
            overlay.redraw(&renderer, &snapshot);
        });

        Self {
            camera,
            player,
            renderer,
            overlay,
            subscription,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn player(&self) -> &StreamPlayer {
        &self.player
    }

    pub fn status(&self) -> PlayerStatus {
        self.player.snapshot().status()
    }

    /// Record a new rendered size and repaint the last event at it.
    pub fn resize(&self, width: u32, height: u32) {
        self.player.resize(width, height);
        let snapshot = self.player.snapshot();
        self.overlay.lock().redraw(&self.renderer, &snapshot);
    }

    pub fn retry(&self) {
        self.player.retry();
    }

    pub fn overlay(&self) -> DisplayList {
        self.overlay.lock().list.clone()
    }

    pub fn last_event(&self) -> Option<Event> {
        self.overlay.lock().last_event.clone()
    }

    pub fn redraws(&self) -> u64 {
        self.overlay.lock().redraws
    }

    pub async fn dispose(mut self) {
        self.subscription.unsubscribe();
        self.player.dispose().await;
    }
}
