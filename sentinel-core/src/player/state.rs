use std::fmt;
use std::time::Duration;

/// Lifecycle of one camera player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlayerState {
    #[default]
    Connecting,
    Playing,
    Error,
    /// Camera has no playable stream, or the player was disposed.
    Offline,
}

/// Indicator shown on a camera card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerStatus {
    Loading,
    Playing,
    Error,
    Offline,
}

impl From<PlayerState> for PlayerStatus {
    fn from(state: PlayerState) -> Self {
        match state {
            PlayerState::Connecting => PlayerStatus::Loading,
            PlayerState::Playing => PlayerStatus::Playing,
            PlayerState::Error => PlayerStatus::Error,
            PlayerState::Offline => PlayerStatus::Offline,
        }
    }
}

impl PlayerStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PlayerStatus::Loading => "loading",
            PlayerStatus::Playing => "playing",
            PlayerStatus::Error => "error",
            PlayerStatus::Offline => "offline",
        }
    }
}

impl fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pixel dimensions of a rendered surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for SurfaceSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// What observers of a player see.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayerSnapshot {
    pub state: PlayerState,
    pub attempt: u32,
    /// Last size the player was rendered at; the overlay's coordinate frame.
    pub surface: SurfaceSize,
    /// Intrinsic frame size reported by the stream, when known.
    pub frame: Option<SurfaceSize>,
    /// Set while a reconnect is scheduled.
    pub next_retry_in: Option<Duration>,
    pub last_error: Option<String>,
}

impl PlayerSnapshot {
    pub fn offline() -> Self {
        Self {
            state: PlayerState::Offline,
            ..Self::default()
        }
    }

    pub fn status(&self) -> PlayerStatus {
        self.state.into()
    }
}
