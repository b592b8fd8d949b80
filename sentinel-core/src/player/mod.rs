//! Per-camera stream playback with automatic recovery.

mod decoder;
mod driver;
mod machine;
pub mod playlist;
mod state;
mod transport;

pub use decoder::{
    Decoder, DecoderFactory, HttpDecoderFactory, MediaInfo, PlaylistDecoder,
    ProgressiveDecoder, is_playable_content_type,
};
pub use driver::StreamPlayer;
pub use machine::PlayerMachine;
pub use state::{PlayerSnapshot, PlayerState, PlayerStatus, SurfaceSize};
pub use transport::TransportKind;
