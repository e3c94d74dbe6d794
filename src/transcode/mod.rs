//! Hand-off to the external transcoder (ffmpeg).
//!
//! [`command::TranscodeCommandBuilder`] turns a manifest plus its rendition
//! selection into stream-map arguments; [`runner::TranscodeRunner`] spawns
//! the process and relays its progress lines.

pub mod command;
pub mod runner;

pub use command::{SecondaryAudio, TranscodeCommandBuilder, TranscodeInput};
pub use runner::TranscodeRunner;
