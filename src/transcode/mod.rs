//! Per-file transcoding
//!
//! The [`Transcoder`] trait is the seam between the batch coordinator and the
//! external process; [`FfmpegTranscoder`] is the production backend.

pub mod ffmpeg;
pub mod traits;

pub use ffmpeg::FfmpegTranscoder;
pub use traits::{run_job, Transcoder};
