//! ffmpeg process backend

use super::traits::Transcoder;
use crate::error::{Result, SpeedshiftError};
use crate::filter::FilterChain;
use crate::types::Job;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, trace, warn};

/// Executable name resolved through PATH when none is configured
pub const DEFAULT_FFMPEG: &str = "ffmpeg";

/// Runs one ffmpeg process per job
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    executable: PathBuf,
}

impl FfmpegTranscoder {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Argument list for one job.
    ///
    /// Passthrough: `-i <in> -c copy -y <out>`.
    /// Filtered: `-i <in> -filter:a <chain> -c:v copy -y <out>`; video is never re-encoded.
    pub fn build_args(job: &Job, chain: &FilterChain) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-hide_banner".into(),
            "-loglevel".into(),
            "error".into(),
            "-i".into(),
            job.input_path.clone().into_os_string(),
        ];

        match chain.to_filter_expression() {
            None => {
                args.push("-c".into());
                args.push("copy".into());
            }
            Some(expr) => {
                args.push("-filter:a".into());
                args.push(expr.into());
                args.push("-c:v".into());
                args.push("copy".into());
            }
        }

        args.push("-y".into());
        args.push(job.output_path.clone().into_os_string());
        args
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new(DEFAULT_FFMPEG)
    }
}

impl Transcoder for FfmpegTranscoder {
    fn transcode(&self, job: &Job, chain: &FilterChain) -> Result<()> {
        let mut cmd = Command::new(&self.executable);
        cmd.args(Self::build_args(job, chain))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            const CREATE_NO_WINDOW: u32 = 0x0800_0000;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        trace!(ffmpeg_cmd = ?cmd);

        let output = cmd.output().map_err(|e| {
            if e.kind() != ErrorKind::NotFound {
                warn!("Cannot launch {}: {}", self.executable.display(), e);
            }
            SpeedshiftError::ExecutableNotFound {
                executable: self.executable.clone(),
            }
        })?;

        if output.status.success() {
            debug!("ffmpeg finished: {}", job.output_path.display());
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let diagnostic = match stderr.trim() {
            "" => format!("ffmpeg exited with {}", output.status),
            text => text.to_string(),
        };

        Err(SpeedshiftError::ProcessFailure {
            path: job.input_path.clone(),
            diagnostic,
        })
    }

    fn name(&self) -> &'static str {
        "ffmpeg"
    }
}
