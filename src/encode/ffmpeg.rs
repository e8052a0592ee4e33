//! Capture backend that encodes through the system `ffmpeg`.
//!
//! Frames are written to stdin as raw RGBA; the container is streamed back on stdout and
//! collected in chunks, so nothing touches disk until the download step.

use std::collections::HashSet;
use std::io::{Read, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use crate::encode::sink::{CaptureBackend, EncodedBlob, EncoderHandle, StreamSpec};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{StoryError, StoryResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::backend::FrameRGBA;

const STDOUT_CHUNK: usize = 64 * 1024;

/// How one mime type maps onto `ffmpeg` muxer and codecs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct EncoderProfile {
    pub(crate) muxer: &'static str,
    pub(crate) video_codec: &'static str,
    pub(crate) audio_codec: &'static str,
    pub(crate) video_args: &'static [&'static str],
    pub(crate) mux_args: &'static [&'static str],
}

const FRAGMENTED_MP4: &[&str] = &["-movflags", "frag_keyframe+empty_moov+default_base_moof"];

/// Muxer and codecs for `mime`, if it is one we know how to produce.
pub(crate) fn profile_for(mime: &str) -> Option<EncoderProfile> {
    let normalized: String = mime
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    let profile = match normalized.as_str() {
        "video/mp4;codecs=avc1.42e01e,mp4a.40.2" => EncoderProfile {
            muxer: "mp4",
            video_codec: "libx264",
            audio_codec: "aac",
            video_args: &["-profile:v", "baseline", "-level", "3.0"],
            mux_args: FRAGMENTED_MP4,
        },
        "video/mp4" => EncoderProfile {
            muxer: "mp4",
            video_codec: "libx264",
            audio_codec: "aac",
            video_args: &[],
            mux_args: FRAGMENTED_MP4,
        },
        "video/webm;codecs=h264" => EncoderProfile {
            muxer: "matroska",
            video_codec: "libx264",
            audio_codec: "libopus",
            video_args: &[],
            mux_args: &[],
        },
        "video/webm;codecs=vp9" => EncoderProfile {
            muxer: "webm",
            video_codec: "libvpx-vp9",
            audio_codec: "libopus",
            video_args: &["-deadline", "realtime", "-cpu-used", "8"],
            mux_args: &[],
        },
        "video/webm" => EncoderProfile {
            muxer: "webm",
            video_codec: "libvpx",
            audio_codec: "libopus",
            video_args: &["-deadline", "realtime", "-cpu-used", "8"],
            mux_args: &[],
        },
        _ => return None,
    };
    Some(profile)
}

/// Capture backend over the system `ffmpeg`.
#[derive(Clone, Debug)]
pub struct FfmpegCapture {
    encoders: Option<HashSet<String>>,
    bg_rgba: [u8; 4],
}

impl FfmpegCapture {
    /// Probe the `ffmpeg` on `PATH` for its encoder list.
    ///
    /// A missing or broken `ffmpeg` yields an unavailable backend rather than an error.
    pub fn probe() -> Self {
        let encoders = list_encoders();
        match &encoders {
            Some(set) => tracing::debug!(count = set.len(), "ffmpeg encoders detected"),
            None => tracing::debug!("ffmpeg not available for capture"),
        }
        Self {
            encoders,
            bg_rgba: [0, 0, 0, 255],
        }
    }

    /// Backend with an explicit encoder list, bypassing the probe.
    pub fn with_encoders<I, S>(encoders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            encoders: Some(encoders.into_iter().map(Into::into).collect()),
            bg_rgba: [0, 0, 0, 255],
        }
    }

    fn has_encoder(&self, name: &str) -> bool {
        self.encoders.as_ref().is_some_and(|set| set.contains(name))
    }
}

impl CaptureBackend for FfmpegCapture {
    fn is_available(&self) -> bool {
        self.encoders.is_some()
    }

    fn is_type_supported(&self, mime: &str) -> bool {
        profile_for(mime).is_some_and(|p| self.has_encoder(p.video_codec))
    }

    fn begin_capture(&mut self, spec: StreamSpec) -> StoryResult<Box<dyn EncoderHandle>> {
        let profile = profile_for(&spec.mime)
            .ok_or_else(|| StoryError::encoder(format!("no ffmpeg profile for '{}'", spec.mime)))?;
        if spec.width == 0 || spec.height == 0 {
            return Err(StoryError::validation("capture width/height must be non-zero"));
        }
        if !spec.width.is_multiple_of(2) || !spec.height.is_multiple_of(2) {
            return Err(StoryError::validation(
                "capture width/height must be even (required for yuv420p output)",
            ));
        }
        let with_audio = spec.audio.is_some() && self.has_encoder(profile.audio_codec);
        if spec.audio.is_some() && !with_audio {
            tracing::warn!(codec = profile.audio_codec, "audio encoder missing, exporting video only");
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd.args([
            "-hide_banner",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", spec.width, spec.height),
        ]);
        push_input_fps(&mut cmd, spec.fps);
        cmd.args(["-i", "pipe:0"]);

        match spec.audio.as_ref().filter(|_| with_audio) {
            Some(audio) => {
                if audio.sample_rate == 0 || audio.channels == 0 {
                    return Err(StoryError::validation(
                        "audio sample_rate and channels must be non-zero",
                    ));
                }
                cmd.args([
                    "-f",
                    "f32le",
                    "-ar",
                    &audio.sample_rate.to_string(),
                    "-ac",
                    &audio.channels.to_string(),
                    "-i",
                ])
                .arg(&audio.path)
                .args(["-c:a", profile.audio_codec, "-shortest"]);
            }
            None => {
                cmd.arg("-an");
            }
        }

        cmd.args(["-c:v", profile.video_codec, "-pix_fmt", "yuv420p"])
            .args(profile.video_args)
            .args(["-b:v", &spec.video_bits_per_second.to_string()])
            .args(profile.mux_args)
            .args(["-f", profile.muxer, "pipe:1"]);

        tracing::debug!(mime = %spec.mime, muxer = profile.muxer, codec = profile.video_codec, "spawning ffmpeg");
        let mut child = cmd.spawn().map_err(|e| {
            StoryError::encoder(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let (Some(stdin), Some(mut stdout), Some(mut stderr)) = (stdin, stdout, stderr) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(StoryError::encoder("failed to open ffmpeg pipes (unexpected)"));
        };

        let stdout_drain = std::thread::spawn(move || -> std::io::Result<Vec<Vec<u8>>> {
            let mut chunks = Vec::new();
            let mut buf = vec![0u8; STDOUT_CHUNK];
            loop {
                let n = stdout.read(&mut buf)?;
                if n == 0 {
                    return Ok(chunks);
                }
                chunks.push(buf[..n].to_vec());
            }
        });
        let stderr_drain = std::thread::spawn(move || -> std::io::Result<Vec<u8>> {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        Ok(Box::new(FfmpegEncoder {
            mime: spec.mime.clone(),
            width: spec.width,
            height: spec.height,
            bg_rgba: self.bg_rgba,
            child,
            stdin: Some(stdin),
            stdout_drain: Some(stdout_drain),
            stderr_drain: Some(stderr_drain),
            scratch: vec![0u8; (spec.width as usize) * (spec.height as usize) * 4],
            last_idx: None,
        }))
    }
}

struct FfmpegEncoder {
    mime: String,
    width: u32,
    height: u32,
    bg_rgba: [u8; 4],
    child: Child,
    stdin: Option<ChildStdin>,
    stdout_drain: Option<JoinHandle<std::io::Result<Vec<Vec<u8>>>>>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
    scratch: Vec<u8>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegEncoder {
    fn join_stderr(&mut self) -> String {
        match self.stderr_drain.take().map(JoinHandle::join) {
            Some(Ok(Ok(bytes))) => String::from_utf8_lossy(&bytes).trim().to_owned(),
            _ => String::new(),
        }
    }
}

impl EncoderHandle for FfmpegEncoder {
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> StoryResult<()> {
        if let Some(last) = self.last_idx
            && idx <= last
        {
            return Err(StoryError::encoder("encoder received out-of-order frame index"));
        }
        self.last_idx = Some(idx);

        if frame.width != self.width || frame.height != self.height {
            return Err(StoryError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, self.width, self.height
            )));
        }
        flatten_premul_over_bg_to_opaque_rgba8(&mut self.scratch, &frame.data, self.bg_rgba)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(StoryError::encoder("encoder is already finalized"));
        };
        if let Err(e) = stdin.write_all(&self.scratch) {
            let stderr = self.join_stderr();
            return Err(StoryError::encoder(format!(
                "failed to write frame to ffmpeg stdin: {e} {stderr}"
            )));
        }
        Ok(())
    }

    fn stop(mut self: Box<Self>) -> StoryResult<EncodedBlob> {
        drop(self.stdin.take());
        let status = self
            .child
            .wait()
            .map_err(|e| StoryError::encoder(format!("failed to wait for ffmpeg to finish: {e}")))?;
        let chunks = match self.stdout_drain.take().map(JoinHandle::join) {
            Some(Ok(Ok(chunks))) => chunks,
            Some(Ok(Err(e))) => {
                return Err(StoryError::encoder(format!("ffmpeg stdout read failed: {e}")));
            }
            Some(Err(_)) => return Err(StoryError::encoder("ffmpeg stdout drain thread panicked")),
            None => Vec::new(),
        };
        let stderr = self.join_stderr();
        if !status.success() {
            return Err(StoryError::encoder(format!(
                "ffmpeg exited with status {status}: {stderr}"
            )));
        }
        Ok(EncodedBlob {
            mime: std::mem::take(&mut self.mime),
            chunks,
        })
    }

    fn abort(mut self: Box<Self>) {
        drop(self.stdin.take());
        let _ = self.child.kill();
        let _ = self.child.wait();
        if let Some(h) = self.stdout_drain.take() {
            let _ = h.join();
        }
        let _ = self.join_stderr();
    }
}

impl Drop for FfmpegEncoder {
    fn drop(&mut self) {
        if self.stdin.take().is_some() {
            tracing::warn!("ffmpeg encoder dropped without stop, killing child");
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

fn list_encoders() -> Option<HashSet<String>> {
    let out = Command::new("ffmpeg")
        .args(["-hide_banner", "-encoders"])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    Some(parse_encoder_list(&String::from_utf8_lossy(&out.stdout)))
}

/// Encoder names from `ffmpeg -encoders` output, skipping the legend.
pub(crate) fn parse_encoder_list(text: &str) -> HashSet<String> {
    text.lines()
        .skip_while(|l| !l.trim_start().starts_with("---"))
        .skip(1)
        .filter_map(|l| {
            let mut parts = l.split_whitespace();
            let flags = parts.next()?;
            let name = parts.next()?;
            (flags.len() == 6).then(|| name.to_owned())
        })
        .collect()
}

fn flatten_premul_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src_premul: &[u8],
    bg_rgba: [u8; 4],
) -> StoryResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(StoryError::validation(
            "frame.data size mismatch with width*height*4",
        ));
    }

    let [bg_r, bg_g, bg_b, _] = bg_rgba.map(u16::from);
    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255u16 - a;
        d[0] = (u16::from(s[0]) + mul_div255_u16(bg_r, inv)).min(255) as u8;
        d[1] = (u16::from(s[1]) + mul_div255_u16(bg_g, inv)).min(255) as u8;
        d[2] = (u16::from(s[2]) + mul_div255_u16(bg_b, inv)).min(255) as u8;
        d[3] = 255;
    }
    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> StoryResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
