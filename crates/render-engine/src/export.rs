//! Export configuration and job management.

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Deserialize;

use retrocast_common::clock::{FrameClock, Stopwatch};
use retrocast_common::config::VideoSettings;
use retrocast_common::error::{RetrocastError, RetrocastResult};

use crate::frames::FrameSequence;

/// Encoder settings for one output video.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,

    /// Declared length of the output video.
    pub duration_secs: f64,

    /// x264 preset.
    pub preset: String,

    /// x264 constant rate factor.
    pub crf: u8,
}

impl ExportConfig {
    pub fn from_settings(settings: &VideoSettings) -> Self {
        Self {
            width: settings.width,
            height: settings.height,
            fps: settings.fps,
            duration_secs: settings.duration_secs() as f64,
            preset: settings.preset.clone(),
            crf: settings.crf,
        }
    }

    pub fn clock(&self) -> FrameClock {
        FrameClock::new(self.fps)
    }
}

/// An export job ready to be encoded.
#[derive(Debug, Clone)]
pub struct ExportJob {
    /// Final output file path.
    pub output_path: PathBuf,

    /// Export configuration.
    pub config: ExportConfig,
}

impl ExportJob {
    pub fn new(output_path: impl Into<PathBuf>, settings: &VideoSettings) -> Self {
        Self {
            output_path: output_path.into(),
            config: ExportConfig::from_settings(settings),
        }
    }

    /// Temporary encode target next to the output, e.g. `.ATXweather.partial.mp4`.
    pub fn staging_path(&self) -> PathBuf {
        let stem = self
            .output_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        let ext = self
            .output_path
            .extension()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "mp4".to_string());
        self.output_path
            .with_file_name(format!(".{stem}.partial.{ext}"))
    }
}

/// Progress callback for export encoding.
pub type ProgressCallback = Box<dyn Fn(ExportProgress) + Send>;

/// Export progress report.
#[derive(Debug, Clone)]
pub struct ExportProgress {
    /// Current progress [0.0, 1.0].
    pub progress: f64,

    /// Frames encoded so far.
    pub frames_encoded: u64,

    /// Total frames to encode.
    pub total_frames: u64,

    /// Estimated time remaining in seconds.
    pub eta_secs: f64,

    /// Current stage.
    pub stage: ExportStage,
}

/// Stages of the export process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Preparing,
    Encoding,
    Verifying,
    Complete,
}

/// Encodes a frame sequence into a video file.
pub trait RenderBackend {
    /// Encode `frames` into `target` according to `job.config`.
    fn encode(
        &mut self,
        frames: &FrameSequence,
        job: &ExportJob,
        target: &Path,
        progress: Option<&ProgressCallback>,
    ) -> RetrocastResult<()>;

    /// Check if this backend is available on the system.
    fn is_available(&self) -> bool;

    /// Backend name.
    fn name(&self) -> &str;
}

/// Encode a frame sequence to `job.output_path`.
///
/// Shorthand for [`encode_staged`] followed by [`StagedVideo::commit`].
pub fn export_video(
    frames: &FrameSequence,
    job: &ExportJob,
    backend: &mut dyn RenderBackend,
    progress: Option<ProgressCallback>,
) -> RetrocastResult<PathBuf> {
    encode_staged(frames, job, backend, progress)?.commit()
}

/// Encode a frame sequence into the job's staging file.
///
/// The output path is not touched until [`StagedVideo::commit`], so a failed
/// encode never leaves a truncated video and never replaces a previous one.
pub fn encode_staged(
    frames: &FrameSequence,
    job: &ExportJob,
    backend: &mut dyn RenderBackend,
    progress: Option<ProgressCallback>,
) -> RetrocastResult<StagedVideo> {
    tracing::info!(
        output = %job.output_path.display(),
        stills = frames.len(),
        duration_secs = job.config.duration_secs,
        "Starting export"
    );

    validate_sequence(frames, &job.config)?;

    if !backend.is_available() {
        return Err(RetrocastError::unsupported(format!(
            "render backend {} is not available (expected ffmpeg in PATH)",
            backend.name()
        )));
    }

    if let Some(parent) = job.output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let total_frames = frames.encoded_frame_count();
    if let Some(cb) = &progress {
        cb(ExportProgress {
            progress: 0.0,
            frames_encoded: 0,
            total_frames,
            eta_secs: 0.0,
            stage: ExportStage::Preparing,
        });
    }

    let staging = job.staging_path();
    let watch = Stopwatch::start();
    tracing::debug!(backend = backend.name(), staging = %staging.display(), "Using render backend");

    if let Err(e) = backend.encode(frames, job, &staging, progress.as_ref()) {
        discard_staging(&staging);
        return Err(e);
    }

    tracing::debug!(
        staging = %staging.display(),
        elapsed_secs = watch.elapsed_secs(),
        "Encoded to staging file"
    );
    Ok(StagedVideo {
        staging,
        output_path: job.output_path.clone(),
        total_frames,
        progress,
        watch,
        committed: false,
    })
}

/// An encoded and verified video waiting in its staging file.
///
/// Dropping it without [`StagedVideo::commit`] removes the staging file.
pub struct StagedVideo {
    staging: PathBuf,
    output_path: PathBuf,
    total_frames: u64,
    progress: Option<ProgressCallback>,
    watch: Stopwatch,
    committed: bool,
}

impl StagedVideo {
    pub fn staging_path(&self) -> &Path {
        &self.staging
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Move the staging file over the output path.
    pub fn commit(mut self) -> RetrocastResult<PathBuf> {
        std::fs::rename(&self.staging, &self.output_path).map_err(|e| {
            RetrocastError::encode(format!(
                "failed to move {} into place: {e}",
                self.output_path.display()
            ))
        })?;
        self.committed = true;

        if let Some(cb) = &self.progress {
            cb(ExportProgress {
                progress: 1.0,
                frames_encoded: self.total_frames,
                total_frames: self.total_frames,
                eta_secs: 0.0,
                stage: ExportStage::Complete,
            });
        }

        tracing::info!(
            output = %self.output_path.display(),
            elapsed_secs = self.watch.elapsed_secs(),
            "Export finished"
        );
        Ok(self.output_path.clone())
    }
}

impl Drop for StagedVideo {
    fn drop(&mut self) {
        if !self.committed {
            discard_staging(&self.staging);
        }
    }
}

/// Reject sequences the encoder would turn into a wrong video.
pub fn validate_sequence(frames: &FrameSequence, config: &ExportConfig) -> RetrocastResult<()> {
    if frames.is_empty() {
        return Err(RetrocastError::encode("frame sequence is empty"));
    }

    frames
        .check_geometry(config.width, config.height)
        .map_err(|e| RetrocastError::encode(e.to_string()))?;

    if let Some(frame) = frames.frames().iter().find(|f| f.duration_secs <= 0.0) {
        return Err(RetrocastError::encode(format!(
            "still at {:.3}s has no hold duration",
            frame.start_secs
        )));
    }

    let covered = frames.total_duration_secs();
    if !config.clock().within_one_frame(covered, config.duration_secs) {
        return Err(RetrocastError::encode(format!(
            "insufficient frames for declared duration: stills cover {covered:.3}s, expected {:.3}s",
            config.duration_secs
        )));
    }
    Ok(())
}

fn discard_staging(staging: &Path) {
    if staging.exists() {
        if let Err(e) = std::fs::remove_file(staging) {
            tracing::warn!(path = %staging.display(), error = %e, "Failed to remove staging file");
        }
    }
}

/// Write every still as a PNG into `dir`, e.g. `00_cards.png`, `01_map.png`.
pub fn write_stills(frames: &FrameSequence, dir: &Path) -> RetrocastResult<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    frames
        .frames()
        .iter()
        .enumerate()
        .map(|(i, frame)| {
            let path = dir.join(format!("{i:02}_{}.png", frame.segment));
            frame.image.save(&path).map_err(|e| {
                RetrocastError::encode(format!("failed to write {}: {e}", path.display()))
            })?;
            Ok(path)
        })
        .collect()
}

/// Concat demuxer script holding each still for its duration.
///
/// The last still is listed twice; the demuxer ignores the duration of the
/// final entry otherwise.
pub fn concat_list(stills: &[PathBuf], frames: &FrameSequence) -> String {
    let mut list = String::from("ffconcat version 1.0\n");
    for (path, frame) in stills.iter().zip(frames.frames()) {
        list.push_str(&format!("file {}\n", quote_concat_path(path)));
        list.push_str(&format!("duration {}\n", frame.duration_secs));
    }
    if let Some(last) = stills.last() {
        list.push_str(&format!("file {}\n", quote_concat_path(last)));
    }
    list
}

fn quote_concat_path(path: &Path) -> String {
    format!("'{}'", path.to_string_lossy().replace('\'', "'\\''"))
}

/// The ffmpeg backend: PNG stills and a concat script in a scratch
/// directory, encoded with libx264.
pub struct FfmpegBackend;

impl FfmpegBackend {
    pub fn new() -> Self {
        Self
    }

    fn run_ffmpeg(
        &self,
        args: &[String],
        total_frames: u64,
        expected_duration_secs: f64,
        progress: Option<&ProgressCallback>,
    ) -> RetrocastResult<()> {
        tracing::debug!(args = ?args, "Running ffmpeg");
        let mut cmd = Command::new("ffmpeg");
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let watch = Stopwatch::start();
        let mut child = cmd
            .spawn()
            .map_err(|e| RetrocastError::encode(format!("Failed to start ffmpeg: {e}")))?;

        tracing::debug!(pid = child.id(), total_frames, "ffmpeg process started");

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RetrocastError::encode("Failed to capture ffmpeg stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| RetrocastError::encode("Failed to capture ffmpeg stderr"))?;

        // ffmpeg blocks once the stderr pipe is full.
        let stderr_task = std::thread::spawn(move || -> String {
            let mut reader = BufReader::new(stderr);
            let mut output = String::new();
            match reader.read_to_string(&mut output) {
                Ok(_) => output,
                Err(err) => format!("<failed to read ffmpeg stderr: {err}>"),
            }
        });

        let mut reader = BufReader::new(stdout);
        let mut line = String::new();
        let mut state = ProgressState::default();
        loop {
            line.clear();
            let bytes = reader
                .read_line(&mut line)
                .map_err(|e| RetrocastError::encode(format!("Failed reading ffmpeg progress: {e}")))?;
            if bytes == 0 {
                break;
            }

            if let Some((key, value)) = line.trim().split_once('=') {
                state.update(key, value);
                if key == "progress" {
                    if let Some(cb) = progress {
                        cb(progress_report(
                            &state,
                            total_frames,
                            expected_duration_secs,
                            watch.elapsed_secs(),
                        ));
                    }
                }
            }
        }

        let status = child
            .wait()
            .map_err(|e| RetrocastError::encode(format!("Failed to wait on ffmpeg: {e}")))?;

        let stderr_output = stderr_task
            .join()
            .unwrap_or_else(|_| "<failed to join stderr reader>".to_string());

        if !status.success() {
            return Err(RetrocastError::encode(format!(
                "ffmpeg failed (status {}): {}",
                status,
                stderr_output.trim()
            )));
        }

        tracing::debug!(elapsed_secs = watch.elapsed_secs(), "ffmpeg finished");
        Ok(())
    }
}

impl Default for FfmpegBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBackend for FfmpegBackend {
    fn encode(
        &mut self,
        frames: &FrameSequence,
        job: &ExportJob,
        target: &Path,
        progress: Option<&ProgressCallback>,
    ) -> RetrocastResult<()> {
        let scratch = tempfile::Builder::new().prefix("retrocast-").tempdir()?;
        let stills = write_stills(frames, scratch.path())?;

        let list_path = scratch.path().join("frames.ffconcat");
        std::fs::write(&list_path, concat_list(&stills, frames))?;

        let args = build_ffmpeg_args(&list_path, target, &job.config);
        let total_frames = frames.encoded_frame_count();
        if let Some(cb) = progress {
            cb(ExportProgress {
                progress: 0.0,
                frames_encoded: 0,
                total_frames,
                eta_secs: 0.0,
                stage: ExportStage::Encoding,
            });
        }
        self.run_ffmpeg(&args, total_frames, job.config.duration_secs, progress)?;

        if let Some(cb) = progress {
            cb(ExportProgress {
                progress: 1.0,
                frames_encoded: total_frames,
                total_frames,
                eta_secs: 0.0,
                stage: ExportStage::Verifying,
            });
        }
        verify_output(target, &job.config)
    }

    fn is_available(&self) -> bool {
        command_exists("ffmpeg")
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

/// Full ffmpeg argument list for encoding a concat script to `output`.
pub fn build_ffmpeg_args(list_path: &Path, output: &Path, config: &ExportConfig) -> Vec<String> {
    let mut args = vec![
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-f".to_string(),
        "concat".to_string(),
        "-safe".to_string(),
        "0".to_string(),
        "-i".to_string(),
        list_path.to_string_lossy().into_owned(),
        "-vf".to_string(),
        format!(
            "scale={}:{},fps={},format=yuv420p",
            config.width, config.height, config.fps
        ),
    ];
    args.extend(codec_args_for_config(config));
    args.extend([
        "-t".to_string(),
        config.duration_secs.to_string(),
        "-progress".to_string(),
        "pipe:1".to_string(),
        "-nostats".to_string(),
        output.to_string_lossy().into_owned(),
    ]);
    args
}

fn codec_args_for_config(config: &ExportConfig) -> Vec<String> {
    vec![
        "-c:v".to_string(),
        "libx264".to_string(),
        "-preset".to_string(),
        config.preset.clone(),
        "-crf".to_string(),
        config.crf.to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-r".to_string(),
        config.fps.to_string(),
        "-an".to_string(),
        "-movflags".to_string(),
        "+faststart".to_string(),
    ]
}

pub fn command_exists(binary: &str) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Stream properties reported by ffprobe.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoProbe {
    pub width: u32,
    pub height: u32,
    pub codec: String,
    pub pix_fmt: String,
    pub duration_secs: f64,
}

#[derive(Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Deserialize)]
struct ProbeStream {
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    pix_fmt: Option<String>,
}

#[derive(Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Parse `ffprobe -of json` output for the first video stream.
pub fn parse_probe(json: &str) -> Option<VideoProbe> {
    let output: ProbeOutput = serde_json::from_str(json).ok()?;
    let stream = output.streams.into_iter().next()?;
    let duration_secs = output.format?.duration?.parse::<f64>().ok()?;
    Some(VideoProbe {
        width: stream.width?,
        height: stream.height?,
        codec: stream.codec_name?,
        pix_fmt: stream.pix_fmt?,
        duration_secs,
    })
}

/// Read stream properties of an encoded file with ffprobe.
pub fn probe_video(path: &Path) -> RetrocastResult<VideoProbe> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=codec_name,width,height,pix_fmt:format=duration",
            "-of",
            "json",
        ])
        .arg(path)
        .output()
        .map_err(|e| RetrocastError::encode(format!("Failed to run ffprobe: {e}")))?;

    if !output.status.success() {
        return Err(RetrocastError::encode(format!(
            "ffprobe could not read {}: {}",
            path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    let raw = String::from_utf8_lossy(&output.stdout);
    parse_probe(&raw).ok_or_else(|| {
        RetrocastError::encode(format!("ffprobe found no video stream in {}", path.display()))
    })
}

/// Compare probed properties with the declared format.
pub fn check_probe(probe: &VideoProbe, config: &ExportConfig) -> RetrocastResult<()> {
    let mut problems = Vec::new();
    if (probe.width, probe.height) != (config.width, config.height) {
        problems.push(format!(
            "resolution {}x{} (expected {}x{})",
            probe.width, probe.height, config.width, config.height
        ));
    }
    if probe.codec != "h264" {
        problems.push(format!("codec {} (expected h264)", probe.codec));
    }
    if probe.pix_fmt != "yuv420p" {
        problems.push(format!("pixel format {} (expected yuv420p)", probe.pix_fmt));
    }
    if !config
        .clock()
        .within_one_frame(probe.duration_secs, config.duration_secs)
    {
        problems.push(format!(
            "duration {:.3}s (expected {:.3}s)",
            probe.duration_secs, config.duration_secs
        ));
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(RetrocastError::encode(format!(
            "encoded video does not match: {}",
            problems.join(", ")
        )))
    }
}

fn verify_output(path: &Path, config: &ExportConfig) -> RetrocastResult<()> {
    if !command_exists("ffprobe") {
        tracing::warn!(path = %path.display(), "ffprobe not found, skipping output verification");
        return Ok(());
    }
    let probe = probe_video(path)?;
    tracing::debug!(?probe, "Probed encoded video");
    check_probe(&probe, config)
}

#[derive(Debug, Default)]
struct ProgressState {
    out_time_secs: f64,
    complete: bool,
}

impl ProgressState {
    fn update(&mut self, key: &str, value: &str) {
        match key {
            "out_time_ms" | "out_time_us" => {
                if let Ok(us) = value.parse::<f64>() {
                    self.out_time_secs = us / 1_000_000.0;
                }
            }
            "progress" => {
                self.complete = value == "end";
            }
            _ => {}
        }
    }
}

fn progress_report(
    state: &ProgressState,
    total_frames: u64,
    expected_duration_secs: f64,
    elapsed_secs: f64,
) -> ExportProgress {
    let progress = if state.complete {
        1.0
    } else if expected_duration_secs <= 0.0 {
        0.0
    } else {
        (state.out_time_secs / expected_duration_secs).clamp(0.0, 1.0)
    };

    let frames_encoded = (progress * total_frames as f64).round() as u64;
    let eta_secs = if progress > 0.0 {
        (elapsed_secs / progress) - elapsed_secs
    } else {
        0.0
    }
    .max(0.0);

    ExportProgress {
        progress,
        frames_encoded,
        total_frames,
        eta_secs,
        stage: if state.complete {
            ExportStage::Verifying
        } else {
            ExportStage::Encoding
        },
    }
}
