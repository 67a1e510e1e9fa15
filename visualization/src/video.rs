//! Frame sinks producing video files
//!
//! A [`FrameSink`] receives rendered frames one by one. GIF files are
//! encoded in-process with the `image` crate; MP4 files are produced by an
//! `ffmpeg` child process fed with raw RGBA frames over its stdin.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::cell::RefCell;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::rc::Rc;

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};
use log::{debug, info, warn};
use thiserror::Error;

use crate::config::RenderConfig;

/// Error type for video encoding
#[derive(Error, Debug)]
pub enum VideoError {
    #[error("Unsupported video file {0}: expected a .gif or .mp4 suffix")]
    UnsupportedFormat(PathBuf),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Encoder exited with {status}")]
    Encoder { status: ExitStatus },

    #[error("Frame size {got:?} differs from the first frame {expected:?}")]
    FrameSize { expected: (u32, u32), got: (u32, u32) },

    #[error("Sink has already been closed")]
    Closed,

    #[error("No frames were written to {0}")]
    NoFrames(PathBuf),
}

/// Output container, chosen from the file suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoFormat {
    Gif,
    Mp4,
}

impl VideoFormat {
    pub fn from_path(path: &Path) -> Result<Self, VideoError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("gif") => Ok(Self::Gif),
            Some(ext) if ext.eq_ignore_ascii_case("mp4") => Ok(Self::Mp4),
            _ => Err(VideoError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Self::Gif => "gif",
            Self::Mp4 => "mp4",
        }
    }
}

impl fmt::Display for VideoFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Consumer of rendered frames
pub trait FrameSink {
    fn grab_frame(&mut self, frame: &RgbaImage) -> Result<(), VideoError>;

    /// Flush and close the output
    fn finish(&mut self) -> Result<(), VideoError>;

    /// Close the output after a failure, discarding what was written
    fn abort(&mut self) -> Result<(), VideoError> {
        Ok(())
    }
}

/// Run `body` against `sink`, finishing it on success and aborting it on
/// failure
pub fn with_sink<S, T, E, F>(sink: &mut S, body: F) -> Result<T, E>
where
    S: FrameSink + ?Sized,
    E: From<VideoError>,
    F: FnOnce(&mut S) -> Result<T, E>,
{
    match body(sink) {
        Ok(value) => {
            sink.finish()?;
            Ok(value)
        }
        Err(err) => {
            if let Err(abort_err) = sink.abort() {
                warn!("Failed to abort video output: {}", abort_err);
            }
            Err(err)
        }
    }
}

/// Open the sink matching the suffix of `path`
pub fn open_sink(path: &Path, config: &RenderConfig) -> Result<Box<dyn FrameSink>, VideoError> {
    let sink: Box<dyn FrameSink> = match VideoFormat::from_path(path)? {
        VideoFormat::Gif => Box::new(GifSink::create(path, config.fps, config.gif_speed)?),
        VideoFormat::Mp4 => Box::new(FfmpegSink::new(path, config.fps)),
    };
    info!("Writing video to {}", path.display());
    Ok(sink)
}

fn check_size(expected: &mut Option<(u32, u32)>, frame: &RgbaImage) -> Result<(), VideoError> {
    let got = frame.dimensions();
    match *expected {
        None => {
            *expected = Some(got);
            Ok(())
        }
        Some(size) if size == got => Ok(()),
        Some(size) => Err(VideoError::FrameSize { expected: size, got }),
    }
}

/// Write handle sharing one buffered file between the encoder and its sink
#[derive(Clone)]
struct SharedFile(Rc<RefCell<BufWriter<File>>>);

impl Write for SharedFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.borrow_mut().flush()
    }
}

/// Animated GIF, looping forever
pub struct GifSink {
    path: PathBuf,
    file: SharedFile,
    encoder: Option<GifEncoder<SharedFile>>,
    delay: Delay,
    size: Option<(u32, u32)>,
}

impl GifSink {
    pub fn create(path: &Path, fps: u32, speed: i32) -> Result<Self, VideoError> {
        let file = SharedFile(Rc::new(RefCell::new(BufWriter::new(File::create(path)?))));
        let mut encoder = GifEncoder::new_with_speed(file.clone(), speed.clamp(1, 30));
        encoder.set_repeat(Repeat::Infinite)?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
            encoder: Some(encoder),
            delay: Delay::from_numer_denom_ms(1000, fps.max(1)),
            size: None,
        })
    }
}

impl FrameSink for GifSink {
    fn grab_frame(&mut self, frame: &RgbaImage) -> Result<(), VideoError> {
        check_size(&mut self.size, frame)?;
        let encoder = self.encoder.as_mut().ok_or(VideoError::Closed)?;
        encoder.encode_frame(Frame::from_parts(frame.clone(), 0, 0, self.delay))?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), VideoError> {
        // Dropping the encoder writes the GIF trailer into the buffer
        let encoder = self.encoder.take().ok_or(VideoError::Closed)?;
        drop(encoder);
        if self.size.is_none() {
            fs::remove_file(&self.path)?;
            return Err(VideoError::NoFrames(self.path.clone()));
        }
        self.file.flush()?;
        debug!("Finished {}", self.path.display());
        Ok(())
    }

    fn abort(&mut self) -> Result<(), VideoError> {
        if self.encoder.take().is_some() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// MP4 encoded by an external `ffmpeg` process
///
/// The process is spawned on the first frame, once the frame size is known.
/// A sink dropped without [`FrameSink::finish`] kills the process.
pub struct FfmpegSink {
    path: PathBuf,
    fps: u32,
    child: Option<Child>,
    size: Option<(u32, u32)>,
}

impl FfmpegSink {
    pub fn new(path: &Path, fps: u32) -> Self {
        Self {
            path: path.to_path_buf(),
            fps: fps.max(1),
            child: None,
            size: None,
        }
    }

    fn spawn(&self, (width, height): (u32, u32)) -> Result<Child, VideoError> {
        debug!("Spawning ffmpeg for {}x{} frames", width, height);
        let child = Command::new("ffmpeg")
            .args(["-y", "-loglevel", "error", "-f", "rawvideo", "-pixel_format", "rgba"])
            .arg("-video_size")
            .arg(format!("{}x{}", width, height))
            .arg("-framerate")
            .arg(self.fps.to_string())
            .args(["-i", "-", "-pix_fmt", "yuv420p"])
            .arg(&self.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .spawn()?;
        Ok(child)
    }

    fn kill(&mut self) -> Result<(), VideoError> {
        if let Some(mut child) = self.child.take() {
            child.kill()?;
            child.wait()?;
        }
        Ok(())
    }
}

impl FrameSink for FfmpegSink {
    fn grab_frame(&mut self, frame: &RgbaImage) -> Result<(), VideoError> {
        check_size(&mut self.size, frame)?;
        if self.child.is_none() {
            self.child = Some(self.spawn(frame.dimensions())?);
        }
        let stdin = self
            .child
            .as_mut()
            .and_then(|child| child.stdin.as_mut())
            .ok_or(VideoError::Closed)?;
        stdin.write_all(frame.as_raw())?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), VideoError> {
        let Some(mut child) = self.child.take() else {
            // ffmpeg is only spawned by the first frame
            return Err(VideoError::NoFrames(self.path.clone()));
        };
        drop(child.stdin.take());
        let status = child.wait()?;
        if !status.success() {
            return Err(VideoError::Encoder { status });
        }
        debug!("Finished {}", self.path.display());
        Ok(())
    }

    fn abort(&mut self) -> Result<(), VideoError> {
        let spawned = self.child.is_some();
        self.kill()?;
        if spawned && self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if let Err(err) = self.kill() {
            warn!("Failed to stop ffmpeg for {}: {}", self.path.display(), err);
        }
    }
}

/// In-memory sink that keeps only the frame count and the last frame
#[derive(Debug, Default)]
pub struct MemorySink {
    pub frames: usize,
    pub last: Option<RgbaImage>,
    pub finished: bool,
    pub aborted: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameSink for MemorySink {
    fn grab_frame(&mut self, frame: &RgbaImage) -> Result<(), VideoError> {
        if self.finished || self.aborted {
            return Err(VideoError::Closed);
        }
        self.frames += 1;
        self.last = Some(frame.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), VideoError> {
        self.finished = true;
        Ok(())
    }

    fn abort(&mut self) -> Result<(), VideoError> {
        self.aborted = true;
        Ok(())
    }
}
