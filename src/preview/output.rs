use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("No audio output available: {0}")]
    Device(String),
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to decode {path}: {message}")]
    Decode { path: PathBuf, message: String },
    #[error("Seek failed: {0}")]
    Seek(String),
    #[error("Nothing loaded")]
    NothingLoaded,
    #[error("Track {0} is not in the collection")]
    UnknownTrack(String),
}

/// Audio sink driven by the preview player.
pub trait PreviewOutput {
    fn load(&mut self, path: &Path) -> Result<(), PreviewError>;
    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);
    fn seek(&mut self, seconds: f64) -> Result<(), PreviewError>;
    fn set_volume(&mut self, volume: f32);
    /// True once the loaded source has played to its end.
    fn finished(&self) -> bool {
        false
    }
    fn position(&self) -> Option<f64> {
        None
    }
}

/// Output for headless runs: accepts every call and plays nothing.
#[derive(Debug, Default)]
pub struct SilentOutput {
    loaded: Option<PathBuf>,
}

impl PreviewOutput for SilentOutput {
    fn load(&mut self, path: &Path) -> Result<(), PreviewError> {
        self.loaded = Some(path.to_path_buf());
        Ok(())
    }
    fn play(&mut self) {}
    fn pause(&mut self) {}
    fn stop(&mut self) {
        self.loaded = None;
    }
    fn seek(&mut self, _seconds: f64) -> Result<(), PreviewError> {
        self.loaded.as_ref().map(|_| ()).ok_or(PreviewError::NothingLoaded)
    }
    fn set_volume(&mut self, _volume: f32) {}
}

/// Default-device output backed by a rodio sink.
pub struct RodioOutput {
    stream: OutputStream,
    sink: Option<Sink>,
    volume: f32,
}

impl RodioOutput {
    pub fn open_default() -> Result<Self, PreviewError> {
        let stream = OutputStreamBuilder::open_default_stream()
            .map_err(|err| PreviewError::Device(err.to_string()))?;
        Ok(Self {
            stream,
            sink: None,
            volume: 1.0,
        })
    }
}

impl PreviewOutput for RodioOutput {
    fn load(&mut self, path: &Path) -> Result<(), PreviewError> {
        let file = File::open(path).map_err(|source| PreviewError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let decoder = Decoder::new(BufReader::new(file)).map_err(|err| PreviewError::Decode {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        if let Some(previous) = self.sink.take() {
            previous.stop();
        }
        let sink = Sink::connect_new(self.stream.mixer());
        sink.set_volume(self.volume);
        sink.pause();
        sink.append(decoder);
        self.sink = Some(sink);
        debug!("Preview loaded {}", path.display());
        Ok(())
    }

    fn play(&mut self) {
        if let Some(sink) = self.sink.as_ref() {
            sink.play();
        }
    }

    fn pause(&mut self) {
        if let Some(sink) = self.sink.as_ref() {
            sink.pause();
        }
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }

    fn seek(&mut self, seconds: f64) -> Result<(), PreviewError> {
        let sink = self.sink.as_ref().ok_or(PreviewError::NothingLoaded)?;
        sink.try_seek(Duration::from_secs_f64(seconds.max(0.0)))
            .map_err(|err| PreviewError::Seek(err.to_string()))
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(sink) = self.sink.as_ref() {
            sink.set_volume(volume);
        }
    }

    fn finished(&self) -> bool {
        self.sink.as_ref().is_some_and(Sink::empty)
    }

    fn position(&self) -> Option<f64> {
        self.sink.as_ref().map(|sink| sink.get_pos().as_secs_f64())
    }
}
