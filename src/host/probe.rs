use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rodio::{Decoder, Source};

use super::HostError;

/// Read an audio file's duration in seconds without decoding it fully.
pub(crate) fn probe_duration(path: &Path) -> Result<f64, HostError> {
    let probe_error = |message: String| HostError::Probe {
        path: path.to_path_buf(),
        message,
    };
    if path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
    {
        let reader = hound::WavReader::open(path).map_err(|err| probe_error(err.to_string()))?;
        let spec = reader.spec();
        let sample_rate = spec.sample_rate.max(1) as f64;
        // `duration` counts frames, independent of channel count.
        return Ok((reader.duration() as f64 / sample_rate).max(0.0));
    }

    let file = File::open(path).map_err(|source| HostError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let byte_len = file.metadata().map(|meta| meta.len()).unwrap_or(0);
    let hint = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let mut builder = Decoder::builder()
        .with_data(BufReader::new(file))
        .with_byte_len(byte_len)
        .with_seekable(false);
    if let Some(hint) = hint.as_deref() {
        builder = builder.with_hint(hint);
    }
    let decoder = builder.build().map_err(|err| probe_error(err.to_string()))?;
    decoder
        .total_duration()
        .map(|duration| duration.as_secs_f64())
        .filter(|seconds| seconds.is_finite())
        .ok_or_else(|| probe_error("duration unavailable".to_string()))
}
