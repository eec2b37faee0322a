use std::path::Path;

pub const SAMPLE_RATE: u32 = 8_000;

/// Write a silent mono wav lasting `seconds`.
pub fn write_silent_wav(path: &Path, seconds: f64) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create wav parent dirs");
    }
    let mut writer = hound::WavWriter::create(path, spec).expect("create wav writer");
    let frames = (seconds * SAMPLE_RATE as f64).round() as usize;
    for _ in 0..frames {
        writer.write_sample(0i16).expect("write wav sample");
    }
    writer.finalize().expect("finalize wav");
}
