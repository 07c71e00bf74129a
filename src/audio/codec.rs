//! Audio decode and encode
//!
//! Chunk artifacts are decoded with symphonia into interleaved 16-bit PCM.
//! The combined audio is written as WAV (hound) or MP3 (LAME), chosen by
//! the output file extension.

use crate::{ChunkerError, Result};
use log::debug;
use mp3lame_encoder::{Bitrate, Builder, FlushGap, InterleavedPcm, Mode, MonoPcm, Quality};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Duration;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Frames handed to LAME per encode call
const MP3_BLOCK_FRAMES: usize = 1152 * 64;

/// Extra room LAME needs when flushing its internal buffers
const MP3_FLUSH_RESERVE: usize = 7200;

/// Decoded audio: interleaved signed 16-bit samples
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PcmAudio {
    sample_rate: u32,
    channels: u16,
    samples: Vec<i16>,
}

impl PcmAudio {
    /// Audio with no samples and no format yet
    ///
    /// The first non-empty segment appended decides the format.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(sample_rate: u32, channels: u16, samples: Vec<i16>) -> Self {
        Self {
            sample_rate,
            channels,
            samples,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of sample frames (one sample per channel)
    pub fn frames(&self) -> usize {
        match self.channels {
            0 => 0,
            n => self.samples.len() / n as usize,
        }
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }

    fn has_format(&self) -> bool {
        self.sample_rate != 0 && self.channels != 0
    }

    /// Append `other` after the current samples
    ///
    /// Both sides must share sample rate and channel count. On mismatch the
    /// error text describes both formats and nothing is appended.
    pub fn append(&mut self, other: &PcmAudio) -> std::result::Result<(), String> {
        if !other.has_format() {
            if other.is_empty() {
                return Ok(());
            }
            return Err("segment has samples but no format".to_string());
        }

        if !self.has_format() {
            self.sample_rate = other.sample_rate;
            self.channels = other.channels;
        } else if self.sample_rate != other.sample_rate || self.channels != other.channels {
            return Err(format!(
                "format mismatch: expected {} Hz x{}, got {} Hz x{}",
                self.sample_rate, self.channels, other.sample_rate, other.channels
            ));
        }

        self.samples.extend_from_slice(&other.samples);
        Ok(())
    }
}

/// Container and codec for the final output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Wav,
    Mp3,
}

impl OutputFormat {
    /// Pick the format implied by a path's extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("mp3") => Ok(OutputFormat::Mp3),
            Some("wav") | Some("wave") => Ok(OutputFormat::Wav),
            other => Err(ChunkerError::Encode {
                path: path.to_path_buf(),
                reason: format!(
                    "unsupported output format {:?}, expected .mp3 or .wav",
                    other.unwrap_or("")
                ),
            }),
        }
    }

}

/// Decode an audio file into PCM
pub fn decode_file(path: &Path) -> Result<PcmAudio> {
    let fail = |reason: String| ChunkerError::Decode {
        artifact: path.to_path_buf(),
        reason,
    };

    let src = File::open(path).map_err(|e| fail(e.to_string()))?;
    let mss = MediaSourceStream::new(Box::new(src), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| fail(format!("unrecognized container: {}", e)))?;
    let mut format = probed.format;

    // Find the first audio track with a known (decodeable) codec
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| fail("no supported audio track".to_string()))?;
    let track_id = track.id;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| fail(format!("unsupported codec: {}", e)))?;

    let mut audio = PcmAudio::new(
        track.codec_params.sample_rate.unwrap_or(0),
        track
            .codec_params
            .channels
            .map(|c| c.count() as u16)
            .unwrap_or(0),
        Vec::new(),
    );

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(fail(e.to_string())),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder.decode(&packet).map_err(|e| fail(e.to_string()))?;
        let spec = *decoded.spec();
        let mut buf = SampleBuffer::<i16>::new(decoded.capacity() as u64, spec);
        buf.copy_interleaved_ref(decoded);

        let segment = PcmAudio::new(
            spec.rate,
            spec.channels.count() as u16,
            buf.samples().to_vec(),
        );
        audio.append(&segment).map_err(fail)?;
    }

    debug!(
        "Decoded {:?}: {} frames at {} Hz x{}",
        path,
        audio.frames(),
        audio.sample_rate,
        audio.channels
    );
    Ok(audio)
}

/// Write PCM to `path` in `format`
///
/// The data goes to a temporary file beside `path` and is renamed into
/// place only once fully written, so a failed encode leaves nothing at
/// `path`.
pub fn encode_file(audio: &PcmAudio, path: &Path, format: OutputFormat) -> Result<()> {
    let fail = |reason: String| ChunkerError::Encode {
        path: path.to_path_buf(),
        reason,
    };

    if !audio.has_format() {
        return Err(fail("no audio format to encode".to_string()));
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(".tts-chunker-")
        .suffix(".part")
        .tempfile_in(dir)
        .map_err(|e| fail(format!("cannot create temporary output: {}", e)))?;

    match format {
        OutputFormat::Wav => write_wav(audio, BufWriter::new(tmp.as_file_mut())),
        OutputFormat::Mp3 => write_mp3(audio, BufWriter::new(tmp.as_file_mut())),
    }
    .map_err(fail)?;

    tmp.as_file()
        .sync_all()
        .map_err(|e| fail(e.to_string()))?;
    tmp.persist(path).map_err(|e| fail(e.error.to_string()))?;

    debug!("Encoded {} frames to {:?}", audio.frames(), path);
    Ok(())
}

fn write_wav<W: Write + io::Seek>(audio: &PcmAudio, out: W) -> std::result::Result<(), String> {
    let spec = hound::WavSpec {
        channels: audio.channels,
        sample_rate: audio.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::new(out, spec).map_err(|e| e.to_string())?;
    for &sample in &audio.samples {
        writer.write_sample(sample).map_err(|e| e.to_string())?;
    }
    writer.finalize().map_err(|e| e.to_string())
}

fn write_mp3<W: Write>(audio: &PcmAudio, mut out: W) -> std::result::Result<(), String> {
    let mode = match audio.channels {
        1 => Mode::Mono,
        2 => Mode::JointStereo,
        n => return Err(format!("MP3 supports 1 or 2 channels, got {}", n)),
    };

    let mut builder = Builder::new().ok_or("cannot allocate LAME encoder")?;
    builder
        .set_num_channels(audio.channels as u8)
        .map_err(|e| format!("channels: {:?}", e))?;
    builder
        .set_sample_rate(audio.sample_rate)
        .map_err(|e| format!("sample rate {}: {:?}", audio.sample_rate, e))?;
    builder
        .set_mode(mode)
        .map_err(|e| format!("mode: {:?}", e))?;
    builder
        .set_brate(Bitrate::Kbps64)
        .map_err(|e| format!("bitrate: {:?}", e))?;
    builder
        .set_quality(Quality::Good)
        .map_err(|e| format!("quality: {:?}", e))?;
    let mut encoder = builder
        .build()
        .map_err(|e| format!("LAME init: {:?}", e))?;

    let block = MP3_BLOCK_FRAMES * audio.channels as usize;
    let mut mp3 = Vec::new();

    for samples in audio.samples.chunks(block) {
        mp3.clear();
        mp3.reserve(mp3lame_encoder::max_required_buffer_size(samples.len()));

        let encoded = if audio.channels == 1 {
            encoder.encode_to_vec(MonoPcm(samples), &mut mp3)
        } else {
            encoder.encode_to_vec(InterleavedPcm(samples), &mut mp3)
        };
        encoded.map_err(|e| format!("encode: {:?}", e))?;
        out.write_all(&mp3).map_err(|e| e.to_string())?;
    }

    // Pad the final partial frame
    mp3.clear();
    mp3.reserve(MP3_FLUSH_RESERVE);
    encoder
        .flush_to_vec::<FlushGap>(&mut mp3)
        .map_err(|e| format!("flush: {:?}", e))?;
    out.write_all(&mp3).map_err(|e| e.to_string())?;

    out.flush().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(frames: usize, rate: u32, value: i16) -> PcmAudio {
        PcmAudio::new(rate, 1, vec![value; frames])
    }

    #[test]
    fn test_output_format_from_extension() {
        assert_eq!(
            OutputFormat::from_path(Path::new("book.MP3")).unwrap(),
            OutputFormat::Mp3
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("out/book.wav")).unwrap(),
            OutputFormat::Wav
        );
        assert!(matches!(
            OutputFormat::from_path(Path::new("book.ogg")),
            Err(ChunkerError::Encode { .. })
        ));
        assert!(OutputFormat::from_path(Path::new("book")).is_err());
    }

    #[test]
    fn test_append_adopts_first_format() {
        let mut acc = PcmAudio::empty();
        acc.append(&tone(4, 22050, 1)).unwrap();
        acc.append(&tone(2, 22050, 2)).unwrap();

        assert_eq!(acc.sample_rate(), 22050);
        assert_eq!(acc.samples(), &[1, 1, 1, 1, 2, 2]);
        assert_eq!(acc.frames(), 6);
    }

    #[test]
    fn test_append_rejects_mismatch() {
        let mut acc = tone(4, 22050, 1);
        let err = acc.append(&tone(4, 44100, 1)).unwrap_err();
        assert!(err.contains("44100"));
        assert_eq!(acc.frames(), 4);
    }

    #[test]
    fn test_duration() {
        let audio = PcmAudio::new(8000, 2, vec![0; 8000 * 2 * 3]);
        assert_eq!(audio.duration(), Duration::from_secs(3));
        assert_eq!(PcmAudio::empty().duration(), Duration::ZERO);
    }

    #[test]
    fn test_wav_encode_then_decode_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let samples: Vec<i16> = (0..4000).map(|i| ((i * 37) % 20000 - 10000) as i16).collect();
        let audio = PcmAudio::new(16000, 2, samples);

        encode_file(&audio, &path, OutputFormat::Wav).unwrap();
        assert_eq!(decode_file(&path).unwrap(), audio);
    }

    #[test]
    fn test_mp3_encode_produces_decodable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.mp3");
        let samples: Vec<i16> = (0..22050).map(|i| ((i % 100) * 200) as i16).collect();
        let audio = PcmAudio::new(22050, 1, samples);

        encode_file(&audio, &path, OutputFormat::Mp3).unwrap();

        let decoded = decode_file(&path).unwrap();
        assert_eq!(decoded.sample_rate(), 22050);
        assert_eq!(decoded.channels(), 1);
        assert!(decoded.frames() >= audio.frames());
    }

    #[test]
    fn test_mp3_keeps_tail_at_every_rate() {
        let dir = tempfile::tempdir().unwrap();

        for rate in [8000, 16000, 22050, 44100] {
            let path = dir.path().join(format!("tail-{}.mp3", rate));
            // One second plus an odd remainder that cannot fill a frame
            let frames = rate as usize + 333;
            let audio = PcmAudio::new(rate, 1, vec![1000; frames]);

            encode_file(&audio, &path, OutputFormat::Mp3).unwrap();
            let decoded = decode_file(&path).unwrap();
            assert!(
                decoded.frames() >= frames,
                "{} Hz: decoded {} of {} frames",
                rate,
                decoded.frames(),
                frames
            );
        }
    }

    #[test]
    fn test_encode_without_format_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nothing.wav");

        let err = encode_file(&PcmAudio::empty(), &path, OutputFormat::Wav).unwrap_err();
        assert!(matches!(err, ChunkerError::Encode { .. }));
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chunk_0.wav");
        std::fs::write(&path, b"definitely not audio").unwrap();

        assert!(matches!(
            decode_file(&path),
            Err(ChunkerError::Decode { .. })
        ));
    }
}
