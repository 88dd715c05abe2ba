//! Decoding of container/codec bytes into 16kHz f32 PCM.

use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

use crate::error::{Error, Result};

/// Canonical sample rate for transcription input.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// The decoder preserves the source channel count up to this limit.
const MAX_CHANNELS: usize = 2;

/// Decoded floating-point PCM, channel count preserved from the source.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPcm {
    /// Samples, interleaved when `channels` is 2
    pub samples: Vec<f32>,
    /// Sample rate in Hz (always the decode target rate)
    pub sample_rate: u32,
    /// Number of channels (1 or 2)
    pub channels: u16,
}

impl DecodedPcm {
    /// Number of per-channel sample frames.
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels.max(1))
    }
}

/// Decode container/codec bytes into f32 PCM at `target_sample_rate`.
///
/// Supports WAV, MP3, FLAC, OGG, M4A/AAC and friends via symphonia, and
/// resamples when the source rate differs. The channel count is preserved
/// (mono and stereo only; anything wider is rejected rather than silently
/// truncated). Malformed or empty input fails with a decode error carrying
/// the underlying cause.
pub fn decode(bytes: &[u8], target_sample_rate: u32) -> Result<DecodedPcm> {
    if bytes.is_empty() {
        return Err(Error::Decode("empty input".to_string()));
    }

    let cursor = Cursor::new(bytes.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    let probed = symphonia::default::get_probe()
        .format(
            &Hint::new(),
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| Error::Decode(format!("probe failed: {e}")))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| Error::Decode("no audio track found".to_string()))?;

    let codec_params = track.codec_params.clone();
    let track_id = track.id;
    let source_rate = codec_params.sample_rate.unwrap_or(target_sample_rate);
    let channels = codec_params.channels.map_or(1, |c| c.count());

    if channels > MAX_CHANNELS {
        return Err(Error::UnsupportedChannelLayout { channels });
    }

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| Error::Decode(format!("codec init failed: {e}")))?;

    let mut interleaved: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(Error::Decode(format!("packet read: {e}"))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder
            .decode(&packet)
            .map_err(|e| Error::Decode(format!("decode: {e}")))?;

        let spec = *decoded.spec();
        let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        interleaved.extend_from_slice(sample_buf.samples());
    }

    if interleaved.is_empty() {
        return Err(Error::Decode("no audio samples decoded".to_string()));
    }

    if source_rate != target_sample_rate {
        debug!(
            "Resampling {} -> {} Hz ({} channels)",
            source_rate, target_sample_rate, channels
        );
        interleaved = resample(&interleaved, channels, source_rate, target_sample_rate)?;
    }

    Ok(DecodedPcm {
        samples: interleaved,
        sample_rate: target_sample_rate,
        channels: channels as u16,
    })
}

/// Sinc resampling of interleaved audio from `from_rate` to `to_rate`.
fn resample(
    interleaved: &[f32],
    channels: usize,
    from_rate: u32,
    to_rate: u32,
) -> Result<Vec<f32>> {
    use rubato::{
        Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
    };

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = f64::from(to_rate) / f64::from(from_rate);
    let chunk_size = 1024;

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, chunk_size, channels)
        .map_err(|e| Error::Decode(format!("resampler init: {e}")))?;

    let frames = interleaved.len() / channels;
    let mut planar: Vec<Vec<f32>> = vec![Vec::with_capacity(frames); channels];
    for frame in interleaved.chunks_exact(channels) {
        for (ch, &sample) in frame.iter().enumerate() {
            planar[ch].push(sample);
        }
    }

    let mut out_planar: Vec<Vec<f32>> = vec![Vec::new(); channels];

    let mut pos = 0;
    while pos < frames {
        let end = (pos + chunk_size).min(frames);
        let mut input: Vec<Vec<f32>> = Vec::with_capacity(channels);
        for wave in &planar {
            // Pad the last chunk with zeros
            let mut buf = wave[pos..end].to_vec();
            buf.resize(chunk_size, 0.0);
            input.push(buf);
        }

        let resampled = resampler
            .process(&input, None)
            .map_err(|e| Error::Decode(format!("resample: {e}")))?;

        for (ch, wave) in resampled.into_iter().enumerate() {
            out_planar[ch].extend_from_slice(&wave);
        }
        pos = end;
    }

    let out_frames = out_planar.iter().map(Vec::len).min().unwrap_or(0);
    let mut out = Vec::with_capacity(out_frames * channels);
    for i in 0..out_frames {
        for wave in &out_planar {
            out.push(wave[i]);
        }
    }
    Ok(out)
}
