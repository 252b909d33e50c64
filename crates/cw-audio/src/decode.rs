use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::AudioError;

/// A decoded track reduced to its first channel.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedAudio {
    /// Samples of channel 0.
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count of the source track.
    pub channels: usize,
}

impl DecodedAudio {
    /// Duration in seconds.
    #[must_use]
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }
}

/// Paquets rejetés par le décodeur pendant la boucle.
#[derive(Debug, Default)]
struct PacketTally {
    failed: usize,
    last_error: Option<String>,
}

impl PacketTally {
    fn record_failure(&mut self, err: &impl std::fmt::Display) {
        self.failed += 1;
        self.last_error = Some(err.to_string());
    }

    /// A stream whose every packet failed is an error, not an empty signal.
    fn check(&self, produced: usize) -> Result<(), AudioError> {
        if produced == 0 && self.failed > 0 {
            return Err(AudioError::DecodeError(format!(
                "{} paquet(s) illisible(s), aucun échantillon : {}",
                self.failed,
                self.last_error.as_deref().unwrap_or_default()
            )));
        }
        Ok(())
    }
}

/// Decode an audio file and keep only its first channel.
///
/// Supports WAV, MP3, FLAC, OGG/Vorbis, AAC via symphonia. No resampling is
/// done: the detector works at the file's native rate.
///
/// # Errors
/// Returns an error if the file cannot be opened or probed, if reading a
/// packet fails before the end of the stream, or if every packet fails to decode.
///
/// # Example
/// ```no_run
/// use cw_audio::decode::decode_file;
/// let audio = decode_file("cry.ogg").unwrap();
/// println!("{} samples @ {} Hz", audio.samples.len(), audio.sample_rate);
/// ```
pub fn decode_file(path: impl AsRef<Path>) -> Result<DecodedAudio, AudioError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| AudioError::Open {
        path: path.display().to_string(),
        source,
    })?;
    let mss = MediaSourceStream::new(
        Box::new(file),
        symphonia::core::io::MediaSourceStreamOptions::default(),
    );

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
        .map_err(|e| AudioError::UnsupportedFormat(format!("{}: {e}", path.display())))?;

    let mut format = probed.format;
    let track = format
        .default_track()
        .ok_or_else(|| AudioError::DecodeError("Aucune piste audio par défaut".to_string()))?;

    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| AudioError::DecodeError("Fréquence d'échantillonnage inconnue".to_string()))?;
    let channels = track
        .codec_params
        .channels
        .map_or(1, symphonia::core::audio::Channels::count)
        .max(1);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::UnsupportedFormat(e.to_string()))?;

    let track_id = track.id;
    let mut samples: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;
    let mut max_sample_frames: usize = 0;
    let mut tally = PacketTally::default();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                return Err(AudioError::DecodeError(format!("{}: {e}", path.display())));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(e) => {
                log::warn!("Audio decode frame error: {e}");
                tally.record_failure(&e);
                continue;
            }
        };

        let spec = *decoded.spec();
        let num_frames = decoded.capacity();
        // Reuse SampleBuffer: only reallocate if this packet is bigger than current capacity
        if sample_buf.is_none() || num_frames > max_sample_frames {
            sample_buf = Some(SampleBuffer::<f32>::new(num_frames as u64, spec));
            max_sample_frames = num_frames;
        }
        let Some(buf) = sample_buf.as_mut() else {
            continue;
        };
        buf.copy_interleaved_ref(decoded);

        samples.extend(crate::preprocess::first_channel(
            buf.samples(),
            spec.channels.count().max(1),
        ));
    }

    tally.check(samples.len())?;

    log::info!(
        "Decoded {} samples @ {}Hz ({} ch) from {}",
        samples.len(),
        sample_rate,
        channels,
        path.display()
    );

    Ok(DecodedAudio {
        samples,
        sample_rate,
        channels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_open_error() {
        let err = decode_file("/no/such/dir/cry.ogg").unwrap_err();
        assert!(matches!(err, AudioError::Open { .. }));
    }

    #[test]
    fn garbage_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.ogg");
        std::fs::write(&path, b"definitely not an ogg stream").unwrap();
        assert!(decode_file(&path).is_err());
    }

    #[test]
    fn all_packets_failing_is_an_error() {
        let mut tally = PacketTally::default();
        for _ in 0..3 {
            tally.record_failure(&"malformed frame");
        }
        let err = tally.check(0).unwrap_err();
        assert!(matches!(err, AudioError::DecodeError(ref msg) if msg.contains("malformed frame")));
    }

    #[test]
    fn partial_failures_keep_decoded_samples() {
        let mut tally = PacketTally::default();
        tally.record_failure(&"one bad packet");
        assert!(tally.check(4096).is_ok());
        // Nothing failed and nothing produced: an empty stream, left to the detector.
        assert!(PacketTally::default().check(0).is_ok());
    }

    #[test]
    fn duration_zero_rate() {
        let audio = DecodedAudio {
            samples: vec![0.0; 10],
            sample_rate: 0,
            channels: 1,
        };
        assert!(audio.duration_secs().abs() < f64::EPSILON);
    }
}
