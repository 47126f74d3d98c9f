/// Sound engine: looping 8-bit background melody plus two jingles, via rodio.
///
/// All sounds are generated as in-memory WAV buffers at init time.
/// The melody runs on its own Sink so it can be paused and resumed;
/// jingles are fire-and-forget.
///
/// Compile without the "sound" feature to disable audio entirely
/// (the stub SoundEngine only remembers the BGM toggle).

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
    use tracing::warn;

    const SAMPLE_RATE: u32 = 22050;
    const TEMPO_BPM: f32 = 140.0;

    /// (note, length in beats)
    const MELODY: [(&str, f32); 13] = [
        ("C5", 0.25), ("E5", 0.25), ("G5", 0.25), ("C6", 0.25),
        ("G5", 0.25), ("E5", 0.25), ("D5", 0.5),
        ("C5", 0.25), ("D5", 0.25), ("E5", 0.25), ("G5", 0.25),
        ("F5", 0.5), ("E5", 0.5),
    ];

    fn note_freq(name: &str) -> Option<f32> {
        let f = match name {
            "C4" => 261.63, "D4" => 293.66, "E4" => 329.63, "F4" => 349.23,
            "G4" => 392.00, "A4" => 440.00, "B4" => 493.88,
            "C5" => 523.25, "D5" => 587.33, "E5" => 659.25, "F5" => 698.46,
            "G5" => 783.99, "A5" => 880.00, "B5" => 987.77,
            "C6" => 1046.50,
            _ => return None,
        };
        Some(f)
    }

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        bgm: Sink,
        sfx_captured: Arc<Vec<u8>>,
        sfx_reached: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new(bgm_on: bool) -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;

            let bgm = Sink::try_new(&handle).ok()?;
            let melody = rodio::Decoder::new(Cursor::new(make_wav(&gen_melody()))).ok()?;
            bgm.append(melody.repeat_infinite());
            if !bgm_on {
                bgm.pause();
            }

            Some(SoundEngine {
                _stream: stream,
                handle,
                bgm,
                sfx_captured: Arc::new(make_wav(&gen_captured())),
                sfx_reached: Arc::new(make_wav(&gen_reached())),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            let sink = match Sink::try_new(&self.handle) {
                Ok(s) => s,
                Err(e) => {
                    warn!(error = %e, "could not open sound sink");
                    return;
                }
            };
            if let Ok(src) = rodio::Decoder::new(Cursor::new(buf.as_ref().clone())) {
                sink.append(src);
                sink.detach(); // fire-and-forget
            }
        }

        pub fn bgm_on(&self) -> bool {
            !self.bgm.is_paused()
        }

        pub fn toggle_bgm(&mut self) {
            if self.bgm.is_paused() {
                self.bgm.play();
            } else {
                self.bgm.pause();
            }
        }

        pub fn play_captured(&self) { self.play(&self.sfx_captured); }
        pub fn play_reached(&self) { self.play(&self.sfx_reached); }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    fn square(t: f32, freq: f32) -> f32 {
        if (t * freq).fract() < 0.5 { 1.0 } else { -1.0 }
    }

    /// One square-wave note: 10 ms attack to 0.1, exponential decay to 0.01.
    fn gen_note(freq: f32, duration: f32) -> Vec<f32> {
        const ATTACK: f32 = 0.01;
        const PEAK: f32 = 0.1;
        const FLOOR: f32 = 0.01;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = if t < ATTACK {
                    PEAK * t / ATTACK
                } else {
                    let k = (t - ATTACK) / (duration - ATTACK).max(f32::EPSILON);
                    PEAK * (FLOOR / PEAK).powf(k)
                };
                square(t, freq) * env
            })
            .collect()
    }

    /// One pass of the background melody. Notes follow back to back.
    fn gen_melody() -> Vec<f32> {
        let beat = 60.0 / TEMPO_BPM;
        MELODY
            .iter()
            .filter_map(|&(name, beats)| note_freq(name).map(|f| gen_note(f, beats * beat)))
            .flatten()
            .collect()
    }

    /// Capture: sad descending tone
    fn gen_captured() -> Vec<f32> {
        let notes = [440.0_f32, 370.0, 311.0, 261.0]; // A4→F#4→Eb4→C4
        let note_dur = 0.12;
        let mut samples = Vec::new();
        for &freq in &notes {
            let n = (SAMPLE_RATE as f32 * note_dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.3;
                samples.push((t * freq * 2.0 * std::f32::consts::PI).sin() * env * 0.3);
            }
        }
        let fade_len = samples.len() / 4;
        let total = samples.len();
        for (i, s) in samples.iter_mut().enumerate().skip(total - fade_len) {
            *s *= (total - i) as f32 / fade_len as f32;
        }
        samples
    }

    /// Goal: ascending fanfare C5→E5→G5→C6 with a held last note
    fn gen_reached() -> Vec<f32> {
        let notes = [523.0_f32, 659.0, 784.0, 1047.0];
        let mut samples = Vec::new();
        for &freq in &notes {
            samples.extend(gen_note(freq, 0.1).iter().map(|s| s * 2.5));
        }
        samples.extend(gen_note(1047.0, 0.3).iter().map(|s| s * 2.5));
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2;
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn melody_notes_are_all_known() {
            assert!(MELODY.iter().all(|(name, _)| note_freq(name).is_some()));
        }

        #[test]
        fn melody_loop_length_matches_tempo() {
            // 4.25 beats at 140 BPM
            let expected = 4.25 * 60.0 / TEMPO_BPM * SAMPLE_RATE as f32;
            let got = gen_melody().len() as f32;
            assert!((got - expected).abs() < MELODY.len() as f32, "{got} vs {expected}");
        }

        #[test]
        fn notes_stay_quiet() {
            assert!(gen_melody().iter().all(|s| s.abs() <= 0.1 + 1e-6));
        }

        #[test]
        fn wav_header_sizes() {
            let wav = make_wav(&[0.0; 100]);
            assert_eq!(wav.len(), 44 + 200);
            assert_eq!(&wav[0..4], b"RIFF");
            assert_eq!(u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]), 200);
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine {
    bgm_on: bool,
}

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new(bgm_on: bool) -> Option<Self> { Some(SoundEngine { bgm_on }) }
    pub fn bgm_on(&self) -> bool { self.bgm_on }
    pub fn toggle_bgm(&mut self) { self.bgm_on = !self.bgm_on; }
    pub fn play_captured(&self) {}
    pub fn play_reached(&self) {}
}
