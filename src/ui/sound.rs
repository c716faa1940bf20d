/// Procedural sound effects via rodio.
///
/// Each effect is synthesized once at startup into an in-memory WAV and
/// replayed fire-and-forget. `play_events` maps a tick's events to sounds.
///
/// Without the "sound" feature the stub engine swallows everything.

use crate::sim::event::GameEvent;

#[cfg(feature = "sound")]
mod inner {
    use std::f32::consts::TAU;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
    use tracing::warn;

    const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_step: Arc<Vec<u8>>,
        sfx_push: Arc<Vec<u8>>,
        sfx_explosion: Arc<Vec<u8>>,
        sfx_die: Arc<Vec<u8>>,
        sfx_clear: Arc<Vec<u8>>,
        sfx_undo: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    warn!("no audio output: {e}");
                    return None;
                }
            };
            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_step: Arc::new(encode_wav(&tone_sweep(220.0, 180.0, 0.03, 0.12))),
                sfx_push: Arc::new(encode_wav(&scrape())),
                sfx_explosion: Arc::new(encode_wav(&boom())),
                sfx_die: Arc::new(encode_wav(&melody(&[392.0, 330.0, 262.0, 196.0], 0.11, 0.3))),
                sfx_clear: Arc::new(encode_wav(&melody(&[523.0, 659.0, 784.0, 1047.0, 1047.0], 0.09, 0.28))),
                sfx_undo: Arc::new(encode_wav(&tone_sweep(500.0, 900.0, 0.07, 0.18))),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            let Ok(sink) = Sink::try_new(&self.handle) else { return };
            if let Ok(src) = Decoder::new(Cursor::new(buf.as_ref().clone())) {
                sink.append(src);
                sink.detach();
            }
        }

        pub fn play_step(&self) { self.play(&self.sfx_step); }
        pub fn play_push(&self) { self.play(&self.sfx_push); }
        pub fn play_explosion(&self) { self.play(&self.sfx_explosion); }
        pub fn play_die(&self) { self.play(&self.sfx_die); }
        pub fn play_clear(&self) { self.play(&self.sfx_clear); }
        pub fn play_undo(&self) { self.play(&self.sfx_undo); }
    }

    // ════════════════════════════════════════════════════════════
    //  Generators (mono f32 samples)
    // ════════════════════════════════════════════════════════════

    fn sample_count(seconds: f32) -> usize {
        (SAMPLE_RATE as f32 * seconds) as usize
    }

    /// Sine glide from `from` Hz to `to` Hz with a linear fade.
    pub(super) fn tone_sweep(from: f32, to: f32, seconds: f32, volume: f32) -> Vec<f32> {
        let n = sample_count(seconds);
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                phase += (from + (to - from) * t) / SAMPLE_RATE as f32;
                (phase * TAU).sin() * (1.0 - t) * volume
            })
            .collect()
    }

    /// Square-ish notes played back to back.
    pub(super) fn melody(notes: &[f32], note_seconds: f32, volume: f32) -> Vec<f32> {
        let n = sample_count(note_seconds);
        notes.iter()
            .flat_map(|&freq| {
                (0..n).map(move |i| {
                    let t = i as f32 / SAMPLE_RATE as f32;
                    let env = 1.0 - 0.4 * (i as f32 / n as f32);
                    let wave = (t * freq * TAU).sin() * 0.75 + (t * freq * 3.0 * TAU).sin() * 0.25;
                    wave * env * volume
                })
            })
            .collect()
    }

    /// Deterministic white noise in [-1, 1].
    fn noise(seed: u32) -> impl FnMut() -> f32 {
        let mut state = seed;
        move || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state as f32 / u32::MAX as f32 * 2.0 - 1.0
        }
    }

    /// Stone dragged across stone: low hum under filtered noise.
    fn scrape() -> Vec<f32> {
        let n = sample_count(0.14);
        let mut rand = noise(0x5eed);
        let mut low = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                low += (rand() - low) * 0.15;
                let hum = (i as f32 / SAMPLE_RATE as f32 * 90.0 * TAU).sin();
                (low * 0.7 + hum * 0.3) * (1.0 - t).powf(0.7) * 0.35
            })
            .collect()
    }

    /// Noise burst with a falling low-pass.
    fn boom() -> Vec<f32> {
        let n = sample_count(0.45);
        let mut rand = noise(0xb00b5);
        let mut low = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let cutoff = 0.5 * (1.0 - t) + 0.02;
                low += (rand() - low) * cutoff;
                low * (1.0 - t).powf(1.5) * 0.6
            })
            .collect()
    }

    // ════════════════════════════════════════════════════════════
    //  16-bit PCM WAV container
    // ════════════════════════════════════════════════════════════

    pub(super) fn encode_wav(samples: &[f32]) -> Vec<u8> {
        const CHANNELS: u16 = 1;
        const BITS: u16 = 16;
        let block_align = CHANNELS * BITS / 8;
        let data_len = samples.len() as u32 * block_align as u32;

        let mut out = Vec::with_capacity(44 + data_len as usize);
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(36 + data_len).to_le_bytes());
        out.extend_from_slice(b"WAVEfmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&CHANNELS.to_le_bytes());
        out.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        out.extend_from_slice(&(SAMPLE_RATE * block_align as u32).to_le_bytes());
        out.extend_from_slice(&block_align.to_le_bytes());
        out.extend_from_slice(&BITS.to_le_bytes());
        out.extend_from_slice(b"data");
        out.extend_from_slice(&data_len.to_le_bytes());
        for &s in samples {
            out.extend_from_slice(&((s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16).to_le_bytes());
        }
        out
    }
}

// ════════════════════════════════════════════════════════════
//  Public API
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_step(&self) {}
    pub fn play_push(&self) {}
    pub fn play_explosion(&self) {}
    pub fn play_die(&self) {}
    pub fn play_clear(&self) {}
    pub fn play_undo(&self) {}
}

impl SoundEngine {
    /// One sound per kind of event; a push replaces the footstep.
    pub fn play_events(&self, events: &[GameEvent]) {
        let has = |f: fn(&GameEvent) -> bool| events.iter().any(f);

        if has(|e| matches!(e, GameEvent::PlayerKilled { .. })) { self.play_die(); }
        if has(|e| matches!(e, GameEvent::Exploded { .. })) { self.play_explosion(); }
        if has(|e| matches!(e, GameEvent::LevelCleared)) { self.play_clear(); }
        if has(|e| matches!(e, GameEvent::Undone | GameEvent::Restarted)) { self.play_undo(); }

        if has(|e| matches!(e, GameEvent::BlockPushed { .. })) {
            self.play_push();
        } else if has(|e| matches!(e, GameEvent::PlayerMoved)) {
            self.play_step();
        }
    }
}

#[cfg(all(test, feature = "sound"))]
mod tests {
    use super::inner::{encode_wav, melody, tone_sweep};

    #[test]
    fn wav_header_matches_payload() {
        let samples = tone_sweep(200.0, 400.0, 0.01, 0.5);
        let wav = encode_wav(&samples);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..16], b"WAVEfmt ");
        let data_len = u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]);
        assert_eq!(data_len as usize, samples.len() * 2);
        assert_eq!(wav.len(), 44 + data_len as usize);
    }

    #[test]
    fn generated_samples_stay_in_range() {
        let notes = melody(&[440.0, 880.0], 0.02, 0.3);
        assert!(notes.iter().all(|s| s.abs() <= 1.0));
    }
}
