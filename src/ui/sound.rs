/// Procedural sound effects via rodio.
///
/// Every effect is synthesised once at startup into an in-memory WAV
/// buffer and replayed on a detached Sink, so playback never blocks the
/// game loop.
///
/// Without the "sound" feature the stub `SoundEngine` below swallows
/// every call.

#[cfg(feature = "sound")]
mod inner {
    use std::f32::consts::TAU;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    pub(super) const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_coin: Arc<Vec<u8>>,
        sfx_jump: Arc<Vec<u8>>,
        sfx_level: Arc<Vec<u8>>,
        sfx_hit: Arc<Vec<u8>>,
        sfx_route: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::info!(error = %e, "no audio output, running silent");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_coin: Arc::new(make_wav(&gen_coin())),
                sfx_jump: Arc::new(make_wav(&gen_jump())),
                sfx_level: Arc::new(make_wav(&gen_level_up())),
                sfx_hit: Arc::new(make_wav(&gen_hit())),
                sfx_route: Arc::new(make_wav(&gen_route_complete())),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            let sink = match Sink::try_new(&self.handle) {
                Ok(s) => s,
                Err(e) => {
                    tracing::debug!(error = %e, "sink unavailable");
                    return;
                }
            };
            if let Ok(src) = rodio::Decoder::new(Cursor::new(buf.as_ref().clone())) {
                sink.append(src);
                sink.detach();
            }
        }

        pub fn play_coin(&self) { self.play(&self.sfx_coin); }
        pub fn play_jump(&self) { self.play(&self.sfx_jump); }
        pub fn play_level_up(&self) { self.play(&self.sfx_level); }
        pub fn play_hit(&self) { self.play(&self.sfx_hit); }
        pub fn play_route_complete(&self) { self.play(&self.sfx_route); }
    }

    // ════════════════════════════════════════════════════════════
    //  Synthesis
    // ════════════════════════════════════════════════════════════

    fn sample_count(seconds: f32) -> usize {
        (SAMPLE_RATE as f32 * seconds) as usize
    }

    /// One note built from weighted harmonics: `partials` is (multiple, weight).
    fn note(freq: f32, seconds: f32, partials: &[(f32, f32)], volume: f32, decay: f32) -> Vec<f32> {
        let n = sample_count(seconds);
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * decay;
                let wave: f32 = partials
                    .iter()
                    .map(|&(mul, w)| (t * freq * mul * TAU).sin() * w)
                    .sum();
                wave * env * volume
            })
            .collect()
    }

    fn melody(notes: &[(f32, f32)], partials: &[(f32, f32)], volume: f32, decay: f32) -> Vec<f32> {
        notes
            .iter()
            .flat_map(|&(freq, secs)| note(freq, secs, partials, volume, decay))
            .collect()
    }

    /// Linear sweep from `from` Hz to `to` Hz.
    fn sweep(from: f32, to: f32, seconds: f32, volume: f32) -> Vec<f32> {
        let n = sample_count(seconds);
        let mut phase = 0.0f32;
        (0..n)
            .map(|i| {
                let p = i as f32 / n as f32;
                let freq = from + (to - from) * p;
                phase += freq / SAMPLE_RATE as f32;
                (phase * TAU).sin() * (1.0 - p).powf(0.7) * volume
            })
            .collect()
    }

    /// Coin: bright two-note ping (E6 → B6).
    fn gen_coin() -> Vec<f32> {
        melody(&[(1319.0, 0.04), (1976.0, 0.09)], &[(1.0, 0.75), (3.0, 0.25)], 0.25, 1.0)
    }

    /// Jump: short rising chirp.
    fn gen_jump() -> Vec<f32> {
        sweep(280.0, 760.0, 0.12, 0.22)
    }

    /// Level up: G5 C6 E6 G6.
    fn gen_level_up() -> Vec<f32> {
        melody(
            &[(784.0, 0.07), (1047.0, 0.07), (1319.0, 0.07), (1568.0, 0.16)],
            &[(1.0, 0.7), (2.0, 0.3)],
            0.28,
            0.4,
        )
    }

    /// Hit by a rug: noisy thud followed by a falling tone.
    fn gen_hit() -> Vec<f32> {
        let n = sample_count(0.08);
        let mut seed: u32 = 0x2f6b_1d3a;
        let mut out: Vec<f32> = (0..n)
            .map(|i| {
                seed ^= seed << 13;
                seed ^= seed >> 17;
                seed ^= seed << 5;
                let noise = (seed as f32 / u32::MAX as f32) * 2.0 - 1.0;
                noise * (1.0 - i as f32 / n as f32) * 0.35
            })
            .collect();
        out.extend(sweep(392.0, 110.0, 0.45, 0.3));
        out
    }

    /// Route completed: ascending fanfare with a held top note.
    fn gen_route_complete() -> Vec<f32> {
        let partials = [(1.0, 0.6), (2.0, 0.3), (3.0, 0.1)];
        let mut out = melody(
            &[(523.0, 0.1), (659.0, 0.1), (784.0, 0.1), (1047.0, 0.1)],
            &partials,
            0.3,
            0.3,
        );
        out.extend(note(1047.0, 0.35, &partials, 0.3, 1.0));
        out
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: 16-bit mono PCM
    // ════════════════════════════════════════════════════════════

    pub(super) fn make_wav(samples: &[f32]) -> Vec<u8> {
        const CHANNELS: u16 = 1;
        const BITS: u16 = 16;
        let block_align = CHANNELS * BITS / 8;
        let byte_rate = SAMPLE_RATE * block_align as u32;
        let data_size = samples.len() as u32 * block_align as u32;

        let mut buf = Vec::with_capacity(44 + data_size as usize);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&CHANNELS.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&BITS.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            buf.extend_from_slice(&v.to_le_bytes());
        }
        buf
    }

}

// ════════════════════════════════════════════════════════════
//  Public API: no-ops when the sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_coin(&self) {}
    pub fn play_jump(&self) {}
    pub fn play_level_up(&self) {}
    pub fn play_hit(&self) {}
    pub fn play_route_complete(&self) {}
}
