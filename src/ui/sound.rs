/// Sound effects: small procedural clips played through rodio.
///
/// Every clip is synthesised into an in-memory WAV buffer once at startup.
/// Playback is fire-and-forget on a detached Sink.
///
/// Without the "sound" feature the stub engine accepts the same calls and
/// does nothing.

/// One effect per kind of thing the player should hear.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sfx {
    Pickup,
    Splash,
    Chop,
    Unlock,
    Swing,
    Hit,
    MonsterDeath,
    Hurt,
    Quest,
    Teleport,
}

impl Sfx {
    pub const ALL: [Sfx; 10] = [
        Sfx::Pickup, Sfx::Splash, Sfx::Chop, Sfx::Unlock, Sfx::Swing,
        Sfx::Hit, Sfx::MonsterDeath, Sfx::Hurt, Sfx::Quest, Sfx::Teleport,
    ];
}

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};
    use tracing::{debug, info};

    use super::Sfx;

    const SAMPLE_RATE: u32 = 22050;
    const TAU: f32 = std::f32::consts::TAU;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        clips: Vec<Arc<Vec<u8>>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    info!(error = %e, "no audio output; sound disabled");
                    return None;
                }
            };
            let clips = Sfx::ALL.iter().map(|&s| Arc::new(make_wav(&synth(s)))).collect();
            Some(SoundEngine { _stream: stream, handle, clips })
        }

        pub fn play(&self, sfx: Sfx) {
            let Some(buf) = self.clips.get(sfx as usize) else { return };
            let sink = match Sink::try_new(&self.handle) {
                Ok(s) => s,
                Err(e) => {
                    debug!(error = %e, ?sfx, "sink unavailable");
                    return;
                }
            };
            if let Ok(src) = rodio::Decoder::new(Cursor::new(buf.as_ref().clone())) {
                sink.append(src);
                sink.detach();
            }
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Synthesis: every generator yields mono f32 samples
    // ════════════════════════════════════════════════════════════

    pub(super) fn synth(sfx: Sfx) -> Vec<f32> {
        match sfx {
            Sfx::Pickup => notes(&[(1047.0, 0.045), (1319.0, 0.045), (1568.0, 0.045)], 0.25),
            Sfx::Splash => noise(0.30, 0.35, 1.6, 9),
            Sfx::Chop => {
                let mut s = noise(0.06, 0.45, 0.5, 3);
                s.extend(sweep(180.0, 90.0, 0.08, 0.3));
                s
            }
            Sfx::Unlock => notes(&[(880.0, 0.06), (1175.0, 0.12)], 0.3),
            Sfx::Swing => {
                let mut s = sweep(900.0, 300.0, 0.10, 0.15);
                mix(&mut s, &noise(0.10, 0.15, 1.0, 7));
                s
            }
            Sfx::Hit => square(140.0, 0.08, 0.3),
            Sfx::MonsterDeath => notes(&[(330.0, 0.1), (262.0, 0.1), (196.0, 0.18)], 0.3),
            Sfx::Hurt => square(90.0, 0.15, 0.25),
            Sfx::Quest => notes(
                &[(523.0, 0.1), (659.0, 0.1), (784.0, 0.1), (1047.0, 0.3)],
                0.3,
            ),
            Sfx::Teleport => sweep(200.0, 1600.0, 0.35, 0.25),
        }
    }

    /// Sequence of sine-plus-octave notes, each decaying.
    fn notes(seq: &[(f32, f32)], volume: f32) -> Vec<f32> {
        let mut samples = Vec::new();
        for &(freq, dur) in seq {
            let n = (SAMPLE_RATE as f32 * dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                let wave = (t * freq * TAU).sin() * 0.7 + (t * freq * 2.0 * TAU).sin() * 0.3;
                samples.push(wave * env * volume);
            }
        }
        samples
    }

    /// Linear frequency glide.
    fn sweep(from: f32, to: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let p = i as f32 / n as f32;
                phase += (from + (to - from) * p) / SAMPLE_RATE as f32;
                (phase * TAU).sin() * (1.0 - p) * volume
            })
            .collect()
    }

    fn square(freq: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - i as f32 / n as f32;
                let s = if (t * freq).fract() < 0.5 { 1.0 } else { -1.0 };
                s * env * volume
            })
            .collect()
    }

    /// LCG noise, smoothed over `smooth` samples. Larger `decay` fades
    /// faster.
    fn noise(duration: f32, volume: f32, decay: f32, smooth: usize) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut state: u32 = 0x2545_f491;
        let mut acc = 0.0_f32;
        let k = 1.0 / smooth.max(1) as f32;
        (0..n)
            .map(|i| {
                state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                let white = (state >> 8) as f32 / (1u32 << 24) as f32 * 2.0 - 1.0;
                acc += (white - acc) * k;
                let env = (1.0 - i as f32 / n as f32).powf(decay);
                acc * env * volume
            })
            .collect()
    }

    fn mix(into: &mut [f32], other: &[f32]) {
        for (a, b) in into.iter_mut().zip(other) {
            *a += b;
        }
    }

    // ════════════════════════════════════════════════════════════
    //  16-bit mono PCM WAV container
    // ════════════════════════════════════════════════════════════

    pub(super) fn make_wav(samples: &[f32]) -> Vec<u8> {
        const CHANNELS: u16 = 1;
        const BITS: u16 = 16;
        let block_align = CHANNELS * BITS / 8;
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
        buf.extend_from_slice(&(SAMPLE_RATE * block_align as u32).to_le_bytes());
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
    pub fn play(&self, _sfx: Sfx) {}
}
