//! Synthesised feedback tones played through macroquad's audio stack.

use std::{f32::consts::PI, io::Cursor};

use anyhow::{anyhow, Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use macroquad::audio::{load_sound_from_bytes, play_sound_once, Sound};
use memory_spheres_rendering::AudioCue;

const SAMPLE_RATE: u32 = 22_050;

/// Loaded sounds for every cue.
pub(crate) struct CueSounds {
    click: Sound,
    correct: Sound,
}

impl CueSounds {
    /// Synthesises and uploads both cue sounds.
    pub(crate) async fn load() -> Result<Self> {
        Ok(Self {
            click: load_cue(AudioCue::Click).await?,
            correct: load_cue(AudioCue::Correct).await?,
        })
    }

    pub(crate) fn play(&self, cue: AudioCue) {
        let sound = match cue {
            AudioCue::Click => self.click,
            AudioCue::Correct => self.correct,
        };
        play_sound_once(sound);
    }
}

async fn load_cue(cue: AudioCue) -> Result<Sound> {
    let bytes = encode_wav(&tone(cue)).with_context(|| format!("failed to encode {cue:?} tone"))?;
    load_sound_from_bytes(&bytes)
        .await
        .map_err(|error| anyhow!("failed to load {cue:?} tone: {error:?}"))
}

fn tone(cue: AudioCue) -> Vec<i16> {
    match cue {
        // Short bright ping.
        AudioCue::Click => {
            let samples = samples_for(0.08);
            (0..samples)
                .map(|index| {
                    let t = index as f32 / SAMPLE_RATE as f32;
                    let progress = index as f32 / samples as f32;
                    let envelope = (-progress * 20.0).exp();
                    let fundamental = (2.0 * PI * 880.0 * t).sin();
                    let harmonic = (2.0 * PI * 1_760.0 * t).sin() * 0.3;
                    ((fundamental + harmonic) * envelope * 20_000.0) as i16
                })
                .collect()
        }
        // Rising chirp from A4 to A5.
        AudioCue::Correct => {
            let samples = samples_for(0.15);
            let mut phase = 0.0_f32;
            (0..samples)
                .map(|index| {
                    let progress = index as f32 / samples as f32;
                    phase += (440.0 + 440.0 * progress) / SAMPLE_RATE as f32;
                    let envelope = (1.0 - progress).sqrt();
                    ((2.0 * PI * phase).sin() * envelope * 22_000.0) as i16
                })
                .collect()
        }
    }
}

fn samples_for(seconds: f32) -> usize {
    (SAMPLE_RATE as f32 * seconds) as usize
}

fn encode_wav(samples: &[i16]) -> Result<Vec<u8>> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut bytes = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut bytes, spec)?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }
    Ok(bytes.into_inner())
}
