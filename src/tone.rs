use anyhow::{bail, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SizedSample, StreamConfig};
use std::time::Duration;

use crate::constants::tone::{AMPLITUDE, DURATION_MS, FADE_MS, FREQUENCY_HZ};

/// Something that can make an alert noise without leaving the process
pub trait TonePlayer: Send + Sync {
    /// Play the tone and block until it has finished
    fn play(&self) -> Result<()>;
}

/// Short sine chime on the default output device
#[derive(Debug, Clone, Copy)]
pub struct CpalTone {
    pub frequency_hz: f32,
    pub duration: Duration,
}

impl Default for CpalTone {
    fn default() -> Self {
        CpalTone {
            frequency_hz: FREQUENCY_HZ,
            duration: Duration::from_millis(DURATION_MS),
        }
    }
}

impl TonePlayer for CpalTone {
    fn play(&self) -> Result<()> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .context("No output device available")?;

        let supported = device
            .default_output_config()
            .context("Failed to get default output config")?;

        let sample_format = supported.sample_format();
        let config: StreamConfig = supported.into();

        match sample_format {
            cpal::SampleFormat::F32 => self.play_with::<f32>(&device, &config),
            cpal::SampleFormat::I16 => self.play_with::<i16>(&device, &config),
            cpal::SampleFormat::U16 => self.play_with::<u16>(&device, &config),
            other => bail!("Unsupported output sample format: {:?}", other),
        }
    }
}

impl CpalTone {
    fn play_with<T>(&self, device: &Device, config: &StreamConfig) -> Result<()>
    where
        T: SizedSample + FromSample<f32>,
    {
        let sample_rate = config.sample_rate.0;
        let channels = config.channels as usize;
        let mut samples = tone_samples(self.frequency_hz, self.duration, sample_rate).into_iter();

        let err_fn = |err| tracing::warn!("Tone output stream error: {}", err);

        let stream = device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    // Same mono sample on every channel, silence once the tone is exhausted
                    for frame in data.chunks_mut(channels) {
                        let value = T::from_sample(samples.next().unwrap_or(0.0));
                        for sample in frame.iter_mut() {
                            *sample = value;
                        }
                    }
                },
                err_fn,
                None,
            )
            .context("Failed to build output stream")?;

        stream.play().context("Failed to start output stream")?;

        // Let the device drain the buffer tail before the stream is dropped
        std::thread::sleep(self.duration + Duration::from_millis(FADE_MS * 2));

        Ok(())
    }
}

/// Mono sine wave with a linear fade at both ends
pub fn tone_samples(frequency_hz: f32, duration: Duration, sample_rate: u32) -> Vec<f32> {
    let total = (sample_rate as u64 * duration.as_millis() as u64 / 1000) as usize;
    let fade = ((sample_rate as u64 * FADE_MS / 1000) as usize).min(total / 2);

    (0..total)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            let envelope = if fade == 0 {
                1.0
            } else if i < fade {
                i as f32 / fade as f32
            } else if i >= total - fade {
                (total - 1 - i) as f32 / fade as f32
            } else {
                1.0
            };
            (t * frequency_hz * std::f32::consts::TAU).sin() * AMPLITUDE * envelope
        })
        .collect()
}
