// SPDX-License-Identifier: MPL-2.0
//! Software implementation of the audio context.
//!
//! Mirrors what a web analyser node computes from the most recent
//! `fft_size` time-domain samples: Blackman window, forward FFT, magnitude
//! normalized by the FFT size, exponential smoothing against the previous
//! frame, then decibels mapped linearly onto `0..=255`.

use super::{AudioContextApi, AudioContextState};
use crate::config::{
    ANALYSER_FFT_SIZE, ANALYSER_MAX_DECIBELS, ANALYSER_MIN_DECIBELS, ANALYSER_SMOOTHING,
};
use crate::error::MediaError;
use crate::player::media::ElementId;
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::collections::VecDeque;
use std::f32::consts::PI;
use std::fmt;
use std::sync::Arc;

pub struct SoftwareAnalyser {
    state: AudioContextState,
    source: Option<ElementId>,
    gain: f32,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    samples: VecDeque<f32>,
    smoothed: Vec<f32>,
    scratch: Vec<Complex<f32>>,
}

impl fmt::Debug for SoftwareAnalyser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoftwareAnalyser")
            .field("state", &self.state)
            .field("source", &self.source)
            .field("gain", &self.gain)
            .field("fft_size", &self.window.len())
            .finish_non_exhaustive()
    }
}

fn blackman(size: usize) -> Vec<f32> {
    const ALPHA: f32 = 0.16;
    let a0 = 0.5 * (1.0 - ALPHA);
    let a1 = 0.5;
    let a2 = 0.5 * ALPHA;
    (0..size)
        .map(|n| {
            let phase = 2.0 * PI * n as f32 / size as f32;
            a0 - a1 * phase.cos() + a2 * (2.0 * phase).cos()
        })
        .collect()
}

impl SoftwareAnalyser {
    /// Analyser with the default FFT size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_fft_size(ANALYSER_FFT_SIZE)
    }

    /// `fft_size` is rounded up to a power of two, minimum 32.
    #[must_use]
    pub fn with_fft_size(fft_size: usize) -> Self {
        let size = fft_size.max(32).next_power_of_two();
        let mut planner = FftPlanner::<f32>::new();
        Self {
            state: AudioContextState::Suspended,
            source: None,
            gain: 1.0,
            fft: planner.plan_fft_forward(size),
            window: blackman(size),
            samples: std::iter::repeat(0.0).take(size).collect(),
            smoothed: vec![0.0; size / 2],
            scratch: vec![Complex::new(0.0, 0.0); size],
        }
    }

    #[must_use]
    pub fn fft_size(&self) -> usize {
        self.window.len()
    }

    /// Feeds decoded mono PCM. Only the newest `fft_size` samples are kept.
    /// Samples arriving while no source is connected are dropped.
    pub fn push_samples(&mut self, samples: &[f32]) {
        if self.source.is_none() {
            return;
        }
        let size = self.window.len();
        let skip = samples.len().saturating_sub(size);
        for &sample in &samples[skip..] {
            if self.samples.len() == size {
                self.samples.pop_front();
            }
            let sample = if sample.is_finite() { sample } else { 0.0 };
            self.samples.push_back(sample * self.gain);
        }
    }

    /// Connected element, if any.
    #[must_use]
    pub fn source(&self) -> Option<ElementId> {
        self.source
    }

    fn analyse(&mut self) {
        let size = self.window.len();
        for ((slot, &sample), &weight) in self
            .scratch
            .iter_mut()
            .zip(self.samples.iter())
            .zip(self.window.iter())
        {
            *slot = Complex::new(sample * weight, 0.0);
        }
        self.fft.process(&mut self.scratch);

        let scale = 1.0 / size as f32;
        for (smoothed, bin) in self.smoothed.iter_mut().zip(self.scratch.iter()) {
            let magnitude = bin.norm() * scale;
            let next = ANALYSER_SMOOTHING * *smoothed + (1.0 - ANALYSER_SMOOTHING) * magnitude;
            *smoothed = if next.is_finite() { next } else { 0.0 };
        }
    }
}

impl Default for SoftwareAnalyser {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps a linear magnitude onto the analyser byte range.
fn to_byte(magnitude: f32) -> u8 {
    if magnitude <= 0.0 {
        return 0;
    }
    let db = 20.0 * magnitude.log10();
    let range = ANALYSER_MAX_DECIBELS - ANALYSER_MIN_DECIBELS;
    let scaled = 255.0 / range * (db - ANALYSER_MIN_DECIBELS);
    scaled.floor().clamp(0.0, 255.0) as u8
}

impl AudioContextApi for SoftwareAnalyser {
    fn state(&self) -> AudioContextState {
        self.state
    }

    fn resume(&mut self) {
        if self.state == AudioContextState::Suspended {
            self.state = AudioContextState::Running;
        }
    }

    fn connect_source(&mut self, element: ElementId) -> Result<(), MediaError> {
        if self.state == AudioContextState::Closed {
            return Err(MediaError::Unsupported("audio context closed".into()));
        }
        self.source = Some(element);
        self.samples.iter_mut().for_each(|s| *s = 0.0);
        self.smoothed.iter_mut().for_each(|s| *s = 0.0);
        Ok(())
    }

    fn disconnect(&mut self) {
        self.source = None;
    }

    fn set_gain(&mut self, gain: f32) {
        self.gain = if gain.is_finite() { gain.max(0.0) } else { 0.0 };
    }

    fn frequency_bin_count(&self) -> usize {
        self.smoothed.len()
    }

    fn frequency_data(&mut self, out: &mut [u8]) {
        if self.source.is_none() || self.state != AudioContextState::Running {
            out.iter_mut().for_each(|b| *b = 0);
            return;
        }
        self.analyse();
        for (byte, &magnitude) in out.iter_mut().zip(self.smoothed.iter()) {
            *byte = to_byte(magnitude);
        }
    }

    fn feed(&mut self, samples: &[f32]) {
        self.push_samples(samples);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq_bin: usize, size: usize, amplitude: f32) -> Vec<f32> {
        (0..size)
            .map(|n| amplitude * (2.0 * PI * freq_bin as f32 * n as f32 / size as f32).sin())
            .collect()
    }

    fn running(size: usize) -> SoftwareAnalyser {
        let mut analyser = SoftwareAnalyser::with_fft_size(size);
        analyser.connect_source(ElementId(1)).expect("context open");
        analyser.resume();
        analyser
    }

    #[test]
    fn fft_size_is_a_power_of_two() {
        assert_eq!(SoftwareAnalyser::with_fft_size(1000).fft_size(), 1024);
        assert_eq!(SoftwareAnalyser::with_fft_size(1).fft_size(), 32);
        assert_eq!(SoftwareAnalyser::new().frequency_bin_count(), ANALYSER_FFT_SIZE / 2);
    }

    #[test]
    fn silence_reads_as_zero() {
        let mut analyser = running(256);
        analyser.push_samples(&vec![0.0; 256]);
        let mut out = vec![7u8; 128];
        analyser.frequency_data(&mut out);
        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    fn tone_peaks_at_its_bin() {
        let mut analyser = running(256);
        let input = sine(16, 256, 0.01);
        let mut out = vec![0u8; 128];
        // Let the smoothing converge.
        for _ in 0..40 {
            analyser.push_samples(&input);
            analyser.frequency_data(&mut out);
        }
        let peak = out
            .iter()
            .enumerate()
            .max_by_key(|&(_, b)| *b)
            .map(|(i, _)| i)
            .expect("non-empty spectrum");
        assert_eq!(peak, 16);
        assert!(out[16] > out[14]);
        assert_eq!(out[100], 0);
    }

    #[test]
    fn suspended_context_reports_nothing() {
        let mut analyser = SoftwareAnalyser::with_fft_size(64);
        analyser.connect_source(ElementId(1)).expect("context open");
        analyser.push_samples(&sine(4, 64, 1.0));
        let mut out = vec![1u8; 32];
        analyser.frequency_data(&mut out);
        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    fn zero_gain_silences_input() {
        let mut analyser = running(64);
        analyser.set_gain(0.0);
        analyser.push_samples(&sine(4, 64, 1.0));
        let mut out = vec![1u8; 32];
        analyser.frequency_data(&mut out);
        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    fn byte_mapping_spans_decibel_range() {
        assert_eq!(to_byte(0.0), 0);
        assert_eq!(to_byte(10f32.powf(ANALYSER_MIN_DECIBELS / 20.0) * 0.5), 0);
        assert_eq!(to_byte(1.0), 255);
    }
}
