use rustfft::num_complex::Complex64;
use crate::display::fft::Transformer;
use crate::display::{DisplayError, RollingBuffer};
/// Multiplexing overhead between the two interleaved ADC channels.
pub const DUAL_CHANNEL_OVERHEAD: f64 = 3.0;
/// Rate at which the display receives samples for each channel.
///
/// With both channels sampling, the converter alternates between them and the
/// per-channel rate drops to `1 / ((1/f1 + 1/f2) * 3)`.
pub fn effective_rate(first_hz: f64, second_hz: f64, single_channel: bool) -> f64 {
    if single_channel {
        first_hz
    } else {
        1.0 / ((1.0 / first_hz + 1.0 / second_hz) * DUAL_CHANNEL_OVERHEAD)
    }
}
/// Re-expresses buffer content at a new sample count by band-limited
/// interpolation: zero-padding (or truncating) the one-sided spectrum.
pub struct Resampler {
    transformer: Transformer,
}
impl Resampler {
    pub fn new() -> Self {
        Self {
            transformer: Transformer::new(),
        }
    }
    /// Samples of `input` re-expressed with `new_size` samples, each output
    /// divided by `new_size`.
    pub fn resample(&mut self, input: &[f64], new_size: usize) -> Result<Vec<f64>, DisplayError> {
        let old_size = input.len();
        let mut bins = self.transformer.forward(input)?;
        // High bins beyond the old Nyquist are zero, never wrapped.
        let freqs = old_size.max(new_size) / 2 + 1;
        bins.resize(freqs, Complex64::new(0.0, 0.0));
        let mut output = self.transformer.inverse(&bins[..new_size / 2 + 1], new_size)?;
        let norm = new_size as f64;
        for sample in &mut output {
            *sample /= norm;
        }
        Ok(output)
    }
    /// Resamples `buffer` in place. The new content is computed completely
    /// before it replaces the old, so the buffer is never half old and half new.
    pub fn apply(&mut self, buffer: &mut RollingBuffer, new_size: usize) -> Result<(), DisplayError> {
        if buffer.len() == new_size {
            return Ok(());
        }
        let resampled = self.resample(buffer.samples(), new_size)?;
        buffer.replace(resampled);
        Ok(())
    }
}
impl Default for Resampler {
    fn default() -> Self {
        Self::new()
    }
}
