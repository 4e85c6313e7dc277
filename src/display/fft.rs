use realfft::RealFftPlanner;
use rustfft::num_complex::Complex64;
use crate::display::DisplayError;
/// Forward/inverse real transform pair. Neither direction is normalized.
pub struct Transformer {
    planner: RealFftPlanner<f64>,
}
impl Transformer {
    pub fn new() -> Self {
        Self {
            planner: RealFftPlanner::<f64>::new(),
        }
    }
    /// One-sided spectrum of `input`, `input.len() / 2 + 1` bins.
    pub fn forward(&mut self, input: &[f64]) -> Result<Vec<Complex64>, DisplayError> {
        if input.len() < 2 {
            return Ok(input
                .iter()
                .map(|&v| Complex64::new(v, 0.0))
                .chain(std::iter::repeat(Complex64::new(0.0, 0.0)))
                .take(1)
                .collect());
        }
        let r2c = self.planner.plan_fft_forward(input.len());
        let mut scratch = input.to_vec();
        let mut spectrum = r2c.make_output_vec();
        r2c.process(&mut scratch, &mut spectrum)?;
        Ok(spectrum)
    }
    /// Real signal of length `len` from its first `len / 2 + 1` bins.
    ///
    /// The imaginary parts of the DC bin and, for even `len`, of the Nyquist bin
    /// carry no information for a real output and are ignored.
    pub fn inverse(&mut self, bins: &[Complex64], len: usize) -> Result<Vec<f64>, DisplayError> {
        let freqs = len / 2 + 1;
        if bins.len() != freqs {
            return Err(DisplayError::Transform(format!(
                "inverse of length {len} needs {freqs} bins, got {}",
                bins.len()
            )));
        }
        if len < 2 {
            return Ok(bins.iter().take(len).map(|c| c.re).collect());
        }
        let mut input = bins.to_vec();
        input[0].im = 0.0;
        if len % 2 == 0 {
            input[freqs - 1].im = 0.0;
        }
        let c2r = self.planner.plan_fft_inverse(len);
        let mut output = c2r.make_output_vec();
        c2r.process(&mut input, &mut output)?;
        Ok(output)
    }
}
impl Default for Transformer {
    fn default() -> Self {
        Self::new()
    }
}
/// One-sided magnitude spectrum of a buffer, recomputed on every request.
#[derive(Clone, Debug)]
pub struct SpectrumSnapshot {
    pub frequencies_hz: Vec<f64>,
    pub magnitudes: Vec<f64>,
}
/// Computes spectra for the display; owns its own transform scratch.
pub struct SpectrumEngine {
    transformer: Transformer,
}
impl SpectrumEngine {
    pub fn new() -> Self {
        Self {
            transformer: Transformer::new(),
        }
    }
    /// Magnitudes are bin moduli divided by the buffer length, so bin 0 is `|mean|`.
    /// The frequency axis spans 0 to Nyquist inclusive in `size / 2 + 1` steps.
    pub fn compute(
        &mut self,
        samples: &[f64],
        sample_rate_hz: f64,
    ) -> Result<SpectrumSnapshot, DisplayError> {
        let size = samples.len();
        let freqs = size / 2 + 1;
        let bins = self.transformer.forward(samples)?;
        let norm = size.max(1) as f64;
        let magnitudes = bins.iter().map(|c| c.norm() / norm).collect();
        Ok(SpectrumSnapshot {
            frequencies_hz: frequency_axis(freqs, sample_rate_hz),
            magnitudes,
        })
    }
}
impl Default for SpectrumEngine {
    fn default() -> Self {
        Self::new()
    }
}
fn frequency_axis(freqs: usize, sample_rate_hz: f64) -> Vec<f64> {
    if freqs <= 1 {
        return vec![0.0; freqs];
    }
    let step = (sample_rate_hz / 2.0) / (freqs - 1) as f64;
    (0..freqs).map(|k| k as f64 * step).collect()
}
