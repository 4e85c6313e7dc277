use crate::display::DisplayError;
/// Fixed-capacity shift register of the most recent samples, oldest first.
#[derive(Clone, Debug, PartialEq)]
pub struct RollingBuffer {
    samples: Vec<f64>,
}
impl RollingBuffer {
    /// A buffer of `size` zero samples ("no data yet").
    pub fn zeroed(size: usize) -> Self {
        Self {
            samples: vec![0.0; size],
        }
    }
    pub fn len(&self) -> usize {
        self.samples.len()
    }
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }
    /// Changes the capacity while keeping the newest `min(old, new)` samples
    /// at the tail. Growth pads the front with zeros, shrinking drops the oldest.
    pub fn resize(&mut self, new_size: usize) {
        let old_size = self.samples.len();
        if new_size == old_size {
            return;
        }
        let mut resized = Vec::with_capacity(new_size);
        if new_size > old_size {
            resized.resize(new_size - old_size, 0.0);
            resized.extend_from_slice(&self.samples);
        } else {
            resized.extend_from_slice(&self.samples[old_size - new_size..]);
        }
        self.samples = resized;
    }
    /// Shifts `incoming` in at the tail; the same number of oldest samples fall out.
    /// Returns how many samples were appended.
    pub fn append(&mut self, incoming: &[f64]) -> usize {
        let size = self.samples.len();
        if incoming.is_empty() || size == 0 {
            return 0;
        }
        if incoming.len() >= size {
            self.samples
                .copy_from_slice(&incoming[incoming.len() - size..]);
            return size;
        }
        let k = incoming.len();
        self.samples.copy_within(k.., 0);
        self.samples[size - k..].copy_from_slice(incoming);
        k
    }
    /// Swaps in fully computed content in one step.
    pub fn replace(&mut self, samples: Vec<f64>) {
        self.samples = samples;
    }
    /// Discards all content and refills with `size` zeros.
    pub fn clear_to(&mut self, size: usize) {
        self.samples.clear();
        self.samples.resize(size, 0.0);
    }
}
/// X coordinates for a buffer: seconds before now, `x[i] = (size - i - 1) / rate`.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeAxis {
    values: Vec<f64>,
    rate_hz: f64,
}
impl TimeAxis {
    pub fn new(size: usize, rate_hz: f64) -> Result<Self, DisplayError> {
        validate_rate(rate_hz)?;
        Ok(Self {
            values: (0..size).map(|i| position(size, i, rate_hz)).collect(),
            rate_hz,
        })
    }
    pub fn rate_hz(&self) -> f64 {
        self.rate_hz
    }
    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn values(&self) -> &[f64] {
        &self.values
    }
    /// Resizes in lockstep with [`RollingBuffer::resize`]: existing coordinates shift
    /// with their samples and the new leading entries are computed fresh.
    pub fn resize(&mut self, new_size: usize) {
        let old_size = self.values.len();
        if new_size == old_size {
            return;
        }
        let mut resized = Vec::with_capacity(new_size);
        if new_size > old_size {
            let offset = new_size - old_size;
            resized.extend((0..offset).map(|i| position(new_size, i, self.rate_hz)));
            resized.extend_from_slice(&self.values);
        } else {
            resized.extend_from_slice(&self.values[old_size - new_size..]);
        }
        self.values = resized;
    }
    /// Recomputes every coordinate for a new size and rate.
    pub fn rebuild(&mut self, size: usize, rate_hz: f64) -> Result<(), DisplayError> {
        *self = Self::new(size, rate_hz)?;
        Ok(())
    }
}
fn position(size: usize, index: usize, rate_hz: f64) -> f64 {
    (size - index - 1) as f64 / rate_hz
}
pub(crate) fn validate_rate(rate_hz: f64) -> Result<(), DisplayError> {
    if rate_hz.is_finite() && rate_hz > 0.0 {
        Ok(())
    } else {
        Err(DisplayError::InvalidSampleRate(rate_hz))
    }
}
/// Number of samples covering `duration_seconds` at `rate_hz`, truncated.
pub fn window_size(duration_seconds: f64, rate_hz: f64) -> usize {
    (duration_seconds * rate_hz) as usize
}
