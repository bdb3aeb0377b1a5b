//! Read-only view over a decibel magnitude spectrum
//!
//! Frames arrive with magnitudes in dB; most features need linear magnitude
//! and the frequency of each bin. This view does both conversions and treats
//! non-finite values as silence.

/// Decibel value used for empty/silent bins
pub const MIN_DB: f32 = -120.0;

/// Linear magnitude below which a bin is treated as empty
pub const LINEAR_FLOOR: f32 = 0.001;

/// Convert dB to linear magnitude, mapping non-finite input to 0
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    if db.is_finite() {
        10.0f32.powf(db / 20.0)
    } else {
        0.0
    }
}

/// Spectrum of one frame
#[derive(Debug, Clone, Copy)]
pub struct Spectrum<'a> {
    db: &'a [f32],
    bin_hz: f32,
}

impl<'a> Spectrum<'a> {
    /// Wrap `db` magnitudes produced by an FFT of `2 * db.len()` points
    pub fn new(db: &'a [f32], sample_rate: u32) -> Self {
        let bin_hz = if db.is_empty() {
            0.0
        } else {
            sample_rate as f32 / (2 * db.len()) as f32
        };
        Self { db, bin_hz }
    }

    /// Number of bins
    pub fn len(&self) -> usize {
        self.db.len()
    }

    /// True for an empty magnitude buffer
    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    /// Bin spacing in Hz
    pub fn bin_hz(&self) -> f32 {
        self.bin_hz
    }

    /// Centre frequency of bin `i`
    #[inline]
    pub fn freq(&self, i: usize) -> f32 {
        i as f32 * self.bin_hz
    }

    /// Magnitude of bin `i` in dB (non-finite values read as [`MIN_DB`])
    #[inline]
    pub fn db(&self, i: usize) -> f32 {
        let v = self.db[i];
        if v.is_finite() {
            v
        } else {
            MIN_DB
        }
    }

    /// Linear magnitude of bin `i`
    #[inline]
    pub fn linear(&self, i: usize) -> f32 {
        db_to_linear(self.db[i])
    }

    /// Bin whose centre is nearest to `freq`, if inside the spectrum
    pub fn nearest_bin(&self, freq: f32) -> Option<usize> {
        if self.bin_hz <= 0.0 || !freq.is_finite() || freq < 0.0 {
            return None;
        }
        let bin = (freq / self.bin_hz).round() as usize;
        (bin < self.db.len()).then_some(bin)
    }

    /// Inclusive bin range covering `[low_hz, high_hz]`, clipped to the spectrum
    pub fn bin_range(&self, low_hz: f32, high_hz: f32) -> std::ops::Range<usize> {
        if self.bin_hz <= 0.0 || high_hz < low_hz {
            return 0..0;
        }
        let start = (low_hz / self.bin_hz).ceil().max(0.0) as usize;
        let end = ((high_hz / self.bin_hz).floor() as usize + 1).min(self.db.len());
        start.min(end)..end
    }

    /// Sum of squared linear magnitude over `[low_hz, high_hz]`
    pub fn band_energy(&self, low_hz: f32, high_hz: f32) -> f32 {
        self.bin_range(low_hz, high_hz)
            .map(|i| {
                let m = self.linear(i);
                m * m
            })
            .sum()
    }
}
