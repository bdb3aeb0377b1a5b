//! Krumhansl-Schmuckler key templates
//!
//! Tonal-hierarchy profiles for the two modes, indexed from the tonic.
//! Templates for the other 11 roots are rotations of these.

use crate::analysis::result::Mode;

/// Major-mode profile (tonic at index 0)
pub const MAJOR_PROFILE: [f32; 12] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];

/// Minor-mode profile (tonic at index 0)
pub const MINOR_PROFILE: [f32; 12] = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

/// Key templates for both modes
#[derive(Debug, Clone)]
pub struct KeyTemplates {
    /// Major profile, tonic first
    pub major: [f32; 12],

    /// Minor profile, tonic first
    pub minor: [f32; 12],
}

impl KeyTemplates {
    /// Create templates with the Krumhansl-Schmuckler profiles
    pub fn new() -> Self {
        Self {
            major: MAJOR_PROFILE,
            minor: MINOR_PROFILE,
        }
    }

    /// Tonic-first profile for `mode`
    pub fn profile(&self, mode: Mode) -> &[f32; 12] {
        match mode {
            Mode::Major => &self.major,
            Mode::Minor => &self.minor,
        }
    }

    /// Profile rotated so that index `root` holds the tonic weight
    ///
    /// `template(root, mode)[pc]` is the weight of pitch class `pc` in the key.
    pub fn template(&self, root: u32, mode: Mode) -> [f32; 12] {
        let profile = self.profile(mode);
        let root = (root % 12) as usize;
        let mut out = [0.0f32; 12];
        for (pc, slot) in out.iter_mut().enumerate() {
            *slot = profile[(pc + 12 - root) % 12];
        }
        out
    }
}

impl Default for KeyTemplates {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation() {
        let templates = KeyTemplates::new();
        let g_major = templates.template(7, Mode::Major);
        // tonic weight lands on G, dominant (D) carries the fifth-degree weight
        assert_eq!(g_major[7], MAJOR_PROFILE[0]);
        assert_eq!(g_major[2], MAJOR_PROFILE[7]);
        assert_eq!(templates.template(0, Mode::Minor), MINOR_PROFILE);
        assert_eq!(templates.template(12, Mode::Major), MAJOR_PROFILE);
    }
}
