/// Ordered sequence of KML colors (`aabbggrr` hex) used to classify a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorRamp {
    pub name: &'static str,
    pub colors: &'static [&'static str],
}

impl ColorRamp {
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Style id of the color at `index`, e.g. `rdgn94`.
    pub fn style_id(&self, index: usize) -> String {
        format!("{}{}", self.name, index)
    }
}

/// Red through yellow to green, for signed series such as climb rate.
pub static RDGN9: ColorRamp = ColorRamp {
    name: "rdgn9",
    colors: &[
        "ff2600a5", "ff2e40de", "ff528ef9", "ff81d4fe", "ffbefffe", "ff82e9cb", "ff66ca84",
        "ff54a02a", "ff376800",
    ],
};

/// Blue through red, for monotonic series such as elapsed time.
pub static JET9: ColorRamp = ColorRamp {
    name: "jet9",
    colors: &[
        "ff7f0000", "ffff0000", "ffff7f00", "ffffff00", "ff7fff7f", "ff00ffff", "ff007fff",
        "ff0000ff", "ff00007f",
    ],
};

/// Every ramp emitted into the style block, in document order.
pub static COLOR_RAMPS: [&ColorRamp; 2] = [&RDGN9, &JET9];

/// Equal-width bin of `value` within `[min, max]`, clamped to `0..n`.
pub fn color_bin(value: f64, min: f64, max: f64, n: usize) -> usize {
    if n == 0 || max <= min || !value.is_finite() {
        return 0;
    }
    let bin = (n as f64 * (value - min) / (max - min)).round();
    bin.clamp(0.0, (n - 1) as f64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bins_clamp_at_both_ends() {
        assert_eq!(color_bin(-4.0, -4.0, 4.0, 9), 0);
        assert_eq!(color_bin(4.0, -4.0, 4.0, 9), 8);
        assert_eq!(color_bin(100.0, -4.0, 4.0, 9), 8);
        assert_eq!(color_bin(-100.0, -4.0, 4.0, 9), 0);
    }

    #[test]
    fn zero_lands_in_middle_bin() {
        assert_eq!(color_bin(0.0, -4.0, 4.0, 9), 5);
        assert_eq!(color_bin(30.0, 0.0, 60.0, 9), 5);
    }

    #[test]
    fn degenerate_range_uses_first_bin() {
        assert_eq!(color_bin(3.0, 1.0, 1.0, 9), 0);
        assert_eq!(color_bin(f64::NAN, 0.0, 1.0, 9), 0);
    }

    #[test]
    fn ramps_have_nine_entries() {
        for ramp in COLOR_RAMPS.iter() {
            assert_eq!(ramp.len(), 9);
            assert_eq!(ramp.style_id(3), format!("{}3", ramp.name));
        }
    }
}
