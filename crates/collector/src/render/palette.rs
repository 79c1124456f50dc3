//! Colour scales for tiles and map markers.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    fn mix(self, other: Rgb, frac: f64) -> Rgb {
        let channel = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
        Rgb(
            channel(self.0, other.0),
            channel(self.1, other.1),
            channel(self.2, other.2),
        )
    }
}

/// Tile colour when the value is missing.
pub const NEUTRAL: Rgb = Rgb(0xdd, 0xdd, 0xdd);

/// -10 °C to 45 °C: purples below zero, turbo up to 35 °C, then a reversed pink ramp.
const TEMPERATURE_STOPS: &[(f64, Rgb)] = &[
    (-10.0, Rgb(0xfc, 0xfb, 0xfd)),
    (-5.0, Rgb(0x9e, 0x9a, 0xc8)),
    (0.0, Rgb(0x3f, 0x00, 0x7d)),
    (0.01, Rgb(0x30, 0x12, 0x3b)),
    (3.5, Rgb(0x44, 0x54, 0xc4)),
    (7.0, Rgb(0x44, 0x90, 0xfe)),
    (10.5, Rgb(0x1f, 0xc8, 0xde)),
    (14.0, Rgb(0x29, 0xef, 0xa2)),
    (17.5, Rgb(0x7d, 0xff, 0x56)),
    (21.0, Rgb(0xc1, 0xf3, 0x34)),
    (24.5, Rgb(0xf1, 0xca, 0x3a)),
    (28.0, Rgb(0xfe, 0x92, 0x2a)),
    (31.5, Rgb(0xea, 0x4f, 0x0d)),
    (35.0, Rgb(0x7a, 0x04, 0x03)),
    (35.01, Rgb(0x67, 0x00, 0x1f)),
    (40.0, Rgb(0xce, 0x12, 0x56)),
    (45.0, Rgb(0xf7, 0xf4, 0xf9)),
];

/// 0 % to 100 %: reversed coolwarm, dry is red.
const HUMIDITY_STOPS: &[(f64, Rgb)] = &[
    (0.0, Rgb(0xb4, 0x04, 0x26)),
    (50.0, Rgb(0xdd, 0xdd, 0xdd)),
    (100.0, Rgb(0x3b, 0x4c, 0xc0)),
];

/// 0 mm to 50 mm.
const RAIN_STOPS: &[(f64, Rgb)] = &[
    (0.0, Rgb(0xf7, 0xfb, 0xff)),
    (25.0, Rgb(0x6b, 0xae, 0xd6)),
    (50.0, Rgb(0x08, 0x30, 0x6b)),
];

fn scale(stops: &[(f64, Rgb)], value: f64) -> Rgb {
    let Some(&(first_at, first)) = stops.first() else {
        return NEUTRAL;
    };
    if !value.is_finite() {
        return NEUTRAL;
    }
    if value <= first_at {
        return first;
    }
    for pair in stops.windows(2) {
        let (lo_at, lo) = pair[0];
        let (hi_at, hi) = pair[1];
        if value <= hi_at {
            return lo.mix(hi, (value - lo_at) / (hi_at - lo_at));
        }
    }
    stops.last().map(|&(_, c)| c).unwrap_or(NEUTRAL)
}

pub fn temperature_color(celsius: f64) -> Rgb {
    scale(TEMPERATURE_STOPS, celsius)
}

pub fn humidity_color(percent: f64) -> Rgb {
    scale(HUMIDITY_STOPS, percent)
}

pub fn rain_color(mm: f64) -> Rgb {
    scale(RAIN_STOPS, mm)
}

pub fn temperature_tile_needs_white(celsius: f64) -> bool {
    celsius >= 32.0 || celsius < 8.0
}

pub fn humidity_tile_needs_white(percent: f64) -> bool {
    percent >= 90.0
}

pub fn rain_tile_needs_white(mm: f64) -> bool {
    mm >= 30.0
}

pub fn marker_needs_white(celsius: f64) -> bool {
    (32.0..40.0).contains(&celsius) || (celsius > -5.0 && celsius < 8.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_clamps_at_both_ends() {
        assert_eq!(temperature_color(-40.0), Rgb(0xfc, 0xfb, 0xfd));
        assert_eq!(temperature_color(60.0), Rgb(0xf7, 0xf4, 0xf9));
        assert_eq!(humidity_color(100.0), Rgb(0x3b, 0x4c, 0xc0));
        assert_eq!(rain_color(f64::NAN), NEUTRAL);
    }

    #[test]
    fn scale_interpolates_between_stops() {
        assert_eq!(humidity_color(25.0), Rgb(0xc9, 0x71, 0x82));
        assert_eq!(Rgb(0, 128, 255).hex(), "#0080ff");
    }

    #[test]
    fn text_contrast_thresholds() {
        assert!(temperature_tile_needs_white(32.0));
        assert!(temperature_tile_needs_white(7.9));
        assert!(!temperature_tile_needs_white(20.0));
        assert!(humidity_tile_needs_white(90.0));
        assert!(!rain_tile_needs_white(29.9));
        assert!(marker_needs_white(35.0));
        assert!(!marker_needs_white(40.0));
        assert!(!marker_needs_white(-5.0));
    }
}
