//! Colour-space and unit conversions used by lighting capabilities.
//!
//! Matrices and gamma curves follow the wide-gamut conversion published for
//! Hue lamps. Every function here is pure and allocation-free except the hex
//! formatter.

/// Numerator of the Kelvin ↔ Mirek reciprocal.
const MIREK_SCALE: u32 = 1_000_000;

/// Convert a colour temperature in Kelvin to Mirek, rounding down.
///
/// Returns `None` for zero.
#[must_use]
pub fn kelvin_to_mirek(kelvin: u32) -> Option<u32> {
    MIREK_SCALE.checked_div(kelvin)
}

/// Convert a colour temperature in Mirek to Kelvin, rounding up.
///
/// Returns `None` for zero.
#[must_use]
pub fn mirek_to_kelvin(mirek: u32) -> Option<u32> {
    if mirek == 0 {
        return None;
    }
    Some(MIREK_SCALE.div_ceil(mirek))
}

/// Convert 8-bit sRGB channels to CIE 1931 xy chromaticity.
///
/// Pure black has no chromaticity and is treated as white.
#[must_use]
pub fn rgb_to_xy(red: u8, green: u8, blue: u8) -> (f64, f64) {
    let (red, green, blue) = if red == 0 && green == 0 && blue == 0 {
        (u8::MAX, u8::MAX, u8::MAX)
    } else {
        (red, green, blue)
    };

    let r = inverse_gamma(f64::from(red) / 255.0);
    let g = inverse_gamma(f64::from(green) / 255.0);
    let b = inverse_gamma(f64::from(blue) / 255.0);

    let x = r * 0.664_511 + g * 0.154_324 + b * 0.162_028;
    let y = r * 0.283_881 + g * 0.668_433 + b * 0.047_685;
    let z = r * 0.000_088 + g * 0.072_310 + b * 0.986_039;

    let sum = x + y + z;
    (nan_to_zero(x / sum), nan_to_zero(y / sum))
}

/// Convert CIE 1931 xy chromaticity to 8-bit sRGB channels at full brightness.
#[must_use]
pub fn xy_to_rgb(x: f64, y: f64) -> [u8; 3] {
    let z = 1.0 - x - y;
    let luminance = 1.0;
    let big_x = (luminance / y) * x;
    let big_z = (luminance / y) * z;

    let linear = [
        big_x * 1.656_492 - luminance * 0.354_851 - big_z * 0.255_038,
        -big_x * 0.707_196 + luminance * 1.655_397 + big_z * 0.036_152,
        big_x * 0.051_713 - luminance * 0.121_364 + big_z * 1.011_530,
    ];

    let clipped = rescale_to_dominant(linear);
    let corrected = rescale_to_dominant(clipped.map(forward_gamma));

    corrected.map(to_channel)
}

/// Parse a `#RRGGBB` string (hex digits in either case).
#[must_use]
pub fn parse_rgb_hex(hex: &str) -> Option<[u8; 3]> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    Some([channel(0..2)?, channel(2..4)?, channel(4..6)?])
}

/// Format channels as an upper-case `#RRGGBB` string.
#[must_use]
pub fn format_rgb_hex([red, green, blue]: [u8; 3]) -> String {
    format!("#{red:02X}{green:02X}{blue:02X}")
}

/// Convert a `#RRGGBB` string to xy; `None` when the string is malformed.
#[must_use]
pub fn rgb_hex_to_xy(hex: &str) -> Option<(f64, f64)> {
    let [red, green, blue] = parse_rgb_hex(hex)?;
    Some(rgb_to_xy(red, green, blue))
}

/// Convert xy to a `#RRGGBB` string.
#[must_use]
pub fn xy_to_rgb_hex(x: f64, y: f64) -> String {
    format_rgb_hex(xy_to_rgb(x, y))
}

fn inverse_gamma(c: f64) -> f64 {
    if c > 0.040_45 {
        ((c + 0.055) / 1.055).powf(2.4)
    } else {
        c / 12.92
    }
}

fn forward_gamma(c: f64) -> f64 {
    if c <= 0.003_130_8 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// Scale the triple down so its largest channel is exactly 1, if it exceeds 1.
fn rescale_to_dominant(rgb: [f64; 3]) -> [f64; 3] {
    let dominant = rgb.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if dominant > 1.0 {
        rgb.map(|c| c / dominant)
    } else {
        rgb
    }
}

fn nan_to_zero(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_channel(c: f64) -> u8 {
    let clamped = nan_to_zero(c).clamp(0.0, 1.0);
    (clamped * 255.0).round() as u8
}
