//! Card colour helpers.

/// An sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Text colour used on light backgrounds.
pub const DARK_TEXT: Rgb = Rgb(0x11, 0x11, 0x11);
/// Text colour used on dark backgrounds.
pub const LIGHT_TEXT: Rgb = Rgb(0xff, 0xff, 0xff);

/// Parse `#rgb` or `#rrggbb` (the `#` is optional).  Short forms are
/// expanded, anything else is right-padded with `0` and cut to six digits.
pub fn parse_hex(input: &str) -> Option<Rgb> {
    let hex = input.trim().trim_start_matches('#');
    let digits: String = if hex.chars().count() == 3 {
        hex.chars().flat_map(|c| [c, c]).collect()
    } else {
        hex.chars().chain(std::iter::repeat('0')).take(6).collect()
    };
    let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
    Some(Rgb(channel(0)?, channel(2)?, channel(4)?))
}

/// WCAG relative luminance in `[0, 1]`.
pub fn relative_luminance(Rgb(r, g, b): Rgb) -> f64 {
    let lin = |v: u8| {
        let v = f64::from(v) / 255.0;
        if v <= 0.03928 {
            v / 12.92
        } else {
            ((v + 0.055) / 1.055).powf(2.4)
        }
    };
    0.2126 * lin(r) + 0.7152 * lin(g) + 0.0722 * lin(b)
}

/// Foreground that stays readable on `background`.  `None` when the card
/// has no colour of its own (the theme default applies).  Unparseable
/// colours get light text.
pub fn pick_text_color(background: Option<&str>) -> Option<Rgb> {
    let bg = background?;
    match parse_hex(bg) {
        Some(rgb) if relative_luminance(rgb) > 0.5 => Some(DARK_TEXT),
        _ => Some(LIGHT_TEXT),
    }
}

/// Blend `color` towards black by `amount` (`0.0` = unchanged, `1.0` = black).
pub fn darken(Rgb(r, g, b): Rgb, amount: f64) -> Rgb {
    let keep = 1.0 - amount.clamp(0.0, 1.0);
    let scale = |v: u8| (f64::from(v) * keep).round() as u8;
    Rgb(scale(r), scale(g), scale(b))
}
