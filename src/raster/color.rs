//! CSS color parsing for the rasterizer.
//!
//! Accepts `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb()`, `rgba()`,
//! `transparent` and a handful of named colors. Modern color functions such
//! as `oklch()` are rejected with an error naming the offending value.

use tiny_skia::Color;

use crate::errors::ExportError;
use crate::style::is_modern_color;

fn named(name: &str) -> Option<(u8, u8, u8, u8)> {
    Some(match name {
        "black" => (0, 0, 0, 255),
        "white" => (255, 255, 255, 255),
        "red" => (255, 0, 0, 255),
        "yellow" => (255, 255, 0, 255),
        "gray" | "grey" => (128, 128, 128, 255),
        "transparent" => (0, 0, 0, 0),
        _ => return None,
    })
}

fn hex_nibble(c: u8) -> Option<u8> {
    (c as char).to_digit(16).map(|d| d as u8)
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8, u8)> {
    let bytes = hex.as_bytes();
    let channel = |i: usize| Some(hex_nibble(bytes[i])? * 16 + hex_nibble(bytes[i + 1])?);
    let short = |i: usize| hex_nibble(bytes[i]).map(|n| n * 17);
    match bytes.len() {
        3 => Some((short(0)?, short(1)?, short(2)?, 255)),
        4 => Some((short(0)?, short(1)?, short(2)?, short(3)?)),
        6 => Some((channel(0)?, channel(2)?, channel(4)?, 255)),
        8 => Some((channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
        _ => None,
    }
}

fn parse_rgb_args(args: &str) -> Option<(u8, u8, u8, u8)> {
    let parts: Vec<&str> = args
        .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let channel = |p: &str| -> Option<u8> {
        if let Some(pct) = p.strip_suffix('%') {
            let v: f32 = pct.parse().ok()?;
            Some((v.clamp(0.0, 100.0) * 2.55).round() as u8)
        } else {
            let v: f32 = p.parse().ok()?;
            Some(v.clamp(0.0, 255.0).round() as u8)
        }
    };
    let alpha = match parts.get(3) {
        None => 255,
        Some(p) => {
            let v: f32 = match p.strip_suffix('%') {
                Some(pct) => pct.parse::<f32>().ok()? / 100.0,
                None => p.parse().ok()?,
            };
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
    };
    Some((channel(parts[0])?, channel(parts[1])?, channel(parts[2])?, alpha))
}

/// Parse one CSS color value.
///
/// # Errors
///
/// `ExportError::Rasterize` for unsupported or malformed values.
pub fn parse_color(value: &str) -> Result<Color, ExportError> {
    let v = value.trim().to_ascii_lowercase();

    if is_modern_color(&v) {
        return Err(ExportError::Rasterize(format!(
            "unsupported color function: {value}"
        )));
    }

    let rgba = if let Some(hex) = v.strip_prefix('#') {
        parse_hex(hex)
    } else if let Some(args) = v
        .strip_prefix("rgba(")
        .or_else(|| v.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        parse_rgb_args(args)
    } else {
        named(&v)
    };

    rgba.map(|(r, g, b, a)| Color::from_rgba8(r, g, b, a))
        .ok_or_else(|| ExportError::Rasterize(format!("invalid color: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba8(c: Color) -> (u8, u8, u8, u8) {
        let c = c.to_color_u8();
        (c.red(), c.green(), c.blue(), c.alpha())
    }

    #[test]
    fn parses_hex_forms() {
        assert_eq!(rgba8(parse_color("#fff").unwrap()), (255, 255, 255, 255));
        assert_eq!(rgba8(parse_color("#1D4ED8").unwrap()), (0x1d, 0x4e, 0xd8, 255));
        assert_eq!(rgba8(parse_color("#00000080").unwrap()), (0, 0, 0, 0x80));
    }

    #[test]
    fn parses_rgb_functions() {
        assert_eq!(rgba8(parse_color("rgb(10, 20, 30)").unwrap()), (10, 20, 30, 255));
        assert_eq!(rgba8(parse_color("rgba(0,0,0,0)").unwrap()), (0, 0, 0, 0));
        assert_eq!(rgba8(parse_color("rgb(255 0 0 / 50%)").unwrap()).3, 128);
    }

    #[test]
    fn rejects_modern_and_garbage() {
        let err = parse_color("oklch(0.7 0.1 250)").unwrap_err();
        assert!(err.to_string().contains("oklch"));
        assert!(parse_color("#12").is_err());
        assert!(parse_color("chartreuse-ish").is_err());
    }
}
