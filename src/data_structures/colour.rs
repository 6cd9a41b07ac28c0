//! Colour conversion helpers.
//!
//! Scene parameters are written as sRGB hex triplets (`0xffdbed`) while shading
//! happens in linear space on an sRGB surface, so every colour is converted once
//! when it enters the engine.

/// Decode one sRGB channel into linear space.
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Split `0xRRGGBB` into linear RGB.
pub fn hex_to_linear(hex: u32) -> [f32; 3] {
    let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
    [channel(16), channel(8), channel(0)]
}

/// Linear RGB scaled by `intensity`, the form lights are uploaded in.
pub fn scaled(hex: u32, intensity: f32) -> [f32; 3] {
    hex_to_linear(hex).map(|c| c * intensity)
}

pub fn to_wgpu(hex: u32) -> wgpu::Color {
    let [r, g, b] = hex_to_linear(hex);
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn black_and_white_are_fixed_points() {
        assert_eq!(hex_to_linear(0x000000), [0.0, 0.0, 0.0]);
        let white = hex_to_linear(0xffffff);
        for c in white {
            assert!((c - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn channels_are_split_in_rgb_order() {
        let [r, g, b] = hex_to_linear(0xff0000);
        assert!((r - 1.0).abs() < 1e-6);
        assert_eq!(g, 0.0);
        assert_eq!(b, 0.0);
    }

    #[test]
    fn midtones_get_darker() {
        // sRGB 0x80 is roughly 21.6% linear
        let [r, _, _] = hex_to_linear(0x800000);
        assert!((r - 0.2158).abs() < 1e-3);
    }

    #[test]
    fn intensity_scales_linear_values() {
        let full = hex_to_linear(0xffdbed);
        let tenth = scaled(0xffdbed, 0.1);
        for (f, t) in full.iter().zip(tenth) {
            assert!((f * 0.1 - t).abs() < 1e-6);
        }
    }
}
