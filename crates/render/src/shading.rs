//! CPU reference model of the globe and atmosphere fragment math.
//!
//! The GPU shaders are generated from these constants, so both stay in step.

use glam::{Vec3, Vec4};

pub const DEFAULT_TERMINATOR_SHARPNESS: f32 = 10.0;

/// Subtracted from the view-facing dot product before squaring.
pub const ATMOSPHERE_RIM_BIAS: f32 = 0.6;

pub const ATMOSPHERE_COLOR: [f32; 3] = [0.3, 0.6, 1.0];

/// Day weight for a surface whose normal makes cosine `cos` with the light.
///
/// Returns 1 on the lit side and 0 on the dark side, with a linear band of
/// half-width `1 / sharpness` around the terminator.
pub fn terminator_mix(cos: f32, sharpness: f32) -> f32 {
    (cos * sharpness).clamp(-1.0, 1.0) * 0.5 + 0.5
}

/// Blend of the night and day samples for a fragment.
pub fn globe_color(
    day: Vec3,
    night: Vec3,
    normal: Vec3,
    vert_to_light: Vec3,
    sharpness: f32,
) -> Vec3 {
    let cos = normal.normalize_or_zero().dot(vert_to_light.normalize_or_zero());
    night.lerp(day, terminator_mix(cos, sharpness))
}

/// Glow strength for a view-space normal.
pub fn atmosphere_intensity(normal: Vec3) -> f32 {
    let d = ATMOSPHERE_RIM_BIAS - normal.dot(Vec3::Z);
    d * d
}

/// Premultiplied glow colour; alpha carries the intensity for additive blending.
pub fn atmosphere_fragment(normal: Vec3) -> Vec4 {
    Vec4::from((Vec3::from(ATMOSPHERE_COLOR), 1.0)) * atmosphere_intensity(normal)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn atmosphere_intensity_at_centre_and_rim() {
        assert!(close(atmosphere_intensity(Vec3::Z), 0.16));
        assert!(close(atmosphere_intensity(Vec3::X), 0.36));
    }

    #[test]
    fn atmosphere_fragment_scales_colour() {
        let c = atmosphere_fragment(Vec3::X);
        assert!(close(c.x, 0.3 * 0.36));
        assert!(close(c.z, 0.36));
        assert!(close(c.w, 0.36));
    }

    #[test]
    fn terminator_saturates_at_band_edges() {
        let s = DEFAULT_TERMINATOR_SHARPNESS;
        assert_eq!(terminator_mix(0.1, s), 1.0);
        assert_eq!(terminator_mix(0.5, s), 1.0);
        assert_eq!(terminator_mix(-0.1, s), 0.0);
        assert_eq!(terminator_mix(-1.0, s), 0.0);
        assert!(close(terminator_mix(0.05, s), 0.75));
        assert!(close(terminator_mix(0.0, s), 0.5));
    }

    #[test]
    fn globe_colour_picks_day_or_night() {
        let day = Vec3::new(1.0, 1.0, 1.0);
        let night = Vec3::new(0.0, 0.0, 0.2);
        let lit = globe_color(day, night, Vec3::Y, Vec3::Y * 3.0, 10.0);
        let dark = globe_color(day, night, Vec3::Y, -Vec3::Y, 10.0);
        assert!(lit.abs_diff_eq(day, 1e-6));
        assert_eq!(dark, night);
    }
}
