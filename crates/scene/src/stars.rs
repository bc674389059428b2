//! Background star field: unlit white points scattered in front of and behind the globe.

use rand::Rng;

/// Flat `[x, y, z, x, y, z, ...]` point positions, generated in pairs.
///
/// Point `2k` of each pair sits in the front pool (`z` in `[0, extent]`),
/// point `2k + 1` in the back pool (`z` in `[-extent, 0]`). Both have `x` and
/// `y` uniform in `[-extent / 2, extent / 2]`.
#[derive(Debug, Clone, PartialEq)]
pub struct StarField {
    positions: Vec<f32>,
    color: [f32; 3],
}

impl StarField {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, pairs: u32, extent: f32) -> Self {
        let mut positions = Vec::with_capacity(pairs as usize * 6);
        for _ in 0..pairs {
            // front
            positions.push((rng.random::<f32>() - 0.5) * extent);
            positions.push((rng.random::<f32>() - 0.5) * extent);
            positions.push(rng.random::<f32>() * extent);
            // back
            positions.push((rng.random::<f32>() - 0.5) * extent);
            positions.push((rng.random::<f32>() - 0.5) * extent);
            positions.push(-rng.random::<f32>() * extent);
        }
        Self {
            positions,
            color: [1.0, 1.0, 1.0],
        }
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn point_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn color(&self) -> [f32; 3] {
        self.color
    }

    /// Iterate points as `[x, y, z]`.
    pub fn points(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.positions.chunks_exact(3).map(|p| [p[0], p[1], p[2]])
    }
}
