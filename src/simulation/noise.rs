use crate::config::{NOISE_K1, NOISE_K2, NOISE_K3, TERRAIN_OCTAVES};

/// Lattice hash in [0, 1): fractional part of `sin(ix*k1 + iy*k2 + seed) * k3`.
///
/// Cheap and visibly non-uniform, which is fine for terrain that only has to
/// look plausible.
pub fn noise_2d(ix: f64, iy: f64, seed: f64) -> f64 {
    let n = (ix * NOISE_K1 + iy * NOISE_K2 + seed).sin() * NOISE_K3;
    // Guard the rare case where rounding lands exactly on 1.0
    (n - n.floor()).min(1.0 - f64::EPSILON)
}

/// Bilinear blend of the four lattice hashes around `(x*scale, y*scale)`
pub fn smooth_noise(x: f64, y: f64, scale: f64, seed: f64) -> f64 {
    let sx = x * scale;
    let sy = y * scale;

    let x0 = sx.floor();
    let y0 = sy.floor();
    let fx = sx - x0;
    let fy = sy - y0;

    let n00 = noise_2d(x0, y0, seed);
    let n10 = noise_2d(x0 + 1.0, y0, seed);
    let n01 = noise_2d(x0, y0 + 1.0, seed);
    let n11 = noise_2d(x0 + 1.0, y0 + 1.0, seed);

    let top = n00 * (1.0 - fx) + n10 * fx;
    let bottom = n01 * (1.0 - fx) + n11 * fx;
    top * (1.0 - fy) + bottom * fy
}

/// Three-octave terrain height in [0, 1]. `time` shifts each octave's seed at
/// its own rate so the landscape slowly reshapes.
pub fn terrain_noise(x: f64, y: f64, time: f64) -> f64 {
    let mut value = 0.0;
    let mut total = 0.0;
    for (scale, drift, weight) in TERRAIN_OCTAVES {
        value += smooth_noise(x, y, scale, time * drift) * weight;
        total += weight;
    }
    value / total
}
