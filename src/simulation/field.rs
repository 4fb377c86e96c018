use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::animation::Animation;
use crate::canvas::{Canvas, Color, Point};
use crate::config::{
    FieldParams, DEPTH_REFERENCE, FIELD_BASE_ELEVATION, FIELD_JITTER, FIELD_SPARSE_EDGE,
    FIELD_SPARSE_KEEP, FIELD_TERRAIN_ELEVATION, LINK_BASE_DISTANCE, LINK_DISTANCE_GAIN,
    LINK_ELEVATION_FALLOFF, LINK_FLICKER_EDGE, LINK_FLICKER_KEEP, LINK_MIN_DISTANCE, LINK_OPACITY,
    POINT_FLICKER_EDGE, POINT_FLICKER_KEEP, PULSE_MIN_RADIUS, PULSE_MIN_STRENGTH,
    PULSE_RADIUS_SPREAD, PULSE_STRENGTH_SPREAD,
};
use crate::simulation::noise::terrain_noise;

/// One vertex of the wireframe terrain.
///
/// The anchor (`base_*`) is fixed at generation; `x`, `y`, `z` are recomputed
/// from it every frame so drift never accumulates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldNode {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub base_x: f64,
    pub base_y: f64,
    pub base_z: f64,
}

/// Expanding ring of elevation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pulse {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub max_radius: f64,
    pub strength: f64,
}

impl Pulse {
    pub fn new(x: f64, y: f64, max_radius: f64, strength: f64) -> Self {
        Self {
            x,
            y,
            radius: 0.0,
            max_radius,
            strength,
        }
    }

    pub fn grow(&mut self, step: f64) {
        self.radius += step;
    }

    pub fn is_spent(&self) -> bool {
        self.radius > self.max_radius
    }

    /// Elevation added at `dist` from the origin: a sine bump across the band
    /// `radius +/- band`, zero outside it
    pub fn elevation_at(&self, dist: f64, band: f64) -> f64 {
        let offset = (dist - self.radius).abs();
        if offset < band {
            ((1.0 - offset / band) * PI).sin() * self.strength
        } else {
            0.0
        }
    }
}

/// Opacity of the link between two nodes, or `None` if it would not be drawn.
/// `nx` is the first node's horizontal position normalized to the surface.
pub fn link_opacity(a: &FieldNode, b: &FieldNode, nx: f64, cutoff: f64) -> Option<f64> {
    let distance = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
    // Reach widens toward the right
    let max_distance = LINK_BASE_DISTANCE + nx * LINK_DISTANCE_GAIN;
    if distance >= max_distance || distance <= LINK_MIN_DISTANCE {
        return None;
    }

    let elevation = (1.0 - (a.z - b.z).abs() / LINK_ELEVATION_FALLOFF).max(0.0);
    let proximity = 1.0 - distance / max_distance;
    let depth = 0.3 + (a.z / DEPTH_REFERENCE) * 0.7;
    let position = 0.4 + nx * 0.6;

    let opacity = proximity * elevation * depth * position * LINK_OPACITY;
    (opacity > cutoff).then_some(opacity)
}

/// Wireframe terrain background: a right-weighted point field drifting on
/// layered waves, reshaped by noise and crossed by expanding pulses.
pub struct FieldSimulator<R: Rng = StdRng> {
    params: FieldParams,
    rng: R,
    width: f64,
    height: f64,
    nodes: Vec<FieldNode>,
    pulses: Vec<Pulse>,
    time: f64,
    last_pulse: f64,
    draw_order: Vec<usize>,
}

impl FieldSimulator<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy(), FieldParams::default())
    }
}

impl<R: Rng> FieldSimulator<R> {
    pub fn with_rng(rng: R, params: FieldParams) -> Self {
        Self {
            params,
            rng,
            width: 0.0,
            height: 0.0,
            nodes: Vec::new(),
            pulses: Vec::new(),
            time: 0.0,
            last_pulse: 0.0,
            draw_order: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn nodes(&self) -> &[FieldNode] {
        &self.nodes
    }

    #[cfg(test)]
    pub fn pulses(&self) -> &[Pulse] {
        &self.pulses
    }

    #[cfg(test)]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Lay a jittered lattice one spacing past every edge. Left of
    /// `FIELD_SPARSE_EDGE` each node survives with `FIELD_SPARSE_KEEP`.
    fn build_nodes(&mut self) {
        let spacing = self.params.spacing;
        let (width, height) = (self.width, self.height);
        self.nodes.clear();

        let mut y = -spacing;
        while y < height + spacing {
            let mut x = -spacing;
            while x < width + spacing {
                if x / width < FIELD_SPARSE_EDGE && self.rng.gen::<f64>() > FIELD_SPARSE_KEEP {
                    x += spacing;
                    continue;
                }

                let jitter_x = (self.rng.gen::<f64>() - 0.5) * FIELD_JITTER;
                let jitter_y = (self.rng.gen::<f64>() - 0.5) * FIELD_JITTER;
                let base_z = terrain_noise(x, y, 0.0) * FIELD_BASE_ELEVATION;

                self.nodes.push(FieldNode {
                    x: x + jitter_x,
                    y: y + jitter_y,
                    z: base_z,
                    base_x: x + jitter_x,
                    base_y: y + jitter_y,
                    base_z,
                });
                x += spacing;
            }
            y += spacing;
        }
    }

    fn maybe_spawn_pulse(&mut self) {
        if self.time - self.last_pulse <= self.params.pulse_cooldown {
            return;
        }
        if self.rng.gen::<f64>() >= self.params.pulse_spawn_probability {
            return;
        }
        // Biased into the busy right half
        let x = self.width * 0.4 + self.rng.gen::<f64>() * self.width * 0.5;
        let y = self.rng.gen::<f64>() * self.height;
        let max_radius = PULSE_MIN_RADIUS + self.rng.gen::<f64>() * PULSE_RADIUS_SPREAD;
        let strength = PULSE_MIN_STRENGTH + self.rng.gen::<f64>() * PULSE_STRENGTH_SPREAD;
        self.pulses.push(Pulse::new(x, y, max_radius, strength));
        self.last_pulse = self.time;
        log::trace!("field: pulse at ({:.0}, {:.0}) r_max {:.0}", x, y, max_radius);
    }

    /// Simulation half of a frame
    pub fn update(&mut self) {
        self.time += self.params.time_step;
        let t = self.time;

        self.maybe_spawn_pulse();

        let growth = self.params.pulse_growth;
        for pulse in &mut self.pulses {
            pulse.grow(growth);
        }
        self.pulses.retain(|p| !p.is_spent());

        let band = self.params.pulse_band;
        for node in &mut self.nodes {
            let wave1 = (node.base_x * 0.008 + t * 1.2).sin() * 8.0;
            let wave2 = (node.base_y * 0.006 + t * 0.9).cos() * 6.0;
            let wave3 = ((node.base_x + node.base_y) * 0.004 + t * 1.5).sin() * 5.0;

            let terrain = terrain_noise(node.base_x, node.base_y, t) * FIELD_TERRAIN_ELEVATION;

            let ripple: f64 = self
                .pulses
                .iter()
                .map(|p| {
                    let dist = ((node.base_x - p.x).powi(2) + (node.base_y - p.y).powi(2)).sqrt();
                    p.elevation_at(dist, band)
                })
                .sum();

            node.x = node.base_x + wave1 + wave3 * 0.5;
            node.y = node.base_y + wave2 + wave3 * 0.3;
            node.z = node.base_z + terrain + ripple;
        }
    }

    /// Painter's order: low (far) nodes first
    fn sort_by_depth(&mut self) {
        let nodes = &self.nodes;
        self.draw_order.clear();
        self.draw_order.extend(0..nodes.len());
        self.draw_order.sort_by(|&a, &b| nodes[a].z.total_cmp(&nodes[b].z));
    }

    /// Drawing half of a frame
    pub fn draw(&mut self, canvas: &mut dyn Canvas) {
        canvas.clear(Color::BLACK);
        let width = f64::from(canvas.width().max(1));
        let cutoff = self.params.link_opacity_cutoff;

        self.sort_by_depth();
        let nodes = &self.nodes;
        let order = &self.draw_order;
        let rng = &mut self.rng;

        for (i, &ia) in order.iter().enumerate() {
            let a = &nodes[ia];
            let nx = a.x / width;
            if nx < LINK_FLICKER_EDGE && rng.gen::<f64>() > LINK_FLICKER_KEEP {
                continue;
            }
            for &ib in &order[i + 1..] {
                let b = &nodes[ib];
                if let Some(opacity) = link_opacity(a, b, nx, cutoff) {
                    canvas.stroke_line(
                        Point::from_f64(a.x, a.y),
                        Point::from_f64(b.x, b.y),
                        1.0,
                        Color::white(opacity as f32),
                    );
                }
            }
        }

        for node in nodes {
            let nx = node.x / width;
            if nx < POINT_FLICKER_EDGE && rng.gen::<f64>() > POINT_FLICKER_KEEP {
                continue;
            }
            let depth = 0.2 + (node.z / DEPTH_REFERENCE) * 0.8;
            let position = 0.3 + nx * 0.7;
            let opacity = depth * position * 0.5;
            let radius = (1.0 + node.z / DEPTH_REFERENCE).max(0.0);
            canvas.fill_circle(
                Point::from_f64(node.x, node.y),
                radius as f32,
                Color::white(opacity as f32),
            );
        }
    }

    #[cfg(test)]
    fn add_pulse(&mut self, pulse: Pulse) {
        self.pulses.push(pulse);
    }
}

impl<R: Rng> Animation for FieldSimulator<R> {
    fn name(&self) -> &'static str {
        "field"
    }

    fn regenerate(&mut self, width: u32, height: u32) {
        self.width = f64::from(width);
        self.height = f64::from(height);
        self.build_nodes();
        log::debug!("field: {} nodes for {}x{}", self.nodes.len(), width, height);
    }

    fn frame(&mut self, canvas: &mut dyn Canvas) {
        self.update();
        self.draw(canvas);
    }
}
