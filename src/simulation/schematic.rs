use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::animation::Animation;
use crate::canvas::{Canvas, Color, Point, TextAlign};
use crate::config::{
    SchematicParams, FLOW_MIN_SPEED, FLOW_SPEED_SPREAD, SCAN_ALPHA, SCAN_HALF_HEIGHT,
    SCHEMATIC_JITTER, SEGMENT_SPLIT, UNDERLAY_ALPHA, UNDERLAY_STEP,
};

/// Visual category of a schematic node
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Register,
    Gate,
    Junction,
    Endpoint,
}

impl NodeKind {
    pub const ALL: [NodeKind; 4] = [
        NodeKind::Register,
        NodeKind::Gate,
        NodeKind::Junction,
        NodeKind::Endpoint,
    ];

    /// Registers and endpoints carry a tag numbered by creation order
    pub fn label(self, index: usize) -> Option<String> {
        match self {
            NodeKind::Register => Some(format!("R{}", index)),
            NodeKind::Endpoint => Some(format!("EP{}", index)),
            NodeKind::Gate | NodeKind::Junction => None,
        }
    }

    /// Polygon outline centred on (x, y); `None` for the round endpoint
    pub fn outline(self, x: f32, y: f32) -> Option<Vec<Point>> {
        match self {
            NodeKind::Register => Some(vec![
                Point::new(x - 15.0, y - 10.0),
                Point::new(x + 15.0, y - 10.0),
                Point::new(x + 15.0, y + 10.0),
                Point::new(x - 15.0, y + 10.0),
            ]),
            // Wedge pointing right, flat back on the left
            NodeKind::Gate => Some(vec![
                Point::new(x - 12.0, y - 10.0),
                Point::new(x + 12.0, y),
                Point::new(x - 12.0, y + 10.0),
            ]),
            NodeKind::Junction => Some(vec![
                Point::new(x, y - 10.0),
                Point::new(x + 10.0, y),
                Point::new(x, y + 10.0),
                Point::new(x - 10.0, y),
            ]),
            NodeKind::Endpoint => None,
        }
    }
}

const ENDPOINT_RADIUS: f32 = 8.0;
const PACKET_RADIUS: f32 = 2.0;

#[derive(Clone, Debug, PartialEq)]
pub struct SchematicNode {
    pub x: f64,
    pub y: f64,
    pub kind: NodeKind,
    pub label: Option<String>,
    pub compromised: bool,
    /// Fixed offset so nodes of one kind do not pulse in lockstep
    pub pulse_phase: f64,
}

impl SchematicNode {
    /// Pulse brightness in [0, 1] at clock `time`
    pub fn brightness(&self, time: f64) -> f64 {
        (time * 2.0 + self.pulse_phase).sin() * 0.5 + 0.5
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Connection {
    pub from: usize,
    pub to: usize,
    /// Packet progress along the wire, always in [0, 1)
    pub data_flow: f64,
    pub flow_speed: f64,
}

impl Connection {
    pub fn advance(&mut self, rate: f64) {
        self.data_flow = (self.data_flow + self.flow_speed * rate) % 1.0;
    }
}

/// Orthogonal route: across to the midpoint column, down/up, across again
pub fn route(from: &SchematicNode, to: &SchematicNode) -> [Point; 4] {
    let mid_x = (from.x + to.x) / 2.0;
    [
        Point::from_f64(from.x, from.y),
        Point::from_f64(mid_x, from.y),
        Point::from_f64(mid_x, to.y),
        Point::from_f64(to.x, to.y),
    ]
}

/// Packet position for progress `flow` along the route from `from` to `to`.
/// Segment boundaries sit at 0.33 and 0.66; each segment ends exactly where
/// the next begins.
pub fn packet_position(from: &SchematicNode, to: &SchematicNode, flow: f64) -> (f64, f64) {
    let mid_x = (from.x + to.x) / 2.0;
    let [first, second] = SEGMENT_SPLIT;

    if flow < first {
        let t = flow / first;
        (from.x + (mid_x - from.x) * t, from.y)
    } else if flow < second {
        let t = (flow - first) / (second - first);
        (mid_x, from.y + (to.y - from.y) * t)
    } else {
        let t = (flow - second) / (1.0 - second);
        (mid_x + (to.x - mid_x) * t, to.y)
    }
}

/// SCADA-style diagram: typed nodes on a loose grid, wired orthogonally, with
/// packets running along the wires and compromised nodes throbbing.
pub struct SchematicSimulator<R: Rng = StdRng> {
    params: SchematicParams,
    rng: R,
    width: f64,
    height: f64,
    nodes: Vec<SchematicNode>,
    connections: Vec<Connection>,
    time: f64,
    scan_y: f64,
}

impl SchematicSimulator<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy(), SchematicParams::default())
    }
}

impl<R: Rng> SchematicSimulator<R> {
    pub fn with_rng(rng: R, params: SchematicParams) -> Self {
        Self {
            params,
            rng,
            width: 0.0,
            height: 0.0,
            nodes: Vec::new(),
            connections: Vec::new(),
            time: 0.0,
            scan_y: 0.0,
        }
    }

    #[cfg(test)]
    pub fn nodes(&self) -> &[SchematicNode] {
        &self.nodes
    }

    #[cfg(test)]
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    #[cfg(test)]
    pub fn scan_y(&self) -> f64 {
        self.scan_y
    }

    pub fn cell_size(&self) -> (f64, f64) {
        (
            self.width / f64::from(self.params.cols + 1),
            self.height / f64::from(self.params.rows + 1),
        )
    }

    /// Distance under which two nodes may be wired
    pub fn wire_reach(&self) -> f64 {
        self.cell_size().0 * self.params.wire_reach
    }

    fn build(&mut self) {
        let (cell_w, cell_h) = self.cell_size();
        self.nodes.clear();
        self.connections.clear();

        for row in 0..self.params.rows {
            for col in 0..self.params.cols {
                if self.rng.gen::<f64>() > self.params.cell_keep {
                    continue;
                }
                let x = cell_w * f64::from(col + 1) + (self.rng.gen::<f64>() - 0.5) * SCHEMATIC_JITTER;
                let y = cell_h * f64::from(row + 1) + (self.rng.gen::<f64>() - 0.5) * SCHEMATIC_JITTER;
                let kind = NodeKind::ALL[self.rng.gen_range(0..NodeKind::ALL.len())];
                let compromised = self.rng.gen::<f64>() < self.params.compromise_probability;
                let pulse_phase = self.rng.gen::<f64>() * TAU;

                self.nodes.push(SchematicNode {
                    x,
                    y,
                    kind,
                    label: kind.label(self.nodes.len()),
                    compromised,
                    pulse_phase,
                });
            }
        }

        let reach = self.wire_reach();
        for i in 0..self.nodes.len() {
            for j in i + 1..self.nodes.len() {
                let (a, b) = (&self.nodes[i], &self.nodes[j]);
                let dist = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
                if dist < reach && self.rng.gen::<f64>() < self.params.wire_accept {
                    self.connections.push(Connection {
                        from: i,
                        to: j,
                        data_flow: 0.0,
                        flow_speed: FLOW_MIN_SPEED + self.rng.gen::<f64>() * FLOW_SPEED_SPREAD,
                    });
                }
            }
        }
    }

    /// Simulation half of a frame
    pub fn update(&mut self) {
        self.time += self.params.time_step;
        if self.height > 0.0 {
            self.scan_y = (self.scan_y + self.params.scan_speed) % self.height;
        }
        let rate = self.params.flow_rate;
        for conn in &mut self.connections {
            conn.advance(rate);
        }
    }

    fn draw_underlay(&self, canvas: &mut dyn Canvas) {
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        let color = Color::white(UNDERLAY_ALPHA);
        let mut x = 0.0;
        while x < w {
            canvas.stroke_line(Point::new(x, 0.0), Point::new(x, h), 1.0, color);
            x += UNDERLAY_STEP;
        }
        let mut y = 0.0;
        while y < h {
            canvas.stroke_line(Point::new(0.0, y), Point::new(w, y), 1.0, color);
            y += UNDERLAY_STEP;
        }
    }

    fn draw_node(&self, canvas: &mut dyn Canvas, node: &SchematicNode) {
        let pulse = node.brightness(self.time) as f32;
        let (stroke, fill, line_width) = if node.compromised {
            (Color::white(0.6 + pulse * 0.4), Color::white(0.05 + pulse * 0.1), 2.0)
        } else {
            (Color::white(0.3), Color::BLACK, 1.0)
        };
        let center = Point::from_f64(node.x, node.y);

        match node.kind.outline(center.x, center.y) {
            Some(points) => {
                canvas.fill_polygon(&points, fill);
                canvas.stroke_polygon(&points, line_width, stroke);
            }
            None => {
                canvas.fill_circle(center, ENDPOINT_RADIUS, fill);
                canvas.stroke_circle(center, ENDPOINT_RADIUS, line_width, stroke);
            }
        }

        if let Some(label) = &node.label {
            canvas.fill_text(
                label,
                Point::new(center.x, center.y + 22.0),
                TextAlign::Center,
                Color::white(0.4),
            );
        }

        if node.compromised {
            canvas.fill_circle(center, 20.0 + pulse * 5.0, Color::white(0.3 + pulse * 0.3));
        }
    }

    /// Drawing half of a frame
    pub fn draw(&self, canvas: &mut dyn Canvas) {
        canvas.clear(Color::BLACK);
        self.draw_underlay(canvas);

        for conn in &self.connections {
            let (from, to) = (&self.nodes[conn.from], &self.nodes[conn.to]);
            canvas.stroke_polyline(&route(from, to), 1.0, Color::white(0.15));
            let (px, py) = packet_position(from, to, conn.data_flow);
            canvas.fill_circle(Point::from_f64(px, py), PACKET_RADIUS, Color::white(0.5));
        }

        for node in &self.nodes {
            self.draw_node(canvas, node);
        }

        canvas.fill_vertical_band(self.scan_y as f32, SCAN_HALF_HEIGHT, Color::white(SCAN_ALPHA));
    }
}

impl<R: Rng> Animation for SchematicSimulator<R> {
    fn name(&self) -> &'static str {
        "schematic"
    }

    fn regenerate(&mut self, width: u32, height: u32) {
        self.width = f64::from(width);
        self.height = f64::from(height);
        self.scan_y = if self.height > 0.0 { self.scan_y % self.height } else { 0.0 };
        self.build();
        log::debug!(
            "schematic: {} nodes, {} wires for {}x{}",
            self.nodes.len(),
            self.connections.len(),
            width,
            height
        );
    }

    fn frame(&mut self, canvas: &mut dyn Canvas) {
        self.update();
        self.draw(canvas);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::recording::{Op, RecordingCanvas};

    fn seeded(seed: u64) -> SchematicSimulator<StdRng> {
        SchematicSimulator::with_rng(StdRng::seed_from_u64(seed), SchematicParams::default())
    }

    fn node_at(x: f64, y: f64) -> SchematicNode {
        SchematicNode {
            x,
            y,
            kind: NodeKind::Junction,
            label: None,
            compromised: false,
            pulse_phase: 0.0,
        }
    }

    fn assert_structure(sim: &SchematicSimulator<StdRng>) {
        let (cell_w, cell_h) = sim.cell_size();
        let cells = (sim.params.cols * sim.params.rows) as usize;
        assert!(sim.nodes().len() <= cells);
        for (i, node) in sim.nodes().iter().enumerate() {
            let col = (node.x / cell_w).round();
            let row = (node.y / cell_h).round();
            assert!((node.x - col * cell_w).abs() <= SCHEMATIC_JITTER / 2.0);
            assert!((node.y - row * cell_h).abs() <= SCHEMATIC_JITTER / 2.0);
            assert_eq!(node.label, node.kind.label(i));
            assert!((0.0..TAU).contains(&node.pulse_phase));
        }
        let reach = sim.wire_reach();
        for conn in sim.connections() {
            assert!(conn.from < conn.to && conn.to < sim.nodes().len());
            let (a, b) = (&sim.nodes()[conn.from], &sim.nodes()[conn.to]);
            assert!(((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt() < reach);
            assert!(conn.flow_speed >= 0.5 && conn.flow_speed < 2.0);
        }
    }

    #[test]
    fn test_generated_structure() {
        for seed in 0..20 {
            let mut sim = seeded(seed);
            sim.regenerate(300, 300);
            assert_structure(&sim);
        }
    }

    #[test]
    fn test_labels_follow_creation_index() {
        assert_eq!(NodeKind::Register.label(3), Some("R3".to_string()));
        assert_eq!(NodeKind::Endpoint.label(0), Some("EP0".to_string()));
        assert_eq!(NodeKind::Gate.label(1), None);
        assert_eq!(NodeKind::Junction.label(1), None);
    }

    #[test]
    fn test_full_acceptance_wires_every_eligible_pair() {
        let params = SchematicParams { wire_accept: 1.0, ..SchematicParams::default() };
        let mut sim = SchematicSimulator::with_rng(StdRng::seed_from_u64(42), params);
        sim.regenerate(600, 400);

        let reach = sim.wire_reach();
        let nodes = sim.nodes();
        let mut eligible = 0;
        for i in 0..nodes.len() {
            for j in i + 1..nodes.len() {
                if ((nodes[i].x - nodes[j].x).powi(2) + (nodes[i].y - nodes[j].y).powi(2)).sqrt() < reach {
                    eligible += 1;
                }
            }
        }
        assert_eq!(sim.connections().len(), eligible);
    }

    #[test]
    fn test_no_wires_when_nothing_in_reach() {
        let params = SchematicParams { wire_reach: 0.0, ..SchematicParams::default() };
        let mut sim = SchematicSimulator::with_rng(StdRng::seed_from_u64(1), params);
        sim.regenerate(300, 300);
        assert!(sim.connections().is_empty());
    }

    #[test]
    fn test_regenerate_twice_same_size() {
        let mut sim = seeded(6);
        sim.regenerate(300, 300);
        assert_structure(&sim);
        sim.regenerate(300, 300);
        assert_structure(&sim);
    }

    #[test]
    fn test_fifty_frames_300x300() {
        for seed in 0..10 {
            let mut sim = seeded(seed);
            sim.regenerate(300, 300);
            let mut canvas = RecordingCanvas::new(300, 300);
            for _ in 0..50 {
                canvas.ops.clear();
                sim.frame(&mut canvas);
            }

            for conn in sim.connections() {
                assert!((0.0..1.0).contains(&conn.data_flow));
                let (a, b) = (&sim.nodes()[conn.from], &sim.nodes()[conn.to]);
                let (px, py) = packet_position(a, b, conn.data_flow);
                assert!(px >= a.x.min(b.x) - 1e-9 && px <= a.x.max(b.x) + 1e-9);
                assert!(py >= a.y.min(b.y) - 1e-9 && py <= a.y.max(b.y) + 1e-9);
            }

            let packets = canvas.circles().filter(|(_, r, _)| *r == PACKET_RADIUS).count();
            assert_eq!(packets, sim.connections().len());
        }
    }

    #[test]
    fn test_packet_continuous_at_segment_boundaries() {
        let a = node_at(20.0, 30.0);
        let b = node_at(180.0, 250.0);
        let eps = 1e-9;
        for boundary in SEGMENT_SPLIT {
            let (x0, y0) = packet_position(&a, &b, boundary - eps);
            let (x1, y1) = packet_position(&a, &b, boundary);
            assert!((x0 - x1).abs() < 1e-4 && (y0 - y1).abs() < 1e-4, "jump at {}", boundary);
        }
        assert_eq!(packet_position(&a, &b, 0.0), (20.0, 30.0));
        assert_eq!(packet_position(&a, &b, 0.33), (100.0, 30.0));
        assert_eq!(packet_position(&a, &b, 0.66), (100.0, 250.0));
        let (x, y) = packet_position(&a, &b, 1.0 - eps);
        assert!((x - 180.0).abs() < 1e-4 && y == 250.0);
    }

    #[test]
    fn test_flow_wraps_back_to_start() {
        let mut conn = Connection { from: 0, to: 1, data_flow: 0.0, flow_speed: 1.25 };
        for _ in 0..40 {
            conn.advance(0.02);
            assert!((0.0..1.0).contains(&conn.data_flow));
        }
        let d = conn.data_flow;
        assert!(d.min(1.0 - d) < 1e-9, "flow {} did not wrap to start", d);
    }

    #[test]
    fn test_scan_line_wraps() {
        let mut sim = seeded(3);
        sim.regenerate(300, 100);
        for _ in 0..150 {
            sim.update();
            assert!(sim.scan_y() >= 0.0 && sim.scan_y() < 100.0);
        }
        assert!((sim.scan_y() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_height_regenerate_keeps_scan_finite() {
        let mut sim = seeded(3);
        sim.regenerate(300, 100);
        sim.update();
        sim.regenerate(300, 0);
        assert_eq!(sim.scan_y(), 0.0);
        sim.update();
        assert!(sim.scan_y().is_finite());
    }

    #[test]
    fn test_brightness_desynchronized() {
        let mut a = node_at(0.0, 0.0);
        let mut b = node_at(0.0, 0.0);
        a.pulse_phase = 0.0;
        b.pulse_phase = std::f64::consts::PI;
        for i in 0..100 {
            let t = i as f64 * 0.05;
            let (ba, bb) = (a.brightness(t), b.brightness(t));
            assert!((0.0..=1.0).contains(&ba) && (0.0..=1.0).contains(&bb));
            // Opposite phases always sum to one
            assert!((ba + bb - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_draw_halos_labels_and_scan_band() {
        let mut sim = seeded(12);
        sim.regenerate(300, 300);
        let mut canvas = RecordingCanvas::new(300, 300);
        sim.frame(&mut canvas);

        let compromised = sim.nodes().iter().filter(|n| n.compromised).count();
        let halos = canvas.circles().filter(|(_, r, _)| *r >= 20.0).count();
        assert_eq!(halos, compromised);

        let labels: Vec<&str> = canvas.texts().collect();
        let expected: Vec<&str> = sim.nodes().iter().filter_map(|n| n.label.as_deref()).collect();
        assert_eq!(labels, expected);

        match canvas.ops.last() {
            Some(Op::Band { center_y, half_height, .. }) => {
                assert_eq!(*center_y, 0.5);
                assert_eq!(*half_height, SCAN_HALF_HEIGHT);
            }
            other => panic!("scan band must be drawn last, got {:?}", other),
        }
    }

    #[test]
    fn test_outlines_per_kind() {
        assert_eq!(NodeKind::Register.outline(0.0, 0.0).map(|p| p.len()), Some(4));
        assert_eq!(NodeKind::Gate.outline(0.0, 0.0).map(|p| p.len()), Some(3));
        assert_eq!(NodeKind::Junction.outline(0.0, 0.0).map(|p| p.len()), Some(4));
        assert!(NodeKind::Endpoint.outline(0.0, 0.0).is_none());
        // The wedge's tip points right
        let gate = NodeKind::Gate.outline(50.0, 50.0).unwrap();
        assert_eq!(gate[1], Point::new(62.0, 50.0));
    }
}
