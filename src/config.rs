/// Initial window size in logical pixels
pub const WINDOW_WIDTH: u32 = 1280;
pub const WINDOW_HEIGHT: u32 = 800;

pub const WINDOW_TITLE: &str = "HUD Backdrop";

// ============================================
// Terrain Noise
// ============================================

/// Hash constants for the single-octave lattice noise
pub const NOISE_K1: f64 = 12.9898;
pub const NOISE_K2: f64 = 78.233;
pub const NOISE_K3: f64 = 43758.5453;

/// (spatial frequency, time-to-seed factor, weight) per octave
pub const TERRAIN_OCTAVES: [(f64, f64, f64); 3] = [
    (0.003, 0.10, 1.0),
    (0.007, 0.15, 0.5),
    (0.015, 0.20, 0.25),
];

// ============================================
// Field Simulator (wireframe background)
// ============================================

/// Lattice spacing in pixels
pub const FIELD_SPACING: f64 = 35.0;

/// Normalized x below which the field thins out
pub const FIELD_SPARSE_EDGE: f64 = 0.4;

/// Retention probability for nodes in the sparse region
pub const FIELD_SPARSE_KEEP: f64 = 0.5;

/// Max positional jitter (total span, centred on the lattice point)
pub const FIELD_JITTER: f64 = 10.0;

/// Anchor and dynamic elevation amplitudes
pub const FIELD_BASE_ELEVATION: f64 = 50.0;
pub const FIELD_TERRAIN_ELEVATION: f64 = 30.0;

/// Clock advance per frame
pub const FIELD_TIME_STEP: f64 = 0.008;

/// Pulse spawning
pub const PULSE_SPAWN_PROBABILITY: f64 = 0.005;
pub const PULSE_COOLDOWN: f64 = 3.0;
pub const PULSE_GROWTH: f64 = 3.0;
pub const PULSE_BAND: f64 = 50.0;
pub const PULSE_MIN_RADIUS: f64 = 300.0;
pub const PULSE_RADIUS_SPREAD: f64 = 200.0;
pub const PULSE_MIN_STRENGTH: f64 = 15.0;
pub const PULSE_STRENGTH_SPREAD: f64 = 10.0;

/// Link geometry and fade
pub const LINK_BASE_DISTANCE: f64 = 60.0;
pub const LINK_DISTANCE_GAIN: f64 = 20.0;
pub const LINK_MIN_DISTANCE: f64 = 5.0;
pub const LINK_ELEVATION_FALLOFF: f64 = 20.0;
pub const LINK_OPACITY: f64 = 0.6;
pub const LINK_OPACITY_CUTOFF: f64 = 0.02;

/// Reference elevation for brightness terms
pub const DEPTH_REFERENCE: f64 = 80.0;

/// Flicker on the calm left side (links, points)
pub const LINK_FLICKER_EDGE: f64 = 0.15;
pub const LINK_FLICKER_KEEP: f64 = 0.3;
pub const POINT_FLICKER_EDGE: f64 = 0.2;
pub const POINT_FLICKER_KEEP: f64 = 0.4;

// ============================================
// Schematic Simulator
// ============================================

pub const SCHEMATIC_COLS: u32 = 5;
pub const SCHEMATIC_ROWS: u32 = 4;
pub const SCHEMATIC_CELL_KEEP: f64 = 0.7;
pub const SCHEMATIC_JITTER: f64 = 20.0;
pub const COMPROMISE_PROBABILITY: f64 = 0.3;

/// Link reach in units of cell width, and acceptance probability
pub const WIRE_REACH: f64 = 1.8;
pub const WIRE_ACCEPT: f64 = 0.6;

pub const FLOW_MIN_SPEED: f64 = 0.5;
pub const FLOW_SPEED_SPREAD: f64 = 1.5;
pub const FLOW_RATE: f64 = 0.02;

pub const SCHEMATIC_TIME_STEP: f64 = 0.016;
pub const SCAN_SPEED: f64 = 0.5;
pub const SCAN_HALF_HEIGHT: f32 = 30.0;
pub const SCAN_ALPHA: f32 = 0.1;

pub const UNDERLAY_STEP: f32 = 20.0;
pub const UNDERLAY_ALPHA: f32 = 0.03;

/// Packet path split across the three wire segments
pub const SEGMENT_SPLIT: [f64; 2] = [0.33, 0.66];

// ============================================
// Compromised Panel
// ============================================

/// Delay before the panel appears
pub const PANEL_START_DELAY_MS: u64 = 1200;
pub const PANEL_FADE_MS: u64 = 500;
pub const PANEL_START_SCALE: f32 = 0.95;

pub const PANEL_MIN_SIDE: u32 = 200;
pub const PANEL_MAX_SIDE: u32 = 300;
pub const PANEL_HEADER_HEIGHT: u32 = 40;
pub const PANEL_READOUT_HEIGHT: u32 = 64;
pub const PANEL_MARGIN: u32 = 48;

pub const HEADER_TEXT: &str = "COMPROMISED";
pub const HEADER_SPEED_MS: u64 = 40;

pub const READOUTS: [(&str, &str); 3] = [
    ("SYS_ID:", "0x7F3A9C2E"),
    ("VECTOR:", "LATERAL_MOVEMENT"),
    ("STATUS:", "DOMAIN_DOMINANCE"),
];

pub const READOUT_FADE_MS: u64 = 300;
pub const READOUT_DELAY_MS: u64 = 200;

// ============================================
// Decode Text
// ============================================

pub const DECODE_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789@#$%&*<>/\\|{}[]";
pub const DECODE_TICKS_PER_CHAR: u32 = 3;
pub const DECODE_SCRAMBLE_WIDTH: usize = 5;

// ============================================
// Headline
// ============================================

/// Text, reveal delay and brightness of each headline line
pub const HEADLINE_LINES: [(&str, u64, f32); 2] = [
    ("WE ARE THE THREAT", 300, 1.0),
    ("YOU DIDN'T MODEL.", 1000, 0.55),
];
pub const HEADLINE_GLITCH_MS: u64 = 600;
pub const HEADLINE_MIN_SCALE: u32 = 2;
pub const HEADLINE_MAX_SCALE: u32 = 8;

/// Red channel keyframes over one cycle; the cyan channel mirrors them
pub const CHANNEL_OFFSETS_X: [f32; 6] = [0.0, -3.0, 2.0, -1.0, 3.0, 0.0];
pub const CHANNEL_OFFSETS_Y: [f32; 6] = [0.0, 1.0, -1.0, 2.0, -1.0, 0.0];
pub const CHANNEL_CYCLE_MS: u64 = 150;

/// Horizontal slice through 40%..60% of the glyph height
pub const SLICE_BAND: [f32; 2] = [0.4, 0.6];
pub const SLICE_OFFSETS_X: [f32; 5] = [-5.0, 5.0, -3.0, 4.0, 0.0];
pub const SLICE_CYCLE_MS: u64 = 100;

pub const SUBTEXT_LINES: [&str; 2] = [
    "> EXTREME ADVERSARIAL SIMULATION. RESEARCH-LED ATTACK VECTORS.",
    "> BEYOND THE SCOPE OF STANDARD PENETRATION TESTING.",
];
pub const SUBTEXT_FADE_MS: u64 = 300;

pub const VERSION_TAG: &str = "V2.0.1";
pub const VERSION_DELAY_MS: u64 = 300;
pub const VERSION_FADE_MS: u64 = 500;
pub const VERSION_OPACITY: f32 = 0.4;

pub const HUD_INSET: f32 = 32.0;

// ============================================
// Mission Logs
// ============================================

pub const MISSION_LOGS_HEADER: &str = "MISSION_LOGS";
pub const MISSION_LOGS_HEADER_SPEED_MS: u64 = 30;
/// Delay after the second headline line settles
pub const MISSION_LOGS_DELAY_MS: u64 = 300;
pub const MISSION_LOGS_FADE_MS: u64 = 200;
pub const MISSION_LOG_STAGGER_MS: u64 = 400;
pub const MISSION_LOG_SPEED_MS: u64 = 25;
pub const MISSION_LOG_FADE_MS: u64 = 300;
pub const MISSION_LOG_SLIDE: f32 = 10.0;
pub const MISSION_LOG_SCALE: u32 = 2;

/// Permissions, operation, target, status
pub const MISSION_LOG_ENTRIES: [(&str, &str, &str, &str); 2] = [
    ("drwx-----", "OP_SILENT_CITADEL", "(Critical Infrastructure)", "[REDACTED]"),
    ("drwx-----", "OP_GLASS_CEILING", "(Fortune 100 Finance)", "[REDACTED]"),
];

// ============================================
// Corner Labels
// ============================================

/// Text, fade delay and final opacity; top-left, top-right, bottom-left,
/// bottom-right
pub const CORNER_LABELS: [(&str, u64, f32); 4] = [
    ("[STATUS: ACTIVE]", 200, 1.0),
    ("/PROTOCOL", 300, 0.7),
    ("/OPERATIONS", 400, 0.7),
    ("/INITIALIZE", 500, 0.7),
];
pub const CORNER_FADE_MS: u64 = 500;
pub const CORNER_SCALE: u32 = 2;

// ============================================
// Glitch Artifacts
// ============================================

pub const ARTIFACT_TICK_MS: u64 = 100;
pub const ARTIFACT_SPAWN_PROBABILITY: f64 = 0.05;
pub const ARTIFACT_MIN_HEIGHT: f32 = 2.0;
pub const ARTIFACT_HEIGHT_SPREAD: f32 = 8.0;
pub const ARTIFACT_MAX_OFFSET: f32 = 10.0;
pub const ARTIFACT_MIN_DURATION_MS: u64 = 100;
pub const ARTIFACT_DURATION_SPREAD_MS: u64 = 200;
/// Noise bursts: left edge as a fraction of the width, width in pixels
pub const NOISE_LEFT_RANGE: [f32; 2] = [0.2, 0.8];
pub const NOISE_MIN_WIDTH: f32 = 50.0;
pub const NOISE_WIDTH_SPREAD: f32 = 200.0;
pub const NOISE_MAX_SPECKLES: usize = 200;

/// Field tuning, defaults mirror the constants above
#[derive(Clone, Debug)]
pub struct FieldParams {
    pub spacing: f64,
    pub time_step: f64,
    pub pulse_spawn_probability: f64,
    pub pulse_cooldown: f64,
    pub pulse_growth: f64,
    pub pulse_band: f64,
    pub link_opacity_cutoff: f64,
}

impl Default for FieldParams {
    fn default() -> Self {
        Self {
            spacing: FIELD_SPACING,
            time_step: FIELD_TIME_STEP,
            pulse_spawn_probability: PULSE_SPAWN_PROBABILITY,
            pulse_cooldown: PULSE_COOLDOWN,
            pulse_growth: PULSE_GROWTH,
            pulse_band: PULSE_BAND,
            link_opacity_cutoff: LINK_OPACITY_CUTOFF,
        }
    }
}

/// Schematic tuning, defaults mirror the constants above
#[derive(Clone, Debug)]
pub struct SchematicParams {
    pub cols: u32,
    pub rows: u32,
    pub cell_keep: f64,
    pub compromise_probability: f64,
    pub wire_reach: f64,
    pub wire_accept: f64,
    pub time_step: f64,
    pub flow_rate: f64,
    pub scan_speed: f64,
}

impl Default for SchematicParams {
    fn default() -> Self {
        Self {
            cols: SCHEMATIC_COLS,
            rows: SCHEMATIC_ROWS,
            cell_keep: SCHEMATIC_CELL_KEEP,
            compromise_probability: COMPROMISE_PROBABILITY,
            wire_reach: WIRE_REACH,
            wire_accept: WIRE_ACCEPT,
            time_step: SCHEMATIC_TIME_STEP,
            flow_rate: FLOW_RATE,
            scan_speed: SCAN_SPEED,
        }
    }
}
