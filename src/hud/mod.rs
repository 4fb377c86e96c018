mod artifacts;
mod decode;
mod headline;
mod mission_logs;
mod overlay;
mod panel;

use std::time::Duration;

pub use artifacts::GlitchArtifacts;
pub use decode::DecodeText;
pub use headline::Headline;
pub use mission_logs::MissionLogs;
pub use overlay::HudOverlay;
pub use panel::CompromisedPanel;

/// Linear 0..1 ramp over `len_ms`, starting `delay_ms` into `since`
fn ramp(since: Duration, delay_ms: u64, len_ms: u64) -> f32 {
    let delay = Duration::from_millis(delay_ms);
    if since < delay {
        return 0.0;
    }
    if len_ms == 0 {
        return 1.0;
    }
    ((since - delay).as_secs_f32() / Duration::from_millis(len_ms).as_secs_f32()).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp() {
        assert_eq!(ramp(Duration::from_millis(100), 200, 500), 0.0);
        assert_eq!(ramp(Duration::from_millis(200), 200, 500), 0.0);
        assert!((ramp(Duration::from_millis(450), 200, 500) - 0.5).abs() < 1e-6);
        assert_eq!(ramp(Duration::from_secs(5), 200, 500), 1.0);
        assert_eq!(ramp(Duration::from_millis(200), 200, 0), 1.0);
    }
}
