use sysgraph_core::state::MetricSample;

const GIB: u64 = 1 << 30;

/// Eight-level block characters, lowest first.
const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Format an MB/s rate the way the graph labels show it (`"3.14MB/s"`).
pub fn format_rate(mbps: MetricSample) -> String {
    format!("{mbps:.2}MB/s")
}

/// Whole gibibytes, truncated (`"7 GB"`).
pub fn format_gib(bytes: u64) -> String {
    format!("{} GB", bytes / GIB)
}

/// One block character per sample, scaled against `ceiling`.
///
/// Values above the ceiling are drawn full height; a non-positive or NaN
/// ceiling draws everything at the lowest level.
pub fn sparkline(samples: &[MetricSample], ceiling: f64) -> String {
    samples
        .iter()
        .map(|&v| {
            if ceiling.is_nan() || ceiling <= 0.0 || !v.is_finite() {
                return BARS[0];
            }
            let level = (v / ceiling).clamp(0.0, 1.0) * (BARS.len() - 1) as f64;
            BARS[level.round() as usize]
        })
        .collect()
}
