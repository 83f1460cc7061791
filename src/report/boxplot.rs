//! Horizontal box-and-whisker plots rendered as text

use serde::Serialize;

/// Five-number summary with Tukey whiskers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// Most extreme values within 1.5×IQR of the quartiles
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

impl BoxStats {
    /// Summary of `values`; `None` when empty or any value is not finite
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() || values.iter().any(|v| !v.is_finite()) {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let q1 = quantile(&sorted, 0.25);
        let median = quantile(&sorted, 0.5);
        let q3 = quantile(&sorted, 0.75);
        let iqr = q3 - q1;
        let lo_fence = q1 - 1.5 * iqr;
        let hi_fence = q3 + 1.5 * iqr;

        let whisker_low = sorted.iter().copied().find(|&v| v >= lo_fence).unwrap_or(q1);
        let whisker_high = sorted.iter().rev().copied().find(|&v| v <= hi_fence).unwrap_or(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|&v| v < lo_fence || v > hi_fence)
            .collect();

        Some(Self {
            min: sorted[0],
            q1,
            median,
            q3,
            max: sorted[sorted.len() - 1],
            whisker_low,
            whisker_high,
            outliers,
        })
    }
}

/// Linear interpolation between closest ranks on sorted input
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Render one box per series on a shared axis.
///
/// Each row is `label │ plot`, followed by an axis row with the axis
/// minimum, midpoint and maximum. `width` is the number of plot columns.
/// Series that are empty or contain non-finite values render as `(no data)`.
pub fn render_boxplot(series: &[(&str, &[f64])], width: usize) -> Vec<String> {
    let width = width.max(11);
    let stats: Vec<Option<BoxStats>> = series.iter().map(|(_, v)| BoxStats::from_values(v)).collect();

    let (mut lo, mut hi) = stats
        .iter()
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| (lo.min(s.min), hi.max(s.max)));
    if !lo.is_finite() {
        return series
            .iter()
            .map(|(label, _)| format!("{} │ (no data)", label))
            .collect();
    }
    if hi - lo < 1e-9 {
        lo -= 0.01;
        hi += 0.01;
    }

    let label_width = series.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    let col = |v: f64| -> usize {
        (((v - lo) / (hi - lo)) * (width - 1) as f64).round().clamp(0.0, (width - 1) as f64) as usize
    };

    let mut lines = Vec::with_capacity(series.len() + 2);
    for ((label, _), stat) in series.iter().zip(&stats) {
        let row = match stat {
            Some(s) => {
                let mut cells = vec![' '; width];
                let (wl, q1, med, q3, wh) = (
                    col(s.whisker_low),
                    col(s.q1),
                    col(s.median),
                    col(s.q3),
                    col(s.whisker_high),
                );
                for c in cells.iter_mut().take(wh + 1).skip(wl) {
                    *c = '─';
                }
                for c in cells.iter_mut().take(q3 + 1).skip(q1) {
                    *c = '░';
                }
                cells[wl] = '├';
                cells[wh] = '┤';
                cells[q1] = '[';
                cells[q3] = ']';
                cells[med] = '┃';
                for &o in &s.outliers {
                    cells[col(o)] = 'o';
                }
                cells.into_iter().collect::<String>()
            }
            None => "(no data)".to_string(),
        };
        lines.push(format!("{:>w$} │ {}", label, row, w = label_width));
    }

    let mut axis = vec!['─'; width];
    axis[0] = '└';
    axis[width / 2] = '┴';
    axis[width - 1] = '┘';
    lines.push(format!("{:>w$}   {}", "", axis.into_iter().collect::<String>(), w = label_width));

    let lo_s = format!("{:.3}", lo);
    let mid_s = format!("{:.3}", (lo + hi) / 2.0);
    let hi_s = format!("{:.3}", hi);
    let mut ticks = vec![' '; width];
    let mut place = |start: usize, text: &str| {
        for (i, ch) in text.chars().enumerate() {
            if let Some(slot) = ticks.get_mut(start + i) {
                *slot = ch;
            }
        }
    };
    place(0, &lo_s);
    place((width / 2).saturating_sub(mid_s.len() / 2), &mid_s);
    place(width.saturating_sub(hi_s.len()), &hi_s);
    lines.push(format!("{:>w$}   {}", "", ticks.into_iter().collect::<String>(), w = label_width));

    lines
}
