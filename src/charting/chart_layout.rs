use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use super::axis::{value_axis, AxisScale};
use super::spline::{fmt_coord, monotone_spline};
use crate::valuation::{BaselineMode, ValuationBucket};

/// How per-group series are stacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StackOffset {
    /// Bands are cumulative absolute values.
    Normal,
    /// Each band is its share of the bucket total (0..1); a bucket with a
    /// zero total contributes a zero share for every group.
    Expand,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartLayoutOptions {
    pub offset: StackOffset,
    pub baseline_mode: BaselineMode,
    /// Crop floor of the y-range; 0 for plain absolute charts, the series
    /// minimum for cropped ones.
    pub min_value: f64,
    /// Widen the y-range to whole tick steps (absolute mode only).
    pub nice_scale: bool,
}

impl Default for ChartLayoutOptions {
    fn default() -> Self {
        ChartLayoutOptions {
            offset: StackOffset::Normal,
            baseline_mode: BaselineMode::None,
            min_value: 0.0,
            nice_scale: false,
        }
    }
}

/// One stacked band and its geometry. `bands` holds the [y0, y1] interval
/// per bucket in data space (absolute values, or shares in expand mode);
/// paths are in the normalized viewport.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartLayer {
    pub label: String,
    pub bands: Vec<(f64, f64)>,
    /// Closed polygon through the smoothed band boundaries.
    pub area_path: String,
    /// Dashed book-value overlay, stacked onto the bands below this layer.
    pub baseline_path: Option<String>,
}

/// Theme-independent chart geometry in a 1000x1000 viewport: y grows
/// downward, x spans the bucket range.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartLayout {
    pub layers: Vec<ChartLayer>,
    pub global_baseline_path: Option<String>,
    pub y_axis: AxisScale,
}

const VIEWPORT: f64 = 1000.0;

impl ChartLayout {
    /// Stacks the bucketed series in `group_order` (bottom band first) and
    /// smooths every boundary. The order is the caller's presentation
    /// choice; reversing it is not a data concern.
    pub fn build(
        buckets: &[ValuationBucket],
        group_order: &[String],
        options: &ChartLayoutOptions,
    ) -> ChartLayout {
        let n = buckets.len();
        if n == 0 {
            return ChartLayout {
                layers: Vec::new(),
                global_baseline_path: None,
                y_axis: value_axis(options.min_value, options.min_value, false),
            };
        }

        let amounts: Vec<Vec<f64>> = group_order
            .iter()
            .map(|label| {
                buckets
                    .iter()
                    .map(|b| {
                        b.values
                            .get(label)
                            .map(|p| p.amount.to_f64().unwrap_or(0.0))
                            .unwrap_or(0.0)
                    })
                    .collect()
            })
            .collect();
        let baselines: Vec<Vec<f64>> = group_order
            .iter()
            .map(|label| {
                buckets
                    .iter()
                    .map(|b| {
                        b.values
                            .get(label)
                            .map(|p| p.baseline.to_f64().unwrap_or(0.0))
                            .unwrap_or(0.0)
                    })
                    .collect()
            })
            .collect();

        // cumulative stack tops per layer, and the column totals
        let mut stacked_upper: Vec<Vec<f64>> = Vec::with_capacity(amounts.len());
        let mut offsets = vec![0.0; n];
        for series in &amounts {
            let upper: Vec<f64> = series
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    offsets[i] += v;
                    offsets[i]
                })
                .collect();
            stacked_upper.push(upper);
        }
        let totals: Vec<f64> = (0..n)
            .map(|i| stacked_upper.last().map(|upper| upper[i]).unwrap_or(0.0))
            .collect();

        // a layer's baseline sits on top of the bands below it
        let baseline_stacked: Vec<Vec<f64>> = (0..amounts.len())
            .map(|li| {
                (0..n)
                    .map(|i| {
                        let below = if li == 0 { 0.0 } else { stacked_upper[li - 1][i] };
                        below + baselines[li][i]
                    })
                    .collect()
            })
            .collect();

        let bands: Vec<Vec<(f64, f64)>> = match options.offset {
            StackOffset::Normal => {
                let mut offsets = vec![0.0; n];
                amounts
                    .iter()
                    .map(|series| {
                        series
                            .iter()
                            .enumerate()
                            .map(|(i, v)| {
                                let y0 = offsets[i];
                                offsets[i] += v;
                                (y0, offsets[i])
                            })
                            .collect()
                    })
                    .collect()
            }
            StackOffset::Expand => {
                let mut offsets = vec![0.0; n];
                amounts
                    .iter()
                    .map(|series| {
                        series
                            .iter()
                            .enumerate()
                            .map(|(i, v)| {
                                let y0 = offsets[i];
                                let share = if totals[i] > 0.0 { v / totals[i] } else { 0.0 };
                                offsets[i] += share;
                                (y0, offsets[i])
                            })
                            .collect()
                    })
                    .collect()
            }
        };

        let raw_max = match options.offset {
            StackOffset::Expand => {
                let mut max_fraction: f64 = 1.0;
                if options.baseline_mode == BaselineMode::PerGroup {
                    for series in &baseline_stacked {
                        for (i, value) in series.iter().enumerate() {
                            if totals[i] > 0.0 {
                                max_fraction = max_fraction.max(value / totals[i]);
                            }
                        }
                    }
                }
                if options.baseline_mode == BaselineMode::Global {
                    for (i, bucket) in buckets.iter().enumerate() {
                        if totals[i] > 0.0 {
                            let baseline = bucket.baseline.to_f64().unwrap_or(0.0);
                            max_fraction = max_fraction.max(baseline / totals[i]);
                        }
                    }
                }
                max_fraction
            }
            StackOffset::Normal => {
                let mut max = totals.iter().fold(0.0f64, |m, &t| m.max(t));
                // a baseline can sit above the stack top when a group has
                // lost value
                for li in 0..amounts.len() {
                    for i in 0..n {
                        let y0 = bands[li][i].0;
                        max = max.max(y0 + baselines[li][i]);
                    }
                }
                max
            }
        };

        let min_y = options.min_value;
        let max_y = raw_max.max(min_y);
        let y_axis = value_axis(
            min_y,
            max_y,
            options.offset == StackOffset::Normal && options.nice_scale,
        );

        let x = |i: usize| {
            if n > 1 {
                i as f64 / (n - 1) as f64 * VIEWPORT
            } else {
                0.0
            }
        };
        let y_span = y_axis.graph_max - y_axis.graph_min;
        let y_normal = |value: f64| {
            if y_span <= 0.0 {
                return VIEWPORT;
            }
            VIEWPORT - ((value.max(y_axis.graph_min) - y_axis.graph_min) / y_span) * VIEWPORT
        };
        let y_expanded = |value: f64, i: usize| {
            if totals[i] > 0.0 {
                y_normal(value / totals[i])
            } else {
                y_normal(0.0)
            }
        };

        let layers: Vec<ChartLayer> = group_order
            .iter()
            .enumerate()
            .map(|(li, label)| {
                let area_path = if n < 2 {
                    String::new()
                } else {
                    let bottom: Vec<(f64, f64)> =
                        (0..n).map(|i| (x(i), y_normal(bands[li][i].0))).collect();
                    let mut top: Vec<(f64, f64)> =
                        (0..n).map(|i| (x(i), y_normal(bands[li][i].1))).collect();
                    top.reverse();

                    let top_path = monotone_spline(&top);
                    format!(
                        "{} L{},{} {} Z",
                        monotone_spline(&bottom),
                        fmt_coord(top[0].0),
                        fmt_coord(top[0].1),
                        top_path.strip_prefix('M').unwrap_or(&top_path)
                    )
                };

                let baseline_path = if options.baseline_mode == BaselineMode::PerGroup {
                    let points: Vec<(f64, f64)> = (0..n)
                        .filter(|&i| {
                            // no marker where the group is absent, or where
                            // the baseline just retraces the band top
                            amounts[li][i] != 0.0 && baselines[li][i] != amounts[li][i]
                        })
                        .map(|i| {
                            let y = match options.offset {
                                StackOffset::Expand => y_expanded(baseline_stacked[li][i], i),
                                StackOffset::Normal => y_normal(baseline_stacked[li][i]),
                            };
                            (x(i), y)
                        })
                        .collect();
                    let path = monotone_spline(&points);
                    if path.is_empty() {
                        None
                    } else {
                        Some(path)
                    }
                } else {
                    None
                };

                ChartLayer {
                    label: label.clone(),
                    bands: bands[li].clone(),
                    area_path,
                    baseline_path,
                }
            })
            .collect();

        let global_baseline_path = if options.baseline_mode == BaselineMode::Global {
            let points: Vec<(f64, f64)> = buckets
                .iter()
                .enumerate()
                .map(|(i, bucket)| {
                    let baseline = bucket.baseline.to_f64().unwrap_or(0.0);
                    let y = match options.offset {
                        StackOffset::Expand => y_expanded(baseline, i),
                        StackOffset::Normal => y_normal(baseline),
                    };
                    (x(i), y)
                })
                .collect();
            let path = monotone_spline(&points);
            if path.is_empty() {
                None
            } else {
                Some(path)
            }
        } else {
            None
        };

        ChartLayout {
            layers,
            global_baseline_path,
            y_axis,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::collections::HashMap;

    use crate::valuation::GroupPoint;

    fn bucket(day: u32, values: &[(&str, i64, i64)]) -> ValuationBucket {
        let mut map = HashMap::new();
        let mut total_baseline = Decimal::ZERO;
        for &(label, amount, baseline) in values {
            total_baseline += Decimal::from(baseline);
            map.insert(
                label.to_string(),
                GroupPoint {
                    amount: Decimal::from(amount),
                    baseline: Decimal::from(baseline),
                },
            );
        }
        ValuationBucket {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            values: map,
            baseline: total_baseline,
        }
    }

    fn order(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_absolute_bands_stack_to_the_column_total() {
        let buckets = vec![
            bucket(1, &[("a", 100, 100), ("b", 50, 50)]),
            bucket(2, &[("a", 150, 100), ("b", 50, 50)]),
        ];
        let layout = ChartLayout::build(
            &buckets,
            &order(&["a", "b"]),
            &ChartLayoutOptions::default(),
        );

        for (i, total) in [150.0, 200.0].iter().enumerate() {
            assert_relative_eq!(layout.layers[0].bands[i].0, 0.0);
            assert_relative_eq!(layout.layers[0].bands[i].1, layout.layers[1].bands[i].0);
            assert_relative_eq!(layout.layers[1].bands[i].1, *total);
        }
    }

    #[test]
    fn test_normalized_bands_stack_to_one() {
        let buckets = vec![
            bucket(1, &[("a", 100, 0), ("b", 300, 0)]),
            bucket(2, &[("a", 60, 0), ("b", 40, 0)]),
        ];
        let layout = ChartLayout::build(
            &buckets,
            &order(&["a", "b"]),
            &ChartLayoutOptions {
                offset: StackOffset::Expand,
                ..ChartLayoutOptions::default()
            },
        );

        assert_relative_eq!(layout.layers[0].bands[0].1, 0.25);
        assert_relative_eq!(layout.layers[1].bands[0].1, 1.0);
        assert_relative_eq!(layout.layers[0].bands[1].1, 0.6);
        assert_relative_eq!(layout.layers[1].bands[1].1, 1.0);
    }

    #[test]
    fn test_zero_total_bucket_yields_zero_shares_not_nan() {
        let buckets = vec![
            bucket(1, &[("a", 100, 0)]),
            bucket(2, &[]),
            bucket(3, &[("a", 50, 0)]),
        ];
        let layout = ChartLayout::build(
            &buckets,
            &order(&["a"]),
            &ChartLayoutOptions {
                offset: StackOffset::Expand,
                ..ChartLayoutOptions::default()
            },
        );

        assert_relative_eq!(layout.layers[0].bands[1].0, 0.0);
        assert_relative_eq!(layout.layers[0].bands[1].1, 0.0);
        assert!(!layout.layers[0].area_path.contains("NaN"));
    }

    #[test]
    fn test_baseline_above_stack_widens_the_y_range() {
        // market value collapsed to 100 but 400 was contributed
        let buckets = vec![
            bucket(1, &[("a", 100, 400)]),
            bucket(2, &[("a", 100, 400)]),
        ];
        let layout = ChartLayout::build(
            &buckets,
            &order(&["a"]),
            &ChartLayoutOptions {
                baseline_mode: BaselineMode::PerGroup,
                ..ChartLayoutOptions::default()
            },
        );

        assert!(layout.y_axis.graph_max >= 400.0);
        assert!(layout.layers[0].baseline_path.is_some());
    }

    #[test]
    fn test_baseline_equal_to_value_is_not_drawn() {
        let buckets = vec![
            bucket(1, &[("a", 100, 100)]),
            bucket(2, &[("a", 200, 200)]),
        ];
        let layout = ChartLayout::build(
            &buckets,
            &order(&["a"]),
            &ChartLayoutOptions {
                baseline_mode: BaselineMode::PerGroup,
                ..ChartLayoutOptions::default()
            },
        );

        assert!(layout.layers[0].baseline_path.is_none());
    }

    #[test]
    fn test_global_baseline_path_present_in_global_mode() {
        let buckets = vec![
            bucket(1, &[("a", 100, 80)]),
            bucket(2, &[("a", 120, 90)]),
        ];
        let layout = ChartLayout::build(
            &buckets,
            &order(&["a"]),
            &ChartLayoutOptions {
                baseline_mode: BaselineMode::Global,
                ..ChartLayoutOptions::default()
            },
        );

        assert!(layout.global_baseline_path.is_some());
        assert!(layout.layers[0].baseline_path.is_none());
    }

    #[test]
    fn test_area_paths_are_closed_polygons() {
        let buckets = vec![
            bucket(1, &[("a", 100, 0)]),
            bucket(2, &[("a", 150, 0)]),
            bucket(3, &[("a", 120, 0)]),
        ];
        let layout = ChartLayout::build(
            &buckets,
            &order(&["a"]),
            &ChartLayoutOptions::default(),
        );

        let path = &layout.layers[0].area_path;
        assert!(path.starts_with('M'));
        assert!(path.ends_with('Z'));
        assert!(path.contains(" L"));
    }

    #[test]
    fn test_empty_series_yields_empty_layout() {
        let layout = ChartLayout::build(&[], &order(&["a"]), &ChartLayoutOptions::default());
        assert!(layout.layers.is_empty());
        assert!(layout.global_baseline_path.is_none());
    }
}
