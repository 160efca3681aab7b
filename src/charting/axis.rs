use serde::{Deserialize, Serialize};

/// Y-axis scale for a chart: the value range actually drawn and the
/// positions of its ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisScale {
    pub step: f64,
    pub graph_min: f64,
    pub graph_max: f64,
    pub start_tick: f64,
    pub end_tick: f64,
}

impl AxisScale {
    /// Tick positions from `start_tick` to `end_tick` inclusive.
    pub fn ticks(&self) -> Vec<f64> {
        if self.step <= 0.0 {
            return Vec::new();
        }
        let mut ticks = Vec::new();
        let mut tick = self.start_tick;
        // tolerance keeps the last tick from falling to rounding noise
        while tick <= self.end_tick + self.step * 1e-9 {
            ticks.push(tick);
            tick += self.step;
        }
        ticks
    }
}

/// Chooses a "nice" tick step (1, 2, 5 or 10 times a power of ten) closest
/// to a tenth of the data range, then anchors ticks on multiples of it.
///
/// With `scale_to_nice` the drawn range is widened to whole steps;
/// otherwise it hugs the data and the first/last ticks sit inside it.
/// Deterministic and library-independent, so rendered axes are reproducible.
pub fn value_axis(data_min: f64, data_max: f64, scale_to_nice: bool) -> AxisScale {
    const TICK_COUNT: f64 = 10.0;
    let raw_step = (data_max - data_min) / TICK_COUNT;

    if raw_step <= 0.0 || !raw_step.is_finite() {
        // flat or empty series: a single tick at the value, if it lands on
        // a whole number
        return AxisScale {
            step: 1.0,
            graph_min: data_min,
            graph_max: data_max,
            start_tick: data_min.ceil(),
            end_tick: data_max.floor(),
        };
    }

    let magnitude = 10f64.powf(raw_step.log10().floor());
    let normalized = raw_step / magnitude;
    let nice = if normalized < 1.5 {
        1.0
    } else if normalized < 3.0 {
        2.0
    } else if normalized < 7.0 {
        5.0
    } else {
        10.0
    };
    let step = nice * magnitude;

    let graph_min = if scale_to_nice {
        (data_min / step).floor() * step
    } else {
        data_min
    };
    let graph_max = if scale_to_nice {
        (data_max / step).ceil() * step
    } else {
        data_max
    };

    AxisScale {
        step,
        graph_min,
        graph_max,
        start_tick: (graph_min / step).ceil() * step,
        end_tick: (graph_max / step).floor() * step,
    }
}
