use std::collections::BTreeMap;

use crate::error::{SceneError, SceneResult};
use crate::registry::Handle;

/// Recorded series for one sensor: `channels` full per-step traces.
///
/// Samples are stored channel-major, so each channel's whole series is a
/// contiguous slice.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorSeries {
    channels: usize,
    steps: usize,
    samples: Vec<f64>,
}

impl SensorSeries {
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Number of recorded time steps. This is what the process reported, not
    /// necessarily what was requested.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// The full series for one channel.
    pub fn channel(&self, channel: usize) -> &[f64] {
        let start = channel * self.steps;
        &self.samples[start..start + self.steps]
    }

    /// Convenience accessor for single-channel sensors.
    pub fn values(&self) -> &[f64] {
        self.channel(0)
    }

    /// All channel values at one time step.
    pub fn sample(&self, step: usize) -> Vec<f64> {
        (0..self.channels)
            .map(|c| self.samples[c * self.steps + step])
            .collect()
    }
}

/// Per-handle time series recovered after a run. Read-only.
#[derive(Debug, Default)]
pub struct Telemetry {
    steps: usize,
    series: BTreeMap<Handle, SensorSeries>,
}

impl Telemetry {
    /// Number of time steps the process reported.
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn get(&self, handle: Handle) -> Option<&SensorSeries> {
        self.series.get(&handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle, &SensorSeries)> {
        self.series.iter().map(|(h, s)| (*h, s))
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Decode the flat numeric output stream into per-handle series.
///
/// Expected shape: a leading time-step count, then records of a sensor handle
/// followed by that sensor's complete series, one contiguous channel-record
/// per declared channel. The stream itself carries no channel counts: how many
/// channel-records to consume per handle comes from `arities`, the table the
/// scene recorded at sensor registration. A record naming a handle absent from
/// that table cannot be aligned and is malformed. A trailing `Done` token is
/// tolerated; records seen twice for one handle keep the last occurrence.
pub fn decode(stdout: &str, arities: &BTreeMap<Handle, usize>) -> SceneResult<Telemetry> {
    let mut tokens = stdout.split_whitespace();

    let Some(first) = tokens.next() else {
        return Ok(Telemetry::default());
    };
    if first == "Done" {
        return Ok(Telemetry::default());
    }
    let steps: usize = first
        .parse()
        .map_err(|_| SceneError::telemetry(format!("bad time-step count {first:?}")))?;

    let mut series = BTreeMap::new();
    while let Some(token) = tokens.next() {
        if token == "Done" {
            break;
        }
        let raw: i32 = token
            .parse()
            .map_err(|_| SceneError::telemetry(format!("bad sensor handle {token:?}")))?;
        let handle = Handle(raw);
        let channels = *arities.get(&handle).ok_or_else(|| {
            SceneError::telemetry(format!("record for unregistered sensor handle {handle}"))
        })?;

        let mut samples = Vec::with_capacity(channels * steps);
        for index in 0..channels * steps {
            let token = tokens.next().ok_or_else(|| {
                SceneError::telemetry(format!(
                    "series for handle {handle} truncated after {index} of {} values",
                    channels * steps
                ))
            })?;
            let value: f64 = token.parse().map_err(|_| {
                SceneError::telemetry(format!("bad sample {token:?} for handle {handle}"))
            })?;
            samples.push(value);
        }

        series.insert(
            handle,
            SensorSeries {
                channels,
                steps,
                samples,
            },
        );
    }

    tracing::debug!(steps, sensors = series.len(), "telemetry decoded");

    Ok(Telemetry { steps, series })
}
