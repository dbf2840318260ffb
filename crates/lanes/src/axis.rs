//! Time axis collaborator and the built-in [`WindowAxis`].
//!
//! The engine never computes a time scale itself. A [`TimeAxis`] maps time to
//! horizontal pixels for the active [`AxisMode`] and reports an identity
//! string that changes whenever that mapping changes.

use std::{
    fmt,
    sync::{PoisonError, RwLock, RwLockWriteGuard},
};

use chrono::NaiveDateTime;
use log::debug;
use serde::Deserialize;

use lanes_core::time::{TimeRange, offset_by_seconds, seconds_between};

use crate::config::AxisConfig;

/// Number of decades compressed into each edge of a logarithmic axis.
const LOG_DECADES: f64 = 3.0;

/// Time to pixel mapping mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisMode {
    /// Fixed pixels per second; a wider viewport shows more time.
    #[default]
    Standard,
    /// The window is stretched to the current viewport width.
    Proportional,
    /// The window occupies a linear center band; time outside it is
    /// compressed logarithmically into the edges.
    Logarithmic,
}

impl fmt::Display for AxisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Proportional => write!(f, "proportional"),
            Self::Logarithmic => write!(f, "logarithmic"),
        }
    }
}

/// Externally owned time to pixel projection.
pub trait TimeAxis: Send + Sync {
    /// Changes whenever the window, scale or mode changes.
    fn identity(&self) -> String;

    fn mode(&self) -> AxisMode;

    /// Time window currently displayed at `width` pixels.
    fn window(&self, width: i32) -> TimeRange;

    /// Horizontal pixel of `time` at `width` pixels.
    fn time_to_pixel(&self, time: NaiveDateTime, width: i32) -> f64;

    /// Time shown at pixel `x`, or `None` when no time maps there.
    fn pixel_to_time(&self, x: f64, width: i32) -> Option<NaiveDateTime>;
}

#[derive(Debug, Clone, Copy)]
struct WindowState {
    origin: NaiveDateTime,
    span_seconds: f64,
    reference_width: i32,
    mode: AxisMode,
    revision: u64,
}

impl WindowState {
    fn end(&self) -> NaiveDateTime {
        offset_by_seconds(self.origin, self.span_seconds).unwrap_or(self.origin)
    }

    fn bump(&mut self) {
        self.revision += 1;
    }
}

/// A pannable, zoomable time window implementing all three axis modes.
#[derive(Debug)]
pub struct WindowAxis {
    name: String,
    center_ratio: f64,
    state: RwLock<WindowState>,
}

impl WindowAxis {
    /// Creates a standard-mode axis showing `[begin, end)` across
    /// `reference_width` pixels.
    ///
    /// Windows shorter than one second are widened to one second.
    pub fn new(begin: NaiveDateTime, end: NaiveDateTime, reference_width: i32) -> Self {
        Self {
            name: String::from("axis"),
            center_ratio: 0.6,
            state: RwLock::new(WindowState {
                origin: begin,
                span_seconds: seconds_between(begin, end).max(1.0),
                reference_width: reference_width.max(1),
                mode: AxisMode::Standard,
                revision: 0,
            }),
        }
    }

    /// Creates an axis like [`WindowAxis::new`] whose logarithmic center
    /// band follows `config`.
    pub fn from_config(
        begin: NaiveDateTime,
        end: NaiveDateTime,
        reference_width: i32,
        config: &AxisConfig,
    ) -> Self {
        Self::new(begin, end, reference_width).with_center_ratio(config.log_center_ratio())
    }

    pub fn with_mode(self, mode: AxisMode) -> Self {
        self.write().mode = mode;
        self
    }

    /// Sets the linear center band share used in logarithmic mode.
    pub fn with_center_ratio(mut self, ratio: f64) -> Self {
        if ratio.is_finite() && ratio > 0.0 {
            self.center_ratio = ratio.min(1.0);
        }
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn set_mode(&self, mode: AxisMode) {
        let mut state = self.write();
        if state.mode != mode {
            state.mode = mode;
            state.bump();
            debug!(axis = self.name.as_str(), mode:%; "Axis mode changed");
        }
    }

    /// Moves the window by `seconds` (negative pans into the past).
    pub fn pan(&self, seconds: f64) {
        let mut state = self.write();
        if let Some(origin) = offset_by_seconds(state.origin, seconds) {
            state.origin = origin;
            state.bump();
        }
    }

    /// Zooms about the window center; factors above one zoom in.
    pub fn zoom(&self, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let mut state = self.write();
        let half = state.span_seconds / 2.0;
        let Some(center) = offset_by_seconds(state.origin, half) else {
            return;
        };
        let span = (state.span_seconds / factor).max(1.0);
        if let Some(origin) = offset_by_seconds(center, -span / 2.0) {
            state.origin = origin;
            state.span_seconds = span;
            state.bump();
        }
    }

    /// Replaces the displayed window.
    pub fn set_window(&self, begin: NaiveDateTime, end: NaiveDateTime) {
        let mut state = self.write();
        state.origin = begin;
        state.span_seconds = seconds_between(begin, end).max(1.0);
        state.bump();
    }

    fn read(&self) -> WindowState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, WindowState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn log_band(&self, width: i32) -> (f64, f64) {
        let band = f64::from(width.max(0)) * self.center_ratio;
        let edge = (f64::from(width.max(0)) - band) / 2.0;
        (edge, band)
    }
}

impl TimeAxis for WindowAxis {
    fn identity(&self) -> String {
        format!("{}@{}", self.name, self.read().revision)
    }

    fn mode(&self) -> AxisMode {
        self.read().mode
    }

    fn window(&self, width: i32) -> TimeRange {
        let state = self.read();
        match state.mode {
            AxisMode::Standard => {
                let shown = state.span_seconds * f64::from(width.max(0))
                    / f64::from(state.reference_width);
                TimeRange::new(Some(state.origin), offset_by_seconds(state.origin, shown))
            }
            AxisMode::Proportional | AxisMode::Logarithmic => {
                TimeRange::bounded(state.origin, state.end())
            }
        }
    }

    fn time_to_pixel(&self, time: NaiveDateTime, width: i32) -> f64 {
        let state = self.read();
        let seconds = seconds_between(state.origin, time);
        match state.mode {
            AxisMode::Standard => {
                seconds * f64::from(state.reference_width) / state.span_seconds
            }
            AxisMode::Proportional => seconds * f64::from(width.max(0)) / state.span_seconds,
            AxisMode::Logarithmic => {
                let (edge, band) = self.log_band(width);
                let span = state.span_seconds;
                if seconds < 0.0 {
                    edge * (1.0 - compress(-seconds / span))
                } else if seconds > span {
                    edge + band + edge * compress((seconds - span) / span)
                } else {
                    edge + seconds * band / span
                }
            }
        }
    }

    fn pixel_to_time(&self, x: f64, width: i32) -> Option<NaiveDateTime> {
        if !x.is_finite() {
            return None;
        }
        let state = self.read();
        let span = state.span_seconds;
        let seconds = match state.mode {
            AxisMode::Standard => x * span / f64::from(state.reference_width),
            AxisMode::Proportional => {
                if width <= 0 {
                    return None;
                }
                x * span / f64::from(width)
            }
            AxisMode::Logarithmic => {
                let (edge, band) = self.log_band(width);
                if band <= 0.0 {
                    return None;
                }
                if x < edge {
                    -expand((edge - x) / edge)? * span
                } else if x > edge + band {
                    span + expand((x - edge - band) / edge)? * span
                } else {
                    (x - edge) * span / band
                }
            }
        };
        offset_by_seconds(state.origin, seconds)
    }
}

/// Maps a distance beyond the window, in window spans, onto `[0, 1]` of an
/// edge band.
fn compress(ratio: f64) -> f64 {
    ((1.0 + ratio).log10() / LOG_DECADES).min(1.0)
}

/// Inverse of [`compress`]; the outermost edge pixel maps to no time.
fn expand(fraction: f64) -> Option<f64> {
    if !(0.0..1.0).contains(&fraction) {
        return None;
    }
    Some(10f64.powf(fraction * LOG_DECADES) - 1.0)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeDelta};
    use float_cmp::assert_approx_eq;

    use super::*;

    fn at(minutes: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + TimeDelta::minutes(minutes)
    }

    fn hour_axis(mode: AxisMode) -> WindowAxis {
        WindowAxis::new(at(0), at(60), 600).with_mode(mode)
    }

    #[test]
    fn test_standard_uses_reference_width() {
        let axis = hour_axis(AxisMode::Standard);
        assert_approx_eq!(f64, axis.time_to_pixel(at(30), 1200), 300.0);
        assert_eq!(axis.window(1200), TimeRange::bounded(at(0), at(120)));
        assert_eq!(axis.pixel_to_time(300.0, 1200), Some(at(30)));
    }

    #[test]
    fn test_proportional_fits_width() {
        let axis = hour_axis(AxisMode::Proportional);
        assert_approx_eq!(f64, axis.time_to_pixel(at(30), 1200), 600.0);
        assert_eq!(axis.window(1200), TimeRange::bounded(at(0), at(60)));
        assert_eq!(axis.pixel_to_time(600.0, 1200), Some(at(30)));
        assert_eq!(axis.pixel_to_time(10.0, 0), None);
    }

    #[test]
    fn test_logarithmic_center_band_is_linear() {
        let axis = hour_axis(AxisMode::Logarithmic);
        // Width 1000 with ratio 0.6: edges of 200 pixels, band of 600.
        assert_approx_eq!(f64, axis.time_to_pixel(at(0), 1000), 200.0);
        assert_approx_eq!(f64, axis.time_to_pixel(at(30), 1000), 500.0);
        assert_approx_eq!(f64, axis.time_to_pixel(at(60), 1000), 800.0);
    }

    #[test]
    fn test_center_ratio_from_config() {
        let config = AxisConfig::default().with_log_center_ratio(0.8);
        let axis =
            WindowAxis::from_config(at(0), at(60), 600, &config).with_mode(AxisMode::Logarithmic);
        // Width 1000 with ratio 0.8: edges of 100 pixels.
        assert_approx_eq!(f64, axis.time_to_pixel(at(0), 1000), 100.0);
        assert_approx_eq!(f64, axis.time_to_pixel(at(60), 1000), 900.0);
    }

    #[test]
    fn test_logarithmic_edges_compress() {
        let axis = hour_axis(AxisMode::Logarithmic);
        let near = axis.time_to_pixel(at(-60), 1000);
        let far = axis.time_to_pixel(at(-6000), 1000);
        let beyond = axis.time_to_pixel(at(-600_000), 1000);
        assert!(near < 200.0 && near > far);
        assert!(far >= 0.0);
        assert_approx_eq!(f64, beyond, 0.0);

        let right = axis.time_to_pixel(at(120), 1000);
        assert!(right > 800.0 && right < 1000.0);
    }

    #[test]
    fn test_logarithmic_inverse() {
        let axis = hour_axis(AxisMode::Logarithmic);
        let x = axis.time_to_pixel(at(-60), 1000);
        let time = axis.pixel_to_time(x, 1000).unwrap();
        assert!(seconds_between(at(-60), time).abs() < 1.0);
        assert_eq!(axis.pixel_to_time(0.0, 1000), None);
    }

    #[test]
    fn test_changes_bump_identity() {
        let axis = hour_axis(AxisMode::Standard).with_name("main");
        let initial = axis.identity();
        assert_eq!(initial, "main@0");

        axis.pan(60.0);
        assert_ne!(axis.identity(), initial);
        assert_eq!(axis.pixel_to_time(0.0, 600), Some(at(1)));

        let before = axis.identity();
        axis.set_mode(AxisMode::Standard);
        assert_eq!(axis.identity(), before);
        axis.set_mode(AxisMode::Logarithmic);
        assert_ne!(axis.identity(), before);
    }

    #[test]
    fn test_zoom_keeps_center() {
        let axis = hour_axis(AxisMode::Proportional);
        axis.zoom(2.0);
        assert_eq!(axis.window(600), TimeRange::bounded(at(15), at(45)));

        axis.zoom(0.0);
        assert_eq!(axis.window(600), TimeRange::bounded(at(15), at(45)));
    }

    #[test]
    fn test_mode_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Holder {
            mode: AxisMode,
        }
        let holder: Holder = toml::from_str(r#"mode = "logarithmic""#).unwrap();
        assert_eq!(holder.mode, AxisMode::Logarithmic);
    }
}
