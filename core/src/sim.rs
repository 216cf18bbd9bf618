//! Scenario simulation for the position / yaw-bias filter.
//!
//! This module provides:
//! - [ScenarioConfig], a serde configuration readable from and writable to JSON, YAML, or TOML files
//! - [run_scenario], which synthesizes a ground-truth trajectory, corrupts odometry with a constant heading
//!   offset and Gaussian noise, emits periodic (and occasionally outlying) absolute fixes, and replays
//!   everything through a [PoseEkf]
//! - [ScenarioResult], holding the per-step [ScenarioRecord]s with CSV export and summary statistics
//!
//! Every random draw comes from a single seeded [StdRng], so a given configuration always produces the same
//! result.

use crate::measurements::{
    MeasurementModel, OdometryIncrement, PositionMeasurement, PositionOrientationMeasurement,
};
use crate::linearize::rotation_about_vertical;
use crate::error::ConfigError;
use crate::pose::PoseEkf;
use crate::{wrap_to_pi, YAW_BIAS_INDEX};

use std::error::Error;
use std::f64::consts::PI;
use std::fmt::{self, Display};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use log::{debug, info, warn};
use nalgebra::{Matrix4, Vector3, Vector4};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// Configuration of a simulated run
///
/// All distances are in meters and all angles in radians. Standard deviations are per step for the odometry and
/// per fix for the absolute measurements. Any field missing from a configuration file takes its default value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Number of odometry steps
    pub steps: usize,
    /// Horizontal distance travelled per step (m)
    pub step_length: f64,
    /// Heading change per step (rad)
    pub turn_rate: f64,
    /// Vertical distance travelled per step (m)
    pub climb_rate: f64,
    /// Heading offset between the odometry frame and the world frame (rad)
    pub true_yaw_bias: f64,
    /// Per-axis odometry translation noise (m)
    pub odometry_noise_std: f64,
    /// Yaw-bias random walk assumed by the filter per step (rad)
    pub yaw_bias_noise_std: f64,
    /// Steps between absolute fixes; zero disables fixes
    pub fix_interval: usize,
    /// Horizontal fix noise (m)
    pub fix_horizontal_std: f64,
    /// Vertical fix noise (m)
    pub fix_vertical_std: f64,
    /// Noise on the observed yaw correction (rad)
    pub fix_yaw_std: f64,
    /// Emit position + orientation fixes instead of position-only fixes
    pub orientation_fixes: bool,
    /// Probability that a fix is replaced by an outlier
    pub outlier_probability: f64,
    /// Horizontal displacement applied to outlying fixes (m)
    pub outlier_magnitude: f64,
    /// Confidence level of the chi-square gate
    pub gate_confidence: f64,
    /// Initial position standard deviation (m)
    pub initial_position_std: f64,
    /// Initial yaw-bias standard deviation (rad)
    pub initial_yaw_bias_std: f64,
    /// Random number generator seed
    pub seed: u64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        ScenarioConfig {
            steps: 600,
            step_length: 0.5,
            turn_rate: 0.005,
            climb_rate: 0.0,
            true_yaw_bias: 0.05,
            odometry_noise_std: 0.02,
            yaw_bias_noise_std: 1e-4,
            fix_interval: 10,
            fix_horizontal_std: 0.5,
            fix_vertical_std: 1.0,
            fix_yaw_std: 0.02,
            orientation_fixes: false,
            outlier_probability: 0.05,
            outlier_magnitude: 50.0,
            gate_confidence: 0.997,
            initial_position_std: 1.0,
            initial_yaw_bias_std: 0.2,
            seed: 42,
        }
    }
}

impl ScenarioConfig {
    /// Check the parameters that would otherwise make the trajectory or the noise generators misbehave.
    ///
    /// The gate confidence is checked by the filter itself on the first fix.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.outlier_probability) {
            return Err(ConfigError::OutlierProbability(self.outlier_probability));
        }
        let distances = [
            ("step_length", self.step_length),
            ("climb_rate", self.climb_rate),
            ("outlier_magnitude", self.outlier_magnitude),
        ];
        for (field, value) in distances {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field, value });
            }
        }
        for (field, value) in [("turn_rate", self.turn_rate), ("true_yaw_bias", self.true_yaw_bias)] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field, value });
            }
            if value.abs() > PI {
                return Err(ConfigError::AngleOutOfRange { field, value });
            }
        }
        let deviations = [
            ("odometry_noise_std", self.odometry_noise_std),
            ("yaw_bias_noise_std", self.yaw_bias_noise_std),
            ("fix_horizontal_std", self.fix_horizontal_std),
            ("fix_vertical_std", self.fix_vertical_std),
            ("fix_yaw_std", self.fix_yaw_std),
            ("initial_position_std", self.initial_position_std),
            ("initial_yaw_bias_std", self.initial_yaw_bias_std),
        ];
        for (field, value) in deviations {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidStandardDeviation { field, value });
            }
        }
        Ok(())
    }

    /// Write the configuration to a JSON file (pretty-printed).
    pub fn to_json<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self).map_err(io::Error::other)
    }
    /// Read the configuration from a JSON file.
    pub fn from_json<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        serde_json::from_reader(file).map_err(io::Error::other)
    }
    /// Write the configuration as YAML.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut file = File::create(path)?;
        let s = serde_yaml::to_string(self).map_err(io::Error::other)?;
        file.write_all(s.as_bytes())
    }
    /// Read the configuration from YAML.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        serde_yaml::from_reader(file).map_err(io::Error::other)
    }
    /// Write the configuration as TOML.
    pub fn to_toml<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut file = File::create(path)?;
        let s = toml::to_string(self).map_err(io::Error::other)?;
        file.write_all(s.as_bytes())
    }
    /// Read the configuration from TOML.
    pub fn from_toml<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let mut s = String::new();
        let mut file = File::open(path)?;
        file.read_to_string(&mut s)?;
        toml::from_str(&s).map_err(io::Error::other)
    }
    /// Generic write: choose format by file extension (.json/.yaml/.yml/.toml)
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let p = path.as_ref();
        match extension(p).as_deref() {
            Some("json") => self.to_json(p),
            Some("yaml") | Some("yml") => self.to_yaml(p),
            Some("toml") => self.to_toml(p),
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "unsupported file extension",
            )),
        }
    }
    /// Generic read: choose format by file extension (.json/.yaml/.yml/.toml)
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let p = path.as_ref();
        match extension(p).as_deref() {
            Some("json") => Self::from_json(p),
            Some("yaml") | Some("yml") => Self::from_yaml(p),
            Some("toml") => Self::from_toml(p),
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "unsupported file extension",
            )),
        }
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())
}

/// Kind of absolute fix delivered at a step
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixKind {
    None,
    Position,
    PositionOrientation,
}
impl Display for FixKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FixKind::None => "none",
            FixKind::Position => "position",
            FixKind::PositionOrientation => "position_orientation",
        };
        write!(f, "{}", name)
    }
}

/// One row of a simulated run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRecord {
    pub step: usize,
    pub true_x: f64,
    pub true_y: f64,
    pub true_z: f64,
    pub est_x: f64,
    pub est_y: f64,
    pub est_z: f64,
    /// Dead-reckoning position, odometry integrated without any heading correction
    pub dr_x: f64,
    pub dr_y: f64,
    pub dr_z: f64,
    /// Estimated yaw bias (rad)
    pub yaw_bias: f64,
    /// Standard deviation of the yaw-bias estimate (rad)
    pub yaw_bias_std: f64,
    /// Root of the trace of the position covariance (m)
    pub position_std: f64,
    pub fix_kind: FixKind,
    /// Whether the delivered fix was an injected outlier
    pub outlier: bool,
    /// Whether the filter rejected the delivered fix
    pub rejected: bool,
}
impl ScenarioRecord {
    fn new(step: usize, truth: &Vector3<f64>, dead_reckoning: &Vector3<f64>, ekf: &PoseEkf) -> Self {
        let estimate = ekf.position();
        ScenarioRecord {
            step,
            true_x: truth[0],
            true_y: truth[1],
            true_z: truth[2],
            est_x: estimate[0],
            est_y: estimate[1],
            est_z: estimate[2],
            dr_x: dead_reckoning[0],
            dr_y: dead_reckoning[1],
            dr_z: dead_reckoning[2],
            yaw_bias: ekf.state().yaw_bias(),
            yaw_bias_std: ekf.orientation_correction_covariance().max(0.0).sqrt(),
            position_std: ekf.covariance_position().trace().max(0.0).sqrt(),
            fix_kind: FixKind::None,
            outlier: false,
            rejected: false,
        }
    }
    pub fn truth(&self) -> Vector3<f64> {
        Vector3::new(self.true_x, self.true_y, self.true_z)
    }
    pub fn estimate(&self) -> Vector3<f64> {
        Vector3::new(self.est_x, self.est_y, self.est_z)
    }
    pub fn dead_reckoning(&self) -> Vector3<f64> {
        Vector3::new(self.dr_x, self.dr_y, self.dr_z)
    }
    /// Euclidean distance between the estimate and the truth (m)
    pub fn position_error(&self) -> f64 {
        (self.estimate() - self.truth()).norm()
    }
    /// Euclidean distance between dead reckoning and the truth (m)
    pub fn dead_reckoning_error(&self) -> f64 {
        (self.dead_reckoning() - self.truth()).norm()
    }
}

/// Output of [run_scenario]
#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioResult {
    /// Per-step records, starting with the initial state at step zero
    pub records: Vec<ScenarioRecord>,
    /// Heading offset the odometry was corrupted with (rad)
    pub true_yaw_bias: f64,
}

impl ScenarioResult {
    /// Number of steps at which a fix was delivered
    pub fn fix_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.fix_kind != FixKind::None)
            .count()
    }
    pub fn rejected_count(&self) -> usize {
        self.records.iter().filter(|r| r.rejected).count()
    }
    pub fn accepted_count(&self) -> usize {
        self.fix_count() - self.rejected_count()
    }
    pub fn outlier_count(&self) -> usize {
        self.records.iter().filter(|r| r.outlier).count()
    }
    /// Number of injected outliers the gate caught
    pub fn rejected_outlier_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.outlier && r.rejected)
            .count()
    }
    pub fn final_position_error(&self) -> Option<f64> {
        self.records.last().map(ScenarioRecord::position_error)
    }
    pub fn final_yaw_bias_error(&self) -> Option<f64> {
        self.records
            .last()
            .map(|r| wrap_to_pi(r.yaw_bias - self.true_yaw_bias).abs())
    }
    /// Root-mean-square position error of the filter over every record (m)
    pub fn rms_position_error(&self) -> f64 {
        rms(self.records.iter().map(ScenarioRecord::position_error))
    }
    /// Root-mean-square position error of uncorrected dead reckoning over every record (m)
    pub fn rms_dead_reckoning_error(&self) -> f64 {
        rms(self.records.iter().map(ScenarioRecord::dead_reckoning_error))
    }

    /// Log a short summary of the run at `info` level.
    pub fn log_summary(&self) {
        info!(
            "{} steps, {} fixes: {} accepted, {} rejected ({} of {} outliers caught)",
            self.records.len().saturating_sub(1),
            self.fix_count(),
            self.accepted_count(),
            self.rejected_count(),
            self.rejected_outlier_count(),
            self.outlier_count()
        );
        info!(
            "RMS position error {:.3} m (dead reckoning {:.3} m)",
            self.rms_position_error(),
            self.rms_dead_reckoning_error()
        );
        if let (Some(position), Some(yaw)) =
            (self.final_position_error(), self.final_yaw_bias_error())
        {
            info!(
                "Final position error {:.3} m, final yaw-bias error {:.5} rad",
                position, yaw
            );
        }
    }

    /// Write the records to a CSV file with a header row.
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for record in &self.records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Read records previously written by [ScenarioResult::to_csv].
    pub fn read_records<P: AsRef<Path>>(path: P) -> io::Result<Vec<ScenarioRecord>> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut records = Vec::new();
        for result in reader.deserialize() {
            let record: ScenarioRecord = result?;
            records.push(record);
        }
        Ok(records)
    }
}

fn rms<I: Iterator<Item = f64>>(errors: I) -> f64 {
    let (sum, count) = errors.fold((0.0, 0usize), |(sum, count), e| (sum + e * e, count + 1));
    if count == 0 {
        0.0
    } else {
        (sum / count as f64).sqrt()
    }
}

fn gaussian(rng: &mut StdRng, std: f64) -> f64 {
    let sample: f64 = rng.sample(StandardNormal);
    std * sample
}

/// Run a simulated scenario through a [PoseEkf].
///
/// The ground truth starts at the origin heading along +X and moves `step_length` meters per step while turning
/// by `turn_rate`. Odometry reports each true increment rotated by `-true_yaw_bias` plus per-axis Gaussian
/// noise, so a filter that recovers the yaw bias recovers the true path. Every `fix_interval` steps an absolute
/// fix is delivered; with probability `outlier_probability` it is displaced horizontally by
/// `outlier_magnitude` in a random direction.
///
/// The filter starts at the true position with a zero yaw bias and the configured initial uncertainties.
pub fn run_scenario(config: &ScenarioConfig) -> Result<ScenarioResult, Box<dyn Error>> {
    config.validate()?;
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut ekf = PoseEkf::new();
    let mut initial_covariance =
        Matrix4::<f64>::identity() * config.initial_position_std.powi(2);
    initial_covariance[(YAW_BIAS_INDEX, YAW_BIAS_INDEX)] = config.initial_yaw_bias_std.powi(2);
    ekf.init(&initial_covariance, &Vector4::zeros());

    let odometry_frame = rotation_about_vertical(-config.true_yaw_bias);
    let mut heading = 0.0_f64;
    let mut truth = Vector3::<f64>::zeros();
    let mut dead_reckoning = Vector3::<f64>::zeros();

    let mut records = Vec::with_capacity(config.steps + 1);
    records.push(ScenarioRecord::new(0, &truth, &dead_reckoning, &ekf));

    for step in 1..=config.steps {
        heading = wrap_to_pi(heading + config.turn_rate);
        let increment = Vector3::new(
            config.step_length * heading.cos(),
            config.step_length * heading.sin(),
            config.climb_rate,
        );
        truth += increment;

        let noise = Vector3::new(
            gaussian(&mut rng, config.odometry_noise_std),
            gaussian(&mut rng, config.odometry_noise_std),
            gaussian(&mut rng, config.odometry_noise_std),
        );
        let odometry = OdometryIncrement::from_std(
            odometry_frame * increment + noise,
            config.odometry_noise_std,
            config.yaw_bias_noise_std,
        );
        dead_reckoning += odometry.translation;
        ekf.predict_odometry(&odometry);

        let mut fix_kind = FixKind::None;
        let mut outlier = false;
        let mut rejected = false;
        if config.fix_interval > 0 && step % config.fix_interval == 0 {
            let mut position = truth
                + Vector3::new(
                    gaussian(&mut rng, config.fix_horizontal_std),
                    gaussian(&mut rng, config.fix_horizontal_std),
                    gaussian(&mut rng, config.fix_vertical_std),
                );
            outlier = rng.random_bool(config.outlier_probability);
            if outlier {
                let direction = rng.random_range(-PI..PI);
                position += Vector3::new(direction.cos(), direction.sin(), 0.0)
                    * config.outlier_magnitude;
            }

            let fix: Box<dyn MeasurementModel> = if config.orientation_fixes {
                fix_kind = FixKind::PositionOrientation;
                let yaw = wrap_to_pi(config.true_yaw_bias + gaussian(&mut rng, config.fix_yaw_std));
                Box::new(PositionOrientationMeasurement::from_std(
                    position,
                    yaw,
                    config.fix_horizontal_std,
                    config.fix_vertical_std,
                    config.fix_yaw_std,
                ))
            } else {
                fix_kind = FixKind::Position;
                Box::new(PositionMeasurement::from_std(
                    position,
                    config.fix_horizontal_std,
                    config.fix_vertical_std,
                ))
            };
            rejected = ekf.correct(fix.as_ref(), config.gate_confidence)?;
            if rejected {
                warn!(
                    "step {}: rejected {} fix (injected outlier: {})",
                    step, fix_kind, outlier
                );
            } else {
                debug!("step {}: applied {} fix", step, fix_kind);
            }
        }

        let mut record = ScenarioRecord::new(step, &truth, &dead_reckoning, &ekf);
        record.fix_kind = fix_kind;
        record.outlier = outlier;
        record.rejected = rejected;
        records.push(record);
    }

    Ok(ScenarioResult {
        records,
        true_yaw_bias: config.true_yaw_bias,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn short_config() -> ScenarioConfig {
        ScenarioConfig {
            steps: 50,
            ..ScenarioConfig::default()
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert!(ScenarioConfig::default().validate().is_ok());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ScenarioConfig {
            outlier_probability: 1.5,
            ..ScenarioConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::OutlierProbability(1.5)));
        assert!(run_scenario(&config).is_err());

        let config = ScenarioConfig {
            fix_horizontal_std: -1.0,
            ..ScenarioConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidStandardDeviation {
                field: "fix_horizontal_std",
                value: -1.0
            })
        );
    }

    #[test]
    fn non_finite_motion_is_rejected() {
        for turn_rate in [f64::INFINITY, f64::NEG_INFINITY] {
            let config = ScenarioConfig {
                turn_rate,
                ..short_config()
            };
            assert_eq!(
                config.validate(),
                Err(ConfigError::NonFinite {
                    field: "turn_rate",
                    value: turn_rate
                })
            );
            assert!(run_scenario(&config).is_err());
        }
        let config = ScenarioConfig {
            turn_rate: f64::NAN,
            ..short_config()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFinite { field: "turn_rate", .. })
        ));
        let config = ScenarioConfig {
            step_length: f64::NAN,
            ..short_config()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFinite { field: "step_length", .. })
        ));
    }

    #[test]
    fn huge_turn_rate_is_rejected_without_running() {
        let config = ScenarioConfig {
            steps: 2,
            turn_rate: 1e18,
            ..ScenarioConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::AngleOutOfRange {
                field: "turn_rate",
                value: 1e18
            })
        );
        assert!(run_scenario(&config).is_err());

        let config = ScenarioConfig {
            true_yaw_bias: -4.0,
            ..short_config()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::AngleOutOfRange { field: "true_yaw_bias", .. })
        ));
    }

    #[test]
    fn invalid_gate_confidence_surfaces_filter_error() {
        let config = ScenarioConfig {
            gate_confidence: 1.5,
            ..short_config()
        };
        assert!(run_scenario(&config).is_err());
    }

    #[test]
    fn records_cover_every_step() {
        let result = run_scenario(&short_config()).unwrap();
        assert_eq!(result.records.len(), 51);
        assert_eq!(result.records[0].step, 0);
        assert_eq!(result.records[50].step, 50);
        assert_eq!(result.fix_count(), 5);
        assert_eq!(
            result.accepted_count() + result.rejected_count(),
            result.fix_count()
        );
        for record in &result.records {
            if record.fix_kind == FixKind::None {
                assert!(!record.rejected);
                assert!(!record.outlier);
            }
        }
    }

    #[test]
    fn same_seed_same_result() {
        let a = run_scenario(&short_config()).unwrap();
        let b = run_scenario(&short_config()).unwrap();
        assert_eq!(a, b);
        let c = run_scenario(&ScenarioConfig {
            seed: 7,
            ..short_config()
        })
        .unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn no_fixes_matches_dead_reckoning_without_bias() {
        let config = ScenarioConfig {
            fix_interval: 0,
            true_yaw_bias: 0.0,
            ..short_config()
        };
        let result = run_scenario(&config).unwrap();
        assert_eq!(result.fix_count(), 0);
        // With a zero bias estimate and no fixes the filter integrates raw odometry.
        for record in &result.records {
            assert_approx_eq!(record.est_x, record.dr_x, 1e-9);
            assert_approx_eq!(record.est_y, record.dr_y, 1e-9);
            assert_approx_eq!(record.est_z, record.dr_z, 1e-9);
        }
    }

    #[test]
    fn orientation_fixes_are_labelled() {
        let config = ScenarioConfig {
            orientation_fixes: true,
            ..short_config()
        };
        let result = run_scenario(&config).unwrap();
        assert!(result
            .records
            .iter()
            .filter(|r| r.fix_kind != FixKind::None)
            .all(|r| r.fix_kind == FixKind::PositionOrientation));
    }

    #[test]
    fn rms_of_empty_is_zero() {
        let result = ScenarioResult {
            records: Vec::new(),
            true_yaw_bias: 0.0,
        };
        assert_eq!(result.rms_position_error(), 0.0);
        assert_eq!(result.final_position_error(), None);
    }

    #[test]
    fn unsupported_extension_is_error() {
        let path = std::env::temp_dir().join("pose_ekf_config.txt");
        assert_eq!(
            ScenarioConfig::default().to_file(&path).unwrap_err().kind(),
            io::ErrorKind::InvalidInput
        );
        assert_eq!(
            ScenarioConfig::from_file(&path).unwrap_err().kind(),
            io::ErrorKind::InvalidInput
        );
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config: ScenarioConfig = toml::from_str("steps = 12\nseed = 3\n").unwrap();
        assert_eq!(config.steps, 12);
        assert_eq!(config.seed, 3);
        assert_eq!(config.fix_interval, ScenarioConfig::default().fix_interval);
    }

    #[test]
    fn fix_kind_display() {
        assert_eq!(format!("{}", FixKind::Position), "position");
        assert_eq!(
            format!("{}", FixKind::PositionOrientation),
            "position_orientation"
        );
    }
}
