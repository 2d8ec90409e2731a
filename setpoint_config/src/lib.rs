#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and history parsing for the setpoint engine.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Every field falls back to the reference plant constants, so an empty
//!   file is a valid configuration.
//! - The history CSV loader enforces headers and rejects non-finite values.
use serde::Deserialize;
use serde::de::Deserializer;

/// Historical warm-up CSV schema.
///
/// Expected headers:
/// zone_temp,outdoor_temp,duration_min
///
/// Example:
/// zone_temp,outdoor_temp,duration_min
/// 50,10,120
/// 48,12,115
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct ObservationRow {
    pub zone_temp: f64,
    pub outdoor_temp: f64,
    pub duration_min: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduleCfg {
    /// Time between two control cycles.
    pub interval_ms: u64,
    /// Wait before the first cycle after the loop starts.
    pub initial_delay_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticCfg {
    /// Number of terminal units to simulate per cycle.
    pub devices: usize,
    pub low: f64,
    pub high: f64,
    /// Range for the simulated external condition; absent means no condition.
    pub condition: Option<(f64, f64)>,
}

/// Piecewise-linear ceiling reset against an external condition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResetCfg {
    pub max_at_high_condition: f64,
    pub condition_low: f64,
    pub condition_high: f64,
}

/// One trim-and-respond loop (pressure or temperature).
#[derive(Debug, Clone, PartialEq)]
pub struct LoopCfg {
    pub initial: f64,
    pub min: f64,
    pub max: f64,
    /// Signed adjustment applied when no unit requests.
    pub trim: f64,
    /// Signed adjustment per request, opposite sign to `trim`.
    pub respond: f64,
    pub max_step: f64,
    /// Signed so that a negative value is a validation error, not a parse error.
    pub ignore_count: i64,
    pub high_threshold: f64,
    /// `None` keeps the ceiling fixed at `max`.
    pub reset: Option<ResetCfg>,
    pub schedule: ScheduleCfg,
    pub synthetic: SyntheticCfg,
}

impl LoopCfg {
    /// Duct static pressure reset, inches WC.
    pub fn pressure() -> Self {
        Self {
            initial: 0.5,
            min: 0.5,
            max: 1.5,
            trim: -0.02,
            respond: 0.06,
            max_step: 0.15,
            ignore_count: 2,
            high_threshold: 0.85,
            reset: None,
            schedule: ScheduleCfg {
                interval_ms: 2_000,
                initial_delay_ms: 5_000,
            },
            synthetic: SyntheticCfg {
                devices: 40,
                low: 0.30,
                high: 0.95,
                condition: None,
            },
        }
    }

    /// Supply-air temperature reset, degrees F.
    pub fn temperature() -> Self {
        Self {
            initial: 60.0,
            min: 55.0,
            max: 65.0,
            trim: 0.2,
            respond: -0.3,
            max_step: 1.0,
            ignore_count: 2,
            high_threshold: 75.0,
            reset: Some(ResetCfg {
                max_at_high_condition: 60.0,
                condition_low: 60.0,
                condition_high: 70.0,
            }),
            schedule: ScheduleCfg {
                interval_ms: 5_000,
                initial_delay_ms: 5_000,
            },
            synthetic: SyntheticCfg {
                devices: 40,
                low: 65.0,
                high: 80.0,
                condition: Some((55.0, 75.0)),
            },
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct OptimalStartCfg {
    /// Exponential smoothing weight in (0.0, 1.0].
    pub forgetting_factor: f64,
    /// Earliest allowed start, minutes before occupancy.
    pub early_start_limit_min: f64,
    /// Latest allowed start, minutes before occupancy.
    pub late_start_limit_min: f64,
    pub initial_a: f64,
    pub initial_b: f64,
    pub initial_d: f64,
    pub occupied_setpoint: f64,
    /// Only the most recent `max_history` observations are learned from.
    pub max_history: Option<usize>,
    /// Interpolation fallback when there is no history at all.
    pub default_minutes: f64,
}

impl Default for OptimalStartCfg {
    fn default() -> Self {
        Self {
            forgetting_factor: 0.1,
            early_start_limit_min: 180.0,
            late_start_limit_min: 10.0,
            initial_a: 10.0,
            initial_b: 5.0,
            initial_d: 0.0,
            occupied_setpoint: 70.0,
            max_history: None,
            default_minutes: 60.0,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "LoopCfg::pressure", deserialize_with = "de_pressure")]
    pub pressure: LoopCfg,
    #[serde(default = "LoopCfg::temperature", deserialize_with = "de_temperature")]
    pub temperature: LoopCfg,
    #[serde(default)]
    pub optimal_start: OptimalStartCfg,
    #[serde(default)]
    pub logging: Logging,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pressure: LoopCfg::pressure(),
            temperature: LoopCfg::temperature(),
            optimal_start: OptimalStartCfg::default(),
            logging: Logging::default(),
        }
    }
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

// ── TOML overlays ────────────────────────────────────────────────────────────
//
// A loop section only needs the keys that differ from its reference loop, so
// the file form is all-optional and gets laid over the right defaults.

#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct ScheduleToml {
    interval_ms: Option<u64>,
    initial_delay_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct SyntheticToml {
    devices: Option<usize>,
    low: Option<f64>,
    high: Option<f64>,
    condition_low: Option<f64>,
    condition_high: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct ResetToml {
    enabled: Option<bool>,
    max_at_high_condition: Option<f64>,
    condition_low: Option<f64>,
    condition_high: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct LoopToml {
    initial: Option<f64>,
    min: Option<f64>,
    max: Option<f64>,
    trim: Option<f64>,
    respond: Option<f64>,
    max_step: Option<f64>,
    ignore_count: Option<i64>,
    high_threshold: Option<f64>,
    reset: Option<ResetToml>,
    schedule: Option<ScheduleToml>,
    synthetic: Option<SyntheticToml>,
}

impl LoopToml {
    fn over(self, base: LoopCfg) -> Result<LoopCfg, String> {
        let schedule = match self.schedule {
            Some(s) => ScheduleCfg {
                interval_ms: s.interval_ms.unwrap_or(base.schedule.interval_ms),
                initial_delay_ms: s.initial_delay_ms.unwrap_or(base.schedule.initial_delay_ms),
            },
            None => base.schedule,
        };
        let synthetic = match self.synthetic {
            Some(s) => SyntheticCfg {
                devices: s.devices.unwrap_or(base.synthetic.devices),
                low: s.low.unwrap_or(base.synthetic.low),
                high: s.high.unwrap_or(base.synthetic.high),
                condition: match (s.condition_low, s.condition_high, base.synthetic.condition) {
                    (Some(lo), Some(hi), _) => Some((lo, hi)),
                    (None, None, inherited) => inherited,
                    (Some(lo), None, Some((_, hi))) => Some((lo, hi)),
                    (None, Some(hi), Some((lo, _))) => Some((lo, hi)),
                    _ => {
                        return Err(
                            "synthetic condition range needs both condition_low and condition_high"
                                .to_string(),
                        );
                    }
                },
            },
            None => base.synthetic,
        };
        let reset = match self.reset {
            None => base.reset,
            Some(r) if r.enabled == Some(false) => None,
            Some(r) => {
                let max_at_high_condition = r
                    .max_at_high_condition
                    .or(base.reset.map(|b| b.max_at_high_condition));
                let condition_low = r.condition_low.or(base.reset.map(|b| b.condition_low));
                let condition_high = r.condition_high.or(base.reset.map(|b| b.condition_high));
                match (max_at_high_condition, condition_low, condition_high) {
                    (Some(max_at_high_condition), Some(condition_low), Some(condition_high)) => {
                        Some(ResetCfg {
                            max_at_high_condition,
                            condition_low,
                            condition_high,
                        })
                    }
                    _ => {
                        return Err("reset needs max_at_high_condition, condition_low and condition_high"
                            .to_string());
                    }
                }
            }
        };
        Ok(LoopCfg {
            initial: self.initial.unwrap_or(base.initial),
            min: self.min.unwrap_or(base.min),
            max: self.max.unwrap_or(base.max),
            trim: self.trim.unwrap_or(base.trim),
            respond: self.respond.unwrap_or(base.respond),
            max_step: self.max_step.unwrap_or(base.max_step),
            ignore_count: self.ignore_count.unwrap_or(base.ignore_count),
            high_threshold: self.high_threshold.unwrap_or(base.high_threshold),
            reset,
            schedule,
            synthetic,
        })
    }
}

fn de_pressure<'de, D>(deserializer: D) -> Result<LoopCfg, D::Error>
where
    D: Deserializer<'de>,
{
    LoopToml::deserialize(deserializer)?
        .over(LoopCfg::pressure())
        .map_err(|e| serde::de::Error::custom(format!("pressure: {e}")))
}

fn de_temperature<'de, D>(deserializer: D) -> Result<LoopCfg, D::Error>
where
    D: Deserializer<'de>,
{
    LoopToml::deserialize(deserializer)?
        .over(LoopCfg::temperature())
        .map_err(|e| serde::de::Error::custom(format!("temperature: {e}")))
}

// ── History CSV ──────────────────────────────────────────────────────────────

pub fn load_history_csv(path: &std::path::Path) -> eyre::Result<Vec<ObservationRow>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open history CSV {:?}: {}", path, e))?;
    read_history(rdr).map_err(|e| e.wrap_err(format!("history CSV {}", path.display())))
}

/// Parse history rows from any reader (stdin, in-memory fixtures).
pub fn read_history_from<R: std::io::Read>(reader: R) -> eyre::Result<Vec<ObservationRow>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    read_history(rdr)
}

fn read_history<R: std::io::Read>(mut rdr: csv::Reader<R>) -> eyre::Result<Vec<ObservationRow>> {
    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers: {}", e))?
        .clone();
    let expected = ["zone_temp", "outdoor_temp", "duration_min"];
    let actual: Vec<String> = headers.iter().map(ToString::to_string).collect();
    if actual != expected {
        eyre::bail!(
            "history CSV must have headers 'zone_temp,outdoor_temp,duration_min', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<ObservationRow>().enumerate() {
        match rec {
            Ok(row) => {
                if !(row.zone_temp.is_finite()
                    && row.outdoor_temp.is_finite()
                    && row.duration_min.is_finite())
                {
                    eyre::bail!("history row {} has a non-finite value", idx + 2);
                }
                if row.duration_min < 0.0 {
                    eyre::bail!("history row {} has a negative duration", idx + 2);
                }
                rows.push(row);
            }
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }
    Ok(rows)
}

// ── Validation ───────────────────────────────────────────────────────────────

fn ensure_finite(name: &str, field: &str, v: f64) -> eyre::Result<()> {
    if !v.is_finite() {
        eyre::bail!("{name}.{field} must be finite");
    }
    Ok(())
}

impl LoopCfg {
    pub fn validate(&self, name: &str) -> eyre::Result<()> {
        for (field, v) in [
            ("initial", self.initial),
            ("min", self.min),
            ("max", self.max),
            ("trim", self.trim),
            ("respond", self.respond),
            ("max_step", self.max_step),
            ("high_threshold", self.high_threshold),
        ] {
            ensure_finite(name, field, v)?;
        }
        if self.min > self.max {
            eyre::bail!("{name}.min must be <= {name}.max");
        }
        if self.initial < self.min || self.initial > self.max {
            eyre::bail!("{name}.initial must be within [{name}.min, {name}.max]");
        }
        if self.max_step < 0.0 {
            eyre::bail!("{name}.max_step must be >= 0");
        }
        if self.ignore_count < 0 {
            eyre::bail!("{name}.ignore_count must be >= 0");
        }

        // Reset
        if let Some(r) = &self.reset {
            ensure_finite(name, "reset.max_at_high_condition", r.max_at_high_condition)?;
            ensure_finite(name, "reset.condition_low", r.condition_low)?;
            ensure_finite(name, "reset.condition_high", r.condition_high)?;
            if r.condition_high <= r.condition_low {
                eyre::bail!("{name}.reset.condition_high must be > {name}.reset.condition_low");
            }
            if r.max_at_high_condition < self.min {
                eyre::bail!("{name}.reset.max_at_high_condition must be >= {name}.min");
            }
        }

        // Schedule
        if self.schedule.interval_ms == 0 {
            eyre::bail!("{name}.schedule.interval_ms must be >= 1");
        }
        if self.schedule.initial_delay_ms > 24 * 60 * 60 * 1000 {
            eyre::bail!("{name}.schedule.initial_delay_ms is unreasonably large (>24h)");
        }

        // Synthetic source
        if self.synthetic.devices == 0 {
            eyre::bail!("{name}.synthetic.devices must be >= 1");
        }
        ensure_finite(name, "synthetic.low", self.synthetic.low)?;
        ensure_finite(name, "synthetic.high", self.synthetic.high)?;
        if self.synthetic.low > self.synthetic.high {
            eyre::bail!("{name}.synthetic.low must be <= {name}.synthetic.high");
        }
        if !(self.synthetic.high - self.synthetic.low).is_finite() {
            eyre::bail!("{name}.synthetic.high - {name}.synthetic.low must be finite");
        }
        if let Some((lo, hi)) = self.synthetic.condition {
            ensure_finite(name, "synthetic.condition_low", lo)?;
            ensure_finite(name, "synthetic.condition_high", hi)?;
            if lo > hi {
                eyre::bail!(
                    "{name}.synthetic.condition_low must be <= {name}.synthetic.condition_high"
                );
            }
            if !(hi - lo).is_finite() {
                eyre::bail!(
                    "{name}.synthetic.condition_high - {name}.synthetic.condition_low must be finite"
                );
            }
        }
        Ok(())
    }
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        self.pressure.validate("pressure")?;
        self.temperature.validate("temperature")?;

        // Optimal start
        let os = &self.optimal_start;
        for (field, v) in [
            ("forgetting_factor", os.forgetting_factor),
            ("early_start_limit_min", os.early_start_limit_min),
            ("late_start_limit_min", os.late_start_limit_min),
            ("initial_a", os.initial_a),
            ("initial_b", os.initial_b),
            ("initial_d", os.initial_d),
            ("occupied_setpoint", os.occupied_setpoint),
            ("default_minutes", os.default_minutes),
        ] {
            ensure_finite("optimal_start", field, v)?;
        }
        if !(os.forgetting_factor > 0.0 && os.forgetting_factor <= 1.0) {
            eyre::bail!("optimal_start.forgetting_factor must be in (0.0, 1.0]");
        }
        if os.late_start_limit_min > os.early_start_limit_min {
            eyre::bail!(
                "optimal_start.late_start_limit_min must be <= optimal_start.early_start_limit_min"
            );
        }
        if os.max_history == Some(0) {
            eyre::bail!("optimal_start.max_history must be >= 1 when set");
        }

        // Logging
        if let Some(rotation) = self.logging.rotation.as_deref()
            && !matches!(rotation, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_reference_loops() {
        let cfg = load_toml("").expect("empty TOML parses");
        assert_eq!(cfg.pressure, LoopCfg::pressure());
        assert_eq!(cfg.temperature, LoopCfg::temperature());
        assert_eq!(cfg.optimal_start, OptimalStartCfg::default());
        cfg.validate().expect("defaults are valid");
    }

    #[test]
    fn partial_section_keeps_its_own_defaults() {
        let cfg = load_toml("[temperature]\nmax_step = 0.5\n").expect("parse");
        assert_eq!(cfg.temperature.max_step, 0.5);
        // Untouched keys come from the temperature loop, not the pressure loop.
        assert_eq!(cfg.temperature.min, 55.0);
        assert!(cfg.temperature.reset.is_some());
    }

    #[test]
    fn reset_can_be_disabled() {
        let cfg = load_toml("[temperature.reset]\nenabled = false\n").expect("parse");
        assert!(cfg.temperature.reset.is_none());
    }

    #[test]
    fn pressure_reset_needs_all_fields() {
        let err = load_toml("[pressure.reset]\ncondition_low = 60.0\n").expect_err("incomplete");
        assert!(err.to_string().contains("reset needs"));
    }

    #[test]
    fn unknown_loop_keys_are_rejected() {
        assert!(load_toml("[pressure]\ntrim_step = 0.1\n").is_err());
    }

    #[test]
    fn unknown_keys_are_rejected_in_every_section() {
        let err = load_toml("[optimal_start]\nforgeting_factor = 0.5\n").expect_err("typo");
        assert!(err.to_string().contains("forgeting_factor"));
        assert!(load_toml("[logging]\nlvl = \"debug\"\n").is_err());
        assert!(load_toml("[optimal_strat]\nforgetting_factor = 0.5\n").is_err());
    }
}
