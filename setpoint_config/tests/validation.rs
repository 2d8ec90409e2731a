use rstest::rstest;
use setpoint_config::load_toml;

const FULL: &str = r#"
[pressure]
initial = 0.5
min = 0.5
max = 1.5
trim = -0.02
respond = 0.06
max_step = 0.15
ignore_count = 2
high_threshold = 0.85

[pressure.schedule]
interval_ms = 2000
initial_delay_ms = 5000

[pressure.synthetic]
devices = 40
low = 0.3
high = 0.95

[temperature]
initial = 60.0
min = 55.0
max = 65.0
trim = 0.2
respond = -0.3
max_step = 1.0
ignore_count = 2
high_threshold = 75.0

[temperature.reset]
max_at_high_condition = 60.0
condition_low = 60.0
condition_high = 70.0

[temperature.synthetic]
devices = 40
low = 65.0
high = 80.0
condition_low = 55.0
condition_high = 75.0

[optimal_start]
forgetting_factor = 0.1
early_start_limit_min = 180.0
late_start_limit_min = 10.0
occupied_setpoint = 70.0
max_history = 10

[logging]
level = "debug"
rotation = "daily"
"#;

#[test]
fn accepts_full_reference_config() {
    let cfg = load_toml(FULL).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert_eq!(cfg.optimal_start.max_history, Some(10));
    assert_eq!(cfg.temperature.synthetic.condition, Some((55.0, 75.0)));
}

#[rstest]
#[case("[pressure]\nmin = 2.0\n", "pressure.min must be <= pressure.max")]
#[case("[pressure]\nignore_count = -1\n", "pressure.ignore_count must be >= 0")]
#[case("[pressure]\ninitial = 0.1\n", "pressure.initial must be within")]
#[case("[pressure]\nmax_step = -0.1\n", "pressure.max_step must be >= 0")]
#[case(
    "[temperature.reset]\ncondition_low = 70.0\ncondition_high = 70.0\n",
    "temperature.reset.condition_high must be > temperature.reset.condition_low"
)]
#[case(
    "[temperature.reset]\nmax_at_high_condition = 50.0\n",
    "temperature.reset.max_at_high_condition must be >= temperature.min"
)]
#[case("[pressure.schedule]\ninterval_ms = 0\n", "pressure.schedule.interval_ms must be >= 1")]
#[case("[pressure.synthetic]\ndevices = 0\n", "pressure.synthetic.devices must be >= 1")]
#[case(
    "[pressure.synthetic]\nlow = -1e308\nhigh = 1e308\n",
    "pressure.synthetic.high - pressure.synthetic.low must be finite"
)]
#[case(
    "[temperature.synthetic]\ncondition_low = -1e308\ncondition_high = 1e308\n",
    "temperature.synthetic.condition_high - temperature.synthetic.condition_low must be finite"
)]
#[case("[optimal_start]\nforgetting_factor = 0.0\n", "forgetting_factor must be in (0.0, 1.0]")]
#[case("[optimal_start]\nforgetting_factor = 1.5\n", "forgetting_factor must be in (0.0, 1.0]")]
#[case(
    "[optimal_start]\nlate_start_limit_min = 200.0\n",
    "late_start_limit_min must be <= optimal_start.early_start_limit_min"
)]
#[case("[optimal_start]\nmax_history = 0\n", "max_history must be >= 1")]
#[case("[logging]\nrotation = \"weekly\"\n", "logging.rotation must be one of")]
fn rejects_invalid_values(#[case] toml: &str, #[case] needle: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should be rejected");
    assert!(
        err.to_string().contains(needle),
        "expected `{needle}` in `{err}`"
    );
}

#[test]
fn forgetting_factor_of_one_is_allowed() {
    let cfg = load_toml("[optimal_start]\nforgetting_factor = 1.0\n").expect("parse TOML");
    cfg.validate().expect("upper bound is inclusive");
}

#[test]
fn nan_is_rejected_by_validation() {
    let cfg = load_toml("[pressure]\nhigh_threshold = nan\n").expect("TOML allows nan");
    let err = cfg.validate().expect_err("nan threshold");
    assert!(err.to_string().contains("pressure.high_threshold must be finite"));
}

#[test]
fn shipped_config_matches_builtin_defaults() {
    let cfg = load_toml(include_str!("../../etc/setpoint.toml")).expect("etc/setpoint.toml parses");
    cfg.validate().expect("etc/setpoint.toml validates");
    assert_eq!(cfg.pressure, setpoint_config::LoopCfg::pressure());
    assert_eq!(cfg.temperature, setpoint_config::LoopCfg::temperature());
    assert_eq!(cfg.optimal_start, setpoint_config::OptimalStartCfg::default());
    assert_eq!(cfg.logging.level.as_deref(), Some("info"));
}
