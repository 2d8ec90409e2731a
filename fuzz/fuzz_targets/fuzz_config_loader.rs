#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Arbitrary TOML must either be rejected or validate without panicking.
    // A config that validates must also build both controllers.
    let Ok(cfg) = setpoint_config::load_toml(data) else {
        return;
    };
    if cfg.validate().is_ok() {
        assert!(setpoint_core::TrimRespondController::try_from(&cfg.pressure).is_ok());
        assert!(setpoint_core::TrimRespondController::try_from(&cfg.temperature).is_ok());
    }
});
