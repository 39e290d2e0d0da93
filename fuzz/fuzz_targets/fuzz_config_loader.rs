#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parsing and validation may reject the input, but must never panic.
    let parsed = toml::from_str::<sobp_config::Config>(data);
    match parsed {
        Ok(cfg) => {
            if cfg.validate().is_ok() {
                // A validated config always carries usable beamlet settings.
                assert!(cfg.beamlets.nbeams >= 1);
                assert!(cfg.beamlets.delta > 0.0);
                assert!(cfg.medium.alpha > 0.0);
            }
        }
        Err(_e) => {
            // parse error is acceptable
        }
    }
});
