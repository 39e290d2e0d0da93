use proptest::prelude::*;
use sobp_core::weights::{probe_depth, summed_dose};
use sobp_core::{
    BeamletCfg, PowerLawParameters, SobpRequest, WeightMethod, run, schedule_beamlets,
    solve_weights_with,
};

prop_compose! {
    fn scheduling_inputs()(
        energy in 10.0f64..250.0,
        chi in 0.01f64..0.99,
        p in 1.3f64..=1.8,
        nbeams in 1usize..40,
        delta in 0.05f64..2.0,
    ) -> (f64, f64, f64, usize, f64) {
        (energy, chi, p, nbeams, delta)
    }
}

prop_compose! {
    // Widths reaching toward the full range, where the proximal beamlet nears zero range.
    fn near_full_width_inputs()(
        energy in 10.0f64..250.0,
        gap in 1e-9f64..1e-2,
        p in 1.3f64..=1.8,
        nbeams in 1usize..40,
        delta in 0.05f64..2.0,
    ) -> (f64, f64, f64, usize, f64) {
        (energy, 1.0 - gap, p, nbeams, delta)
    }
}

proptest! {
    #[test]
    fn energy_range_round_trip(energy in 0.1f64..1000.0, p in 1.0f64..2.0) {
        let m = PowerLawParameters::water(p).unwrap();
        let back = m.energy_of(m.range_of(energy).unwrap()).unwrap();
        prop_assert!((back - energy).abs() <= 1e-12 * energy);
    }

    #[test]
    fn range_energy_round_trip(range in 1e-3f64..100.0, p in 1.0f64..2.0) {
        let m = PowerLawParameters::water(p).unwrap();
        let back = m.range_of(m.energy_of(range).unwrap()).unwrap();
        prop_assert!((back - range).abs() <= 1e-12 * range);
    }

    #[test]
    fn schedule_is_monotonic_and_covers_the_width((energy, chi, p, nbeams, delta) in scheduling_inputs()) {
        let m = PowerLawParameters::water(p).unwrap();
        let s = schedule_beamlets(&m, energy, chi, &BeamletCfg { nbeams, delta }).unwrap();
        let r = s.ranges();
        prop_assert!(r.len() >= nbeams);
        prop_assert!(r.windows(2).all(|w| w[1] < w[0]));
        prop_assert!((r[0] - s.max_range()).abs() <= 1e-12 * s.max_range());
        let proximal = s.max_range() * (1.0 - chi);
        prop_assert!((r[r.len() - 1] - proximal).abs() <= 1e-12 * s.max_range());
        prop_assert!(s.spacing() <= delta * (1.0 + 1e-12));
        for w in r.windows(2) {
            prop_assert!(w[0] - w[1] <= delta * (1.0 + 1e-9));
        }
    }

    #[test]
    fn weights_are_non_negative_with_unit_reference((energy, chi, p, nbeams, delta) in scheduling_inputs()) {
        let m = PowerLawParameters::water(p).unwrap();
        let s = schedule_beamlets(&m, energy, chi, &BeamletCfg { nbeams, delta }).unwrap();
        for method in [WeightMethod::Recursive, WeightMethod::Analytical] {
            let w = solve_weights_with(method, p, &s.ranges()).unwrap();
            prop_assert_eq!(w.len(), s.len());
            prop_assert_eq!(w[0], 1.0);
            prop_assert!(w.iter().all(|&x| x >= 0.0));
        }
    }

    #[test]
    fn weights_stay_non_negative_up_to_full_width((energy, chi, p, nbeams, delta) in near_full_width_inputs()) {
        let m = PowerLawParameters::water(p).unwrap();
        let s = schedule_beamlets(&m, energy, chi, &BeamletCfg { nbeams, delta }).unwrap();
        let r = s.ranges();
        prop_assert!(r[r.len() - 1] > 0.0);
        prop_assert!(r.windows(2).all(|w| w[1] < w[0]));
        for method in [WeightMethod::Recursive, WeightMethod::Analytical] {
            let w = solve_weights_with(method, p, &r).unwrap();
            prop_assert_eq!(w[0], 1.0);
            prop_assert!(w.iter().all(|&x| x.is_finite() && x >= 0.0));
        }
    }

    #[test]
    fn recursive_weights_flatten_the_plateau((energy, chi, p, nbeams, delta) in scheduling_inputs()) {
        let m = PowerLawParameters::water(p).unwrap();
        let s = schedule_beamlets(&m, energy, chi, &BeamletCfg { nbeams, delta }).unwrap();
        let r = s.ranges();
        let w = solve_weights_with(WeightMethod::Recursive, p, &r).unwrap();
        let level = summed_dose(p, &r, &w, probe_depth(&r, 0));
        for i in 0..r.len() {
            let d = summed_dose(p, &r, &w, probe_depth(&r, i));
            prop_assert!((d - level).abs() <= 1e-6 * level);
        }
    }

    #[test]
    fn runs_are_deterministic((energy, chi, p, nbeams, delta) in scheduling_inputs()) {
        let req = SobpRequest::builder()
            .with_energy(energy)
            .with_chi(chi)
            .with_powerp(p)
            .with_nbeams(nbeams)
            .with_delta(delta)
            .build()
            .unwrap();
        let a = run(&req).unwrap();
        let b = run(&req).unwrap();
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(a.to_string(), b.to_string());
    }
}
