use pretty_assertions::assert_eq;

use pitchgrid::grid::rational::{closest_rational, Fraction};
use pitchgrid::{ConsistentTuning, Error, RegularScale, TuningPreset};

mod common;
use common::{assert_close, lattice_points, v};

#[test]
fn test_voltage_is_log2_of_ratio() {
    for preset in TuningPreset::ALL {
        let tuning = preset.tuning();
        for c in lattice_points(6) {
            let ratio = tuning.vec_to_freq_ratio_no_offset(c);
            assert_close(
                tuning.vec_to_voltage_no_offset(c),
                ratio.log2(),
                1e-4,
                &format!("{} at {}", preset, c),
            );
        }
    }
}

#[test]
fn test_offset_is_linear() {
    let mut tuning = TuningPreset::FiveLimitCleantone.tuning();
    for offset in [-2.0f32, -0.25, 0.0, 0.75, 3.0] {
        tuning.set_offset(offset);
        for c in lattice_points(3) {
            assert_close(
                tuning.vec_to_voltage(c),
                tuning.vec_to_voltage_no_offset(c) + offset,
                1e-5,
                &format!("offset {} at {}", offset, c),
            );
        }
    }
}

#[test]
fn test_arbitrary_basis_fixpoints() {
    let cases = [
        (v(2, 5), 2.0f32, v(1, 3), 1.5f32),
        (v(3, 1), 1.7, v(-1, 2), 1.1),
        (v(0, 2), 1.25, v(1, 3), 1.5),
        (v(4, 7), 2.9, v(1, 1), 1.2),
    ];
    for (v1, f1, v2, f2) in cases {
        let tuning = ConsistentTuning::new(v1, f1, v2, f2).unwrap();
        assert_close(tuning.vec_to_freq_ratio_no_offset(v1), f1, 1e-6, "f1");
        assert_close(tuning.vec_to_freq_ratio_no_offset(v2), f2, 1e-6, "f2");
    }
}

#[test]
fn test_preset_intervals() {
    let fifth = v(1, 3);
    let third = v(0, 2);

    let pythagorean = TuningPreset::Pythagorean.tuning();
    assert_close(pythagorean.vec_to_cents(fifth), 701.955, 0.01, "pythagorean fifth");
    assert_close(pythagorean.vec_to_cents(third), 407.82, 0.01, "pythagorean third");

    let meantone = TuningPreset::QuarterCommaMeantone.tuning();
    assert_close(meantone.vec_to_cents(third), 386.314, 0.01, "meantone third");
    assert_close(meantone.vec_to_cents(fifth), 696.578, 0.01, "meantone fifth");

    let tet19 = TuningPreset::Tet19.tuning();
    assert_close(tet19.vec_to_cents(v(0, 1)), 3.0 * 1200.0 / 19.0, 0.01, "19-TET whole tone");

    let septimal = TuningPreset::SevenLimitCleantone.tuning();
    assert_close(septimal.vec_to_freq_ratio_no_offset(v(1, 1)), 7.0 / 6.0, 1e-6, "7/6");
}

#[test]
fn test_scale_bijection_for_coprime_systems() {
    for system in [v(2, 5), v(5, 2), v(3, 4), v(1, 4), v(5, 7), v(2, 3)] {
        let mut scale = RegularScale::new(system, 0).unwrap();
        for mode in 0..scale.n() {
            scale.set_mode(mode);
            let degree_coords: Vec<_> = (0..scale.n()).map(|s| scale.scale_note_seq_nr_to_coord(s)).collect();
            for (s, &c) in degree_coords.iter().enumerate() {
                assert_eq!(scale.coord_to_scale_note_seq_nr(c), Some(s as i32));
            }
            // anything else in the first period is not a degree
            for x in 0..=system.x {
                for y in 0..=system.y {
                    let c = v(x, y);
                    if x + y < scale.n() && !degree_coords.contains(&c) {
                        assert_eq!(scale.coord_to_scale_note_seq_nr(c), None, "{} mode {} at {}", system, mode, c);
                    }
                }
            }
        }
    }
}

#[test]
fn test_non_coprime_system_rejected() {
    assert_eq!(
        RegularScale::new(v(4, 6), 0),
        Err(Error::NonCoprimeScaleSystem(v(4, 6)))
    );
}

#[test]
fn test_twelve_tet_fifth_naming_follows_direction() {
    let scale = RegularScale::default();
    let ascending_x = ConsistentTuning::new(v(2, 5), 2.0, v(1, 0), 2f32.powf(1.0 / 12.0)).unwrap();
    let ascending_y = ConsistentTuning::new(v(2, 5), 2.0, v(0, 1), 2f32.powf(1.0 / 12.0)).unwrap();

    assert_eq!(scale.canonical_name_for_coord(v(1, 3), &ascending_x), "5");
    assert_eq!(scale.canonical_name_for_coord(v(1, 3), &ascending_y), "5");

    let sharp_four = v(0, 3);
    assert_eq!(scale.canonical_name_for_coord(sharp_four, &ascending_x), "♯4");
    assert_eq!(scale.canonical_name_for_coord(sharp_four, &ascending_y), "♭4");
}

#[test]
fn test_scale_table() {
    let tuning = TuningPreset::Pythagorean.tuning();
    let scale = RegularScale::default();
    let table: Vec<(String, String)> = scale
        .degrees(&tuning)
        .into_iter()
        .map(|d| (d.name, d.ratio))
        .collect();
    let expected: Vec<(String, String)> = [
        ("1", "1/1"),
        ("2", "9/8"),
        ("3", "5/4+21.5ct"),
        ("4", "4/3"),
        ("5", "3/2"),
        ("6", "5/3+21.5ct"),
        ("7", "17/9+8.7ct"),
    ]
    .iter()
    .map(|(n, r)| (n.to_string(), r.to_string()))
    .collect();
    assert_eq!(table, expected);
}

#[test]
fn test_closest_rational_examples() {
    assert_eq!(closest_rational(1.5, 10.0), Fraction::new(3, 2));
    assert_eq!(closest_rational(2.0, 10.0), Fraction::new(2, 1));
    assert_eq!(closest_rational(7.0 / 6.0, 35.0), Fraction::new(7, 6));
}
