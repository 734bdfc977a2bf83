//! Volume and aggregation behavior over the public API, across a sweep of
//! realistic sawmill dimensions.

use sismad_core::format::{format_currency, format_volume};
use sismad_core::volume::{log_volume, piece_volume, raw_log_volume, raw_piece_volume};
use sismad_core::{aggregate, LineItem, Measurement, Money, Totals, Volume};
use std::f64::consts::PI;

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

fn direct(m3: f64, price_cents: i64) -> LineItem {
    LineItem::new(
        "lote",
        "sp",
        Measurement::Direct { cubic_meters: m3 },
        Money::from_cents(price_cents),
    )
    .unwrap()
}

#[test]
fn test_board_scenario() {
    // 15 × 2.5 × 300 cm × 5 = 56 250 cm³
    let raw = raw_piece_volume(15.0, 2.5, 300.0, 5.0);
    assert!((raw - 0.05625).abs() < 1e-12);

    let volume = piece_volume(15.0, 2.5, 300.0, 5.0);
    assert_eq!(volume.dm3(), 56);
    assert_eq!(format_volume(volume), "0.056 m³");
}

#[test]
fn test_log_scenario() {
    let raw = raw_log_volume(30.0, 20.0, 4.0);
    assert!((raw - PI * 0.125 * 0.125 * 4.0).abs() < 1e-12);
    assert!((raw - 0.19635).abs() < 1e-5);
    assert_eq!(log_volume(30.0, 20.0, 4.0).dm3(), 196);
}

#[test]
fn test_two_line_totals_scenario() {
    let totals = aggregate(&[direct(0.5, 100_00), direct(1.2, 200_00)]);
    assert_eq!(totals.total_volume.m3(), 1.7);
    assert_eq!(totals.total_value_cents, 290_00);
    assert_eq!(format_currency(totals.total_value()), "R$ 290,00");
}

#[test]
fn test_piece_volume_sweep() {
    for width in [2.5, 5.0, 7.5, 10.0, 15.0, 20.0, 30.0] {
        for thickness in [1.0, 2.0, 2.5, 5.0, 7.5] {
            for length in [100.0, 250.0, 300.0, 440.0, 600.0] {
                for quantity in [1.0, 3.0, 12.0, 0.5] {
                    let expected = round3(width * thickness * length * quantity / 1_000_000.0);
                    let volume = piece_volume(width, thickness, length, quantity);
                    assert!(
                        (volume.m3() - expected).abs() < 1e-9,
                        "{width} x {thickness} x {length} x {quantity}"
                    );
                }
            }
        }
    }
}

#[test]
fn test_log_volume_sweep() {
    for d1 in [12.0, 20.0, 25.5, 30.0, 45.0, 80.0] {
        for d2 in [10.0, 18.0, 25.5, 40.0] {
            for length in [2.2, 3.0, 4.0, 6.5] {
                let radius = ((d1 + d2) / 2.0 / 100.0) / 2.0;
                let expected = round3(PI * radius * radius * length);
                let volume = log_volume(d1, d2, length);
                assert!(
                    (volume.m3() - expected).abs() < 1e-9,
                    "{d1} / {d2} x {length}"
                );
                assert_eq!(volume, log_volume(d2, d1, length));
            }
        }
    }
}

#[test]
fn test_aggregation_properties() {
    let items: Vec<LineItem> = (1..=40)
        .map(|i| direct(0.013 * f64::from(i), 150_00 + i64::from(i) * 37))
        .collect();

    let forward = aggregate(&items);

    let mut reversed = items.clone();
    reversed.reverse();
    assert_eq!(aggregate(&reversed), forward);

    let mut interleaved: Vec<LineItem> = items.iter().step_by(2).cloned().collect();
    interleaved.extend(items.iter().skip(1).step_by(2).cloned());
    assert_eq!(aggregate(&interleaved), forward);

    for split in [0, 1, 17, 39, 40] {
        let (a, b) = items.split_at(split);
        assert_eq!(aggregate(a) + aggregate(b), forward, "split at {split}");
    }

    assert_eq!(aggregate(&[]), Totals::default());
    assert_eq!(Totals::default().total_volume, Volume::zero());
}
