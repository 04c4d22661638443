use std::rc::Rc;

use kiai_core::timing::{
    AbsoluteTimestamp, Error, InheritedTimingPoint, RelativeTimestamp, Timestamp, TimingPoint,
    UninheritedTimingPoint, SNAP_DENOMINATORS,
};
use proptest::prelude::*;

fn uninherited() -> UninheritedTimingPoint {
    UninheritedTimingPoint::new(AbsoluteTimestamp(12345), 200., 4).unwrap()
}

fn check_round_trip(anchor: &dyn Timestamp, measures: i32, num: u32, denom: u32, millis: i32) {
    let relative = RelativeTimestamp::new(anchor, 200., 4, measures, num, denom).unwrap();
    assert_eq!(relative.to_absolute(), AbsoluteTimestamp(millis));

    let snapped = AbsoluteTimestamp(millis).to_relative(anchor, 200., 4).unwrap();
    assert_eq!(snapped, relative);
    assert_eq!(snapped.milliseconds(), millis);
}

#[test]
fn uninherited_grid() {
    let point = uninherited();
    let anchor = &point.timestamp;

    check_round_trip(anchor, 0, 0, 1, 12345);
    check_round_trip(anchor, 1, 0, 1, 13545);
    check_round_trip(anchor, 0, 1, 4, 12645);
    check_round_trip(anchor, 0, 1, 2, 12945);
    check_round_trip(anchor, 0, 3, 4, 13245);
}

#[test]
fn inherited_grid() {
    let parent = uninherited();
    let start = RelativeTimestamp::new(&parent.timestamp, parent.bpm, parent.meter, 1, 0, 1)
        .unwrap()
        .to_absolute();
    let point = TimingPoint::Inherited(InheritedTimingPoint {
        parent: Rc::new(parent.clone().into()),
        timestamp: start,
        slider_velocity: 1.25,
    });
    assert_eq!(point.bpm(), 200.);
    assert_eq!(point.meter(), 4);

    let anchor = point.timestamp();
    check_round_trip(&anchor, 0, 0, 1, 13545);
    check_round_trip(&anchor, 1, 0, 1, 14745);
    check_round_trip(&anchor, 0, 1, 4, 13845);
    check_round_trip(&anchor, 0, 1, 2, 14145);
    check_round_trip(&anchor, 0, 3, 4, 14445);
}

#[test]
fn relative_anchor() {
    // A relative timestamp can anchor another one.
    let base = AbsoluteTimestamp(1000);
    let measure = RelativeTimestamp::new(&base, 200., 4, 2, 0, 1).unwrap();
    let beat = AbsoluteTimestamp(3700).to_relative(&measure, 200., 4).unwrap();

    assert_eq!(beat.anchor().milliseconds(), 3400);
    assert_eq!((beat.measures(), beat.numerator(), beat.denominator()), (0, 1, 4));
    assert_eq!(beat.to_absolute(), AbsoluteTimestamp(3700));
}

#[test]
fn off_grid_fails() {
    let anchor = AbsoluteTimestamp(12345);
    for millis in [12352, 12645 + 7, 13545 - 7] {
        let result = AbsoluteTimestamp(millis).to_relative(&anchor, 200., 4);
        assert!(
            matches!(result, Err(Error::NoAccurateSnap { .. })),
            "{millis} snapped: {result:?}"
        );
    }
}

fn bpm_and_meter() -> impl Strategy<Value = (f64, u32)> {
    // Grids where every subdivision lands on a whole millisecond.
    (
        prop_oneof![Just(100.), Just(125.), Just(200.), Just(250.), Just(500.)],
        prop_oneof![Just(4u32), Just(8u32)],
    )
}

fn gcd(a: i64, b: i64) -> i64 {
    if b == 0 {
        a.abs()
    } else {
        gcd(b, a % b)
    }
}

fn uneven_bpm_and_meter() -> impl Strategy<Value = (i64, u32)> {
    // Grids where most subdivisions fall between whole milliseconds.
    (
        prop_oneof![
            Just(140i64),
            Just(165i64),
            Just(170i64),
            Just(175i64),
            Just(180i64),
            Just(190i64),
            Just(210i64)
        ],
        prop_oneof![Just(3u32), Just(4u32), Just(7u32)],
    )
}

#[test]
fn uneven_grid_round_trip() {
    let anchor = AbsoluteTimestamp(0);
    for millis in [6750, 7000, 7500, 10000] {
        let snapped = AbsoluteTimestamp(millis).to_relative(&anchor, 180., 4).unwrap();
        assert_eq!(snapped.to_absolute(), AbsoluteTimestamp(millis));
    }
}

proptest! {
    #[test]
    fn whole_millisecond_grid_points_round_trip(anchor in -100_000..1_000_000i32,
                                                (bpm, meter) in uneven_bpm_and_meter(),
                                                denom_index in 0..SNAP_DENOMINATORS.len(),
                                                multiple in -2_000..2_000i64) {
        let denominator = i64::from(SNAP_DENOMINATORS[denom_index]);

        // A grid point is `steps` subdivisions from the anchor, at
        // `steps * meter * 60000 / (bpm * denominator)` ms. Keep only whole milliseconds.
        let numerator = i64::from(meter) * 60_000;
        let divisor = bpm * denominator;
        let steps = multiple * (divisor / gcd(divisor, numerator));
        let millis = i64::from(anchor) + steps * numerator / divisor;
        prop_assume!(millis >= i64::from(i32::MIN) && millis <= i64::from(i32::MAX));

        let millis = AbsoluteTimestamp(millis as i32);
        let anchor = AbsoluteTimestamp(anchor);
        let snapped = millis.to_relative(&anchor, bpm as f64, meter).unwrap();
        prop_assert_eq!(snapped.to_absolute(), millis);

        let relative = RelativeTimestamp::new(
            &anchor,
            bpm as f64,
            meter,
            steps.div_euclid(denominator) as i32,
            steps.rem_euclid(denominator) as u32,
            denominator as u32,
        )
        .unwrap();
        prop_assert_eq!(relative.to_absolute(), millis);
    }

    #[test]
    fn grid_points_round_trip(anchor in -100_000..1_000_000i32,
                              (bpm, meter) in bpm_and_meter(),
                              measures in -50..50i32,
                              denom_index in 0..SNAP_DENOMINATORS.len(),
                              num_seed in any::<u32>()) {
        let denominator = SNAP_DENOMINATORS[denom_index];
        let numerator = num_seed % denominator;
        let anchor = AbsoluteTimestamp(anchor);

        let millis = RelativeTimestamp::new(&anchor, bpm, meter, measures, numerator, denominator)
            .unwrap()
            .to_absolute();
        let snapped = millis.to_relative(&anchor, bpm, meter).unwrap();

        prop_assert_eq!(snapped.to_absolute(), millis);
        prop_assert!(SNAP_DENOMINATORS.contains(&snapped.denominator()));
    }

    #[test]
    fn snapping_never_exceeds_threshold(anchor in 0..100_000i32,
                                        offset in -20_000..20_000i32,
                                        bpm in 60f64..300.,
                                        meter in 1..8u32) {
        let anchor = AbsoluteTimestamp(anchor);
        let timestamp = AbsoluteTimestamp(anchor.0 + offset);

        if let Ok(snapped) = timestamp.to_relative(&anchor, bpm, meter) {
            let ms_per_measure = 60_000. / bpm * f64::from(meter);
            let exact = f64::from(anchor.0)
                + ms_per_measure * f64::from(snapped.measures())
                + ms_per_measure * f64::from(snapped.numerator()) / f64::from(snapped.denominator());
            prop_assert!((exact - f64::from(timestamp.0)).abs() <= 2. + 1e-6);
        }
    }
}
