use std::fs;

use kiai_core::{
    curve::CurveKind,
    geometry::{IntPoint, Vec2},
    timing::AbsoluteTimestamp,
};
use kiai_osu::{
    governing_entry, parse_hit_objects, parse_timing_points, Extras, HitObject, HitObjectKind,
    Hitsound, Spinner,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn read(path: &str) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn parse_sample() {
    let text = read("tests/data/hit_objects.txt");
    let objects = parse_hit_objects(text.lines()).unwrap();
    assert_eq!(objects.len(), 6);

    let kinds: Vec<_> = objects
        .iter()
        .map(|object| (object.is_circle(), object.is_slider(), object.is_spinner()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (true, false, false),
            (true, false, false),
            (false, true, false),
            (false, true, false),
            (false, false, true),
            (true, false, false),
        ]
    );

    assert!(objects[0].new_combo());
    assert_eq!(objects[1].hitsound(), Hitsound::WHISTLE);

    let HitObjectKind::Slider(slider) = objects[3].kind() else {
        panic!("expected a slider");
    };
    assert_eq!(slider.curve_kind(), CurveKind::Linear);
    assert_eq!(slider.repeat_count(), 2);
    assert_eq!(
        slider.curve(),
        &[Vec2::new(64., 320.), Vec2::new(64., 200.)]
    );

    assert_eq!(
        objects[4].kind(),
        &HitObjectKind::Spinner(Spinner {
            end_time: AbsoluteTimestamp(4000)
        })
    );

    assert_eq!(
        objects[5].extras(),
        &Extras {
            sample_set: 1,
            addition_set: 2,
            custom_index: 0,
            volume: 80,
            filename: "clap.wav".to_owned(),
        }
    );
}

#[test]
fn reserialize_sample() {
    let text = read("tests/data/hit_objects.txt");
    let objects = parse_hit_objects(text.lines()).unwrap();

    let lines: Vec<String> = objects.iter().map(ToString::to_string).collect();
    let expected: Vec<&str> = text.lines().filter(|line| !line.is_empty()).collect();
    assert_eq!(lines, expected);
}

#[test]
fn linear_slider_uses_target_length() {
    let object: HitObject = "0,0,1500,2,0,L|10:0,1,5".parse().unwrap();
    let HitObjectKind::Slider(slider) = object.kind() else {
        panic!("expected a slider");
    };

    assert_eq!(
        slider.control_points(),
        &[IntPoint::new(0, 0), IntPoint::new(10, 0)]
    );
    assert_eq!(slider.curve(), &[Vec2::new(0., 0.), Vec2::new(5., 0.)]);
}

#[test]
fn snap_sample_to_timing_points() {
    let timing_points = read("tests/data/timing_points.txt");
    let entries = parse_timing_points(timing_points.lines()).unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[1].point.bpm(), 120.);

    let text = read("tests/data/hit_objects.txt");
    let objects = parse_hit_objects(text.lines()).unwrap();

    let snapped: Vec<String> = objects
        .iter()
        .map(|object| {
            let entry = governing_entry(&entries, object.start_time()).unwrap();
            entry
                .point
                .to_relative(object.start_time())
                .unwrap()
                .to_string()
        })
        .collect();

    assert_eq!(
        snapped,
        vec![
            "0 + 0/1", "0 + 1/8", "0 + 1/4", "0 + 1/2", "0 + 3/4", "1 + 3/4"
        ]
    );
}

#[test]
fn reserialize_timing_points() {
    let text = read("tests/data/timing_points.txt");
    let entries = parse_timing_points(text.lines()).unwrap();

    let lines: Vec<String> = entries.iter().map(ToString::to_string).collect();
    assert_eq!(lines, text.lines().collect::<Vec<_>>());
}

fn arbitrary_extras() -> impl Strategy<Value = String> {
    (0..4i32, 0..4i32, 0..10i32, 0..=100i32, "[a-z0-9_]{0,8}").prop_map(
        |(sample_set, addition_set, custom_index, volume, filename)| {
            format!("{sample_set}:{addition_set}:{custom_index}:{volume}:{filename}")
        },
    )
}

prop_compose! {
    fn arbitrary_common(type_bit: u32)
                       (x in 0..512i32,
                        y in 0..384i32,
                        time in 0..10_000_000i32,
                        new_combo in any::<bool>(),
                        hitsound in 0..16u32)
                       -> String {
        let object_type = type_bit | if new_combo { 4 } else { 0 };
        format!("{x},{y},{time},{object_type},{hitsound}")
    }
}

prop_compose! {
    fn arbitrary_circle()
                       (common in arbitrary_common(1),
                        extras in arbitrary_extras())
                       -> String {
        format!("{common},{extras}")
    }
}

prop_compose! {
    fn arbitrary_spinner()
                        (common in arbitrary_common(8),
                         duration in 0..100_000i32,
                         extras in arbitrary_extras())
                        -> String {
        // The end time only needs to be an integer, so offsetting from zero is fine.
        format!("{common},{duration},{extras}")
    }
}

prop_compose! {
    fn arbitrary_linear_slider()
                              (common in arbitrary_common(2),
                               dx in 1..200i32,
                               dy in -200..200i32,
                               repeat_count in 1..10u32,
                               length in (0..100_000u32).prop_map(|l| f64::from(l) / 100.),
                               extras in arbitrary_extras())
                              -> String {
        // Position is the first two fields; the control point is placed relative to it.
        let mut fields = common.split(',');
        let x: i32 = fields.next().unwrap().parse().unwrap();
        let y: i32 = fields.next().unwrap().parse().unwrap();
        format!(
            "{common},L|{}:{},{repeat_count},{length},0|0,0:0|0:0,{extras}",
            x + dx,
            y + dy,
        )
    }
}

fn arbitrary_line() -> impl Strategy<Value = String> {
    prop_oneof![
        arbitrary_circle(),
        arbitrary_spinner(),
        arbitrary_linear_slider()
    ]
}

proptest! {
    #[test]
    fn line_parse_serialize(line in arbitrary_line()) {
        let object: HitObject = line.parse().unwrap();
        prop_assert_eq!(object.to_string(), line.clone());

        let object2: HitObject = object.to_string().parse().unwrap();
        prop_assert_eq!(object, object2);
    }
}
