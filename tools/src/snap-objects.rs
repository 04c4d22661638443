use std::{path::PathBuf, rc::Rc};

use anyhow::{bail, Context};
use kiai_core::timing::{AbsoluteTimestamp, Error, TimingPoint, UninheritedTimingPoint};
use kiai_osu::TimingPointEntry;
use structopt::StructOpt;
use tracing::{info, warn};

mod common;

#[derive(StructOpt)]
#[structopt(
    name = "snap-objects",
    about = "Prints the position of every hit object on the beat grid."
)]
struct Opt {
    /// Timestamp of the first beat, in milliseconds.
    #[structopt(long, requires = "bpm", allow_hyphen_values = true)]
    offset: Option<i32>,

    /// Beats per minute.
    #[structopt(long, requires = "offset")]
    bpm: Option<f64>,

    /// Beats per measure.
    #[structopt(long, default_value = "4")]
    meter: u32,

    /// Path to a .osu file or a file with hit object lines.
    ///
    /// Without --offset and --bpm, the grid comes from the [TimingPoints] section.
    path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    common::init_logging();

    info!(
        "{} version {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
    );

    let opt = Opt::from_args();
    let text = common::read(&opt.path)?;
    let objects = kiai_osu::parse_hit_objects(common::section(&text, "HitObjects"))
        .context("error parsing hit objects")?;

    let entries = match (opt.offset, opt.bpm) {
        (Some(offset), Some(bpm)) => {
            let point = UninheritedTimingPoint::new(AbsoluteTimestamp(offset), bpm, opt.meter)
                .context("invalid grid")?;
            vec![TimingPointEntry {
                point: Rc::new(TimingPoint::from(point)),
                beat_length: 60_000. / bpm,
                meter: opt.meter,
                sample_set: 0,
                sample_index: 0,
                volume: 100,
                effects: Default::default(),
            }]
        }
        _ => kiai_osu::parse_timing_points(common::section(&text, "TimingPoints"))
            .context("error parsing timing points")?,
    };

    if !entries.iter().any(|entry| !entry.is_inherited()) {
        bail!("no uninherited timing points; pass --offset and --bpm");
    }

    let mut unsnapped = 0;
    for object in &objects {
        let start_time = object.start_time();
        let Some(entry) = kiai_osu::governing_entry(&entries, start_time) else {
            continue;
        };

        match entry.point.to_relative(start_time) {
            Ok(relative) => println!("{}\t{}", start_time, relative),
            Err(Error::NoAccurateSnap { .. }) => {
                unsnapped += 1;
                println!("{}\tunsnapped", start_time);
            }
            Err(err) => return Err(err).context("error snapping object"),
        }
    }

    if unsnapped > 0 {
        warn!("{} of {} objects are unsnapped", unsnapped, objects.len());
    }

    Ok(())
}
