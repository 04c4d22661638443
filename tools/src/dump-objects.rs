use std::path::PathBuf;

use anyhow::Context;
use structopt::StructOpt;
use tracing::info;

mod common;

#[derive(StructOpt)]
#[structopt(name = "dump-objects", about = "Prints the hit objects of a map.")]
struct Opt {
    /// Write the objects back in the map format instead of YAML.
    #[structopt(long)]
    reserialize: bool,

    /// Path to a .osu file or a file with hit object lines.
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

    info!("parsed {} objects", objects.len());

    if opt.reserialize {
        for object in &objects {
            println!("{}", object);
        }
    } else {
        let yaml = serde_yaml::to_string(&objects).context("error serializing objects")?;
        print!("{}", yaml);
    }

    Ok(())
}
