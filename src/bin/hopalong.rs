// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use clap::{App, Arg, ArgMatches};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::str::FromStr;

use hopalong::config::{
    parse_count, parse_opacity, parse_params, parse_point, parse_range, parse_rate, parse_size,
};
use hopalong::{Controller, Discard, Error, Pacer, PpmSequence, Settings, Start, Surface, Variant};

const NITERS: &str = "niters";
const NHIST: &str = "nhist";
const NRESET: &str = "nreset";
const FPS: &str = "fps";
const PARAMS: &str = "params";
const RANGE: &str = "range";
const START: &str = "start";
const RANDOM_START: &str = "random-start";
const VARIANT: &str = "variant";
const SEED: &str = "seed";
const OPACITY: &str = "opacity";
const SIZE: &str = "size";
const OUTPUT: &str = "output";
const FRAMES: &str = "frames";

// clap validators want Result<(), String>.
fn check<T>(r: Result<T, Error>) -> Result<(), String> {
    r.map(|_| ()).map_err(|e| e.to_string())
}

fn args<'a>() -> ArgMatches<'a> {
    App::new("hopalong")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Animated Hopalong attractor renderer")
        .after_help(
            "`--nreset 1` creates a very chaotic visual effect. \
             Larger numbers (e.g. 10) create more stable structures.",
        )
        .arg(
            Arg::with_name(NITERS)
                .long(NITERS)
                .short("n")
                .takes_value(true)
                .default_value("1000")
                .allow_hyphen_values(true)
                .validator(|s| check(parse_count("niters", &s, false)))
                .help("Number of hopalong iterations drawn per frame"),
        )
        .arg(
            Arg::with_name(NHIST)
                .long(NHIST)
                .short("H")
                .takes_value(true)
                .default_value("10")
                .allow_hyphen_values(true)
                .validator(|s| check(parse_count("nhist", &s, true)))
                .help("Number of frames an iteration stays on screen"),
        )
        .arg(
            Arg::with_name(NRESET)
                .long(NRESET)
                .short("r")
                .takes_value(true)
                .default_value("10")
                .allow_hyphen_values(true)
                .validator(|s| check(parse_count("nreset", &s, true)))
                .help("Frames generated before the parameters are randomised; 0 keeps them"),
        )
        .arg(
            Arg::with_name(FPS)
                .long(FPS)
                .short("f")
                .takes_value(true)
                .default_value("25")
                .allow_hyphen_values(true)
                .validator(|s| check(parse_rate(&s)))
                .help("Frames generated per second"),
        )
        .arg(
            Arg::with_name(PARAMS)
                .long(PARAMS)
                .short("p")
                .takes_value(true)
                .allow_hyphen_values(true)
                .validator(|s| check(parse_params(&s)))
                .help("Parameters a,b,c of the first orbit; random when absent"),
        )
        .arg(
            Arg::with_name(RANGE)
                .long(RANGE)
                .short("R")
                .takes_value(true)
                .default_value("-10,10")
                .allow_hyphen_values(true)
                .validator(|s| check(parse_range(&s)))
                .help("Lower and upper bound random parameters are drawn from"),
        )
        .arg(
            Arg::with_name(START)
                .long(START)
                .short("S")
                .takes_value(true)
                .default_value("0,0")
                .allow_hyphen_values(true)
                .validator(|s| check(parse_point(&s)))
                .help("Start position x,y of every orbit"),
        )
        .arg(
            Arg::with_name(RANDOM_START)
                .long(RANDOM_START)
                .help("Draw the start position from the parameter range on every reset"),
        )
        .arg(
            Arg::with_name(VARIANT)
                .long(VARIANT)
                .takes_value(true)
                .default_value("classic")
                .possible_values(&["classic", "positive", "additive", "sinusoidal", "gingerbread"])
                .help("Member of the map family to iterate"),
        )
        .arg(
            Arg::with_name(SEED)
                .long(SEED)
                .takes_value(true)
                .validator(|s| check(parse_u64("seed", Some(s.as_str()))))
                .help("Seed for the random parameters"),
        )
        .arg(
            Arg::with_name(OPACITY)
                .long(OPACITY)
                .short("a")
                .takes_value(true)
                .default_value("0.3")
                .validator(|s| check(parse_opacity(&s)))
                .help("Opacity of the newest frame's points"),
        )
        .arg(
            Arg::with_name(SIZE)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("800x800")
                .validator(|s| check(parse_size(&s)))
                .help("Size of output frames"),
        )
        .arg(
            Arg::with_name(OUTPUT)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Directory frames are written to; frames are discarded when absent"),
        )
        .arg(
            Arg::with_name(FRAMES)
                .long(FRAMES)
                .short("F")
                .takes_value(true)
                .validator(|s| check(parse_u64("frames", Some(s.as_str()))))
                .help("Stop after this many frames"),
        )
        .get_matches()
}

// Every option read this way has a default value.
fn value<'m>(matches: &'m ArgMatches, name: &str) -> &'m str {
    matches.value_of(name).unwrap_or_default()
}

fn parse_u64(name: &str, s: Option<&str>) -> Result<Option<u64>, Error> {
    match s {
        Some(s) => u64::from_str(s)
            .map(Some)
            .map_err(|_| Error::Configuration(format!("{} '{}' is not a whole number", name, s))),
        None => Ok(None),
    }
}

fn settings(matches: &ArgMatches) -> Result<Settings, Error> {
    let params = match matches.value_of(PARAMS) {
        Some(s) => Some(parse_params(s)?),
        None => None,
    };
    let start = if matches.is_present(RANDOM_START) {
        Start::Random
    } else {
        Start::Fixed(parse_point(value(matches, START))?)
    };

    Ok(Settings {
        iterations: parse_count("niters", value(matches, NITERS), false)?,
        history: parse_count("nhist", value(matches, NHIST), true)?,
        reset_interval: parse_count("nreset", value(matches, NRESET), true)?,
        fps: parse_rate(value(matches, FPS))?,
        params,
        range: parse_range(value(matches, RANGE))?,
        start,
        variant: Variant::from_str(value(matches, VARIANT))?,
        seed: parse_u64("seed", matches.value_of(SEED))?,
        opacity: parse_opacity(value(matches, OPACITY))?,
        size: parse_size(value(matches, SIZE))?,
        output: matches.value_of(OUTPUT).map(PathBuf::from),
        frames: parse_u64("frames", matches.value_of(FRAMES))?,
    })
}

fn animate(settings: Settings) -> Result<u64, Error> {
    settings.validate()?;
    let (width, height) = settings.size;
    let mut surface: Box<dyn Surface> = match settings.output {
        Some(ref dir) => {
            info!("writing frames to {}", dir.display());
            Box::new(PpmSequence::new(dir, width, height)?)
        }
        None => Box::new(Discard::new(width, height)?),
    };
    let mut pacer = Pacer::new(settings.fps)?;
    let rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let limit = settings.frames;
    let mut controller = Controller::new(settings, rng)?;
    controller.run(surface.as_mut(), &mut pacer, limit)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = args();
    let result = settings(&matches).and_then(|settings| {
        info!("{}", settings);
        animate(settings)
    });

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
