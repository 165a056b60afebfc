// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use pngseam::artifacts::{HIGHLIGHTED_SEAMS, OUTPUTS};
use pngseam::codec::decode;
use pngseam::{CarveError, CarveState, Execution, PngArtifacts, SeamCarver};
use std::fs;
use std::path::Path;
use std::process;

use clap::{App, Arg, ArgMatches};
use log::info;

fn positive(value: String) -> Result<(), String> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(()),
        _ => Err(format!("expected a positive integer, got '{}'", value)),
    }
}

fn setup_logging(verbosity: u64) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn execution(matches: &ArgMatches) -> Execution {
    match matches.value_of("mode") {
        Some("parallel") => match matches.value_of("workers") {
            Some(workers) => Execution::with_workers(workers.parse().unwrap_or(1)),
            None => Execution::parallel(),
        },
        _ => Execution::Sequential,
    }
}

fn ensure_dir(dir: &Path) -> Result<(), CarveError> {
    fs::create_dir_all(dir).map_err(|e| CarveError::IoFailure {
        path: dir.display().to_string(),
        reason: e.to_string(),
    })
}

fn run(matches: &ArgMatches) -> Result<(), (Option<usize>, CarveError)> {
    let input = Path::new(matches.value_of("input").unwrap_or_default());
    let iterations: usize = matches
        .value_of("iterations")
        .and_then(|n| n.parse().ok())
        .unwrap_or(1);
    let execution = execution(matches);
    let highlighted = Path::new(matches.value_of("highlight-dir").unwrap_or(HIGHLIGHTED_SEAMS));
    let outputs = Path::new(matches.value_of("output-dir").unwrap_or(OUTPUTS));

    let image = decode(input, execution).map_err(|e| (None, e))?;
    info!(
        "{}: {}x{}, {} channels, {} iterations, {:?}",
        input.display(),
        image.width(),
        image.height(),
        image.channels(),
        iterations,
        execution
    );

    for dir in &[highlighted, outputs] {
        ensure_dir(dir).map_err(|e| (None, e))?;
    }
    let mut sink = PngArtifacts::new(input, highlighted, outputs, execution);
    if let Some(energy) = matches.value_of("energy-dir") {
        ensure_dir(Path::new(energy)).map_err(|e| (None, e))?;
        sink = sink.with_energy_maps(energy);
    }

    let mut carver = SeamCarver::new(execution);
    let carved = carver.carve(image, iterations, &mut sink).map_err(|e| {
        let failed = match carver.state() {
            CarveState::Failed(iteration) => Some(iteration),
            _ => None,
        };
        (failed, e)
    })?;

    if let Some(last) = sink.last_output() {
        println!("{} ({}x{})", last.display(), carved.width(), carved.height());
    }
    Ok(())
}

fn main() {
    let matches = App::new("pngseam")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Narrow an image by carving out its least important vertical seams")
        .arg(
            Arg::with_name("input")
                .help("The image to carve")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("iterations")
                .short("n")
                .long("iterations")
                .help("How many seams to carve out")
                .takes_value(true)
                .required(true)
                .validator(positive),
        )
        .arg(
            Arg::with_name("mode")
                .short("m")
                .long("mode")
                .help("Run every stage on one thread, or across a worker pool")
                .takes_value(true)
                .possible_values(&["sequential", "parallel"])
                .default_value("sequential"),
        )
        .arg(
            Arg::with_name("workers")
                .short("w")
                .long("workers")
                .help("Worker threads in parallel mode [default: one per CPU]")
                .takes_value(true)
                .env("PNGSEAM_WORKERS")
                .validator(positive),
        )
        .arg(
            Arg::with_name("highlight-dir")
                .long("highlight-dir")
                .help("Where the highlighted-seam snapshots go")
                .takes_value(true)
                .default_value(HIGHLIGHTED_SEAMS),
        )
        .arg(
            Arg::with_name("output-dir")
                .long("output-dir")
                .help("Where the narrowed images go")
                .takes_value(true)
                .default_value(OUTPUTS),
        )
        .arg(
            Arg::with_name("energy-dir")
                .long("energy-dir")
                .help("Also write each iteration's energy map here")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("More logging; repeat for more"),
        )
        .get_matches();

    setup_logging(matches.occurrences_of("verbose"));

    if let Err((iteration, err)) = run(&matches) {
        let input = matches.value_of("input").unwrap_or_default();
        match iteration {
            Some(i) => eprintln!("pngseam: {}: iteration {}: {}: {}", input, i, err.kind(), err),
            None => eprintln!("pngseam: {}: {}: {}", input, err.kind(), err),
        }
        process::exit(1);
    }
}
