use clap::{App, Arg};
use log::{LevelFilter, error, info, warn};
use sched_sim::{
    InputError, Job, PolicyConfig, PolicyKind, SimOutcome, input, logging, render, sim, simulate,
};
use std::{path::Path, process::ExitCode};

fn main() -> ExitCode {
    let matches = App::new("sched-sim")
        .about("Replays a process list under a CPU scheduling policy and reports metrics")
        .arg(
            Arg::with_name("input")
                .value_name("INPUT")
                .help("Process list; a default one is written if missing")
                .default_value("input.txt"),
        )
        .arg(
            Arg::with_name("policy")
                .short("p")
                .long("policy")
                .takes_value(true)
                .possible_values(&["cfs", "dps-dtq", "srpt", "all"])
                .default_value("all")
                .help("Scheduling policy to simulate"),
        )
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .takes_value(true)
                .help("TOML file with policy tunables"),
        )
        .arg(
            Arg::with_name("gantt")
                .long("gantt")
                .help("Print the gantt chart of each run"),
        )
        .arg(
            Arg::with_name("details")
                .long("details")
                .help("Print per-process timings as CSV"),
        )
        .arg(
            Arg::with_name("generate")
                .long("generate")
                .takes_value(true)
                .value_name("N")
                .help("Write N random processes to INPUT and exit"),
        )
        .arg(
            Arg::with_name("seed")
                .long("seed")
                .takes_value(true)
                .default_value("0")
                .help("Seed for --generate"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("Raise log verbosity (-v info, -vv debug, -vvv trace)"),
        )
        .get_matches();

    let level = match matches.occurrences_of("verbose") {
        0 => None,
        1 => Some(LevelFilter::Info),
        2 => Some(LevelFilter::Debug),
        _ => Some(LevelFilter::Trace),
    };
    logging::init(level);

    let input_path = Path::new(matches.value_of("input").unwrap_or("input.txt"));

    if let Some(count) = matches.value_of("generate") {
        return generate(input_path, count, matches.value_of("seed").unwrap_or("0"));
    }

    let config = match matches.value_of("config") {
        Some(path) => match PolicyConfig::load(path) {
            Ok(config) => config,
            Err(err) => {
                error!("{err}");
                return ExitCode::FAILURE;
            }
        },
        None => PolicyConfig::default(),
    };

    let policies: Vec<PolicyKind> = match matches.value_of("policy").unwrap_or("all") {
        "all" => PolicyKind::ALL.to_vec(),
        name => match name.parse() {
            Ok(policy) => vec![policy],
            Err(err) => {
                error!("{err}");
                return ExitCode::FAILURE;
            }
        },
    };

    let jobs = match load_jobs(input_path) {
        Ok(jobs) => jobs,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let mut outcomes = Vec::with_capacity(policies.len());
    for policy in policies {
        match simulate(jobs.clone(), policy, &config) {
            Ok(outcome) => outcomes.push(outcome),
            Err(err) => {
                error!("{policy}: {err}");
                return ExitCode::FAILURE;
            }
        }
    }

    report(
        &outcomes,
        matches.is_present("gantt"),
        matches.is_present("details"),
    );
    ExitCode::SUCCESS
}

// Missing input gets the default process list, then one more attempt
fn load_jobs(path: &Path) -> Result<Vec<Job>, InputError> {
    if !path.exists() {
        warn!(
            "{} not found, writing the default process list",
            path.display()
        );
        input::write_default_input(path)?;
    }
    let jobs = input::read_jobs(path)?;
    info!("read {} processes from {}", jobs.len(), path.display());
    Ok(jobs)
}

fn generate(path: &Path, count: &str, seed: &str) -> ExitCode {
    let (Ok(count), Ok(seed)) = (count.parse::<usize>(), seed.parse::<u64>()) else {
        error!("--generate and --seed take non-negative integers");
        return ExitCode::FAILURE;
    };
    if !(1..=input::MAX_PROCESSES).contains(&count) {
        error!("--generate takes 1..={} processes", input::MAX_PROCESSES);
        return ExitCode::FAILURE;
    }

    let jobs = sim::random_jobs(count, seed);
    match input::write_jobs(path, &jobs) {
        Ok(()) => {
            println!("Wrote {count} processes to {}", path.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn report(outcomes: &[SimOutcome], gantt: bool, details: bool) {
    for outcome in outcomes {
        if gantt || details || outcomes.len() == 1 {
            println!("== {} ==", outcome.policy);
        }
        if gantt {
            print!("{}", render::gantt_chart(&outcome.gantt));
        }
        if details {
            print!("{}", render::process_table(&outcome.processes));
        }
        if outcomes.len() == 1 {
            print!("{}", render::metrics_table(&outcome.metrics));
        }
    }

    if outcomes.len() > 1 {
        print!("{}", render::comparison_table(outcomes));
    }
}
