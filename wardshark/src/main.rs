use std::io::Write;
use std::path::Path;

use anyhow::{Context, anyhow};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dota_wards::analyzer::summary::WardSummary;
use dota_wards::analyzer::survey::Survey;
use dota_wards::analyzer::ward_dump::WardDump;
use dota_wards::analyzer::wards::{VisionPayload, WardTracker};
use dota_wards::game_constants::DurationRules;
use dota_wards::{ExtractOptions, ExtractOptionsBuilder, ReplayFile, extract_wards, run_analyzers};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn load_rules(path: Option<&str>) -> anyhow::Result<DurationRules> {
    let Some(path) = path else {
        return Ok(DurationRules::defaults());
    };
    let contents = std::fs::read_to_string(path).context("Failed to read config file")?;
    let rules = toml::from_str(&contents).context("Failed to parse config file")?;
    Ok(rules)
}

fn extract_options(matches: &ArgMatches) -> anyhow::Result<ExtractOptions> {
    let match_id = match matches.value_of("MATCH_ID") {
        Some(id) => id
            .parse::<i64>()
            .with_context(|| format!("invalid match id {id:?}"))?,
        None => 0,
    };
    let rules = load_rules(matches.value_of("CONFIG"))?;

    Ok(ExtractOptionsBuilder::default()
        .match_id(match_id)
        .rules(rules)
        .build()?)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if pretty {
        serde_json::to_writer_pretty(&mut out, value)?;
    } else {
        serde_json::to_writer(&mut out, value)?;
    }
    writeln!(out)?;
    Ok(())
}

fn replay_arg<'a>(matches: &'a ArgMatches) -> anyhow::Result<&'a Path> {
    matches
        .value_of("LOG")
        .map(Path::new)
        .ok_or_else(|| anyhow!("no event log given"))
}

fn log_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name("LOG")
        .help("Entity event log (.jsonl or .jsonl.gz)")
        .required(true)
        .index(1)
}

fn extraction_args<'a, 'b>(cmd: App<'a, 'b>) -> App<'a, 'b> {
    cmd.arg(log_arg())
        .arg(
            Arg::with_name("MATCH_ID")
                .help("Match id stamped on every record")
                .short("m")
                .long("match-id")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("CONFIG")
                .help("TOML file overriding the ward lifetime rules")
                .short("c")
                .long("config")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("PRETTY")
                .help("Pretty-print the JSON output")
                .long("pretty"),
        )
}

fn run_extract(matches: &ArgMatches) -> anyhow::Result<()> {
    let path = replay_arg(matches)?;
    let options = extract_options(matches)?;
    let records = extract_wards(path, &options)
        .with_context(|| format!("failed to extract wards from {}", path.display()))?;
    info!("{} wards extracted", records.len());
    print_json(&records, matches.is_present("PRETTY"))
}

fn run_payload(matches: &ArgMatches) -> anyhow::Result<()> {
    let path = replay_arg(matches)?;
    let options = extract_options(matches)?;

    let mut tracker = WardTracker::new(options.match_id, options.rules.clone());
    let mut survey = Survey::new();
    let replay = ReplayFile::open(path)?;
    run_analyzers(replay.events(), &mut [&mut tracker, &mut survey])
        .with_context(|| format!("failed to read {}", path.display()))?;

    let duration_sec = survey
        .stats()
        .last_tick
        .map(|tick| tick.seconds() as u32)
        .unwrap_or_default();
    let payload = VisionPayload::new(duration_sec, tracker.into_records());
    print_json(&payload, matches.is_present("PRETTY"))
}

fn run_summary(matches: &ArgMatches) -> anyhow::Result<()> {
    let path = replay_arg(matches)?;
    let options = extract_options(matches)?;
    let records = extract_wards(path, &options)
        .with_context(|| format!("failed to extract wards from {}", path.display()))?;
    let summary = WardSummary::from_records(&records);
    if summary.lacks_team_data() {
        info!("no ward in {} could be attributed to a team", path.display());
    }
    print_json(&summary, matches.is_present("PRETTY"))
}

fn run_survey(matches: &ArgMatches) -> anyhow::Result<()> {
    let path = replay_arg(matches)?;
    let mut survey = Survey::new();
    let replay = ReplayFile::open(path)?;
    run_analyzers(replay.events(), &mut [&mut survey])
        .with_context(|| format!("failed to read {}", path.display()))?;
    print_json(survey.stats(), true)
}

fn run_dump_ward(matches: &ArgMatches) -> anyhow::Result<()> {
    let path = replay_arg(matches)?;
    let mut dump = WardDump::new();
    let replay = ReplayFile::open(path)?;
    run_analyzers(replay.events(), &mut [&mut dump])
        .with_context(|| format!("failed to read {}", path.display()))?;
    match dump.into_dump() {
        Some(dump) => print_json(&dump, true),
        None => Err(anyhow!("no ward entity found in {}", path.display())),
    }
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let matches = App::new("Ward Shark")
        .about("Extracts ward placements from Dota 2 replay entity event logs")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(extraction_args(
            SubCommand::with_name("extract").about("Prints every destroyed ward as JSON"),
        ))
        .subcommand(extraction_args(
            SubCommand::with_name("payload")
                .about("Prints the match length together with its wards"),
        ))
        .subcommand(extraction_args(
            SubCommand::with_name("summary").about("Prints per-team ward counts"),
        ))
        .subcommand(
            SubCommand::with_name("survey")
                .about("Counts entity events by phase and class")
                .arg(log_arg()),
        )
        .subcommand(
            SubCommand::with_name("dump-ward")
                .about("Dumps all fields of the first ward entity created")
                .arg(log_arg()),
        )
        .subcommand(
            SubCommand::with_name("default-config")
                .about("Prints the default ward lifetime rules as TOML"),
        )
        .get_matches();

    match matches.subcommand() {
        ("extract", Some(sub)) => run_extract(sub),
        ("payload", Some(sub)) => run_payload(sub),
        ("summary", Some(sub)) => run_summary(sub),
        ("survey", Some(sub)) => run_survey(sub),
        ("dump-ward", Some(sub)) => run_dump_ward(sub),
        ("default-config", Some(_)) => {
            print!("{}", DurationRules::generate_default_toml());
            Ok(())
        }
        _ => Ok(()),
    }
}
