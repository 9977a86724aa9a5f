//! Command-line host for the weekly grouping core.
//!
//! # Responsibility
//! - Wire a SQLite file, logging and policy into core services.
//! - Print plain-text results; no formatting beyond what an operator needs.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use groupweek_core::db::open_db;
use groupweek_core::{
    core_version, default_log_level, init_logging, init_stderr_logging, AttendanceStatus,
    GroupingPolicy, GroupingService, ParticipantId, RosterService, RunOutcome,
    SqliteAttendanceStore, SqliteHistoryStore, SqliteParticipantDirectory, SqliteTrackRegistry,
    TrackInput, TrackSource, WeekNumber, WeekSummary,
};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rusqlite::Connection;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "groupweek", version, about = "Weekly base group and track assignment")]
struct Cli {
    /// SQLite database file.
    #[arg(long, env = "GROUPWEEK_DB", default_value = "groupweek.sqlite3")]
    db: PathBuf,

    /// Absolute directory for rolling log files; logs go to stderr when unset.
    #[arg(long, env = "GROUPWEEK_LOG_DIR")]
    log_dir: Option<String>,

    /// trace|debug|info|warn|error
    #[arg(long, env = "GROUPWEEK_LOG_LEVEL")]
    log_level: Option<String>,

    /// JSON grouping policy overriding the defaults.
    #[arg(long, env = "GROUPWEEK_POLICY")]
    policy: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Manage the participant directory.
    #[command(subcommand)]
    Participant(ParticipantCommand),
    /// Record one participant's attendance for a week.
    Attend {
        week: u32,
        id: String,
        /// attending|absent_pre|absent_day
        status: AttendanceStatus,
    },
    /// Replace a week's tracks; titles fill slots A, B, C, D in order.
    Tracks {
        week: u32,
        #[arg(num_args = 0..=4)]
        titles: Vec<String>,
    },
    /// Group the week's attendees and replace its stored record.
    Run {
        week: u32,
        /// Seed for a reproducible run.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print a stored week, or list stored weeks when no week is given.
    Show { week: Option<u32> },
}

#[derive(Debug, Subcommand)]
enum ParticipantCommand {
    Add { id: String, name: String },
    Remove { id: String },
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_cli_logging(&cli)?;
    info!("event=cli_start module=cli status=ok version={}", core_version());

    let policy = match &cli.policy {
        Some(path) => GroupingPolicy::load(path)
            .with_context(|| format!("loading policy from {}", path.display()))?,
        None => GroupingPolicy::default(),
    };
    let conn = open_db(&cli.db).with_context(|| format!("opening {}", cli.db.display()))?;

    match cli.command {
        Command::Participant(command) => participant(&conn, command),
        Command::Attend { week, id, status } => {
            let roster = roster(&conn)?;
            roster.mark_attendance(week_number(week)?, &ParticipantId::new(&id)?, status)?;
            println!("week {week}: {id} -> {status}");
            Ok(())
        }
        Command::Tracks { week, titles } => {
            let inputs: Vec<TrackInput> = titles
                .into_iter()
                .map(|title| TrackInput { title, link: None })
                .collect();
            for track in roster(&conn)?.register_tracks(week_number(week)?, &inputs)? {
                println!("{} {}", track.id, track.title);
            }
            Ok(())
        }
        Command::Run { week, seed } => run(&conn, policy, week_number(week)?, seed),
        Command::Show { week: Some(week) } => show(&conn, policy, week_number(week)?),
        Command::Show { week: None } => {
            for week in grouping(&conn, policy)?.history_weeks()? {
                println!("week {week}");
            }
            Ok(())
        }
    }
}

fn init_cli_logging(cli: &Cli) -> Result<()> {
    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    let initialized = match &cli.log_dir {
        Some(dir) => init_logging(level, dir),
        None => init_stderr_logging(level),
    };
    initialized.map_err(|err| anyhow!("failed to initialize logging: {err}"))
}

fn week_number(value: u32) -> Result<WeekNumber> {
    Ok(WeekNumber::new(value)?)
}

type Roster<'c> = RosterService<
    SqliteParticipantDirectory<'c>,
    SqliteAttendanceStore<'c>,
    SqliteTrackRegistry<'c>,
>;
type Grouping<'c> =
    GroupingService<SqliteAttendanceStore<'c>, SqliteTrackRegistry<'c>, SqliteHistoryStore<'c>>;

fn roster(conn: &Connection) -> Result<Roster<'_>> {
    Ok(RosterService::new(
        SqliteParticipantDirectory::try_new(conn)?,
        SqliteAttendanceStore::try_new(conn)?,
        SqliteTrackRegistry::try_new(conn)?,
    ))
}

fn grouping(conn: &Connection, policy: GroupingPolicy) -> Result<Grouping<'_>> {
    Ok(GroupingService::new(
        SqliteAttendanceStore::try_new(conn)?,
        SqliteTrackRegistry::try_new(conn)?,
        SqliteHistoryStore::try_new(conn)?,
        policy,
    )?)
}

fn participant(conn: &Connection, command: ParticipantCommand) -> Result<()> {
    let roster = roster(conn)?;
    match command {
        ParticipantCommand::Add { id, name } => {
            let participant = roster.add_participant(&id, &name)?;
            println!("added {} ({})", participant.id, participant.name);
        }
        ParticipantCommand::Remove { id } => {
            roster.remove_participant(&ParticipantId::new(&id)?)?;
            println!("removed {id}");
        }
        ParticipantCommand::List => {
            for participant in roster.list_participants()? {
                println!("{}\t{}", participant.id, participant.name);
            }
        }
    }
    Ok(())
}

fn run(
    conn: &Connection,
    policy: GroupingPolicy,
    week: WeekNumber,
    seed: Option<u64>,
) -> Result<()> {
    let service = grouping(conn, policy)?;
    let outcome = match seed {
        Some(seed) => service.run_week(week, &mut StdRng::seed_from_u64(seed))?,
        None => service.run_week_from_entropy(week)?,
    };

    match outcome {
        RunOutcome::NothingToAssign { week } => {
            println!("week {week}: nobody is attending; nothing to assign");
        }
        RunOutcome::Committed {
            record,
            track_source,
            overlaps,
        } => {
            if track_source == TrackSource::Placeholder {
                println!(
                    "week {week}: fewer than {} titled tracks, using placeholders",
                    service.policy().fallback_track_count
                );
            }
            for overlap in &overlaps {
                let members: Vec<&str> =
                    overlap.members.iter().map(ParticipantId::as_str).collect();
                println!(
                    "warning: group {} has {} on track {}",
                    overlap.group_index + 1,
                    members.join(", "),
                    overlap.track
                );
            }
            print_summary(&roster(conn)?.describe_week(&record)?);
        }
    }
    Ok(())
}

fn show(conn: &Connection, policy: GroupingPolicy, week: WeekNumber) -> Result<()> {
    let Some(record) = grouping(conn, policy)?.week_record(week)? else {
        bail!("no stored grouping for week {week}");
    };
    print_summary(&roster(conn)?.describe_week(&record)?);
    Ok(())
}

fn print_summary(summary: &WeekSummary) {
    println!("week {}", summary.week);
    println!("base groups:");
    for (index, group) in summary.base_groups.iter().enumerate() {
        let names: Vec<&str> = group.iter().map(|member| member.name.as_str()).collect();
        println!("  {}: {}", index + 1, names.join(", "));
    }
    println!("activity groups:");
    for group in &summary.activity_groups {
        let names: Vec<&str> = group
            .members
            .iter()
            .map(|member| member.name.as_str())
            .collect();
        let title = group.title.as_deref().unwrap_or("-");
        println!("  {} ({}): {}", group.track, title, names.join(", "));
    }
}
