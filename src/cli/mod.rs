pub mod history;
pub mod status;

use std::{fmt::Display, path::PathBuf};

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use tracing::level_filters::LevelFilter;

use crate::{
    storage::{
        entities::FeedInterval,
        slot_storage::{LogSlot, SlotStorage, SlotStorageImpl},
    },
    tracker::Tracker,
    utils::{
        clock::{Clock, DefaultClock},
        dir::resolve_application_path,
        logging::enable_logging,
        time::{day_and_time, day_key, day_label},
    },
};

#[derive(Parser, Debug)]
#[command(name = "Burplog", version, long_about = None)]
#[command(about = "Track infant feedings and diaper changes from the terminal", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

/// Arguments shared by the commands that can take a moment in the past.
#[derive(Debug, clap::Args)]
struct AtArgs {
    #[arg(
        long = "at",
        help = "Moment to log instead of now. Examples are \"2 hours ago\", \"21:30\", \"12:00 16/03/2025\""
    )]
    at: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

impl AtArgs {
    fn resolve(&self, now: DateTime<Local>) -> Result<DateTime<Utc>> {
        parse_when(self.at.as_deref(), self.date_style, now)
    }
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Log a feeding, now or at a given moment")]
    Feed {
        #[command(flatten)]
        at: AtArgs,
    },
    #[command(about = "Log a diaper change, now or at a given moment")]
    Diaper {
        #[command(flatten)]
        at: AtArgs,
    },
    #[command(about = "Show where the day stands")]
    Status {},
    #[command(about = "Display a log day by day")]
    History {
        log: LogSlot,
        #[arg(long, help = "Only show this many most recent days")]
        days: Option<usize>,
    },
    #[command(about = "Remove one entry. A unique prefix of its id is enough")]
    Remove { log: LogSlot, id: String },
    #[command(about = "Drop every entry of a log")]
    Clear { log: LogSlot },
    #[command(about = "Toggle the vitamin checkmark for a day")]
    Vitamin {
        #[arg(
            long,
            help = "Day to toggle instead of today. Examples are \"yesterday\", \"15/03/2025\""
        )]
        date: Option<String>,
        #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
        date_style: DateStyle,
    },
    #[command(about = "Show or set the expected hours between feedings")]
    Interval {
        #[arg(help = "Hours between feedings, 1 to 4. Leave out to show the current value")]
        hours: Option<FeedInterval>,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let application_path = resolve_application_path(args.dir.clone())?;

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(&application_path, logging_level, args.log)?;

    let mut tracker = Tracker::load(SlotStorageImpl::new(application_path)?).await?;
    let clock = DefaultClock;

    match args.commands {
        Commands::Feed { at } => log_entry(&mut tracker, LogSlot::Feedings, at, &clock).await,
        Commands::Diaper { at } => log_entry(&mut tracker, LogSlot::Diapers, at, &clock).await,
        Commands::Status {} => {
            println!("{}", status::render_status(&tracker, &clock, &Local));
            Ok(())
        }
        Commands::History { log, days } => {
            println!("{}", history::render_history(&tracker, log, days, &Local));
            Ok(())
        }
        Commands::Remove { log, id } => {
            match tracker.remove_entry(log, &id).await? {
                Some(removed) => println!(
                    "Removed {} {} from {}",
                    log.noun(1),
                    removed.short_id(),
                    day_and_time(removed.instant, &Local)
                ),
                None => println!("Nothing in the {log} log starts with {id}"),
            }
            Ok(())
        }
        Commands::Clear { log } => {
            let removed = tracker.clear_log(log).await?;
            println!("Removed {} {}", removed, log.noun(removed));
            Ok(())
        }
        Commands::Vitamin { date, date_style } => {
            let instant = parse_when(
                date.as_deref(),
                date_style,
                clock.time().with_timezone(&Local),
            )?;
            let day = day_key(instant, &Local);
            if tracker.toggle_vitamin(day).await? {
                println!("Vitamin marked given for {}", day_label(day));
            } else {
                println!("Vitamin no longer marked for {}", day_label(day));
            }
            Ok(())
        }
        Commands::Interval { hours } => {
            match hours {
                Some(interval) => {
                    tracker.set_interval(interval).await?;
                    println!("Feeding interval set to {interval}");
                }
                None => println!("Feeding interval: {}", tracker.interval()),
            }
            Ok(())
        }
    }
}

async fn log_entry<S: SlotStorage>(
    tracker: &mut Tracker<S>,
    slot: LogSlot,
    at: AtArgs,
    clock: &dyn Clock,
) -> Result<()> {
    let instant = at.resolve(clock.time().with_timezone(&Local))?;
    let entry = tracker.log_event(slot, instant).await?;
    println!(
        "Logged {} {} at {}",
        slot.noun(1),
        entry.short_id(),
        day_and_time(entry.instant, &Local)
    );
    Ok(())
}

/// Turns the user supplied date text into an instant, defaulting to now. Bad
/// input surfaces as a regular clap validation error.
fn parse_when(
    input: Option<&str>,
    date_style: DateStyle,
    now: DateTime<Local>,
) -> Result<DateTime<Utc>> {
    let Some(input) = input else {
        return Ok(now.to_utc());
    };

    match parse_date_string(input, now, date_style.into()) {
        Ok(v) => Ok(v.to_utc()),
        Err(e) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to parse date {input:?}: {e}"),
            )
            .into()),
    }
}
