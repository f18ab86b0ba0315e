//! Command-line interface for the streak tracker.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use streak_tracker::config::AppConfig;
use streak_tracker::db::Database;
use streak_tracker::ingest::ingest_message;
use streak_tracker::logging::{init_logging, OperationTimer};
use streak_tracker::models::{DayDetail, Diagnostics, Overview, UserStats};
use streak_tracker::score::ALL_SCORES;
use streak_tracker::stats;
use streak_tracker::validation::InputValidator;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Override the database path from configuration
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Import streak messages (interactive loop, single message, or file)
    Import {
        /// Ingest a single message and exit
        #[arg(short, long)]
        message: Option<String>,

        /// Read messages from a file, one per line
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Show a database overview
    Overview {
        /// Include per-user statistics and recent days
        #[arg(short = 'l', long)]
        detailed: bool,
    },
    /// Show details for a specific streak day
    ShowDay {
        /// Day number to show
        day: Option<i64>,

        /// Show the most recent N days instead
        #[arg(short, long)]
        recent: Option<u32>,
    },
    /// Diagnose the database for missing days, duplicates, and orphans
    Diagnose,
    /// Show per-user statistics
    Stats,
    /// Export the per-user time series for charting consumers
    Export {
        /// Output format (json or csv)
        #[arg(short = 'f', long, default_value = "json")]
        format: String,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete a specific day and all its results (previewed first)
    DeleteDay {
        /// Day number to delete
        day: i64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Irreversibly delete ALL data (double confirmation required)
    Wipe,
}

fn main() -> Result<()> {
    // Parse first so --help/--version work even with a broken config file.
    let cli = Cli::parse();

    let config = AppConfig::load()?;
    init_logging(
        Some(&config.log_level()),
        config.logging.file_path.as_deref().map(std::path::Path::new),
    )?;

    let db_path = cli
        .database
        .as_ref()
        .map_or_else(|| config.database_path(), |p| p.display().to_string());
    InputValidator::validate_database_path(&db_path)?;
    let db = Database::new(&db_path)?;

    match &cli.command {
        Commands::Import { message, file } => run_import(&config, &db, message, file)?,
        Commands::Overview { detailed } => run_overview(&db, *detailed)?,
        Commands::ShowDay { day, recent } => run_show_day(&db, *day, *recent)?,
        Commands::Diagnose => run_diagnose(&db)?,
        Commands::Stats => run_stats(&db)?,
        Commands::Export { format, output } => run_export(&db, format, output.as_deref())?,
        Commands::DeleteDay { day, yes } => run_delete_day(&db, *day, *yes)?,
        Commands::Wipe => run_wipe(&db)?,
    }

    Ok(())
}

/// Ingest one message and report the outcome; errors are printed and
/// swallowed so batch loops can continue.
fn ingest_and_report(config: &AppConfig, db: &Database, message: &str) -> bool {
    if let Err(e) = InputValidator::validate_message(message, config.import.max_message_len) {
        println!("❌ {e}");
        return false;
    }

    match ingest_message(db, message) {
        Ok(outcome) => {
            println!(
                "✅ Added Day {} with {} entries",
                outcome.day, outcome.results_added
            );
            if !outcome.users_touched.is_empty() {
                println!("   Users: {}", outcome.users_touched.join(", "));
            }
            true
        }
        Err(e) => {
            error!(error = %e, "ingestion failed");
            println!("❌ Error: {e}");
            println!("Please check the message format and try again.");
            false
        }
    }
}

fn run_import(
    config: &AppConfig,
    db: &Database,
    message: &Option<String>,
    file: &Option<PathBuf>,
) -> Result<()> {
    if let Some(message) = message {
        ingest_and_report(config, db, message);
        return Ok(());
    }

    if let Some(path) = file {
        let timer = OperationTimer::new("file import");
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let mut imported = 0usize;
        for line in content.lines() {
            if line.trim().is_empty() {
                continue;
            }
            if ingest_and_report(config, db, line) {
                imported += 1;
            }
        }

        println!("\n🎉 Import complete! Processed {imported} messages.");
        timer.finish();
        return Ok(());
    }

    // Interactive batch mode, terminated by the sentinel word.
    println!("🎯 Streak Tracker - Batch Import");
    println!("{}", "=".repeat(50));
    println!(
        "Paste streak messages below, one per line. Type '{}' when finished.\n",
        config.import.sentinel
    );

    let stdin = std::io::stdin();
    let mut imported = 0usize;

    loop {
        print!("Message {}: ", imported + 1);
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let message = line.trim();

        if message.eq_ignore_ascii_case(&config.import.sentinel) {
            break;
        }
        if message.is_empty() {
            continue;
        }

        if ingest_and_report(config, db, message) {
            imported += 1;
            print_brief_overview(&stats::overview(db)?);
            println!();
        }
    }

    println!("\n🎉 Import complete! Processed {imported} messages.");
    Ok(())
}

fn print_brief_overview(overview: &Overview) {
    println!("📊 Database Overview:");
    println!("   • {} streak days", overview.total_days);
    println!("   • {} users", overview.total_users);
    println!("   • {} total entries", overview.total_results);
    println!("   • Users: {}", overview.users.join(", "));
}

fn run_overview(db: &Database, detailed: bool) -> Result<()> {
    let overview = stats::overview(db)?;

    if !detailed {
        print_brief_overview(&overview);
        return Ok(());
    }

    println!("{}", "=".repeat(70));
    println!("🏆 DETAILED DATABASE OVERVIEW");
    println!("{}", "=".repeat(70));
    print_brief_overview(&overview);

    let days = stats::list_days(db)?;
    if let (Some(min), Some(max)) = (days.first(), days.last()) {
        println!("   • Streak range: Day {min} to Day {max}");
    }

    println!("\n👥 USER STATISTICS:");
    print_user_stats_table(&stats::user_stats(db)?);

    let recent = stats::recent_days(db, 10)?;
    if !recent.is_empty() {
        println!("\n📅 RECENT STREAK DAYS:");
        for day in recent.iter().rev() {
            if let Some(detail) = stats::day_detail(db, *day)? {
                println!("   • Day {day}: {} participants", detail.participants());
            }
        }
    }

    Ok(())
}

fn print_user_stats_table(user_stats: &[UserStats]) {
    if user_stats.is_empty() {
        println!("   (no users)");
        return;
    }

    println!(
        "{:<15} {:<6} {:<3} {:<3} {:<3} {:<3} {:<3} {:<3} {:<3} {:<5}",
        "Username", "Games", "1", "2", "3", "4", "5", "6", "X", "Wins"
    );
    println!("{}", "-".repeat(60));
    for user in user_stats {
        print!("{:<15} {:<6} ", user.username, user.games_played);
        for score in ALL_SCORES {
            print!("{:<3} ", user.distribution.count(score));
        }
        println!("{:<5}", user.wins);
    }
}

fn run_show_day(db: &Database, day: Option<i64>, recent: Option<u32>) -> Result<()> {
    if let Some(count) = recent {
        let days = stats::recent_days(db, count)?;
        if days.is_empty() {
            println!("📅 No days found in database");
        } else {
            println!("📅 Recent {} days in database:", days.len());
            println!(
                "   {}",
                days.iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
        return Ok(());
    }

    let Some(day) = day else {
        println!("❌ Provide a day number, or --recent N");
        return Ok(());
    };
    let day = InputValidator::validate_day_number(day)?;

    match stats::day_detail(db, day)? {
        Some(detail) => print_day_detail(&detail),
        None => {
            println!("❌ Day {day} not found in database!");
            let nearby = stats::nearby_days(db, day, 5)?;
            if nearby.is_empty() {
                println!("📍 No nearby days found in database.");
            } else {
                println!(
                    "📍 Nearby days in database: {}",
                    nearby
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
        }
    }

    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn print_day_detail(detail: &DayDetail) {
    println!("📅 Day {} Details", detail.day);
    println!("{}", "=".repeat(50));
    println!("📝 Imported: {}", detail.imported_at);
    println!("\n🎯 RESULTS FOR DAY {}:", detail.day);
    println!("👥 Total participants: {}", detail.participants());

    for score in ALL_SCORES {
        let with_score: Vec<_> = detail.results.iter().filter(|r| r.score == score).collect();
        if with_score.is_empty() {
            continue;
        }

        let noun = if with_score.len() == 1 { "player" } else { "players" };
        println!("\n{}/6: ({} {noun})", score, with_score.len());
        for result in with_score {
            let crown = if result.is_winner { "👑 " } else { "   " };
            println!("{crown}{}", result.username);
        }
    }

    let total = detail.participants();
    if total == 0 {
        println!("\n⚠️  No participants found for Day {}", detail.day);
        return;
    }

    println!("\n📊 STATISTICS:");
    let failures = detail.failures();
    let successes = total - failures;
    println!("   • Total players: {total}");
    println!(
        "   • Successful: {successes} ({:.1}%)",
        successes as f64 / total as f64 * 100.0
    );
    if failures > 0 {
        println!(
            "   • Failed (X): {failures} ({:.1}%)",
            failures as f64 / total as f64 * 100.0
        );
    }

    let winners = detail.winners();
    if !winners.is_empty() {
        println!("   • Winner(s): {}", winners.join(", "));
    }

    if let Some(avg) = detail.average_score() {
        println!("   • Average score: {avg:.2}/6");
    }

    if let Some(best) = detail.best_score() {
        let best_players: Vec<_> = detail
            .results
            .iter()
            .filter(|r| r.score == best)
            .map(|r| r.username.as_str())
            .collect();
        println!("   • Best score: {best}/6 by {}", best_players.join(", "));
    }
}

fn run_diagnose(db: &Database) -> Result<()> {
    let diag = stats::diagnostics(db)?;

    println!("🔍 Database Diagnosis");
    println!("{}", "=".repeat(50));

    if diag.total_days == 0 {
        println!("❌ Database is empty - no streak days found!");
        return Ok(());
    }

    print_diagnostics(&diag);
    Ok(())
}

fn print_diagnostics(diag: &Diagnostics) {
    println!("\n📊 OVERVIEW:");
    println!("   • Total streak days in database: {}", diag.total_days);
    if let Some((min, max)) = diag.day_range {
        println!("   • Day range: {min} to {max}");
        println!("   • Expected consecutive days: {}", max - min + 1);
    }

    println!("\n🔍 DIAGNOSIS RESULTS:");
    if diag.is_healthy() {
        println!("✅ DATABASE IS HEALTHY!");
        println!("   • No missing days");
        println!("   • No duplicate days");
        println!("   • All days are consecutive");
        return;
    }

    if !diag.missing_days.is_empty() {
        println!("❌ MISSING DAYS ({}):", diag.missing_days.len());
        println!(
            "   • Days: {}",
            diag.missing_days
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    if !diag.duplicate_days.is_empty() {
        println!("❌ DUPLICATE DAYS ({}):", diag.duplicate_days.len());
        println!(
            "   • Days: {}",
            diag.duplicate_days
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    if !diag.gaps.is_empty() {
        println!("⚠️  NON-CONSECUTIVE SEQUENCES ({} gaps):", diag.gaps.len());
        for (start, end) in &diag.gaps {
            if start == end {
                println!("   • Gap at day {start}");
            } else {
                println!("   • Gap from day {start} to {end}");
            }
        }
    }

    if diag.orphaned_results > 0 || diag.orphaned_users > 0 {
        println!("\n⚠️  DATA INTEGRITY ISSUES:");
        if diag.orphaned_results > 0 {
            println!(
                "   • {} orphaned results (results without corresponding streak)",
                diag.orphaned_results
            );
        }
        if diag.orphaned_users > 0 {
            println!(
                "   • {} orphaned users (users without any results)",
                diag.orphaned_users
            );
        }
    }
}

fn run_stats(db: &Database) -> Result<()> {
    let user_stats = stats::user_stats(db)?;

    println!("👥 USER STATISTICS:");
    print_user_stats_table(&user_stats);

    println!(
        "\n{:<15} {:<8} {:<8} {:<8} {:<8}",
        "Username", "Avg", "Part.%", "Streak", "Consist."
    );
    println!("{}", "-".repeat(55));
    for user in &user_stats {
        let avg = user
            .average_score
            .map_or_else(|| "-".to_string(), |a| format!("{a:.2}"));
        println!(
            "{:<15} {:<8} {:<8.1} {:<8} {:<8.2}",
            user.username,
            avg,
            user.participation_rate * 100.0,
            user.longest_streak,
            user.consistency_score
        );
    }

    Ok(())
}

fn run_export(db: &Database, format: &str, output: Option<&std::path::Path>) -> Result<()> {
    let series = stats::time_series(db)?;

    match format.to_lowercase().as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(&series)?;
            match output {
                Some(path) => {
                    std::fs::write(path, json)?;
                    info!(path = %path.display(), "exported time series");
                    println!("✅ Exported time series to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
        "csv" => {
            let mut writer: csv::Writer<Box<dyn Write>> = match output {
                Some(path) => csv::Writer::from_writer(Box::new(std::fs::File::create(path)?)),
                None => csv::Writer::from_writer(Box::new(std::io::stdout())),
            };

            let mut header = vec!["day".to_string()];
            header.extend(series.users.iter().map(|u| u.username.clone()));
            writer.write_record(&header)?;

            for (i, day) in series.days.iter().enumerate() {
                let mut record = vec![day.to_string()];
                for user in &series.users {
                    record.push(
                        user.points[i].map_or_else(String::new, |rank| rank.to_string()),
                    );
                }
                writer.write_record(&record)?;
            }
            writer.flush()?;

            if let Some(path) = output {
                println!("✅ Exported time series to {}", path.display());
            }
        }
        other => {
            warn!(format = other, "unknown export format");
            println!("❌ Unknown format '{other}'. Use json or csv.");
        }
    }

    Ok(())
}

fn run_delete_day(db: &Database, day: i64, yes: bool) -> Result<()> {
    let day = InputValidator::validate_day_number(day)?;

    let Some(detail) = stats::day_detail(db, day)? else {
        println!("❌ Day {day} not found in database!");
        return Ok(());
    };

    println!("\n⚠️  DELETION PREVIEW for Day {day}:");
    println!("   • Participants: {}", detail.participants());
    println!("   • Imported: {}", detail.imported_at);
    println!("   • Results to be deleted:");
    for result in &detail.results {
        let crown = if result.is_winner { "👑 " } else { "" };
        println!("     - {crown}{}: {}", result.username, result.score);
    }

    if !yes {
        println!("\n❓ Are you sure you want to delete Day {day} and all its data?");
        let confirmation = prompt("   Type 'DELETE' to confirm, or anything else to cancel: ")?;
        if confirmation.trim() != "DELETE" {
            println!("❌ Deletion cancelled.");
            return Ok(());
        }
    }

    match db.delete_day(day)? {
        Some(summary) => {
            println!("✅ Successfully deleted Day {day}!");
            println!("   • Removed {} results", summary.results_deleted);
        }
        None => println!("❌ Day {day} not found in database!"),
    }

    Ok(())
}

fn run_wipe(db: &Database) -> Result<()> {
    let overview = stats::overview(db)?;

    if overview.total_results == 0 && overview.total_days == 0 && overview.total_users == 0 {
        println!("   • Database is already empty!");
        return Ok(());
    }

    println!("📊 CURRENT DATABASE STATE:");
    print_brief_overview(&overview);

    println!("\n⚠️  WARNING: This will permanently delete ALL data");
    let confirm1 = prompt("Are you sure you want to clear the database? (yes/no): ")?;
    if confirm1.trim().to_lowercase() != "yes" {
        println!("❌ Operation cancelled.");
        return Ok(());
    }

    println!("\n🚨 FINAL WARNING: This action cannot be undone!");
    let confirm2 = prompt("Type 'DELETE ALL DATA' to confirm: ")?;
    if confirm2.trim() != "DELETE ALL DATA" {
        println!("❌ Operation cancelled.");
        return Ok(());
    }

    db.wipe()?;
    println!("\n✅ Database cleared successfully!");
    Ok(())
}

fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}
