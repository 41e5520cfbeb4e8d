use anyhow::{Context, Result};
use dotenvy::dotenv;
use log::{error, info};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use medremind::commands::console::{render_list, render_upcoming, short_id, HELP};
use medremind::commands::{parse_command, resolve_id, Command};
use medremind::core::{Config, Session};
use medremind::database::Database;
use medremind::features::notifications::{NotifierSet, NotifyConfig};
use medremind::features::reminders::{
    Clock, InMemoryStore, ReminderScheduler, ReminderStore, SchedulerOptions, SystemClock,
};

/// Open the configured database, degrading to memory-only storage
async fn open_store(config: &Config) -> Arc<dyn ReminderStore> {
    match Database::new(&config.database_path).await {
        Ok(database) => Arc::new(database),
        Err(e) => {
            error!(
                "Failed to open database at {}: {e:#}. Reminders will not survive a restart",
                config.database_path
            );
            Arc::new(InMemoryStore::new())
        }
    }
}

/// Load notification settings; a missing file means console-only alerts
fn load_notify_config(path: &str) -> Result<NotifyConfig> {
    match NotifyConfig::load(path) {
        Ok(config) => {
            info!("📄 Loaded notification config from {path}");
            Ok(config)
        }
        Err(e) => {
            if std::path::Path::new(path).exists() {
                Err(e.context(format!("Invalid notification config at {path}")))
            } else {
                info!("📄 No notification config at {path} - console alerts only");
                Ok(NotifyConfig::default())
            }
        }
    }
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting medication reminders for user {}...", config.user_id);

    let store = open_store(&config).await;
    let notify_config = load_notify_config(&config.notify_config_path)?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let scheduler = ReminderScheduler::new(
        Session::new(config.user_id.clone()),
        store,
        Arc::new(NotifierSet::from_config(&notify_config)),
        clock.clone(),
        SchedulerOptions {
            rearm_daily: config.rearm_daily,
        },
    );

    let loaded = scheduler.load_reminders().await;
    println!(
        "💊 Medication reminders for {} ({} loaded). Type `help` for commands.",
        config.user_id,
        loaded.len()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt();

    while let Some(line) = lines
        .next_line()
        .await
        .context("Failed to read from stdin")?
    {
        match parse_command(&line) {
            Ok(Command::Add { name, time }) => match scheduler.add_reminder(&name, time).await {
                Ok(reminder) => {
                    let next = scheduler
                        .next_fire(&reminder.id)
                        .map(|at| at.format("%a %Y-%m-%d %H:%M").to_string())
                        .unwrap_or_else(|| "-".to_string());
                    println!(
                        "⏰ Got it! I'll remind you to take {} every day at {}.\n   Next: {next}  (id {})",
                        reminder.medication_name,
                        reminder.time_of_day,
                        short_id(&reminder.id)
                    );
                }
                Err(e) => println!("❌ {e}"),
            },
            Ok(Command::Remove { id }) => {
                match resolve_id(&id, &scheduler.list_reminders()) {
                    Ok(full_id) => {
                        scheduler.remove_reminder(&full_id).await;
                        println!("✅ Removed reminder {}.", short_id(&full_id));
                    }
                    Err(e) => println!("❌ {e}"),
                }
            }
            Ok(Command::List) => println!("{}", render_list(&scheduler.list_reminders())),
            Ok(Command::Next) => println!(
                "{}",
                render_upcoming(&scheduler.upcoming(), clock.now())
            ),
            Ok(Command::Help) => println!("{HELP}"),
            Ok(Command::Quit) => break,
            Ok(Command::Empty) => {}
            Err(e) => println!("❌ {e}"),
        }
        prompt();
    }

    scheduler.shutdown();
    info!("Goodbye");
    Ok(())
}
