//! gather CLI — operator interface to the events backend.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use gather_rs::app::AppContext;
use gather_rs::config::{Config, EnvSource, Loaded};
use gather_rs::model::{EventId, NewEvent, Visibility};
use gather_rs::telemetry::{TelemetryConfig, init_telemetry};

#[derive(Parser)]
#[command(name = "gather", about = "Community events backend")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Environment configuration
    Env {
        #[command(subcommand)]
        action: EnvAction,
    },
    /// Run pending database migrations
    Migrate,
    /// Event operations
    Event {
        #[command(subcommand)]
        action: EventAction,
    },
}

#[derive(Subcommand)]
enum EnvAction {
    /// Validate the environment and summarize it
    Check,
    /// Print the client-exposed config as JSON
    Public,
}

#[derive(Subcommand)]
enum EventAction {
    /// Create an event
    Create {
        title: String,
        /// Start time, RFC 3339 (e.g. 2026-11-01T18:00:00Z)
        starts_at: DateTime<Utc>,
        /// Creator email
        #[arg(long)]
        by: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        location: Option<String>,
        /// public | private
        #[arg(long, default_value = "public")]
        visibility: String,
    },
    /// List public events
    List {
        #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..))]
        limit: u32,
    },
    /// Show one event
    Show { id: uuid::Uuid },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let env = EnvSource::from_process();
    let _guard = init_telemetry(TelemetryConfig::from_source(&env, "gather"))?;

    match cli.command {
        Command::Env { action } => match action {
            EnvAction::Check => cmd_env_check(env),
            EnvAction::Public => {
                let config = Config::from_source(&env)?;
                println!("{}", serde_json::to_string_pretty(config.public())?);
                Ok(())
            }
        },
        Command::Migrate => {
            let ctx = AppContext::new(Config::from_source(&env)?);
            let db = ctx.connect_db().await?;
            db.migrate().await?;
            println!("Migrations applied.");
            Ok(())
        }
        Command::Event { action } => {
            let ctx = AppContext::new(Config::from_source(&env)?);
            let result = cmd_event(&ctx, action).await;
            if let Err(e) = ctx.shutdown().await {
                tracing::warn!(error = %e, "analytics shutdown failed");
            }
            result
        }
    }
}

fn cmd_env_check(env: EnvSource) -> anyhow::Result<()> {
    match Config::load(env)? {
        Loaded::Validated(config) => {
            println!("Mode:            {}", config.mode);
            println!(
                "Auth secret:     {}",
                if config.auth_secret.is_some() {
                    "set"
                } else {
                    "-"
                }
            );
            println!("Resend from:     {}", config.resend_from);
            println!("PostHog host:    {}", config.posthog_host);
            println!("Public host:     {}", config.public.posthog_host);
            println!(
                "OTLP endpoint:   {}",
                config.otel_endpoint.as_deref().unwrap_or("-")
            );
            println!("Environment OK.");
        }
        Loaded::Unchecked(raw) => {
            println!(
                "Validation skipped. NODE_ENV={}",
                raw.get("NODE_ENV").unwrap_or("-")
            );
        }
    }
    Ok(())
}

async fn cmd_event(ctx: &AppContext, action: EventAction) -> anyhow::Result<()> {
    let db = ctx.connect_db().await?;

    match action {
        EventAction::Create {
            title,
            starts_at,
            by,
            description,
            location,
            visibility,
        } => {
            let visibility: Visibility = visibility.parse()?;
            let mut new = NewEvent::new(title, starts_at, &by).visibility(visibility);
            if let Some(d) = description {
                new = new.description(d);
            }
            if let Some(l) = location {
                new = new.location(l);
            }

            let event = db.create_event(new).await?;
            ctx.analytics.client().capture(
                "event_created",
                &by,
                serde_json::json!({
                    "event_id": event.id.to_string(),
                    "visibility": event.visibility.to_string(),
                }),
            );
            println!("Created: {} ({})", event.id, event.title);
        }
        EventAction::List { limit } => {
            let events = db.list_public_events(limit).await?;
            if events.is_empty() {
                println!("No public events.");
                return Ok(());
            }

            println!("{:<36}  {:<16}  {:<30}  LOCATION", "ID", "STARTS", "TITLE");
            println!("{}", "-".repeat(100));
            for event in &events {
                let title = if event.title.len() > 30 {
                    event.title.chars().take(30).collect::<String>()
                } else {
                    event.title.clone()
                };
                println!(
                    "{:<36}  {:<16}  {:<30}  {}",
                    event.id,
                    event.starts_at.format("%Y-%m-%d %H:%M"),
                    title,
                    event.location.as_deref().unwrap_or("-")
                );
            }
            println!("\n{} event(s)", events.len());
        }
        EventAction::Show { id } => {
            let event = db.get_event(EventId(id)).await?;
            println!("ID:          {}", event.id);
            println!("Title:       {}", event.title);
            println!("Starts:      {}", event.starts_at);
            println!(
                "Location:    {}",
                event.location.as_deref().unwrap_or("-")
            );
            println!("Visibility:  {}", event.visibility);
            println!("Created by:  {}", event.created_by);
            println!("Created:     {}", event.created_at);
            if let Some(ref description) = event.description {
                println!("---\n{description}");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn list_limit(args: &[&str]) -> Result<u32, clap::Error> {
        let cli = Cli::try_parse_from(["gather", "event", "list"].iter().chain(args))?;
        match cli.command {
            Command::Event {
                action: EventAction::List { limit },
            } => Ok(limit),
            _ => panic!("parsed into the wrong subcommand"),
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn list_limit_defaults_and_parses() {
        assert_eq!(list_limit(&[]).unwrap(), 20);
        assert_eq!(list_limit(&["--limit", "5"]).unwrap(), 5);
    }

    #[test]
    fn list_limit_must_be_positive() {
        assert!(list_limit(&["--limit", "0"]).is_err());
        assert!(list_limit(&["--limit=-5"]).is_err());
        assert!(list_limit(&["--limit", "abc"]).is_err());
    }
}
