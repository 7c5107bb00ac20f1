use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::{error, info};

use tunnelog::configuration::config::Config;
use tunnelog::controller::controller_handler::Controller;
use tunnelog::session_store::types::TIME_FORMAT;

#[derive(Parser)]
#[command(name = "tunnelog")]
#[command(version)]
#[command(about = "Records OpenVPN client sessions from the server status log")]
struct Args {
    /// Optional TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to the OpenVPN status log
    #[arg(long, env = "TUNNELOG_STATUS_LOG")]
    status_log: Option<PathBuf>,

    /// Path to the CSV session log
    #[arg(long, env = "TUNNELOG_SESSION_LOG")]
    session_log: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Reconcile the current status snapshot into the session log (default)
    Record,
    /// List currently connected clients
    Live,
    /// List recorded sessions
    History {
        /// Only sessions without an end time
        #[arg(long)]
        active: bool,
        /// Only sessions with an end time
        #[arg(long)]
        closed: bool,
    },
    /// Delete one session row from the log
    Delete { session_id: String },
    /// Clear the session log back to a header-only file
    Reset,
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match Config::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                error!("Unable to import configuration from file: {}", e);
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };
    config.apply_overrides(args.status_log, args.session_log);

    let controller = Controller::new(config);

    let result = match args.command.unwrap_or(Command::Record) {
        Command::Record => controller.record().map(|_| ()).map_err(|e| e.to_string()),
        Command::Live => match controller.live() {
            Ok(connections) => {
                println!("user\tpublic_ip\ttunnel_ip\tconnected_since");
                for conn in connections {
                    println!(
                        "{}\t{}\t{}\t{}",
                        conn.user,
                        conn.public_ip,
                        conn.tunnel_ip,
                        conn.connected_since.format(TIME_FORMAT)
                    );
                }
                Ok(())
            }
            Err(e) => Err(e.to_string()),
        },
        Command::History { active, closed } => match controller.history() {
            Ok(mut sessions) => {
                if active && !closed {
                    sessions.retain(|s| s.is_active());
                } else if closed && !active {
                    sessions.retain(|s| !s.is_active());
                }
                println!("session_id\tstart_time\tend_time\tduration_seconds");
                for session in sessions {
                    let end = session
                        .end_time
                        .map(|t| t.format(TIME_FORMAT).to_string())
                        .unwrap_or_else(|| "-".to_string());
                    let duration = session
                        .duration_seconds
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "-".to_string());
                    println!(
                        "{}\t{}\t{}\t{}",
                        session.session_id,
                        session.start_time.format(TIME_FORMAT),
                        end,
                        duration
                    );
                }
                Ok(())
            }
            Err(e) => Err(e.to_string()),
        },
        Command::Delete { session_id } => match controller.delete_session(&session_id) {
            Ok(true) => Ok(()),
            Ok(false) => {
                info!("No session with id {}", session_id);
                Ok(())
            }
            Err(e) => Err(e.to_string()),
        },
        Command::Reset => controller.reset().map_err(|e| e.to_string()),
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}
