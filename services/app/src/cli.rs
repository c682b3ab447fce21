use anyhow::{Result, anyhow, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{Value, json};
use std::path::PathBuf;

use app::{AppState, Navigation};
use auth::models::{LoginCredentials, NewUser};
use common::ApiError;
use tickets::models::{NewTicket, TicketPatch};

#[derive(Parser)]
#[command(name = "ticketapp")]
#[command(about = "Ticket tracking demo over a mock backend", long_about = None)]
pub(crate) struct Cli {
    /// Settings file (defaults to ./ticketapp.toml when present)
    #[arg(long, global = true)]
    pub(crate) config: Option<PathBuf>,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Create an account and log in
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Log in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// End the current session
    Logout,

    /// Show the current session
    Whoami,

    /// Navigate to a path and report what the router does
    Visit { path: String },

    /// Manage tickets (requires a valid session)
    #[command(subcommand)]
    Tickets(TicketCommands),
}

#[derive(Subcommand)]
pub(crate) enum TicketCommands {
    /// List tickets, most recent first
    List {
        /// Total tries when the network flakes
        #[arg(long, default_value_t = 3)]
        attempts: u32,
    },

    /// Show one ticket
    Show { id: String },

    /// Create a ticket
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "open")]
        status: String,
        /// Extra field as key=value; the value is parsed as JSON when possible
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, Value)>,
    },

    /// Patch a ticket
    Update {
        id: String,
        /// Field to set as key=value; the value is parsed as JSON when possible
        #[arg(long = "set", value_parser = parse_field, required = true)]
        fields: Vec<(String, Value)>,
    },

    /// Delete a ticket
    Remove { id: String },
}

fn parse_field(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    if key.is_empty() {
        return Err(format!("missing key in '{raw}'"));
    }

    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn api_error(err: ApiError) -> anyhow::Error {
    anyhow!("[{}] {}", err.kind().as_str(), err)
}

fn emit<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) async fn run(state: &AppState, command: Commands) -> Result<()> {
    match command {
        Commands::Signup {
            name,
            email,
            password,
        } => {
            let payload = NewUser {
                name,
                email,
                password,
            };
            let session = state.session.signup(&payload).await.map_err(api_error)?;
            emit(&session)
        }

        Commands::Login { email, password } => {
            let credentials = LoginCredentials { email, password };
            let session = state
                .session
                .login(&credentials)
                .await
                .map_err(api_error)?;
            emit(&session)
        }

        Commands::Logout => {
            state.session.logout().await.map_err(api_error)?;
            emit(&json!({ "loggedOut": true }))
        }

        Commands::Whoami => {
            let session = state.session.session().await;
            emit(&json!({
                "authenticated": session.is_some(),
                "session": session,
            }))
        }

        Commands::Visit { path } => emit(&state.navigate(&path).await),

        Commands::Tickets(command) => {
            let navigation = state.navigate("/tickets").await;
            if let Navigation::Redirect { to, .. } = &navigation {
                emit(&navigation)?;
                bail!("Not logged in or session expired; continue at {to}");
            }
            run_tickets(state, command).await
        }
    }
}

async fn run_tickets(state: &AppState, command: TicketCommands) -> Result<()> {
    let api = &state.tickets;

    match command {
        TicketCommands::List { attempts } => {
            let tickets = api.list_with_retry(attempts).await.map_err(api_error)?;
            emit(&tickets)
        }

        TicketCommands::Show { id } => emit(&api.get(&id).await.map_err(api_error)?),

        TicketCommands::Create {
            title,
            status,
            fields,
        } => {
            let new_ticket = fields
                .into_iter()
                .fold(NewTicket::new(title, status), |ticket, (key, value)| {
                    ticket.with_field(key, value)
                });
            emit(&api.create(new_ticket).await.map_err(api_error)?)
        }

        TicketCommands::Update { id, fields } => {
            let patch: TicketPatch = fields.into_iter().collect();
            emit(&api.update(&id, &patch).await.map_err(api_error)?)
        }

        TicketCommands::Remove { id } => {
            api.remove(&id).await.map_err(api_error)?;
            emit(&json!({ "success": true }))
        }
    }
}
