//! Ignite Gym - track your workouts from the terminal
#![allow(clippy::uninlined_format_args)]

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use ignite_gym::api::{GymApi, GymClient, ProfileUpdate};
use ignite_gym::auth::SessionStore;
use ignite_gym::avatar::prepare_avatar;
use ignite_gym::error::AppError;
use ignite_gym::validation::schemas::{self, fields};
use ignite_gym::validation::{FormValues, Schema};
use ignite_gym::{Config, Session, User};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (RUST_LOG=debug for verbose output)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Parse CLI arguments
    match parse_args()? {
        Command::Run => ignite_gym::app::run().await,
        Command::SignIn { email } => sign_in_cli(&email).await,
        Command::SignUp { name, email } => sign_up_cli(&name, &email).await,
        Command::SignOut => sign_out_cli(),
        Command::WhoAmI => whoami(),
        Command::Groups => groups_cli().await,
        Command::Exercises { group } => exercises_cli(&group).await,
        Command::History => history_cli().await,
        Command::Profile {
            name,
            change_password,
        } => profile_cli(name.as_deref(), change_password).await,
        Command::Avatar { path } => avatar_cli(path).await,
        Command::Help => {
            print_help();
            Ok(())
        }
        Command::Version => {
            print_version();
            Ok(())
        }
    }
}

/// CLI commands
enum Command {
    Run,
    SignIn {
        email: String,
    },
    SignUp {
        name: String,
        email: String,
    },
    SignOut,
    WhoAmI,
    Groups,
    Exercises {
        group: String,
    },
    History,
    Profile {
        name: Option<String>,
        change_password: bool,
    },
    Avatar {
        path: PathBuf,
    },
    Help,
    Version,
}

fn parse_args() -> Result<Command> {
    let args: Vec<String> = std::env::args().collect();

    let Some(command) = args.get(1) else {
        return Ok(Command::Run);
    };
    let arg = |i: usize, what: &str| {
        args.get(i)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Missing {what}\nRun 'ignite-gym --help' for usage"))
    };

    match command.as_str() {
        "-h" | "--help" | "help" => Ok(Command::Help),
        "-v" | "--version" | "version" => Ok(Command::Version),
        "signin" | "login" => Ok(Command::SignIn {
            email: arg(2, "email")?,
        }),
        "signup" => Ok(Command::SignUp {
            name: arg(2, "name")?,
            email: arg(3, "email")?,
        }),
        "signout" | "logout" => Ok(Command::SignOut),
        "whoami" => Ok(Command::WhoAmI),
        "groups" => Ok(Command::Groups),
        "exercises" => Ok(Command::Exercises {
            group: arg(2, "muscle group")?,
        }),
        "history" => Ok(Command::History),
        "profile" => {
            let name = args
                .iter()
                .position(|a| a == "--name" || a == "-n")
                .and_then(|i| args.get(i + 1))
                .cloned();
            let change_password = args.iter().any(|a| a == "--password" || a == "-p");
            Ok(Command::Profile {
                name,
                change_password,
            })
        }
        "avatar" => Ok(Command::Avatar {
            path: PathBuf::from(arg(2, "image path")?),
        }),
        other => Err(anyhow::anyhow!(
            "Unknown command: {other}\nRun 'ignite-gym --help' for usage"
        )),
    }
}

fn print_help() {
    let config_path = Config::default_path()
        .map_or_else(|_| "Unknown".to_string(), |p| p.display().to_string());

    println!(
        r#"{}
🏋️ Ignite Gym - track your workouts from the terminal

USAGE:
    ignite-gym                         Launch TUI
    ignite-gym [COMMAND]

COMMANDS:
    signin <email>                     Sign in (password read from stdin)
    signup <name> <email>              Create an account and sign in
                                       (password and confirmation from stdin)
    signout                            Forget the stored session
    whoami                             Show the signed-in user

    groups                             List muscle groups
    exercises <group>                  List the exercises of a group
    history                            Show your exercise history

    profile [OPTIONS]                  Update your profile
      Options:
        -n, --name <name>              New display name
        -p, --password                 Change password (prompts on stdin)
    avatar <path>                      Upload a new avatar (up to 5MB)

OPTIONS:
    -h, --help                         Show this help message
    -v, --version                      Show version information

KEYBINDINGS (TUI):
    Tab / Shift+Tab   Move between fields
    Enter             Next field, submit on the last one
    1 / 2 / 3         Home / History / Profile
    F1 or ?           Help
    F2 or t           Change theme

CONFIG:
    {}
"#,
        ignite_gym::LOGO,
        config_path
    );
}

fn print_version() {
    println!("ignite-gym {}", ignite_gym::VERSION);
}

/// Read one line from stdin without echo handling (pipes and prompts alike)
fn read_secret(prompt: &str) -> Result<String> {
    eprint!("{prompt}: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Run a form schema over CLI input; field errors become one error listing them all
fn validate(schema: &Schema, pairs: &[(&str, String)]) -> Result<FormValues> {
    let values: FormValues = pairs
        .iter()
        .map(|(field, value)| ((*field).to_string(), value.clone()))
        .collect();

    schema.validate(&values).map_err(|errors| {
        let lines: Vec<String> = errors
            .iter()
            .map(|(field, message)| format!("  {field}: {message}"))
            .collect();
        anyhow::anyhow!("Invalid input:\n{}", lines.join("\n"))
    })
}

/// Normalised value of a validated field
fn field<'a>(values: &'a FormValues, name: &str) -> &'a str {
    values.get(name).map_or("", String::as_str)
}

/// Stored session plus a client carrying its token
fn open_session() -> Result<(Session, GymClient)> {
    let config = Config::load()?;
    let session = Session::restore(SessionStore::open()?);
    let mut client = GymClient::from_config(&config);
    client.set_token(session.token().map(String::from));
    Ok((session, client))
}

fn require_user(session: &Session) -> Result<User> {
    session
        .user()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Not signed in. Run: ignite-gym signin <email>"))
}

/// Turn an API failure into the message a user should see
fn report(error: &AppError, fallback: &str) -> anyhow::Error {
    if !error.is_application() {
        tracing::error!("request failed: {error}");
    }
    anyhow::anyhow!(error.user_message(fallback))
}

async fn sign_in_cli(email: &str) -> Result<()> {
    let password = read_secret("Password")?;
    let values = validate(
        &schemas::sign_in(),
        &[(fields::EMAIL, email.to_string()), (fields::PASSWORD, password)],
    )?;

    let (mut session, mut client) = open_session()?;
    session
        .sign_in(&mut client, field(&values, fields::EMAIL), field(&values, fields::PASSWORD))
        .await
        .map_err(|e| report(&e, "Could not sign in, try again later."))?;

    let user = require_user(&session)?;
    println!("✓ Signed in as {} <{}>", user.name, user.email);
    Ok(())
}

async fn sign_up_cli(name: &str, email: &str) -> Result<()> {
    let password = read_secret("Password")?;
    let confirmation = read_secret("Confirm password")?;
    let values = validate(
        &schemas::sign_up(),
        &[
            (fields::NAME, name.to_string()),
            (fields::EMAIL, email.to_string()),
            (fields::PASSWORD, password),
            (fields::PASSWORD_CONFIRM, confirmation),
        ],
    )?;

    let (mut session, mut client) = open_session()?;
    session
        .sign_up(
            &mut client,
            field(&values, fields::NAME),
            field(&values, fields::EMAIL),
            field(&values, fields::PASSWORD),
        )
        .await
        .map_err(|e| report(&e, "Could not create the account, try again later."))?;

    println!("✓ Account created, welcome {}!", name);
    Ok(())
}

fn sign_out_cli() -> Result<()> {
    let (mut session, mut client) = open_session()?;
    if !session.is_authenticated() {
        println!("Not signed in.");
        return Ok(());
    }
    session.sign_out_from(&mut client);
    println!("✓ Signed out");
    Ok(())
}

fn whoami() -> Result<()> {
    let (session, client) = open_session()?;
    let Some(user) = session.user() else {
        println!("Not signed in.");
        return Ok(());
    };

    println!("{} <{}>", user.name, user.email);
    match &user.avatar {
        Some(file) => println!("  Avatar: {}", client.avatar_url(file)),
        None => println!("  Avatar: none"),
    }
    println!("  Server: {}", client.base_url());
    Ok(())
}

async fn groups_cli() -> Result<()> {
    let (session, client) = open_session()?;
    require_user(&session)?;

    let groups = client
        .groups()
        .await
        .map_err(|e| report(&e, "Could not load the muscle groups."))?;
    for group in groups {
        println!("{group}");
    }
    Ok(())
}

async fn exercises_cli(group: &str) -> Result<()> {
    let (session, client) = open_session()?;
    require_user(&session)?;

    let exercises = client
        .exercises_by_group(group)
        .await
        .map_err(|e| report(&e, "Could not load the exercises."))?;

    if exercises.is_empty() {
        println!("No exercises in {group}.");
    }
    for exercise in exercises {
        println!("[{}] {} · {}", exercise.id, exercise.name, exercise.summary());
    }
    Ok(())
}

async fn history_cli() -> Result<()> {
    let (session, client) = open_session()?;
    require_user(&session)?;

    let days = client
        .history()
        .await
        .map_err(|e| report(&e, "Could not load the history."))?;

    if days.is_empty() {
        println!("No exercises registered yet.");
    }
    for day in days {
        println!("\n{}", day.title);
        println!("{}", "─".repeat(40));
        for entry in day.data {
            println!("  {}  {:<12} {}", entry.hour, entry.group.to_uppercase(), entry.name);
        }
    }
    Ok(())
}

async fn profile_cli(name: Option<&str>, change_password: bool) -> Result<()> {
    let (mut session, client) = open_session()?;
    let user = require_user(&session)?;

    let (old_password, password, confirmation) = if change_password {
        (
            read_secret("Current password")?,
            read_secret("New password")?,
            read_secret("Confirm new password")?,
        )
    } else {
        (String::new(), String::new(), String::new())
    };

    let values = validate(
        &schemas::profile(),
        &[
            (fields::NAME, name.unwrap_or(&user.name).to_string()),
            (fields::EMAIL, user.email.clone()),
            (fields::OLD_PASSWORD, old_password),
            (fields::PASSWORD, password),
            (fields::PASSWORD_CONFIRM, confirmation),
        ],
    )?;

    let update = ProfileUpdate::new(
        field(&values, fields::NAME),
        values.get(fields::PASSWORD).cloned(),
        values.get(fields::OLD_PASSWORD).cloned(),
    );
    session
        .update_profile(&client, &update)
        .await
        .map_err(|e| report(&e, "Could not update the profile, try again later."))?;

    println!("✓ Profile updated");
    Ok(())
}

async fn avatar_cli(path: PathBuf) -> Result<()> {
    let (mut session, client) = open_session()?;
    let user = require_user(&session)?;

    validate(
        &schemas::avatar(),
        &[(fields::AVATAR_PATH, path.display().to_string())],
    )?;
    let upload = match prepare_avatar(&path, &user.name) {
        Ok(upload) => upload,
        Err(e) => bail!("⚠ {e}"),
    };

    session
        .update_avatar(&client, &upload)
        .await
        .map_err(|e| report(&e, "Could not update the avatar, try again later."))?;

    if let Some(file) = session.user().and_then(|u| u.avatar.as_deref()) {
        println!("✓ Avatar updated: {}", client.avatar_url(file));
    }
    Ok(())
}
