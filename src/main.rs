use clap::Parser;
use cv_desk::cli::{Cli, Commands, CvCommands, ProfileCommands, ProfileUpdateArgs, passwords_match};
use cv_desk::models::{RegisterRequest, UserPatch};
use cv_desk::resources::Resources;
use cv_desk::{
    ApiClient, AppError, Config, KeyringTokenStore, LogSessionExpiryHandler, SessionManager, User,
};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref()).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {}", e);
        std::process::exit(1);
    });

    // Keep the guard alive so log messages are flushed on exit
    let _guard = cv_desk::logger::setup_logging(&config);

    if let Err(e) = run(&config, cli.command).await {
        tracing::error!("command failed: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: &Config, command: Commands) -> Result<(), AppError> {
    let store = Arc::new(KeyringTokenStore::new());
    let api = ApiClient::new(config, store.clone(), Arc::new(LogSessionExpiryHandler))?;
    let resources = Resources::new(&api);
    let mut session = SessionManager::new(api, store);
    session.bootstrap().await;

    match command {
        Commands::Login(args) => {
            let username = match args.username {
                Some(username) => username,
                None => prompt("Username: ")?,
            };
            let password = prompt_password("Password: ")?;
            session.login(&username, &password).await?;
            println!("Logged in as {}.", username);
        }

        Commands::Register(args) => {
            let password = prompt_password("Password: ")?;
            let confirmation = prompt_password("Confirm password: ")?;
            if !passwords_match(&password, &confirmation) {
                // Caller-side check; nothing has been sent to the server yet
                eprintln!("Passwords do not match.");
                std::process::exit(1);
            }

            session
                .register(&RegisterRequest {
                    username: args.username.clone(),
                    email: args.email,
                    password,
                    password2: confirmation,
                    full_name: args.full_name,
                })
                .await?;
            println!("Registered and logged in as {}.", args.username);
        }

        Commands::Logout => {
            session.logout().await;
            println!("Logged out.");
        }

        Commands::Whoami => match session.user() {
            Some(user) => print_user(user),
            None => println!("Not logged in."),
        },

        Commands::Profile(args) => match args.command {
            ProfileCommands::Show => match session.user() {
                Some(user) => print_user(user),
                None => println!("Not logged in."),
            },
            ProfileCommands::Update(args) => {
                let user = session.update_profile(&patch_from(args)).await?;
                println!("Profile updated.");
                print_user(&user);
            }
            ProfileCommands::ChangePassword => {
                let old_password = prompt_password("Current password: ")?;
                let new_password = prompt_password("New password: ")?;
                let confirmation = prompt_password("Confirm new password: ")?;
                if !passwords_match(&new_password, &confirmation) {
                    eprintln!("Passwords do not match.");
                    std::process::exit(1);
                }
                let message = session.change_password(&old_password, &new_password).await?;
                println!("{}", message);
            }
        },

        Commands::Cv(args) => match args.command {
            CvCommands::List => {
                let cvs = resources.cvs.list().await.map_err(AppError::Api)?;
                if cvs.is_empty() {
                    println!("No CVs yet.");
                }
                for cv in cvs {
                    let rating = cv
                        .ai_rating
                        .map(|r| format!("{}/100", r))
                        .unwrap_or_else(|| "unrated".to_string());
                    println!("{:>5}  {}  [{}]", cv.id, cv.payload.title, rating);
                }
            }
            CvCommands::Show { id } => {
                let cv = resources.cvs.get(id).await.map_err(AppError::Api)?;
                println!(
                    "{}",
                    serde_json::to_string_pretty(&cv).unwrap_or_else(|_| format!("{:?}", cv))
                );
            }
            CvCommands::Delete { id } => {
                resources.cvs.delete(id).await.map_err(AppError::Api)?;
                println!("CV {} deleted.", id);
            }
            CvCommands::Analyze { id } => {
                let result = resources.cvs.analyze(id).await.map_err(AppError::Api)?;
                println!("{}", result.message);
                println!(
                    "{}",
                    serde_json::to_string_pretty(&result.analysis)
                        .unwrap_or_else(|_| result.analysis.to_string())
                );
            }
            CvCommands::Duplicate { id } => {
                let result = resources.cvs.duplicate(id).await.map_err(AppError::Api)?;
                println!("{} (new CV id: {})", result.message, result.cv.id);
            }
        },
    }

    Ok(())
}

fn print_user(user: &User) {
    println!("{} <{}> (id {})", user.username, user.email, user.id);
    if let Some(full_name) = &user.full_name {
        println!("  name:     {}", full_name);
    }
    if let Some(location) = &user.location {
        println!("  location: {}", location);
    }
    if let Some(phone) = &user.phone_number {
        println!("  phone:    {}", phone);
    }
    if let Some(bio) = &user.bio {
        println!("  bio:      {}", bio);
    }
}

fn patch_from(args: ProfileUpdateArgs) -> UserPatch {
    UserPatch {
        email: args.email,
        full_name: args.full_name,
        profile_picture: None,
        phone_number: args.phone_number,
        location: args.location,
        bio: args.bio,
    }
}

fn prompt(label: &str) -> Result<String, AppError> {
    use std::io::Write;

    print!("{}", label);
    std::io::stdout().flush().map_err(io_error)?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line).map_err(io_error)?;
    Ok(line.trim().to_string())
}

fn prompt_password(label: &str) -> Result<String, AppError> {
    rpassword::prompt_password(label).map_err(io_error)
}

fn io_error(e: std::io::Error) -> AppError {
    AppError::Generic {
        message: format!("Input error: {}", e),
    }
}
