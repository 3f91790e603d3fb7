use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// cv-desk - command-line client for the CV builder platform
#[derive(Parser)]
#[command(name = "cv-desk")]
#[command(about = "Manage your account and CVs from the terminal", long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Log in and store the session
    Login(LoginArgs),

    /// Create an account
    Register(RegisterArgs),

    /// Log out and clear the stored session
    Logout,

    /// Show the currently logged-in user
    Whoami,

    /// View or change the account profile
    Profile(ProfileArgs),

    /// Work with CVs
    Cv(CvArgs),
}

#[derive(Args, Clone)]
pub struct LoginArgs {
    /// Username; prompted for when omitted
    #[arg(short, long)]
    pub username: Option<String>,
}

#[derive(Args, Clone)]
pub struct RegisterArgs {
    #[arg(short, long)]
    pub username: String,

    #[arg(short, long)]
    pub email: String,

    /// Display name shown on the profile
    #[arg(short, long)]
    pub full_name: Option<String>,
}

#[derive(Args, Clone)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommands,
}

#[derive(Subcommand, Clone)]
pub enum ProfileCommands {
    /// Print the profile
    Show,

    /// Update profile fields on the server
    Update(ProfileUpdateArgs),

    /// Change the account password
    ChangePassword,
}

#[derive(Args, Clone, Default)]
pub struct ProfileUpdateArgs {
    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub full_name: Option<String>,

    #[arg(long)]
    pub phone_number: Option<String>,

    #[arg(long)]
    pub location: Option<String>,

    #[arg(long)]
    pub bio: Option<String>,
}

#[derive(Args, Clone)]
pub struct CvArgs {
    #[command(subcommand)]
    pub command: CvCommands,
}

#[derive(Subcommand, Clone)]
pub enum CvCommands {
    /// List your CVs
    List,

    /// Show one CV
    Show { id: i64 },

    /// Delete a CV
    Delete { id: i64 },

    /// Run the AI review over a CV
    Analyze { id: i64 },

    /// Duplicate a CV
    Duplicate { id: i64 },
}

/// Caller-side check performed before any registration request is issued; a
/// mismatch means zero network calls.
pub fn passwords_match(password: &str, confirmation: &str) -> bool {
    password == confirmation
}
