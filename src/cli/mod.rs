use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser)]
#[command(name = "slipcheck")]
#[command(about = "Verify a student ID and upload a payment slip")]
#[command(long_about = "slipcheck looks up a student by ID against the verification backend and, once \
                       the student is known, uploads a payment-slip image for later validation. \
                       Run without a subcommand to start an interactive session.")]
pub struct Cli {
    /// Backend root URL, overriding configuration
    #[arg(long, global = true, help = "Backend root URL (overrides slipcheck.toml and environment)")]
    pub backend: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive session: type an ID, validate it, choose and upload a slip
    Session,
    /// Look up a student ID and print the greeting
    Lookup {
        /// Student identifier to resolve
        student_id: String,
    },
    /// Resolve a student and upload a slip image in one go
    Submit {
        /// Student identifier to resolve before uploading
        #[arg(long, help = "Student ID that must resolve before the slip is uploaded")]
        student_id: String,
        /// Path to the slip image
        image: PathBuf,
    },
    /// Print the effective configuration as TOML
    Config,
}
