use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use tenauth::cli::create_superadmin;

#[derive(Parser)]
#[command(name = "tenauth-cli")]
#[command(about = "TenAuth CLI - Administrative tools for TenAuth", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new superadmin account
    CreateSuperadmin {
        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Display name of the superadmin
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    // Initialize database connection
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database");

    let cli = Cli::parse();

    match cli.command {
        Commands::CreateSuperadmin {
            email,
            name,
            password,
        } => handle_create_superadmin(&pool, email, name, password).await,
    }
}

async fn handle_create_superadmin(
    pool: &sqlx::postgres::PgPool,
    email: Option<String>,
    name: Option<String>,
    password: Option<String>,
) {
    // Use provided values or prompt interactively
    let email = email.unwrap_or_else(|| {
        Input::new()
            .with_prompt("Email address")
            .interact_text()
            .expect("Failed to read email")
    });

    let name = name.unwrap_or_else(|| {
        Input::new()
            .with_prompt("Display name")
            .interact_text()
            .expect("Failed to read display name")
    });

    let password = password.unwrap_or_else(|| {
        Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
            .expect("Failed to read password")
    });

    match create_superadmin(&pool, &email, &name, &password).await {
        Ok(_) => {
            println!("\n✅ Superadmin created successfully!");
            println!("   Email: {}", email);
            println!("   Name: {}", name);
        }
        Err(e) => {
            eprintln!("\n❌ Error creating superadmin: {}", e);
            std::process::exit(1);
        }
    }
}
