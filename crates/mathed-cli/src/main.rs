use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use mathed_cache::{CacheConfig, RedisCache, invalidate};
use mathed_cli::admin::create_admin;
use mathed_cli::seeder::{self, DemoUsersConfig};
use mathed_db::{PgPool, init_db_pool, run_migrations};

#[derive(Parser)]
#[command(name = "mathed-cli")]
#[command(about = "MathEd CLI - Administrative tools for MathEd Romania", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an admin account
    CreateAdmin {
        /// First name of the admin
        #[arg(short = 'f', long)]
        first_name: Option<String>,

        /// Last name of the admin
        #[arg(short = 'l', long)]
        last_name: Option<String>,

        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Seed the Grade 5 curriculum (units, lessons, tests)
    SeedCurriculum {
        /// Delete the existing Grade 5 data first
        #[arg(long)]
        flush: bool,
    },
    /// Seed fake students and teachers for local development
    SeedDemoUsers {
        /// Number of students
        #[arg(long, default_value = "50")]
        students: usize,

        /// Number of teachers
        #[arg(long, default_value = "5")]
        teachers: usize,
    },
    /// Delete demo users (emails ending in @example.com, never admins)
    ClearDemoUsers,
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    let pool = init_db_pool().await;
    if let Err(e) = run_migrations(&pool).await {
        eprintln!("❌ Failed to run migrations: {}", e);
        std::process::exit(1);
    }

    match cli.command {
        Commands::CreateAdmin {
            first_name,
            last_name,
            email,
            password,
        } => handle_create_admin(&pool, first_name, last_name, email, password).await,
        Commands::SeedCurriculum { flush } => handle_seed_curriculum(&pool, flush).await,
        Commands::SeedDemoUsers { students, teachers } => {
            handle_seed_demo_users(&pool, students, teachers).await
        }
        Commands::ClearDemoUsers => handle_clear_demo_users(&pool).await,
    }
}

async fn handle_create_admin(
    pool: &PgPool,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    password: Option<String>,
) {
    let first_name = first_name.unwrap_or_else(|| {
        Input::new()
            .with_prompt("First name")
            .interact_text()
            .expect("Failed to read first name")
    });

    let last_name = last_name.unwrap_or_else(|| {
        Input::new()
            .with_prompt("Last name")
            .interact_text()
            .expect("Failed to read last name")
    });

    let email = email.unwrap_or_else(|| {
        Input::new()
            .with_prompt("Email address")
            .interact_text()
            .expect("Failed to read email")
    });

    let password = password.unwrap_or_else(|| {
        Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
            .expect("Failed to read password")
    });

    match create_admin(pool, &first_name, &last_name, &email, &password).await {
        Ok(id) => {
            println!("\n✅ Admin created successfully!");
            println!("   ID: {}", id);
            println!("   Email: {}", email.trim().to_lowercase());
            println!("   Name: {} {}", first_name, last_name);
        }
        Err(e) => {
            eprintln!("\n❌ Error creating admin: {}", e);
            std::process::exit(1);
        }
    }
}

async fn handle_seed_curriculum(pool: &PgPool, flush: bool) {
    println!("🌱 Seeding Grade 5 curriculum...");

    match seeder::seed_grade5(pool, flush).await {
        Ok(report) => {
            println!(
                "✅ Grade {}, {} units, {} lessons, {} tests created",
                if report.grade_created { "created" } else { "existed" },
                report.units_created,
                report.lessons_created,
                report.tests_created
            );
        }
        Err(e) => {
            eprintln!("\n❌ Error seeding curriculum: {}", e);
            std::process::exit(1);
        }
    }

    // Cached projections of the old curriculum would otherwise linger until TTL.
    let config = CacheConfig::from_env();
    if config.enabled {
        match RedisCache::from_config(&config).await {
            Ok(cache) => invalidate::content(Some(&cache)).await,
            Err(e) => eprintln!("⚠️  Could not connect to Redis to invalidate cache: {}", e),
        }
    }
}

async fn handle_seed_demo_users(pool: &PgPool, students: usize, teachers: usize) {
    let config = DemoUsersConfig {
        students,
        teachers,
        ..Default::default()
    };

    match seeder::seed_demo_users(pool, config).await {
        Ok(total) => println!("✅ Created {} demo users", total),
        Err(e) => {
            eprintln!("\n❌ Error seeding demo users: {}", e);
            std::process::exit(1);
        }
    }
}

async fn handle_clear_demo_users(pool: &PgPool) {
    match seeder::clear_demo_users(pool).await {
        Ok(_) => println!("✅ Cleared demo users"),
        Err(e) => {
            eprintln!("\n❌ Error clearing demo users: {}", e);
            std::process::exit(1);
        }
    }
}
