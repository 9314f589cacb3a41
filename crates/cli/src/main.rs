mod config;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::{ColoredString, Colorize};
use uuid::Uuid;

use auth::{AccountsFile, LocalAuthProvider};
use diagnosis::{classify, validate_diastolic, validate_measurement, validate_systolic, Category};
use genai_client::GeminiClient;
use records::{InMemoryRecordStore, LifestyleAdvice, ProfilePatch, Reading, ReadingStats, Snapshot};
use server::{AccountService, ReadingUpdate, RecommendationOrchestrator, Session};

use crate::config::AppConfig;

/// bp-tracker - Blood pressure log with lifestyle recommendations
#[derive(Parser)]
#[command(name = "bp-tracker")]
#[command(about = "Record blood-pressure readings and get lifestyle recommendations", long_about = None)]
struct Cli {
    /// Directory holding the record and account files
    #[arg(short, long, env = "BP_DATA_DIR", default_value = ".bp-tracker")]
    data_dir: PathBuf,

    /// Account email
    #[arg(long, env = "BP_EMAIL", global = true)]
    email: Option<String>,

    /// Account password
    #[arg(long, env = "BP_PASSWORD", global = true, hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Signup,

    /// Record a new reading
    Add {
        #[arg(long, allow_negative_numbers = true)]
        systolic: i32,

        #[arg(long, allow_negative_numbers = true)]
        diastolic: i32,

        #[arg(long)]
        notes: Option<String>,
    },

    /// List readings, newest first
    List,

    /// Show one reading
    Show {
        #[arg(long)]
        id: Uuid,
    },

    /// Show lifestyle recommendations for a reading
    Recommend {
        #[arg(long)]
        id: Uuid,
    },

    /// Edit a reading. An empty --notes clears the notes.
    Edit {
        #[arg(long)]
        id: Uuid,

        #[arg(long, allow_negative_numbers = true)]
        systolic: Option<i32>,

        #[arg(long, allow_negative_numbers = true)]
        diastolic: Option<i32>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete a reading and its recommendations
    Delete {
        #[arg(long)]
        id: Uuid,
    },

    /// Summary statistics over all readings
    Stats,

    /// Show your profile
    Profile,

    /// Edit your profile. An empty value clears a field.
    ProfileSet {
        #[arg(long)]
        full_name: Option<String>,

        #[arg(long)]
        age: Option<u32>,

        #[arg(long)]
        gender: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        emergency_contact: Option<String>,
    },

    /// Classify a measurement without recording it
    Classify {
        #[arg(long, allow_negative_numbers = true)]
        systolic: i32,

        #[arg(long, allow_negative_numbers = true)]
        diastolic: i32,
    },
}

/// Services wired over the on-disk files.
struct App {
    config: AppConfig,
    store: Arc<InMemoryRecordStore>,
    auth: Arc<LocalAuthProvider>,
    orchestrator: RecommendationOrchestrator,
    accounts: AccountService,
}

impl App {
    fn open(config: AppConfig) -> Result<Self> {
        let snapshot = Snapshot::load(&config.records_path())
            .with_context(|| format!("Failed to load records from {}", config.records_path().display()))?;
        let accounts_file = AccountsFile::load(&config.accounts_path())
            .with_context(|| format!("Failed to load accounts from {}", config.accounts_path().display()))?;

        let store = Arc::new(InMemoryRecordStore::from_snapshot(snapshot));
        let auth = Arc::new(LocalAuthProvider::from_accounts(accounts_file));
        let generator =
            Arc::new(GeminiClient::new(config.gemini().clone()).context("Failed to create text-generation client")?);
        tracing::info!(
            "Recommendations from model {} at {}",
            generator.model(),
            generator.service_address()
        );

        let orchestrator = RecommendationOrchestrator::new(store.clone(), generator);
        let accounts = AccountService::new(auth.clone(), store.clone());

        Ok(Self {
            config,
            store,
            auth,
            orchestrator,
            accounts,
        })
    }

    /// Write records and accounts back to the data directory.
    async fn save(&self) -> Result<()> {
        self.store
            .snapshot()
            .await
            .save(&self.config.records_path())
            .context("Failed to save records")?;
        self.auth
            .export_accounts()
            .await
            .save(&self.config.accounts_path())
            .context("Failed to save accounts")?;
        tracing::debug!("Saved data to {}", self.config.data_dir().display());
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Classification needs no account or data files
    if let Commands::Classify { systolic, diastolic } = cli.command {
        return handle_classify(systolic, diastolic);
    }

    let config = AppConfig::from_env(cli.data_dir.clone())?;
    let app = App::open(config)?;
    let (email, password) = credentials(&cli)?;

    if let Commands::Signup = cli.command {
        let user = app.accounts.sign_up(&email, &password).await?;
        app.save().await?;
        println!("{} Created account {} ({})", "✓".green(), user.email, user.id);
        return Ok(());
    }

    let mut session = app
        .accounts
        .sign_in(&email, &password)
        .await
        .context("Sign-in failed")?;

    let mutated = match cli.command {
        Commands::Add {
            systolic,
            diastolic,
            notes,
        } => handle_add(&app, &session, systolic, diastolic, notes).await?,
        Commands::List => handle_list(&app, &session).await?,
        Commands::Show { id } => handle_show(&app, &session, id).await?,
        Commands::Recommend { id } => handle_recommend(&app, &session, id).await?,
        Commands::Edit {
            id,
            systolic,
            diastolic,
            notes,
        } => {
            let update = ReadingUpdate {
                systolic,
                diastolic,
                notes,
            };
            handle_edit(&app, &session, id, update).await?
        }
        Commands::Delete { id } => handle_delete(&app, &session, id).await?,
        Commands::Stats => handle_stats(&app, &session).await?,
        Commands::Profile => handle_profile(&app, &session).await?,
        Commands::ProfileSet {
            full_name,
            age,
            gender,
            phone,
            emergency_contact,
        } => {
            let patch = ProfilePatch {
                full_name,
                age,
                gender,
                phone,
                emergency_contact,
            };
            handle_profile_set(&app, &mut session, patch).await?
        }
        Commands::Signup | Commands::Classify { .. } => false,
    };

    if mutated {
        app.save().await?;
    }
    app.accounts.sign_out(session).await?;

    Ok(())
}

fn credentials(cli: &Cli) -> Result<(String, String)> {
    let email = cli
        .email
        .clone()
        .ok_or_else(|| anyhow!("No email given; pass --email or set BP_EMAIL"))?;
    let password = cli
        .password
        .clone()
        .ok_or_else(|| anyhow!("No password given; pass --password or set BP_PASSWORD"))?;
    Ok((email, password))
}

/// Handle the 'classify' command
fn handle_classify(systolic: i32, diastolic: i32) -> Result<()> {
    validate_measurement(systolic, diastolic)?;
    let category = classify(systolic, diastolic);
    println!("{}/{} mmHg: {}", systolic, diastolic, paint(category));
    Ok(())
}

/// Handle the 'add' command
async fn handle_add(
    app: &App,
    session: &Session,
    systolic: i32,
    diastolic: i32,
    notes: Option<String>,
) -> Result<bool> {
    validate_measurement(systolic, diastolic)?;

    let start = Instant::now();
    let reading = app
        .orchestrator
        .add_reading(session, systolic, diastolic, notes)
        .await?;
    println!("{} Recorded reading in {:?}", "✓".green(), start.elapsed());
    print_reading(&reading);

    if !app.orchestrator.has_cached(session, reading.id).await {
        println!(
            "{}",
            "Recommendations are not ready yet; run 'recommend' to try again.".yellow()
        );
    }
    Ok(true)
}

/// Handle the 'list' command
async fn handle_list(app: &App, session: &Session) -> Result<bool> {
    let readings = app.orchestrator.list_readings(session).await?;
    if readings.is_empty() {
        println!("No readings yet.");
        return Ok(false);
    }

    println!("{}", format!("{} reading(s):", readings.len()).bold().blue());
    for reading in &readings {
        println!(
            "{}  {}  {:>3}/{:<3} mmHg  {}",
            reading.id.to_string().dimmed(),
            reading.created_at.format("%Y-%m-%d %H:%M"),
            reading.systolic,
            reading.diastolic,
            paint(reading.diagnosis)
        );
    }
    Ok(false)
}

/// Handle the 'show' command
async fn handle_show(app: &App, session: &Session, id: Uuid) -> Result<bool> {
    let reading = app.orchestrator.get_reading(session, id).await?;
    print_reading(&reading);
    Ok(false)
}

/// Handle the 'recommend' command
async fn handle_recommend(app: &App, session: &Session, id: Uuid) -> Result<bool> {
    let reading = app.orchestrator.get_reading(session, id).await?;
    let cached_before = app.orchestrator.has_cached(session, id).await;

    let advice = app.orchestrator.get_recommendations(session, id).await?;
    print_reading(&reading);
    print_advice(&advice);

    // A newly generated recommendation lands in the store
    Ok(!cached_before && app.orchestrator.has_cached(session, id).await)
}

/// Handle the 'edit' command
async fn handle_edit(app: &App, session: &Session, id: Uuid, update: ReadingUpdate) -> Result<bool> {
    if let Some(systolic) = update.systolic {
        validate_systolic(systolic)?;
    }
    if let Some(diastolic) = update.diastolic {
        validate_diastolic(diastolic)?;
    }

    let reading = app.orchestrator.update_reading(session, id, update).await?;
    println!("{} Updated reading", "✓".green());
    print_reading(&reading);
    Ok(true)
}

/// Handle the 'delete' command
async fn handle_delete(app: &App, session: &Session, id: Uuid) -> Result<bool> {
    app.orchestrator.delete_reading(session, id).await?;
    println!("{} Deleted reading {}", "✓".green(), id);
    Ok(true)
}

/// Handle the 'stats' command
async fn handle_stats(app: &App, session: &Session) -> Result<bool> {
    let stats = app.orchestrator.reading_stats(session).await?;
    print_stats(&stats);
    Ok(false)
}

/// Handle the 'profile' command
async fn handle_profile(app: &App, session: &Session) -> Result<bool> {
    let profile = app.accounts.get_profile(session).await?;
    let show = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    println!("{}", "Profile:".bold().blue());
    println!("{}Email: {}", "• ".green(), show(&profile.email));
    println!("{}Full name: {}", "• ".green(), show(&profile.full_name));
    println!(
        "{}Age: {}",
        "• ".green(),
        profile.age.map_or_else(|| "-".to_string(), |a| a.to_string())
    );
    println!("{}Gender: {}", "• ".green(), show(&profile.gender));
    println!("{}Phone: {}", "• ".green(), show(&profile.phone));
    println!("{}Emergency contact: {}", "• ".green(), show(&profile.emergency_contact));
    Ok(false)
}

/// Handle the 'profile-set' command
async fn handle_profile_set(app: &App, session: &mut Session, patch: ProfilePatch) -> Result<bool> {
    if patch == ProfilePatch::default() {
        println!("Nothing to change.");
        return Ok(false);
    }
    app.accounts.update_profile(session, patch).await?;
    println!("{} Profile updated", "✓".green());
    handle_profile(app, session).await?;
    Ok(true)
}

fn paint(category: Category) -> ColoredString {
    match category {
        Category::Normal => category.label().green(),
        Category::Elevated => category.label().yellow(),
        Category::HypertensionStage1 => category.label().bright_red(),
        Category::HypertensionStage2 => category.label().red(),
        Category::HypertensiveCrisis => category.label().red().bold(),
    }
}

fn print_reading(reading: &Reading) {
    println!("{}", format!("Reading {}", reading.id).bold().blue());
    println!(
        "{}Taken: {}",
        "• ".green(),
        reading.created_at.format("%Y-%m-%d %H:%M UTC")
    );
    println!(
        "{}Blood pressure: {}/{} mmHg",
        "• ".green(),
        reading.systolic,
        reading.diastolic
    );
    println!("{}Diagnosis: {}", "• ".green(), paint(reading.diagnosis));
    if let Some(notes) = &reading.notes {
        println!("{}Notes: {}", "• ".green(), notes);
    }
    if reading.diagnosis.is_urgent() {
        println!(
            "{}",
            "Readings this high need prompt medical attention.".red().bold()
        );
    }
}

fn print_advice(advice: &LifestyleAdvice) {
    println!("{}", "Lifestyle Recommendations:".bold().blue());
    for (title, lists) in advice.sections() {
        if lists.iter().all(|(_, items)| items.is_empty()) {
            continue;
        }
        println!("\n{}", title.bold());
        for (label, items) in lists {
            if items.is_empty() {
                continue;
            }
            println!("  {}", label.cyan());
            for item in items {
                println!("    - {}", item);
            }
        }
    }
}

fn print_stats(stats: &ReadingStats) {
    println!("{}", "Reading statistics:".bold().blue());
    println!("{}Readings: {}", "• ".cyan(), stats.count);
    if stats.count == 0 {
        return;
    }
    println!(
        "{}Average: {}/{} mmHg ({})",
        "• ".cyan(),
        stats.avg_systolic,
        stats.avg_diastolic,
        paint(classify(stats.avg_systolic, stats.avg_diastolic))
    );
    for (category, count) in &stats.by_category {
        println!("  {:<22} {}", category.label(), count);
    }
    if let Some(worst) = stats.worst_category() {
        println!("{}Highest category seen: {}", "• ".cyan(), paint(worst));
    }
    if let Some(latest) = &stats.latest {
        println!(
            "{}Latest: {}/{} mmHg on {}",
            "• ".cyan(),
            latest.systolic,
            latest.diastolic,
            latest.created_at.format("%Y-%m-%d")
        );
    }
}
