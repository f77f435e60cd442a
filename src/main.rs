use std::net::SocketAddr;
use std::process;

use clap::{Parser, Subcommand};
use comfy_table::{modifiers, presets, ContentArrangement, Table};
use terminal_size::{terminal_size, Width};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use stratus::api::{ApiClient, HttpResourceProvider, ResourceProvider};
use stratus::config::{self, DEFAULT_HOST, DEFAULT_PORT};
use stratus::models::{AppState, ProjectScope, ResourceCatalog};
use stratus::routes::build_router;

struct Settings {
    api: ApiClient,
    public_base_url: String,
    default_project_id: String,
    max_submit_attempts: u32,
    has_token: bool,
}

fn load_settings(env_file: Option<&str>) -> Settings {
    config::load_env_file(env_file);
    let client = match reqwest::Client::builder()
        .user_agent(format!("Stratus/{}", env!("CARGO_PKG_VERSION")))
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(%e, "Failed to create HTTP client");
            eprintln!("{}: {}", yansi::Paint::new("Failed to create HTTP client").red(), e);
            process::exit(1);
        }
    };
    let token = config::get_api_token();
    Settings {
        has_token: !token.is_empty(),
        api: ApiClient::new(client, config::get_api_base_url(), token),
        public_base_url: config::get_public_base_url(),
        default_project_id: config::get_default_project_id(),
        max_submit_attempts: config::get_max_submit_attempts(),
    }
}

async fn start_server(settings: Settings, host: &str, port: u16) {
    if !settings.has_token {
        tracing::warn!("API_TOKEN is not set; API calls will be unauthenticated");
    }
    let state = AppState::with_api(
        settings.api,
        settings.public_base_url,
        settings.default_project_id,
        settings.max_submit_attempts,
    );

    let addr: SocketAddr = match format!("{}:{}", host, port).parse() {
        Ok(a) => a,
        Err(e) => {
            tracing::error!(%e, "Invalid host/port format");
            eprintln!("{}: {}", yansi::Paint::red("Invalid host/port format"), e);
            process::exit(1);
        }
    };
    let app = build_router(state);
    tracing::info!(%addr, "Starting Stratus server");
    println!(
        "{} {}",
        yansi::Paint::new("Provisioning console running on").green(),
        yansi::Paint::new(format!("http://{}/create", addr)).cyan()
    );
    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(%e, "Server encountered an error while running");
                eprintln!("{}: {}", yansi::Paint::new("Server error").red(), e);
                process::exit(1);
            }
        }
        Err(e) => {
            tracing::error!(%e, "Failed to bind to address; is the port already in use?");
            eprintln!(
                "{}: {}\n{}",
                yansi::Paint::new(format!("Failed to bind to {}", addr)).red(),
                e,
                yansi::Paint::new("Stop the process using this port, or pass a different --port value.").yellow()
            );
            process::exit(1);
        }
    }
}

fn print_catalog(catalog: &ResourceCatalog) {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    if let Some((Width(w), _)) = terminal_size() {
        table.set_width(w.saturating_sub(4));
    }
    table.set_header(vec!["Resource", "Available", "First"]);
    let first = |names: Vec<&str>| names.first().map(|n| n.to_string()).unwrap_or_default();
    table.add_row(vec![
        "Flavors".to_string(),
        catalog.flavors.len().to_string(),
        first(catalog.flavors.iter().map(|f| f.name.as_str()).collect()),
    ]);
    table.add_row(vec![
        "Images".to_string(),
        catalog.images.len().to_string(),
        first(catalog.images.iter().map(|i| i.name.as_str()).collect()),
    ]);
    table.add_row(vec![
        "Networks".to_string(),
        catalog.networks.len().to_string(),
        first(catalog.networks.iter().map(|n| n.name.as_str()).collect()),
    ]);
    table.add_row(vec![
        "Key pairs".to_string(),
        catalog.keypairs.len().to_string(),
        first(catalog.keypairs.iter().map(|k| k.name.as_str()).collect()),
    ]);
    table.add_row(vec![
        "Security groups".to_string(),
        catalog.security_groups.len().to_string(),
        first(catalog.security_groups.iter().map(|g| g.name.as_str()).collect()),
    ]);
    println!("\n{table}\n");
}

async fn check_config(settings: Settings, project: Option<String>) {
    if !settings.has_token {
        eprintln!("{}", yansi::Paint::new("API_TOKEN is not configured").red());
        process::exit(1);
    }
    let scope = ProjectScope::new(project.unwrap_or(settings.default_project_id));
    println!(
        "{} {} ({} {})",
        yansi::Paint::new("Checking").bold(),
        settings.api.base_url(),
        yansi::Paint::new("project").dim(),
        scope.project_id
    );
    let provider = HttpResourceProvider::new(settings.api);
    match provider.list_resources(&scope).await {
        Ok(catalog) => {
            print_catalog(&catalog);
            println!("{}", yansi::Paint::new("Configuration looks good").green());
        }
        Err(e) => {
            tracing::error!(%e, "Resource listing failed");
            eprintln!("{}: {}", yansi::Paint::new("API check failed").red(), e);
            process::exit(1);
        }
    }
}

#[derive(Parser)]
#[command(
    name = "stratus",
    author,
    version,
    about = "Stratus instance provisioning console",
    long_about = r#"Stratus serves a step-by-step web wizard for creating compute instances
against the console API: pick a flavor, an image, a network, name the server,
review and create.

Examples:
  stratus serve --host 127.0.0.1 --port 8080
  stratus check-config --env-file .env.staging
"#,
    after_help = "Use `stratus <subcommand> --help` to get subcommand specific options."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Disable colorized output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server
    Serve {
        /// Host to bind to
        #[arg(long, default_value_t = String::from(DEFAULT_HOST))]
        host: String,
        /// Port to bind to
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
        /// Path to .env file
        #[arg(long)]
        env_file: Option<String>,
    },
    /// Validate configuration by listing the project's resources
    #[command(
        about = "Validate configuration and ensure API connectivity.",
        long_about = "Check that an API token is configured, then fetch the flavors, images, networks, key pairs and security groups the wizard would offer and print how many of each are available."
    )]
    CheckConfig {
        /// Path to .env file
        #[arg(long)]
        env_file: Option<String>,
        /// Project to list resources for (defaults to DEFAULT_PROJECT_ID)
        #[arg(long)]
        project: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    if cli.no_color {
        yansi::whenever(yansi::Condition::NEVER);
    }

    match cli.command {
        None => start_server(load_settings(None), DEFAULT_HOST, DEFAULT_PORT).await,
        Some(Commands::Serve { host, port, env_file }) => {
            start_server(load_settings(env_file.as_deref()), &host, port).await
        }
        Some(Commands::CheckConfig { env_file, project }) => {
            check_config(load_settings(env_file.as_deref()), project).await
        }
    }
}
