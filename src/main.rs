//! Organiser CLI
//!
//! Command-line front end for the organising CRM:
//! - List projects, employers, workers and site visits
//! - Run the dashboard redirect check for a session
//! - Read or change the theme preference
//! - Generate a default config file

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;

use organiser::backend::{BackendClient, TokenSession};
use organiser::config::{generate_default_config, Config};
use organiser::dashboard::{DashboardController, DashboardState, Navigator, Route};
use organiser::pages::{employers, projects, site_visits, workers, PageContext, PageView};
use organiser::presentation::{badge_class, badge_color, badge_label, FileStore, ThemeSettings};
use organiser::roles::RoleResolver;
use organiser::scope::ViewScope;

#[derive(Parser)]
#[command(name = "organiser")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Organising CRM for construction projects, employers and workers")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Session access token (default: ORGANISER_ACCESS_TOKEN)
    #[arg(long, global = true)]
    pub token: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List projects with their primary job site
    Projects,

    /// Show one project
    Project {
        /// Project id
        id: String,
    },

    /// List employers
    Employers,

    /// List workers placed with an employer
    Workers {
        /// Employer id
        employer_id: String,
    },

    /// List site visits with a status summary
    Visits,

    /// Run the dashboard redirect check for the current session
    Dashboard,

    /// Show or change the theme preference
    Theme {
        #[arg(value_enum, default_value = "show")]
        action: ThemeAction,
    },

    /// Show the badge color for a percentage
    Badge {
        /// Percentage (omit for none)
        percentage: Option<f64>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ThemeAction {
    Show,
    Dark,
    Light,
    Toggle,
}

/// Prints redirects instead of performing them
struct PrintNavigator;

impl Navigator for PrintNavigator {
    fn redirect(&self, route: Route) {
        println!("Redirect -> {}", route.path());
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            let config = Config::load_with_env(path)
                .with_context(|| format!("loading config from {:?}", path))?;
            config.logging.init();
            config
        }
        None => {
            let discovery = Config::discover();
            discovery.config.logging.init();
            discovery.report();
            discovery.config
        }
    };

    let token = cli
        .token
        .clone()
        .or_else(|| std::env::var("ORGANISER_ACCESS_TOKEN").ok());

    match cli.command {
        Commands::Projects => {
            let ctx = page_context(&config, token.as_deref())?;
            let mut view = PageView::new(cancel_on_ctrl_c());
            view.load(projects::fetch_projects(&ctx)).await;
            print_lines(view.state().render_with(|rows| projects::render(rows)));
        }

        Commands::Project { id } => {
            let ctx = page_context(&config, token.as_deref())?;
            let mut view = PageView::new(cancel_on_ctrl_c());
            view.load(projects::fetch_project(&ctx, &id)).await;
            print_lines(view.state().render_with(|row| match row {
                Some(project) => projects::render(std::slice::from_ref(project)),
                None => vec![format!("Project {} not found", id)],
            }));
        }

        Commands::Employers => {
            let ctx = page_context(&config, token.as_deref())?;
            let mut view = PageView::new(cancel_on_ctrl_c());
            view.load(employers::fetch_employers(&ctx)).await;
            print_lines(view.state().render_with(|rows| employers::render(rows)));
        }

        Commands::Workers { employer_id } => {
            let ctx = page_context(&config, token.as_deref())?;
            let mut view = PageView::new(cancel_on_ctrl_c());
            view.load(workers::fetch_workers(&ctx, &employer_id)).await;
            print_lines(view.state().render_with(|rows| workers::render(rows)));
        }

        Commands::Visits => {
            let ctx = page_context(&config, token.as_deref())?;
            let mut view = PageView::new(cancel_on_ctrl_c());
            view.load(site_visits::fetch_site_visits(&ctx)).await;
            print_lines(view.state().render_with(|rows| site_visits::render(rows)));
        }

        Commands::Dashboard => {
            let client = Arc::new(backend_client(&config, token.as_deref())?);
            let sessions = Arc::new(TokenSession::new(Arc::clone(&client), token));
            let roles = Arc::new(RoleResolver::with_ttl(
                client,
                std::time::Duration::from_secs(config.backend.role_ttl_secs),
            ));

            let mut dashboard = DashboardController::new(sessions, roles, Arc::new(PrintNavigator));
            let scope = cancel_on_ctrl_c();
            if dashboard.check(&scope).await.is_none() {
                match dashboard.state() {
                    DashboardState::Authenticated(None) => println!("Signed in, no role assigned"),
                    DashboardState::Error(message) => anyhow::bail!("dashboard check failed: {}", message),
                    DashboardState::Loading => println!("Cancelled"),
                    _ => {}
                }
            }
        }

        Commands::Theme { action } => {
            let store = FileStore::new(&config.preferences.path);
            let mut settings = ThemeSettings::load(store)?;

            match action {
                ThemeAction::Show => {}
                ThemeAction::Dark => settings.set(organiser::Theme::Dark)?,
                ThemeAction::Light => settings.set(organiser::Theme::Light)?,
                ThemeAction::Toggle => {
                    settings.toggle()?;
                }
            }
            println!("{}", settings.current());
        }

        Commands::Badge { percentage } => {
            println!(
                "{} {} ({})",
                badge_label(percentage),
                badge_color(percentage).name(),
                badge_class(percentage)
            );
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("writing {:?}", path))?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

fn backend_client(config: &Config, token: Option<&str>) -> anyhow::Result<BackendClient> {
    let client = BackendClient::from_config(&config.backend)?;
    Ok(match token {
        Some(token) => client.with_access_token(token),
        None => client,
    })
}

fn page_context(config: &Config, token: Option<&str>) -> anyhow::Result<PageContext> {
    let client = Arc::new(backend_client(config, token)?);
    Ok(PageContext::new(client, &config.backend))
}

/// A view scope that Ctrl+C cancels
fn cancel_on_ctrl_c() -> ViewScope {
    let scope = ViewScope::new();
    let canceller = scope.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            canceller.cancel();
        }
    });
    scope
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}
