// CLI output goes to stdout by design.
#![allow(clippy::print_stdout)]

use clap::{Parser, Subcommand};
use std::sync::Arc;
use storefront_client::config::Config;
use storefront_client::domain::auth::{Credentials, Registration, decode_identity};
use storefront_client::domain::product::{PageItem, PageList, page_windows};
use storefront_client::routing::{ROUTE_HOME, TracingNavigator};
use storefront_client::services::ServiceContainer;
use storefront_client::storage::FileSessionStore;
use storefront_client::telemetry;

#[derive(Debug, Parser)]
#[command(name = "storefront", version, about = "Storefront API client")]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and log in
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// End the current session
    Logout,
    /// Show the logged-in identity
    Whoami,
    /// List one catalog page
    Products {
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 12)]
        per_page: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init_telemetry(&cli.config.telemetry);

    let store = Arc::new(FileSessionStore::new(cli.config.session.session_file.clone()));
    let navigator = Arc::new(TracingNavigator);
    let services = ServiceContainer::new(&cli.config, store, navigator)?;

    match cli.command {
        Command::Login { email, password } => {
            let pair = services.auth_service.login(Credentials { email, password }).await?;
            let user = decode_identity(&pair.access_token)?;
            println!("logged in as {} <{}> until {}", user.username, user.email, pair.expires_at);
        }
        Command::Register { username, email, password } => {
            let pair = services.auth_service.register(Registration { username, email, password }).await?;
            let user = decode_identity(&pair.access_token)?;
            println!("registered and logged in as {} <{}>", user.username, user.email);
        }
        Command::Logout => {
            services.auth_service.logout().await?;
            println!("logged out");
        }
        Command::Whoami => match services.auth_service.current_user() {
            Some(user) => println!("{} <{}>", user.username, user.email),
            None => println!("not logged in"),
        },
        Command::Products { page, per_page } => {
            let guard = services.route_guard();
            if !guard.enforce(&TracingNavigator, ROUTE_HOME) {
                anyhow::bail!("not logged in");
            }

            let products = services.product_service.list().await?;
            let page = PageList::from_items(products, page, per_page);

            for product in &page.items {
                println!(
                    "{:<12} {:<32} {:>10.2}  {}",
                    product.product_code, product.name, product.price, product.category
                );
            }
            println!(
                "showing {}-{} of {} (page {} of {})",
                page.start_index() + usize::from(page.total_count > 0),
                page.end_index(),
                page.total_count,
                page.page_number,
                page.total_pages().max(1),
            );
            println!("{}", render_pager(page.total_pages(), page.page_number));
        }
    }

    Ok(())
}

fn render_pager(total_pages: usize, current: usize) -> String {
    page_windows(total_pages, current)
        .into_iter()
        .map(|item| match item {
            PageItem::Page(n) if n == current => format!("[{n}]"),
            PageItem::Page(n) => n.to_string(),
            PageItem::Gap => "...".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
