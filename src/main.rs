use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use ytmix::config;
use ytmix::{HttpTransport, ItemsPage, MixPlaylistExtractor, PageDescriptor, PlaylistEntry};

#[derive(Debug, Parser)]
#[command(name = "ytmix", version, about = "Walk YouTube mixes from the command line")]
struct Cli {
    /// Override config file path.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log requests and paging decisions.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the mix name, thumbnail and uploader.
    Info { url: String },
    /// Print the entries of the first pages of a mix.
    Items {
        url: String,
        /// Number of pages to walk (defaults to `output.pages` from the config).
        #[arg(long)]
        pages: Option<usize>,
        /// Write the descriptor of the next page to this file.
        #[arg(long)]
        save_page: Option<PathBuf>,
    },
    /// Continue a mix from a descriptor written by `items --save-page`.
    Resume {
        url: String,
        page_file: PathBuf,
        #[arg(long)]
        pages: Option<usize>,
        /// Write the descriptor of the next page to this file.
        #[arg(long)]
        save_page: Option<PathBuf>,
    },
    /// Dump the raw watch response of the first page.
    Json { url: String },
    /// Set the language and region sent with requests.
    Locale {
        /// Language code, e.g. `en`.
        language: String,
        /// Region code, e.g. `US`.
        country: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .init();

    let cfg = config::load(cli.config.as_deref()).context("load config")?;

    match cli.command {
        Command::Info { url } => {
            let mix = make_extractor(&cfg, &url)?;
            let meta = mix.metadata().await.context("read mix metadata")?;
            println!("name:      {}", meta.name);
            println!("thumbnail: {}", meta.thumbnail_url);
            println!("uploader:  {}", meta.uploader_name);
            println!("items:     endless");
        }
        Command::Items {
            url,
            pages,
            save_page,
        } => {
            let mix = make_extractor(&cfg, &url)?;
            let first = mix.initial_page().await.context("fetch first page")?;
            let pages = pages.unwrap_or(cfg.output.pages);
            let next = walk(&mix, first, pages).await?;
            if let Some(path) = save_page {
                save_descriptor(&path, &next)?;
            }
        }
        Command::Resume {
            url,
            page_file,
            pages,
            save_page,
        } => {
            let mix = make_extractor(&cfg, &url)?;
            let page = load_descriptor(&page_file)?;
            let first = mix.get_page(&page).await.context("fetch resumed page")?;
            let pages = pages.unwrap_or(cfg.output.pages);
            let next = walk(&mix, first, pages).await?;
            save_descriptor(save_page.as_deref().unwrap_or(&page_file), &next)?;
        }
        Command::Json { url } => {
            let mix = make_extractor(&cfg, &url)?;
            let state = mix.fetch_page().await.context("fetch first page")?;
            println!("{}", serde_json::to_string_pretty(state.initial_data())?);
        }
        Command::Locale { language, country } => {
            let mut cfg = cfg;
            cfg.locale.language = language;
            cfg.locale.country = country.unwrap_or_default();
            config::save(&cfg, cli.config.as_deref()).context("save config")?;
            println!("Updated locale to {}.", cfg.locale.accept_language());
        }
    }

    Ok(())
}

fn make_extractor(cfg: &config::Config, url: &str) -> anyhow::Result<MixPlaylistExtractor> {
    let transport = HttpTransport::new(&cfg.http).context("build http transport")?;
    let mix = MixPlaylistExtractor::new(url, Arc::new(transport), cfg.locale.clone())
        .with_context(|| format!("parse mix url {url}"))?;
    Ok(mix)
}

/// Prints `first` and the pages after it, `pages` in total. Returns the descriptor to continue from.
async fn walk(
    mix: &MixPlaylistExtractor,
    first: ItemsPage,
    pages: usize,
) -> anyhow::Result<PageDescriptor> {
    let mut n = 0;
    print_entries(&first.entries, &mut n);
    let mut next = first.next_page;

    for i in 1..pages.max(1) {
        let page = mix
            .get_page(&next)
            .await
            .with_context(|| format!("fetch page {}", i + 1))?;
        print_entries(&page.entries, &mut n);
        next = page.next_page;
    }
    Ok(next)
}

fn print_entries(entries: &[PlaylistEntry], n: &mut usize) {
    for e in entries {
        *n += 1;
        let uploader = match &e.uploader_name {
            Some(u) => format!(" - {u}"),
            None => String::new(),
        };
        let duration = match e.duration_seconds {
            Some(s) => format!(" [{}:{:02}]", s / 60, s % 60),
            None => String::new(),
        };
        println!("{:03}. {}{}{}  ({})", *n, e.title, uploader, duration, e.url);
    }
}

fn save_descriptor(path: &Path, page: &PageDescriptor) -> anyhow::Result<()> {
    let raw = serde_json::to_string_pretty(page).context("serialize page descriptor")?;
    std::fs::write(path, raw).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

fn load_descriptor(path: &Path) -> anyhow::Result<PageDescriptor> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))
}
