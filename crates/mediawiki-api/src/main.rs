//! MediaWiki API command line client.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use mediawiki_api::{GeoQuery, MediaWikiClient, PageOptions, SummaryOptions, WikipediaPage};
use shared::{Config, LogConfig};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Language prefix, overrides the config file
    #[arg(short, long, global = true)]
    language: Option<String>,

    /// User-Agent header, overrides the config file
    #[arg(long, global = true)]
    user_agent: Option<String>,

    /// Enable rate limiting with this many milliseconds between requests
    #[arg(long, global = true)]
    rate_limit_ms: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search article titles
    Search {
        query: String,
        /// Maximum number of results
        #[arg(short, long, default_value_t = 10)]
        results: u32,
        /// Also print the spelling suggestion
        #[arg(long)]
        suggestion: bool,
    },
    /// Find articles near a coordinate
    Geosearch {
        #[arg(allow_negative_numbers = true)]
        latitude: f64,
        #[arg(allow_negative_numbers = true)]
        longitude: f64,
        /// Restrict the search to this article
        #[arg(long)]
        title: Option<String>,
        #[arg(short, long, default_value_t = 10)]
        results: u32,
        /// Search radius in meters (10 to 10000)
        #[arg(long, default_value_t = 1000)]
        radius: u32,
    },
    /// Print the spelling suggestion for a query
    Suggest { query: String },
    /// Print random article titles
    Random {
        #[arg(default_value_t = 1)]
        pages: u32,
    },
    /// Print the plain text summary of an article
    Summary {
        title: String,
        #[arg(long)]
        sentences: Option<u32>,
        #[arg(long)]
        chars: Option<u32>,
        /// Use the exact title instead of the search suggestion
        #[arg(long)]
        exact: bool,
        /// Fail on redirects instead of following them
        #[arg(long)]
        no_redirect: bool,
    },
    /// Print one property of an article
    Page {
        /// Article title, or a page id with --id
        target: String,
        /// Treat the target as a numeric page id
        #[arg(long)]
        id: bool,
        #[arg(short, long, value_enum, default_value_t = PageField::Summary)]
        field: PageField,
        /// Section title, for `--field section`
        #[arg(long)]
        section: Option<String>,
        /// Language prefix, for `--field lang-title`
        #[arg(long)]
        to: Option<String>,
        #[arg(long)]
        exact: bool,
        #[arg(long)]
        no_redirect: bool,
    },
    /// List the language prefixes the wiki serves
    Languages,
    /// Print the Wikimedia donation page
    Donate,
    /// Write the effective configuration, flags included, to the config path
    InitConfig,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PageField {
    Summary,
    Content,
    Html,
    HtmlText,
    Images,
    Links,
    References,
    Categories,
    Coordinates,
    Sections,
    Section,
    Revision,
    Url,
    LangTitle,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.verbose {
        config.logging.default_level = "debug".to_string();
    }
    shared::logging::init(LogConfig::from_settings("mediawiki-api", &config.logging))?;

    info!(config_file = %args.config.display(), "Loaded configuration");

    if let Some(language) = &args.language {
        config.mediawiki.language = language.clone();
    }
    if let Some(user_agent) = &args.user_agent {
        config.mediawiki.user_agent = user_agent.clone();
    }
    if let Some(ms) = args.rate_limit_ms {
        config.mediawiki.rate_limit.enabled = true;
        config.mediawiki.rate_limit.min_wait_ms = ms;
    }

    if let Command::InitConfig = args.command {
        return config.save(&args.config);
    }

    let client = MediaWikiClient::connect(&config.mediawiki)
        .await
        .context("Failed to create MediaWiki client")?;

    run(&client, args.command).await
}

async fn run(client: &MediaWikiClient, command: Command) -> Result<()> {
    match command {
        Command::Search {
            query,
            results,
            suggestion,
        } => {
            if suggestion {
                let found = client.search_with_suggestion(&query, results).await?;
                print_lines(&found.titles);
                if let Some(suggestion) = found.suggestion {
                    println!("Did you mean: {suggestion}");
                }
            } else {
                print_lines(&client.search(&query, results).await?);
            }
        }
        Command::Geosearch {
            latitude,
            longitude,
            title,
            results,
            radius,
        } => {
            let mut query = GeoQuery::new(latitude, longitude)
                .results(results)
                .radius(radius);
            if let Some(title) = title {
                query = query.title(title);
            }
            print_lines(&client.geosearch(&query).await?);
        }
        Command::Suggest { query } => match client.suggest(&query).await? {
            Some(suggestion) => println!("{suggestion}"),
            None => info!(query = %query, "No suggestion"),
        },
        Command::Random { pages } => print_lines(&client.random(pages).await?),
        Command::Summary {
            title,
            sentences,
            chars,
            exact,
            no_redirect,
        } => {
            let options = SummaryOptions {
                sentences,
                chars,
                auto_suggest: !exact,
                redirect: !no_redirect,
            };
            println!("{}", client.summary(&title, options).await?);
        }
        Command::Page {
            target,
            id,
            field,
            section,
            to,
            exact,
            no_redirect,
        } => {
            let options = PageOptions {
                auto_suggest: !exact,
                redirect: !no_redirect,
                preload: false,
            };

            let page = if id {
                let pageid = target
                    .parse::<u64>()
                    .with_context(|| format!("Invalid page id: {target}"))?;
                client.page_by_id(pageid, options).await?
            } else {
                client.page(&target, options).await?
            };

            info!(pageid = page.pageid(), title = page.title(), "Page loaded");
            print_field(&page, field, section.as_deref(), to.as_deref()).await?;
        }
        Command::Languages => {
            for (code, name) in client.languages() {
                println!("{code}\t{name}");
            }
        }
        Command::Donate => println!("{}", client.donate_url()),
        Command::InitConfig => bail!("init-config runs before the client connects"),
    }

    Ok(())
}

async fn print_field(
    page: &WikipediaPage,
    field: PageField,
    section: Option<&str>,
    to: Option<&str>,
) -> Result<()> {
    match field {
        PageField::Summary => println!("{}", page.summary().await?),
        PageField::Content => println!("{}", page.content().await?),
        PageField::Html => println!("{}", page.html().await?),
        PageField::HtmlText => println!("{}", page.html_text().await?),
        PageField::Images => print_lines(page.images().await?),
        PageField::Links => print_lines(page.links().await?),
        PageField::References => print_lines(page.references().await?),
        PageField::Categories => print_lines(page.categories().await?),
        PageField::Sections => print_lines(page.sections().await?),
        PageField::Coordinates => match page.coordinates().await? {
            Some(coordinates) => println!("{}, {}", coordinates.latitude, coordinates.longitude),
            None => info!(title = page.title(), "Page has no coordinates"),
        },
        PageField::Section => {
            let Some(title) = section else {
                bail!("--section is required for the section field");
            };
            match page.section(title).await? {
                Some(text) => println!("{text}"),
                None => bail!("No section titled \"{title}\""),
            }
        }
        PageField::Revision => println!(
            "{} (parent {})",
            page.revision_id().await?,
            page.parent_id().await?
        ),
        PageField::Url => println!("{}", page.url()),
        PageField::LangTitle => {
            let Some(code) = to else {
                bail!("--to is required for the lang-title field");
            };
            match page.lang_title(code).await? {
                Some(title) => println!("{title}"),
                None => info!(language = code, "No interlanguage link"),
            }
        }
    }

    Ok(())
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

