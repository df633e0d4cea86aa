use clap::{Parser, Subcommand, ValueEnum};
use taste_engine::{DomainConfig, FsSource, RecommendEngine};

#[derive(Parser)]
#[command(name = "taste-cli")]
#[command(about = "Taste Engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Catalog domain
    #[arg(short, long, value_enum, default_value_t = Domain::Games)]
    domain: Domain,

    /// Directory holding the catalog artifacts
    #[arg(short, long, default_value = "cache")]
    cache_dir: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum Domain {
    Games,
    Music,
    Movies,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the catalog
    Search {
        /// Search query
        query: String,

        /// Maximum results
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Print the catalog's tag vocabulary
    Tags,

    /// Cold-start discovery lists
    Discover,

    /// Recommend from a seed list
    Recommend {
        /// Seed item ids (at least 3)
        #[arg(required = true)]
        seed_ids: Vec<String>,

        /// Optional tag to explore
        #[arg(short, long)]
        explore: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let config = match cli.domain {
        Domain::Games => DomainConfig::games(),
        Domain::Music => DomainConfig::music(),
        Domain::Movies => DomainConfig::movies(),
    };

    let engine = RecommendEngine::new(config);
    engine.load(&FsSource::new(&cli.cache_dir)).await?;

    match cli.command {
        Commands::Search { query, limit } => {
            let results = engine.search(&query, Some(limit))?;
            if results.is_empty() {
                println!("No matches for '{}'", query);
            }
            for (i, item) in results.iter().enumerate() {
                println!("{}. {} [{}]", i + 1, item.display_name(), item.creator);
            }
        }

        Commands::Tags => {
            for tag in engine.tags()? {
                println!("{}", tag);
            }
        }

        Commands::Discover => {
            let result = engine.discover()?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Commands::Recommend { seed_ids, explore } => {
            let result = engine.recommend(&seed_ids, explore.as_deref())?;

            if let Some(tag) = &result.profile.dominant_tag {
                println!("Dominant tag: {}", tag);
            }
            for bucket in &result.buckets {
                println!("\n== {} ==", bucket.label);
                for item in &bucket.items {
                    println!("   {} - {:.1}", item.item.display_name(), item.score);
                }
            }
        }
    }

    Ok(())
}
