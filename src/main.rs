use altgraph::graph::{build_with, BuildOptions};
use altgraph::ingest::{load_records, ProductRecord};
use altgraph::{Config, Finder, Graph, Outcome, Query};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "altgraph")]
#[command(about = "Find in-stock substitutes for out-of-stock products using a product knowledge graph")]
struct Args {
    /// Config file (overrides ALTGRAPH_CONFIG and ./config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Product file (.csv or .json); overrides altgraph.data_path
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find ranked alternatives for a product
    Find {
        /// Requested product id
        product: String,

        /// Maximum price (defaults to the requested product's price)
        #[arg(long)]
        max_price: Option<f64>,

        /// Required tags, delimited like the data file's tags column
        #[arg(long, default_value = "")]
        tags: String,

        /// Preferred brand (empty means no preference)
        #[arg(long, default_value = "")]
        brand: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// List product ids in ascending order
    List,
    /// Show one product's attributes
    Show {
        product: String,

        #[arg(long)]
        json: bool,
    },
    /// Print node and edge counts
    Stats {
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from(Some(path.as_path()))?,
        None => Config::load()?,
    };
    if let Some(data) = &args.data {
        config.altgraph.data_path = data.clone();
    }

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.altgraph.log_level.as_str()),
    )
    .init();

    let graph = load_graph(&config)?;

    match args.command {
        Command::Find {
            product,
            max_price,
            tags,
            brand,
            json,
        } => {
            let mut query = Query::new(product)
                .required_tags_str(&tags, config.tag_delimiter())
                .preferred_brand(&brand);
            query.max_price = max_price;
            query.validate()?;

            let outcome = Finder::new(&graph)
                .with_limit(config.search.max_results)
                .find(&query);

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_outcome(&graph, &outcome);
            }
        }
        Command::List => {
            for id in graph.product_ids_sorted() {
                println!("{}", id);
            }
        }
        Command::Show { product, json } => print!("{}", render_show(&graph, &product, json)?),
        Command::Stats { json } => {
            let stats = graph.stats();
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Products:       {}", stats.products);
                println!("Categories:     {}", stats.categories);
                println!("Tags:           {}", stats.tags);
                println!("IS_A edges:     {}", stats.is_a_edges);
                println!("HAS_TAG edges:  {}", stats.has_tag_edges);
            }
        }
    }

    Ok(())
}

/// Load the product file and build the session graph.
fn load_graph(config: &Config) -> Result<Graph> {
    let path = config.data_path();
    log::info!("Loading products from {}", path.display());

    let records = load_records(path)
        .with_context(|| format!("Failed to load product file: {}", path.display()))?;
    let report = build_with(&records, &BuildOptions::from(&config.ingest))
        .with_context(|| format!("Failed to build graph from {}", path.display()))?;

    if !report.skipped.is_empty() {
        log::warn!("{} malformed rows skipped", report.skipped.len());
    }
    Ok(report.graph)
}

/// Text for `show`; an unknown id is a message, not an error.
fn render_show(graph: &Graph, product: &str, json: bool) -> Result<String> {
    Ok(match graph.product(product) {
        Some(p) if json => format!("{}\n", serde_json::to_string_pretty(p)?),
        Some(p) => format_product(p),
        None => format!("Unknown product: {}\n", product),
    })
}

fn print_outcome(graph: &Graph, outcome: &Outcome) {
    match outcome {
        Outcome::InStock { product_id } => {
            println!("Exact product is in stock.");
            if let Some(p) = graph.product(product_id) {
                print_product(p);
            }
        }
        Outcome::Alternatives(list) if list.is_empty() => {
            println!("No suitable alternatives found with the given constraints.");
        }
        Outcome::Alternatives(list) => {
            for (idx, alt) in list.iter().enumerate() {
                println!("### Alternative {}", idx + 1);
                if let Some(p) = graph.product(&alt.product_id) {
                    print_product(p);
                }
                println!("Score:       {}", alt.score);
                println!("Rule tags:   {}", alt.rules.join(", "));
                println!("{:-<40}", "");
            }
        }
    }
}

fn print_product(p: &ProductRecord) {
    print!("{}", format_product(p));
}

fn format_product(p: &ProductRecord) -> String {
    format!(
        "Product ID:  {}\nBrand:       {}\nCategory:    {}\nPrice:       {}\nIn stock:    {}\nTags:        {}\n",
        p.id,
        p.brand,
        p.category,
        p.price,
        p.in_stock,
        p.tags.join(", ")
    )
}
