use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "livmap")]
#[command(about = "Geocode delivery and store addresses, aggregate deliveries by store and postal code.")]
#[command(version)]
pub struct Cli {
    /// Delivery CSV file (columns: adresse_livraison, magasin)
    #[arg(short = 'd', long)]
    pub deliveries: Option<PathBuf>,

    /// Store CSV file (columns: addresse_collecte, magasin)
    #[arg(short = 's', long)]
    pub stores: Option<PathBuf>,

    /// Geocode cache snapshot to load (JSON)
    #[arg(short = 'c', long)]
    pub cache: Option<PathBuf>,

    /// Where to write the updated cache snapshot
    #[arg(long, default_value = "geocode_cache_updated.json")]
    pub cache_out: PathBuf,

    /// Directory for the geocoded and aggregated CSV outputs
    #[arg(short = 'o', long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Restrict aggregation to these stores (comma-separated; default: all)
    #[arg(short = 'm', long, value_delimiter = ',')]
    pub magasins: Vec<String>,

    /// Print aggregate groups as JSON to stdout
    #[arg(long)]
    pub json: bool,

    /// Generate config sample
    #[arg(long)]
    pub generate_config: bool,
}
