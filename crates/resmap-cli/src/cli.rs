//! CLI definition using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use resmap_domain::ResourceFilter;
use resmap_types::{OutputFormat, ResourceStatus, ResourceType};

#[derive(Parser)]
#[command(name = "resmap")]
#[command(author = "yuuji")]
#[command(version)]
#[command(about = "Track emergency response resources on a clustered map")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (json, table). Uses config value if not specified.
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Directory holding map-resources.json (overrides config)
    #[arg(long, global = true)]
    pub store_dir: Option<PathBuf>,

    /// Directory containing pins/<type>.png (overrides config)
    #[arg(long, global = true)]
    pub assets_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

/// Type and text filter shared by the read commands
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Only these types (repeat or comma-separate). All types if omitted.
    #[arg(long = "type", short = 't', value_delimiter = ',')]
    pub types: Vec<ResourceType>,

    /// Case-insensitive text matched against title, municipality and description
    #[arg(long, short = 's')]
    pub search: Option<String>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> ResourceFilter {
        let filter = if self.types.is_empty() {
            ResourceFilter::all()
        } else {
            ResourceFilter::from_types(self.types.iter().copied())
        };
        filter.with_query(self.search.clone().unwrap_or_default())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List resources
    List {
        #[command(flatten)]
        filter: FilterArgs,

        /// Maximum number of rows
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },

    /// Add a resource
    Add {
        /// Resource name
        #[arg(long)]
        title: String,

        /// Resource type
        #[arg(long = "type", short = 't', default_value = "trucks")]
        resource_type: ResourceType,

        #[arg(long, short = 'q', default_value_t = 1)]
        quantity: u32,

        /// Latitude (defaults to the configured home location)
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude (defaults to the configured home location)
        #[arg(long, allow_hyphen_values = true)]
        lon: Option<f64>,

        #[arg(long, short = 'm', default_value = "Iloilo City")]
        municipality: String,

        #[arg(long, default_value = "ready")]
        status: ResourceStatus,

        #[arg(long, short = 'd', default_value = "")]
        description: String,
    },

    /// Write generated demonstration records to the store
    Seed {
        /// Number of records. Uses config value if not specified.
        #[arg(long, short = 'n')]
        count: Option<usize>,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Append to the existing collection instead of replacing it
        #[arg(long)]
        append: bool,
    },

    /// Show dashboard statistics
    Stats {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Print visible resources as a GeoJSON FeatureCollection
    Geojson {
        #[command(flatten)]
        filter: FilterArgs,

        /// Write to file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Render the clustered map headlessly
    Map {
        #[command(flatten)]
        filter: FilterArgs,

        /// Zoom level to render at
        #[arg(long, short = 'z')]
        zoom: Option<f64>,

        /// Write the resulting map style document to a file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Export the dashboard to Excel
    Export {
        #[command(flatten)]
        filter: FilterArgs,

        /// Output Excel file path
        #[arg(long, short = 'o', default_value = "resources.xlsx")]
        output: PathBuf,
    },

    /// List resource types
    Types,

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set store directory
        #[arg(long)]
        set_store_dir: Option<PathBuf>,

        /// Set assets directory
        #[arg(long)]
        set_assets_dir: Option<PathBuf>,

        /// Set default output format
        #[arg(long)]
        set_output: Option<OutputFormat>,

        /// Set base map style URL
        #[arg(long)]
        set_style_url: Option<String>,

        /// Set home location
        #[arg(long, num_args = 2, value_names = ["LAT", "LON"], allow_hyphen_values = true)]
        set_home: Option<Vec<f64>>,

        /// Set number of types shown in the distribution
        #[arg(long)]
        set_top_types: Option<usize>,

        /// Set number of generated demo records
        #[arg(long)]
        set_mock_count: Option<usize>,

        /// Show generated demo records while the store is empty
        #[arg(long)]
        set_demo_data: Option<bool>,

        /// Reset to default configuration
        #[arg(long)]
        reset: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_filter_args() {
        let cli = Cli::parse_from(["resmap", "list", "--type", "ems,watercraft", "-s", "boat"]);
        let Commands::List { filter, .. } = cli.command else {
            panic!("expected list");
        };
        let filter = filter.to_filter();
        assert!(filter.is_active(ResourceType::Ems));
        assert!(filter.is_active(ResourceType::Watercraft));
        assert!(!filter.is_active(ResourceType::Trucks));
        assert_eq!(filter.query(), "boat");
    }

    #[test]
    fn test_no_types_means_all() {
        let filter = FilterArgs::default().to_filter();
        assert!(ResourceType::ALL.iter().all(|t| filter.is_active(*t)));
    }

    #[test]
    fn test_add_defaults() {
        let cli = Cli::parse_from(["resmap", "add", "--title", "Boat", "--lat", "-10.5"]);
        match cli.command {
            Commands::Add {
                resource_type,
                quantity,
                status,
                municipality,
                lat,
                lon,
                ..
            } => {
                assert_eq!(resource_type, ResourceType::Trucks);
                assert_eq!(quantity, 1);
                assert_eq!(status, ResourceStatus::Ready);
                assert_eq!(municipality, "Iloilo City");
                assert_eq!(lat, Some(-10.5));
                assert_eq!(lon, None);
            }
            _ => panic!("expected add"),
        }
    }
}
