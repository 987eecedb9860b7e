//! Command handlers

use std::path::{Path, PathBuf};

use resmap_app::config::Config;
use resmap_app::dashboard::build_report;
use resmap_app::export::export_to_excel;
use resmap_app::map::open_map;
use resmap_app::repository::open_resource_store;
use resmap_app::resources::{add_resource, load_or_demo, seed, NewResource};
use resmap_map::SOURCE_ID;
use resmap_types::{GeoPoint, OutputFormat, Resource, Result, ValidationError};
use tracing::debug;

use crate::cli::{Cli, Commands, FilterArgs};
use crate::output::{output_dashboard, output_map, output_resources, output_types};

pub fn execute(cli: Cli) -> Result<()> {
    // Load config
    let mut config = Config::load()?;

    // Override from CLI args
    if let Some(ref dir) = cli.store_dir {
        config.store_dir = Some(dir.clone());
    }
    if let Some(ref dir) = cli.assets_dir {
        config.assets_dir = Some(dir.clone());
    }
    let output_format = cli.format.unwrap_or(config.output_format);
    debug!(store_dir = ?config.store_dir, %output_format, "configuration loaded");

    match &cli.command {
        Commands::List { filter, limit } => cmd_list(&config, filter, *limit, output_format),
        Commands::Add {
            title,
            resource_type,
            quantity,
            lat,
            lon,
            municipality,
            status,
            description,
        } => cmd_add(
            &config,
            NewResource {
                title: title.clone(),
                description: description.clone(),
                resource_type: *resource_type,
                quantity: *quantity,
                location: GeoPoint::new(
                    lat.unwrap_or(config.home.latitude),
                    lon.unwrap_or(config.home.longitude),
                ),
                municipality: municipality.clone(),
                status: *status,
                user_id: None,
            },
            output_format,
        ),
        Commands::Seed {
            count,
            seed: seed_value,
            append,
        } => cmd_seed(&config, count.unwrap_or(config.mock_count), *seed_value, !*append),
        Commands::Stats { filter } => cmd_stats(&config, filter, output_format),
        Commands::Geojson { filter, output } => cmd_geojson(&config, filter, output.as_deref()),
        Commands::Map {
            filter,
            zoom,
            output,
        } => cmd_map(&config, filter, *zoom, output.as_deref(), output_format),
        Commands::Export { filter, output } => cmd_export(&config, filter, output.clone()),
        Commands::Types => output_types(output_format),
        Commands::Config {
            show,
            set_store_dir,
            set_assets_dir,
            set_output,
            set_style_url,
            set_home,
            set_top_types,
            set_mock_count,
            set_demo_data,
            reset,
        } => cmd_config(ConfigUpdate {
            show: *show,
            set_store_dir: set_store_dir.clone(),
            set_assets_dir: set_assets_dir.clone(),
            set_output: *set_output,
            set_style_url: set_style_url.clone(),
            set_home: set_home.as_deref().map(|v| GeoPoint::new(v[0], v[1])),
            set_top_types: *set_top_types,
            set_mock_count: *set_mock_count,
            set_demo_data: *set_demo_data,
            reset: *reset,
        }),
    }
}

fn load_resources(config: &Config) -> Result<Vec<Resource>> {
    let store = open_resource_store(config)?;
    let loaded = load_or_demo(&store, config);
    if loaded.demo {
        eprintln!(
            "Store is empty; showing {} generated demo records (run `resmap seed` to persist)",
            loaded.resources.len()
        );
    }
    Ok(loaded.resources)
}

fn cmd_list(config: &Config, filter: &FilterArgs, limit: Option<usize>, output_format: OutputFormat) -> Result<()> {
    let resources = load_resources(config)?;
    let visible: Vec<_> = filter
        .to_filter()
        .apply(&resources)
        .into_iter()
        .take(limit.unwrap_or(usize::MAX))
        .cloned()
        .collect();
    output_resources(output_format, &visible, resources.len())
}

fn cmd_add(config: &Config, form: NewResource, output_format: OutputFormat) -> Result<()> {
    let store = open_resource_store(config)?;
    let resource = add_resource(&store, form)?;

    if output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&resource)?);
    } else {
        println!("Added resource");
        println!("  ID:           {}", resource.id);
        println!("  Title:        {}", resource.title);
        println!("  Type:         {}", resource.resource_type.label());
        println!("  Quantity:     {}", resource.quantity);
        println!("  Status:       {}", resource.status.label());
        println!("  Municipality: {}", resource.municipality);
        if let Some(location) = resource.location() {
            println!("  Location:     {:.6}, {:.6}", location.latitude, location.longitude);
        }
        println!("\nStored in: {}", store.path().display());
    }
    Ok(())
}

fn cmd_seed(config: &Config, count: usize, seed_value: Option<u64>, replace: bool) -> Result<()> {
    let store = open_resource_store(config)?;
    let written = seed(&store, count, seed_value, replace)?;
    println!(
        "{} {} generated resources in {}",
        if replace { "Wrote" } else { "Appended" },
        written,
        store.path().display()
    );
    Ok(())
}

fn cmd_stats(config: &Config, filter: &FilterArgs, output_format: OutputFormat) -> Result<()> {
    let resources = load_resources(config)?;
    let report = build_report(&resources, &filter.to_filter(), config.top_types);
    output_dashboard(output_format, &report)
}

fn cmd_geojson(config: &Config, filter: &FilterArgs, output: Option<&Path>) -> Result<()> {
    let resources = load_resources(config)?;
    let report = build_report(&resources, &filter.to_filter(), config.top_types);
    let features = report.features();
    let content = serde_json::to_string_pretty(&features)?;

    match output {
        Some(path) => {
            std::fs::write(path, content)?;
            println!("Wrote {} features to {}", features.len(), path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

fn cmd_map(
    config: &Config,
    filter: &FilterArgs,
    zoom: Option<f64>,
    output: Option<&Path>,
    output_format: OutputFormat,
) -> Result<()> {
    let resources = load_resources(config)?;
    let report = build_report(&resources, &filter.to_filter(), config.top_types);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let mut session = runtime.block_on(open_map(config, report.features()))?;

    if let Some(zoom) = zoom {
        let center = session.widget.camera().center;
        session.widget.set_camera(center, zoom);
    }

    let rendered = session.widget.rendered_features(SOURCE_ID);
    output_map(output_format, session.widget.camera(), &session.icons, &rendered)?;

    if let Some(path) = output {
        let style = serde_json::to_string_pretty(&session.widget.style_document())?;
        std::fs::write(path, style)?;
        if output_format == OutputFormat::Table {
            println!("\nStyle written to: {}", path.display());
        }
    }
    Ok(())
}

fn cmd_export(config: &Config, filter: &FilterArgs, output: PathBuf) -> Result<()> {
    let resources = load_resources(config)?;
    let report = build_report(&resources, &filter.to_filter(), config.top_types);

    export_to_excel(&report, &output)?;

    println!("Exported {} resources to: {}", report.visible.len(), output.display());
    Ok(())
}

struct ConfigUpdate {
    show: bool,
    set_store_dir: Option<PathBuf>,
    set_assets_dir: Option<PathBuf>,
    set_output: Option<OutputFormat>,
    set_style_url: Option<String>,
    set_home: Option<GeoPoint>,
    set_top_types: Option<usize>,
    set_mock_count: Option<usize>,
    set_demo_data: Option<bool>,
    reset: bool,
}

fn cmd_config(update: ConfigUpdate) -> Result<()> {
    if update.reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        println!("\n{}", config);
        return Ok(());
    }

    let mut config = Config::load()?;
    let mut modified = false;

    if let Some(dir) = update.set_store_dir {
        config.store_dir = Some(dir);
        modified = true;
    }

    if let Some(dir) = update.set_assets_dir {
        config.assets_dir = Some(dir);
        modified = true;
    }

    if let Some(output_format) = update.set_output {
        config.output_format = output_format;
        modified = true;
    }

    if let Some(url) = update.set_style_url {
        config.style_url = url;
        modified = true;
    }

    if let Some(home) = update.set_home {
        if !home.is_valid() {
            return Err(ValidationError::InvalidCoordinates {
                latitude: home.latitude,
                longitude: home.longitude,
            }
            .into());
        }
        config.home = home;
        modified = true;
    }

    if let Some(n) = update.set_top_types {
        config.top_types = n;
        modified = true;
    }

    if let Some(n) = update.set_mock_count {
        config.mock_count = n;
        modified = true;
    }

    if let Some(enabled) = update.set_demo_data {
        config.demo_data = enabled;
        modified = true;
    }

    if modified {
        config.save()?;
        println!("Configuration updated");
    }

    if update.show || !modified {
        println!("{}", config);
    }

    Ok(())
}
