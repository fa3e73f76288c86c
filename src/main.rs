//! drawloom CLI
//!
//! Usage:
//!   drawloom [OPTIONS] <INPUT>
//!
//! Options:
//!   -o, --output <FILE>      Output file (default: input with .drawio extension)
//!   -t, --templates <DIR>    Templates directory
//!   -c, --config <FILE>      Settings file (TOML format)
//!       --validate           Apply templates and stop before generating output
//!       --list-providers     List registered providers and their resources
//!       --log-level <LEVEL>  Log level (default: warn)
//!   -h, --help               Print help

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use clap::Parser;
use log::{debug, LevelFilter};

use drawloom::{
    drawio, generate, load_document, process, Error, ProviderRegistry, RenderConfig, Settings,
};

#[derive(Parser, Debug)]
#[command(name = "drawloom", version)]
#[command(about = "Convert declarative YAML diagrams to draw.io files")]
struct Cli {
    /// Input YAML document
    input: Option<PathBuf>,

    /// Output file (.drawio or .xml)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Templates directory
    #[arg(short, long)]
    templates: Option<PathBuf>,

    /// Settings file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Validate the document and its templates without writing output
    #[arg(long)]
    validate: bool,

    /// List available providers and their resources
    #[arg(long)]
    list_providers: bool,

    /// Log level: off, error, warn, info, debug or trace
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() {
    let cli = Cli::parse();

    let log_level = LevelFilter::from_str(&cli.log_level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {}. Using 'warn' instead.", cli.log_level);
        LevelFilter::Warn
    });
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();
    debug!(cli:?; "Parsed arguments");

    let registry = Arc::new(ProviderRegistry::with_builtins());

    if cli.list_providers {
        print_providers(&registry);
        return;
    }

    let Some(input) = cli.input.as_deref() else {
        eprintln!("Error: input file is required");
        std::process::exit(1);
    };

    if let Err(e) = run(&cli, input, registry) {
        eprintln!("Error: {}", e.report());
        std::process::exit(1);
    }
}

fn run(cli: &Cli, input: &Path, registry: Arc<ProviderRegistry>) -> Result<(), Error> {
    let settings = match &cli.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };

    let mut config = RenderConfig::from_settings(settings);
    match &cli.templates {
        Some(dir) => config = config.with_template_dir(dir),
        None => {
            if let Some(dir) = input.parent().filter(|d| !d.as_os_str().is_empty()) {
                config = config.with_base_dir(dir);
            }
        }
    }

    let mut document = load_document(input)?;
    process(&mut document, registry, &config)?;

    if cli.validate {
        println!("YAML configuration is valid");
        return Ok(());
    }

    let file = generate(&document, &config)?;
    let xml = drawio::write_mxfile(&file, config.drawio.pretty_print);

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| input.with_extension("drawio"));
    write_output(&output, &xml)?;

    println!(
        "Successfully converted {} to {}",
        input.display(),
        output.display()
    );
    Ok(())
}

fn write_output(path: &Path, xml: &str) -> Result<(), Error> {
    let io_error = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(io_error)?;
    }
    fs::write(path, xml).map_err(io_error)
}

fn print_providers(registry: &ProviderRegistry) {
    println!("Available Providers");
    println!("===================");

    let names = registry.list();
    if names.is_empty() {
        println!("No providers registered.");
        return;
    }

    for name in names {
        let Some(provider) = registry.get(&name) else {
            continue;
        };
        println!("\n{} (v{})", provider.name(), provider.version());

        let resources = provider.resources();
        if resources.is_empty() {
            println!("  No resources available");
            continue;
        }

        println!("  Resources:");
        for resource in resources {
            println!(
                "    - {}: {} ({})",
                resource.resource_type, resource.name, resource.category
            );
            println!("      {}", resource.description);
            if let Some(example) = resource.examples.first() {
                println!("      Example: {}", example.name);
            }
        }
    }

    println!("\nReference resources in a document as:");
    println!("   resource: \"<provider>-<resource-type>\"");
    println!("   Example: resource: \"core-shape\"");
}
