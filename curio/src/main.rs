use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use curio_core::CatalogService;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

mod output;
use output::{item_line, AddOutput, InitOutput, ItemListOutput, ItemOutput, OutputWriter};

/// Curio - a catalog store with content-addressed images
#[derive(Parser)]
#[command(name = "curio")]
#[command(about = "Catalog store with a content-addressed image store", long_about = None)]
#[command(version)]
struct Cli {
    /// Data root directory (defaults to CURIO_ROOT env var or ./curio-data)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    /// Emit JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a data root
    Init,

    /// Ingest an item: an image plus a name and a category
    Add {
        /// Image file to ingest ("-" reads from stdin)
        image: PathBuf,

        /// Item name
        #[arg(long)]
        name: String,

        /// Category name
        #[arg(long)]
        category: String,
    },

    /// List every item
    List,

    /// Show a single item by id
    Get {
        /// Item identifier
        id: i64,
    },

    /// Search items by name substring
    Search {
        /// Keyword (empty matches every item)
        #[arg(default_value = "")]
        keyword: String,
    },

    /// Write image bytes for a reference to stdout
    Image {
        /// Image reference (e.g. <64-hex-chars>.jpg)
        reference: String,
    },
}

fn main() {
    // Logging is best effort; commands work the same without it.
    // The handle must outlive the command or the logger shuts down.
    let _logger = flexi_logger::Logger::try_with_env_or_str("info")
        .and_then(|logger| logger.start())
        .ok();

    let cli = Cli::parse();
    let out = OutputWriter::new(cli.json);

    // Determine data root: CLI arg > CURIO_ROOT env var > ./curio-data default
    let root = cli
        .root
        .clone()
        .or_else(|| std::env::var("CURIO_ROOT").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("./curio-data"));
    log::debug!("using data root {}", root.display());

    if let Err(err) = run(&cli, &root, &out) {
        let code = exit_code(&err);
        out.write_error(&err, code);
        std::process::exit(i32::from(code));
    }
}

/// Client-caused failures (not found, invalid input) exit 2; everything
/// else is a server-side failure and exits 1.
fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<curio_core::Error>() {
        Some(e) if e.is_client_error() => 2,
        _ => 1,
    }
}

fn run(cli: &Cli, root: &Path, out: &OutputWriter) -> Result<()> {
    match &cli.command {
        Commands::Init => cmd_init(root, out),
        Commands::Add {
            image,
            name,
            category,
        } => cmd_add(root, image, name, category, out),
        Commands::List => cmd_list(root, out),
        Commands::Get { id } => cmd_get(root, *id, out),
        Commands::Search { keyword } => cmd_search(root, keyword, out),
        Commands::Image { reference } => cmd_image(root, reference),
    }
}

fn open_service(root: &Path) -> Result<CatalogService> {
    CatalogService::open(root)
        .with_context(|| format!("Failed to open data root at {}", root.display()))
}

fn cmd_init(root: &Path, out: &OutputWriter) -> Result<()> {
    open_service(root)?;

    out.write(
        &InitOutput {
            success: true,
            result_code: 0,
            root: root.display().to_string(),
        },
        || format!("Initialized curio data root at {}\n", root.display()),
    )
}

fn cmd_add(
    root: &Path,
    image: &Path,
    name: &str,
    category: &str,
    out: &OutputWriter,
) -> Result<()> {
    let service = open_service(root)?;

    let source = open_image_source(image)?;
    let id = service
        .add_item(source, name, category)
        .with_context(|| format!("Failed to add item: {}", name))?;

    let item = service.get_by_id(id)?;

    out.write(
        &AddOutput {
            success: true,
            result_code: 0,
            id,
            image_name: item.image_name.clone(),
        },
        || format!("{} {}\n", id, item.image_name),
    )
}

/// Open the ingest byte source: a file path, or stdin for "-".
fn open_image_source(image: &Path) -> Result<Box<dyn Read>> {
    if image == Path::new("-") {
        if atty::is(atty::Stream::Stdin) {
            anyhow::bail!("Refusing to read image bytes from a terminal (pipe a file instead)");
        }
        Ok(Box::new(io::stdin()))
    } else {
        let file = File::open(image)
            .with_context(|| format!("Failed to open image: {}", image.display()))?;
        Ok(Box::new(file))
    }
}

fn cmd_list(root: &Path, out: &OutputWriter) -> Result<()> {
    let service = open_service(root)?;

    let list = service.list_all().context("Failed to list items")?;

    out.write(
        &ItemListOutput {
            success: true,
            result_code: 0,
            items: list.items.clone(),
        },
        || list.items.iter().map(item_line).collect(),
    )
}

fn cmd_get(root: &Path, id: i64, out: &OutputWriter) -> Result<()> {
    let service = open_service(root)?;

    let item = service
        .get_by_id(id)
        .with_context(|| format!("Failed to get item {}", id))?;

    out.write(
        &ItemOutput {
            success: true,
            result_code: 0,
            item: item.clone(),
        },
        || item_line(&item),
    )
}

fn cmd_search(root: &Path, keyword: &str, out: &OutputWriter) -> Result<()> {
    let service = open_service(root)?;

    let hits = service
        .search(keyword)
        .with_context(|| format!("Search failed for keyword: {}", keyword))?;

    out.write(
        &ItemListOutput {
            success: true,
            result_code: 0,
            items: hits.items.clone(),
        },
        || hits.items.iter().map(item_line).collect(),
    )
}

fn cmd_image(root: &Path, reference: &str) -> Result<()> {
    let service = open_service(root)?;

    let path = service
        .resolve_image(reference)
        .with_context(|| format!("Invalid image reference: {}", reference))?;

    let mut file = File::open(&path)
        .with_context(|| format!("Failed to open artifact: {}", path.display()))?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    io::copy(&mut file, &mut handle)
        .with_context(|| format!("Failed to output artifact: {}", path.display()))?;

    Ok(())
}
