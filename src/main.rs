//! meshbundle CLI
//!
//! Inspect, verify and post-process exported mesh bundles.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use meshbundle_core::logging::{init_with_config, TracingConfig};
use meshbundle_core::ImageTranscoder;
use meshbundle_export::manifest::read_json;
use meshbundle_export::{resize, ExportManifest, ExportOptions, MaterialManifest, PngTranscoder};
use meshbundle_import::ImportOptions;
use meshbundle_storage::{FileQuery, FilesystemStorage, Storage};

/// meshbundle - skeletal mesh bundle tooling
#[derive(Parser)]
#[command(name = "meshbundle")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format for structured data
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Pipeline configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {s}")),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List files in a bundle directory
    List(ListArgs),

    /// Downscale a PNG texture
    Resize(ResizeArgs),

    /// Summarize an export manifest and its material files
    Inspect(ManifestArgs),

    /// Check that every file a manifest references exists
    Verify(ManifestArgs),

    /// Print the effective pipeline configuration
    Config,
}

#[derive(Args)]
struct ListArgs {
    /// Directory to list
    path: PathBuf,

    /// File name pattern (glob-style)
    #[arg(short, long, default_value = "*")]
    pattern: String,

    /// List recursively
    #[arg(short, long)]
    recursive: bool,
}

#[derive(Args)]
struct ResizeArgs {
    /// PNG file to resize
    input: PathBuf,

    /// Output file (defaults to overwriting the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Maximum width and height (defaults to the configured texture limit)
    #[arg(short, long)]
    max: Option<u32>,
}

#[derive(Args)]
struct ManifestArgs {
    /// Actor manifest (`<export_name>.json`)
    manifest: PathBuf,
}

/// Options loaded with `--config`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct PipelineConfig {
    export: ExportOptions,
    import: ImportOptions,
}

impl PipelineConfig {
    fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_with_config(TracingConfig::from_verbosity(cli.verbose));

    let config = PipelineConfig::load(cli.config.as_deref())?;
    debug!(?config, "Loaded configuration");

    match cli.command {
        Commands::List(args) => cmd_list(args, cli.format),
        Commands::Resize(args) => cmd_resize(args, &config),
        Commands::Inspect(args) => cmd_inspect(args, cli.format),
        Commands::Verify(args) => cmd_verify(args, cli.format),
        Commands::Config => cmd_config(&config),
    }
}

fn cmd_list(args: ListArgs, format: OutputFormat) -> Result<()> {
    let storage = FilesystemStorage::new();
    let nodes = FileQuery::new()
        .with_pattern(args.pattern.as_str())
        .recursive(args.recursive)
        .run_nodes(&storage, &args.path)
        .with_context(|| format!("Failed to list {}", args.path.display()))?;

    let sized: Vec<(String, u64)> = nodes
        .into_iter()
        .map(|node| (node.path.display().to_string(), node.size))
        .collect();

    match format {
        OutputFormat::Json => {
            let entries: Vec<_> = sized
                .iter()
                .map(|(path, size)| serde_json::json!({ "path": path, "size": size }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Csv => {
            println!("path,size");
            for (path, size) in &sized {
                println!("{path},{size}");
            }
        }
        OutputFormat::Text => {
            println!("{:<12} Path", "Size");
            println!("{:-<12} {:-<50}", "", "");
            for (path, size) in &sized {
                println!("{:<12} {}", format_size(*size), path);
            }
            println!();
            println!("{} files", sized.len());
        }
    }

    Ok(())
}

fn cmd_resize(args: ResizeArgs, config: &PipelineConfig) -> Result<()> {
    let Some(max) = args.max.or_else(|| config.export.effective_texture_limit()) else {
        bail!("No size limit: pass --max or set a texture limit in the config");
    };

    let storage = FilesystemStorage::new();
    let transcoder = PngTranscoder;

    let bytes = storage
        .read(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let image = transcoder.decode(&bytes).context("Failed to decode PNG")?;
    let (width, height) = (image.width, image.height);

    let resized = resize(image, max).context("Failed to resize")?;
    let output = args.output.unwrap_or_else(|| args.input.clone());

    if (resized.width, resized.height) == (width, height) && output == args.input {
        println!("{} is {width}x{height}, already within {max}", args.input.display());
        return Ok(());
    }

    let encoded = transcoder.encode(&resized).context("Failed to encode PNG")?;
    storage.ensure_parent(&output)?;
    storage
        .write(&output, &encoded)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!(input = %args.input.display(), output = %output.display(), max, "Resized texture");
    println!(
        "{} {width}x{height} -> {} {}x{}",
        args.input.display(),
        output.display(),
        resized.width,
        resized.height
    );
    Ok(())
}

/// Load a manifest and every material manifest it references
fn load_bundle(
    storage: &FilesystemStorage,
    manifest_path: &Path,
) -> Result<(PathBuf, ExportManifest, Vec<(String, Option<MaterialManifest>)>)> {
    let manifest: ExportManifest = read_json(storage, manifest_path)
        .with_context(|| format!("Failed to load manifest {}", manifest_path.display()))?;
    let base = manifest_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let material_paths: BTreeSet<&str> = manifest
        .skeletal_meshes
        .iter()
        .flat_map(|mesh| mesh.materials.iter())
        .filter_map(|slot| slot.material_json_path.as_deref())
        .collect();

    let materials = material_paths
        .into_iter()
        .map(|rel| {
            let material = match read_json::<MaterialManifest>(storage, &base.join(rel)) {
                Ok(material) => Some(material),
                Err(e) => {
                    warn!(material = %rel, error = %e, "Cannot load material manifest");
                    None
                }
            };
            (rel.to_string(), material)
        })
        .collect();

    Ok((base, manifest, materials))
}

fn cmd_inspect(args: ManifestArgs, format: OutputFormat) -> Result<()> {
    let storage = FilesystemStorage::new();
    let (_, manifest, materials) = load_bundle(&storage, &args.manifest)?;

    match format {
        OutputFormat::Json => {
            let summary = serde_json::json!({
                "actor": manifest.actor_name,
                "meshes": manifest.skeletal_meshes,
                "materials": materials.iter().map(|(path, material)| {
                    serde_json::json!({ "path": path, "manifest": material })
                }).collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Csv => {
            println!("mesh,slot_index,slot_name,material");
            for mesh in &manifest.skeletal_meshes {
                for slot in &mesh.materials {
                    println!(
                        "{},{},{},{}",
                        mesh.mesh_name,
                        slot.material_slot_index,
                        slot.material_slot_name,
                        slot.material_json_path.as_deref().unwrap_or("")
                    );
                }
            }
        }
        OutputFormat::Text => {
            println!("Actor: {}", manifest.actor_name);
            println!("Meshes: {}", manifest.skeletal_meshes.len());
            for mesh in &manifest.skeletal_meshes {
                println!(
                    "  {} -> {}",
                    mesh.mesh_name,
                    mesh.exported_fbx_path.as_deref().unwrap_or("(not exported)")
                );
                for slot in &mesh.materials {
                    println!(
                        "    [{}] {:<20} {}",
                        slot.material_slot_index,
                        slot.material_slot_name,
                        slot.material_json_path.as_deref().unwrap_or("(none)")
                    );
                }
            }

            println!("Materials: {}", materials.len());
            for (path, material) in &materials {
                match material {
                    Some(m) => println!(
                        "  {:<40} {} scalar, {} vector, {} texture",
                        m.material_name,
                        m.scalar_parameters.len(),
                        m.vector_parameters.len(),
                        m.texture_parameters.len()
                    ),
                    None => println!("  {path:<40} (unreadable)"),
                }
            }
        }
    }

    Ok(())
}

fn cmd_verify(args: ManifestArgs, format: OutputFormat) -> Result<()> {
    let storage = FilesystemStorage::new();
    let (base, manifest, materials) = load_bundle(&storage, &args.manifest)?;

    let mut referenced: BTreeSet<String> = manifest
        .referenced_paths()
        .map(str::to_string)
        .collect();
    for (_, material) in &materials {
        if let Some(material) = material {
            referenced.extend(
                material
                    .texture_parameters
                    .iter()
                    .map(|t| t.exported_png_path.clone()),
            );
        }
    }

    let missing: Vec<&String> = referenced
        .iter()
        .filter(|rel| !storage.exists(&base.join(rel.as_str())))
        .collect();

    match format {
        OutputFormat::Json => {
            let result = serde_json::json!({
                "checked": referenced.len(),
                "missing": missing,
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        OutputFormat::Csv => {
            println!("path,exists");
            for rel in &referenced {
                println!("{rel},{}", !missing.contains(&rel));
            }
        }
        OutputFormat::Text => {
            for rel in &missing {
                println!("missing: {rel}");
            }
            println!("{} referenced, {} missing", referenced.len(), missing.len());
        }
    }

    if !missing.is_empty() {
        bail!("{} referenced files are missing", missing.len());
    }
    Ok(())
}

fn cmd_config(config: &PipelineConfig) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
