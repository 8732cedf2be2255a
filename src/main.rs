use clap::{Parser, Subcommand};
use easel::batch::{self, BatchEvent};
use easel::config::LoaderConfig;
use easel::loader::{Loader, Preset};
use easel::request::{CacheStrategy, RequestOptions};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "easel")]
#[command(about = "Preset-driven image transformations")]
#[command(long_about = "\
Preset-driven image transformations

Applies a named preset (circle, circle-border, border, rounded, gray,
blur, plain) to one image or to every image under a directory. Outputs
are PNG. Batch runs keep a manifest of content hashes alongside the
outputs, so unchanged inputs are skipped on the next run.

Preset parameters (border width and color, corner radius, blur sigma,
display density) come from an optional TOML config file:

  density = 2.0
  border_width_dp = 3.0
  corner_radius = 24
  blur_sigma = 8.0

Run 'easel presets' to list the available presets.")]
#[command(version)]
struct Cli {
    /// TOML config file with preset parameters
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply a preset to a single image
    Apply {
        /// Input image (jpg, png, or webp)
        input: PathBuf,
        /// Preset name (see 'easel presets')
        #[arg(long, short, default_value = "circle")]
        preset: String,
        /// Output path; defaults to <stem>-<preset>.png next to the input
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Resize to WIDTHxHEIGHT before the preset transforms
        #[arg(long)]
        resize: Option<String>,
    },
    /// Apply a preset to every image under a directory
    Batch {
        /// Source directory
        source: PathBuf,
        /// Preset name (see 'easel presets')
        #[arg(long, short, default_value = "circle")]
        preset: String,
        /// Output directory
        #[arg(long, short, default_value = "out")]
        output: PathBuf,
        /// Ignore the manifest and reprocess every image
        #[arg(long)]
        no_cache: bool,
        /// Caching strategy: all, none, decoded-only, encoded-only, automatic
        #[arg(long, default_value = "all")]
        cache_strategy: String,
    },
    /// List the available presets
    Presets,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => LoaderConfig::load(path)?,
        None => LoaderConfig::default(),
    };

    match cli.command {
        Command::Apply {
            input,
            preset,
            output,
            resize,
        } => {
            let preset: Preset = preset.parse()?;
            let resize = resize.as_deref().map(parse_resize).transpose()?;
            let loader = Loader::new(config);

            let loaded = loader.load(
                Some(&input),
                RequestOptions {
                    resize,
                    transforms: preset.transforms(loader.config()),
                    ..Default::default()
                },
            )?;

            let output = output.unwrap_or_else(|| default_output(&input, preset));
            loaded.image.save(&output)?;

            println!(
                "{} -> {} ({}x{})",
                input.display(),
                output.display(),
                loaded.image.width(),
                loaded.image.height()
            );
            println!("source: {}", loaded.source_hash);
            println!("params: {}", loaded.params_hash);
        }
        Command::Batch {
            source,
            preset,
            output,
            no_cache,
            cache_strategy,
        } => {
            let preset: Preset = preset.parse()?;
            let strategy: CacheStrategy = cache_strategy.parse()?;
            let loader = Loader::new(config);

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    match event {
                        BatchEvent::Processed { input, output } => {
                            println!("  {} -> {}", input.display(), output);
                        }
                        BatchEvent::Cached { output, .. } => {
                            println!("  {} (cached)", output);
                        }
                        BatchEvent::Failed { input, message } => {
                            eprintln!("  {}: {}", input.display(), message);
                        }
                    }
                }
            });

            println!(
                "==> Applying '{}' to {} -> {}",
                preset,
                source.display(),
                output.display()
            );
            let result =
                batch::run(&loader, preset, &source, &output, !no_cache, strategy, Some(tx))?;
            printer.join().expect("printer thread panicked");
            println!("Cache: {}", result.stats);
        }
        Command::Presets => {
            for preset in Preset::ALL {
                println!("{:14} {}", preset.name(), preset.describe());
            }
        }
    }

    Ok(())
}

/// Parse a `WIDTHxHEIGHT` argument like `800x200`.
fn parse_resize(arg: &str) -> Result<(u32, u32), String> {
    let (w, h) = arg
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{arg}'"))?;
    let width = w
        .parse::<u32>()
        .map_err(|_| format!("invalid width in '{arg}'"))?;
    let height = h
        .parse::<u32>()
        .map_err(|_| format!("invalid height in '{arg}'"))?;
    Ok((width, height))
}

fn default_output(input: &Path, preset: Preset) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    input.with_file_name(format!("{}-{}.png", stem, preset.name()))
}
