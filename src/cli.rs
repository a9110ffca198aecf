//! Command-line front end over the processing engine.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use clap::{Parser, Subcommand};
use tracing::info;

use lissage_core::codec;
use lissage_core::params::NEUTRAL_LEVEL;
use lissage_engine::{
    DenoiseParams, EditParams, Engine, EngineConfig, EngineEvent, EngineEvents, ImageInfo,
};

/// Denoise and adjust JPEG, PNG and TIFF images.
#[derive(Parser, Debug)]
#[command(name = "lissage", version)]
pub struct Cli {
    /// Engine configuration file (JSON)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print file details and the color baseline of an image
    Info {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a denoise filter and save the result
    Denoise {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output file; without an extension the input's format is used
        #[arg(short, long, value_name = "OUTPUT")]
        output: PathBuf,

        #[command(subcommand)]
        filter: Filter,
    },

    /// Adjust brightness, contrast, hue and saturation and save the result
    Edit {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output file; without an extension the input's format is used
        #[arg(short, long, value_name = "OUTPUT")]
        output: PathBuf,

        /// 0-200, 100 leaves brightness unchanged
        #[arg(long, default_value_t = NEUTRAL_LEVEL)]
        brightness: i32,

        /// 0-200, 100 leaves contrast unchanged
        #[arg(long, default_value_t = NEUTRAL_LEVEL)]
        contrast: i32,

        /// 0-179, defaults to the image's own hue
        #[arg(long)]
        hue: Option<i32>,

        /// 0-255, defaults to the image's own saturation
        #[arg(long)]
        saturation: Option<i32>,
    },
}

#[derive(Subcommand, Clone, Copy, Debug)]
enum Filter {
    /// Gaussian blur
    Gaussian {
        #[arg(long, default_value_t = 1.0)]
        sigma: f32,
        /// Odd, positive
        #[arg(long, default_value_t = 5)]
        kernel_width: i32,
        /// Odd, positive
        #[arg(long, default_value_t = 5)]
        kernel_height: i32,
    },
    /// Median blur
    Median {
        /// Odd, at least 3
        #[arg(long, default_value_t = 5)]
        aperture: i32,
    },
    /// Non-local means
    NlMeans,
}

impl From<Filter> for DenoiseParams {
    fn from(filter: Filter) -> Self {
        match filter {
            Filter::Gaussian {
                sigma,
                kernel_width,
                kernel_height,
            } => DenoiseParams::GaussianBlur {
                sigma,
                kernel_width,
                kernel_height,
            },
            Filter::Median { aperture } => DenoiseParams::MedianBlur { aperture },
            Filter::NlMeans => DenoiseParams::NonLocalMeans,
        }
    }
}

pub fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Info { input, json } => print_info(&input, json, config),
        Command::Denoise {
            input,
            output,
            filter,
        } => {
            let params = DenoiseParams::from(filter);
            process(&input, &output, config, |engine, _| {
                engine.denoise(params)?;
                Ok(())
            })
        }
        Command::Edit {
            input,
            output,
            brightness,
            contrast,
            hue,
            saturation,
        } => process(&input, &output, config, |engine, defaults| {
            engine.edit(EditParams {
                brightness,
                contrast,
                hue: hue.unwrap_or(defaults.hue),
                saturation: saturation.unwrap_or(defaults.saturation),
            })?;
            Ok(())
        }),
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse config {}", path.display()))
}

fn check_extension(path: &Path) -> Result<()> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    ensure!(
        codec::is_supported_extension(ext),
        "unsupported image format: {}",
        path.display()
    );
    Ok(())
}

/// `output` as given, or with the source's extension when it has none.
fn resolve_output(output: &Path, info: &ImageInfo) -> PathBuf {
    if output.extension().is_some() {
        return output.to_path_buf();
    }
    let dir = output.parent().unwrap_or(Path::new(""));
    let stem = output.file_name().unwrap_or_default().to_string_lossy();
    info.save_path(dir, &stem)
}

fn print_info(input: &Path, json: bool, config: EngineConfig) -> Result<()> {
    check_extension(input)?;
    let (mut engine, _events) = Engine::start(config)?;
    let loaded = engine.load(input)?;
    engine.stop();

    let info = &loaded.info;
    if json {
        let value = serde_json::json!({
            "info": info,
            "baseline": loaded.baseline,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{}.{}", info.name, info.extension);
        println!("  size:       {} KB", info.size_kb());
        println!("  dimensions: {}x{}", info.width, info.height);
        println!("  hue:        {}", loaded.baseline.hue);
        println!("  saturation: {}", loaded.baseline.saturation);
    }
    Ok(())
}

/// Load `input`, queue one operation, wait for its result and save it.
fn process(
    input: &Path,
    output: &Path,
    config: EngineConfig,
    submit: impl FnOnce(&Engine, EditParams) -> Result<()>,
) -> Result<()> {
    check_extension(input)?;
    let (mut engine, mut events) = Engine::start(config)?;

    let loaded = engine.load(input)?;
    let output = resolve_output(output, &loaded.info);
    check_extension(&output)?;

    submit(&engine, loaded.edit_defaults())?;
    let event = wait_for_result(&mut events)?;
    info!(
        width = event.image().width,
        height = event.image().height,
        denoised = event.is_denoised(),
        "result ready"
    );

    engine.save(&output)?;
    engine.stop();
    println!("{}", output.display());
    Ok(())
}

fn wait_for_result(events: &mut EngineEvents) -> Result<EngineEvent> {
    events
        .blocking_recv()
        .context("engine stopped before producing a result")
}
