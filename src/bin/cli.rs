use anyhow::{anyhow, bail, Context, Result};
use crabblur::commands;
use crabblur::ops::{self, FlipAxis, StitchLayout};
use crabblur::quality::BlurDetector;
use crabblur::{Bitmap, BitmapConfig, CrabBlurConfig, ImageBuffer, PreviewSession};
use std::env;
use std::path::Path;

const USAGE: &str = "Usage: crabblur-cli <blur|flip|detect|stitch|preview|config> [args] [--json] [--config <path>]";

/// Options shared by every subcommand plus whatever is left over.
struct Invocation {
    positional: Vec<String>,
    options: Vec<(String, String)>,
    switches: Vec<String>,
    json: bool,
}

impl Invocation {
    fn parse(args: &[String]) -> Result<Self> {
        let mut positional = Vec::new();
        let mut options = Vec::new();
        let mut switches = Vec::new();
        let mut json = false;

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--json" => json = true,
                "--flip" | "--reset" => switches.push(args[i].clone()),
                flag if flag.starts_with("--") => {
                    i += 1;
                    let value = args
                        .get(i)
                        .ok_or_else(|| anyhow!("missing value for {}", flag))?;
                    options.push((flag.to_string(), value.clone()));
                }
                _ => positional.push(args[i].clone()),
            }
            i += 1;
        }

        Ok(Self {
            positional,
            options,
            switches,
            json,
        })
    }

    fn option(&self, name: &str) -> Option<&str> {
        self.options
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn parsed<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.option(name)
            .map(|value| {
                value
                    .parse::<T>()
                    .map_err(|e| anyhow!("invalid value for {}: {} ({})", name, value, e))
            })
            .transpose()
    }

    fn switch(&self, name: &str) -> bool {
        self.switches.iter().any(|s| s == name)
    }
}

fn main() {
    crabblur::init_logging();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("{}", USAGE);
        std::process::exit(1);
    }

    let result = Invocation::parse(&args[2..]).and_then(|inv| run(&args[1], &inv));
    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        eprintln!("{}", USAGE);
        std::process::exit(1);
    }
}

fn run(command: &str, inv: &Invocation) -> Result<()> {
    let config = match inv.option("--config") {
        Some(path) => commands::load_config_from(path).map_err(|e| anyhow!(e))?,
        None => commands::get_config().map_err(|e| anyhow!(e))?,
    };

    match command {
        "blur" => cmd_blur(inv, &config),
        "flip" => cmd_flip(inv, &config),
        "detect" => cmd_detect(inv, &config),
        "stitch" => cmd_stitch(inv, &config),
        "preview" => cmd_preview(inv, &config),
        "config" => cmd_config(inv),
        _ => bail!("unknown command: {}", command),
    }
}

fn load_buffer(path: &str) -> Result<ImageBuffer> {
    let bitmap = Bitmap::open(path).with_context(|| format!("failed to load {}", path))?;
    Ok(bitmap.to_buffer(false)?)
}

fn save_buffer(buffer: &ImageBuffer, path: &str, config: &CrabBlurConfig) -> Result<()> {
    let bitmap = Bitmap::from_buffer(buffer, BitmapConfig::Rgba8888)?;
    bitmap
        .save(Path::new(path), config.output.jpeg_quality)
        .with_context(|| format!("failed to save {}", path))
}

fn two_paths(inv: &Invocation, usage: &str) -> Result<(String, String)> {
    match inv.positional.as_slice() {
        [input, output] => Ok((input.clone(), output.clone())),
        _ => bail!("usage: {}", usage),
    }
}

fn cmd_blur(inv: &Invocation, config: &CrabBlurConfig) -> Result<()> {
    let (input, output) =
        two_paths(inv, "crabblur-cli blur <in> <out> [--sigma s | --progress p]")?;
    let sigma = match (inv.parsed::<f32>("--sigma")?, inv.parsed::<u32>("--progress")?) {
        (Some(sigma), _) => sigma,
        (None, Some(progress)) => config.blur.sigma_from_progress(progress),
        (None, None) => config.blur.sigma_from_progress(config.blur.default_progress),
    };

    let src = load_buffer(&input)?;
    let mut dst = src.clone();
    ops::gaussian_blur_with_border(&src, &mut dst, sigma, config.blur.border)?;
    save_buffer(&dst, &output, config)?;

    if inv.json {
        println!(
            "{}",
            serde_json::json!({ "input": input, "output": output, "sigma": sigma })
        );
    } else {
        println!("Blurred {} -> {} (sigma {:.2})", input, output, sigma);
    }
    Ok(())
}

fn cmd_flip(inv: &Invocation, config: &CrabBlurConfig) -> Result<()> {
    let (input, output) = two_paths(inv, "crabblur-cli flip <in> <out> [--axis v|h|both]")?;
    let axis = inv
        .parsed::<FlipAxis>("--axis")?
        .unwrap_or(config.flip.axis);

    let src = load_buffer(&input)?;
    let mut dst = src.clone();
    ops::flip(&src, &mut dst, axis)?;
    save_buffer(&dst, &output, config)?;

    if inv.json {
        println!(
            "{}",
            serde_json::json!({ "input": input, "output": output, "axis": axis })
        );
    } else {
        println!("Flipped {} -> {} ({:?})", input, output, axis);
    }
    Ok(())
}

fn cmd_detect(inv: &Invocation, config: &CrabBlurConfig) -> Result<()> {
    let input = match inv.positional.as_slice() {
        [input] => input.clone(),
        _ => bail!("usage: crabblur-cli detect <in> [--threshold t]"),
    };
    let threshold = inv
        .parsed::<f64>("--threshold")?
        .unwrap_or(config.detection.threshold);

    let metrics = BlurDetector::new(threshold)?.analyze(&load_buffer(&input)?)?;

    if inv.json {
        println!("{}", serde_json::to_string(&metrics)?);
    } else {
        println!(
            "{}: {} (variance {:.2}, threshold {}, {:?})",
            input,
            if metrics.is_blurred { "blurred" } else { "not blurred" },
            metrics.variance,
            metrics.threshold,
            metrics.blur_level
        );
    }
    Ok(())
}

fn cmd_stitch(inv: &Invocation, config: &CrabBlurConfig) -> Result<()> {
    let (output, inputs) = match inv.positional.split_first() {
        Some((output, inputs)) if !inputs.is_empty() => (output.clone(), inputs),
        _ => bail!("usage: crabblur-cli stitch <out> <in>... [--layout h|v|grid:N] [--overlap px]"),
    };

    let mut options = config.stitch.options();
    if let Some(layout) = inv.parsed::<StitchLayout>("--layout")? {
        options.layout = layout;
    }
    if let Some(overlap) = inv.parsed::<u32>("--overlap")? {
        options.overlap = overlap;
    }

    let sources = inputs
        .iter()
        .map(|path| load_buffer(path))
        .collect::<Result<Vec<_>>>()?;
    let mut composites = Vec::new();
    ops::stitch(&sources, &mut composites, &options)?;

    let composite = composites
        .pop()
        .ok_or_else(|| anyhow!("stitcher produced no output"))?;
    save_buffer(&composite, &output, config)?;

    if inv.json {
        println!(
            "{}",
            serde_json::json!({
                "output": output,
                "inputs": inputs,
                "width": composite.width(),
                "height": composite.height(),
                "layout": options.layout,
            })
        );
    } else {
        println!(
            "Stitched {} images -> {} ({}x{})",
            inputs.len(),
            output,
            composite.width(),
            composite.height()
        );
    }
    Ok(())
}

fn cmd_preview(inv: &Invocation, config: &CrabBlurConfig) -> Result<()> {
    let (input, output) =
        two_paths(inv, "crabblur-cli preview <in> <out> [--progress p] [--flip]")?;
    let progress = inv
        .parsed::<u32>("--progress")?
        .unwrap_or(config.blur.default_progress);

    let mut session = PreviewSession::new(load_buffer(&input)?, config.clone())?;
    let mut outcome = session.set_progress(progress)?;
    if inv.switch("--flip") {
        outcome = session.flip_source()?;
    }
    save_buffer(session.display(), &output, config)?;

    if inv.json {
        println!("{}", serde_json::to_string(&outcome)?);
    } else {
        println!(
            "Preview at progress {} (sigma {:.1}): {} -> {}",
            outcome.progress,
            outcome.sigma,
            if outcome.metrics.is_blurred { "blurred" } else { "not blurred" },
            output
        );
    }
    Ok(())
}

fn cmd_config(inv: &Invocation) -> Result<()> {
    let config = if inv.switch("--reset") {
        commands::reset_config().map_err(|e| anyhow!(e))?
    } else {
        commands::get_config().map_err(|e| anyhow!(e))?
    };

    if inv.json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        print!("{}", toml::to_string_pretty(&config)?);
    }
    Ok(())
}
