use clap::{Parser, Subcommand, ValueEnum};
use smarter_images::element::Element;
use smarter_images::scene::Scene;
use smarter_images::url::{apply, build_url};
use smarter_images::{Swapper, config, output};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "smarter-images")]
#[command(about = "Viewport-driven responsive image swapping")]
#[command(long_about = "\
Viewport-driven responsive image swapping

Viewport widths map to breakpoint zones; each managed element is pointed at
an image sized for the current zone, built by one URL strategy:

  resize-service   <protocol><service>.cloudimage.io/s/resize/<zone>/<source>
                   (or /s/crop/<zone>x<height>/ with maintain_aspect)
  custom-url       your template, %%size%% → zone, %%source%% → source token
  placeholder      <protocol>placehold.it/<zone>x<zone>

With upsize_only, an element never swaps down to a smaller zone than it has
already been served.

Run 'smarter-images gen-config' to generate a documented config file.")]
#[command(version)]
struct Cli {
    /// Config file (stock defaults when missing)
    #[arg(long, default_value = "smarter-images.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum Tag {
    Img,
    Other,
}

#[derive(Subcommand)]
enum Command {
    /// Print the zone for a viewport width
    Resolve {
        #[arg(long)]
        width: u32,
    },
    /// Print the URL built for a fresh element at a viewport width
    Url {
        #[arg(long)]
        width: u32,
        /// Source token of the element
        #[arg(long)]
        source: Option<String>,
        #[arg(long, value_enum, default_value = "img")]
        tag: Tag,
        /// Rendered box as WIDTHxHEIGHT, used for the aspect ratio
        #[arg(long = "box", value_parser = parse_box)]
        size: Option<(f64, f64)>,
    },
    /// Replay a scene file's signals against its elements
    Simulate {
        scene: PathBuf,
        /// Print the final element states as JSON instead of the report
        #[arg(long)]
        json: bool,
    },
    /// Validate the config file
    Check,
    /// Print a stock config file with all options documented
    GenConfig,
}

fn parse_box(value: &str) -> Result<(f64, f64), String> {
    let (w, h) = value
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;
    let w = w.parse::<f64>().map_err(|e| format!("bad width: {e}"))?;
    let h = h.parse::<f64>().map_err(|e| format!("bad height: {e}"))?;
    Ok((w, h))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Resolve { width } => {
            let swapper = load_swapper(&cli.config)?;
            println!("{}", swapper.zone_for(width));
        }
        Command::Url {
            width,
            source,
            tag,
            size,
        } => {
            let swapper = load_swapper(&cli.config)?;
            let zone = swapper.zone_for(width);
            let tag = match tag {
                Tag::Img => "img",
                Tag::Other => "div",
            };
            let mut element = Element::new("cli", tag);
            element.source = source;
            if let Some((w, h)) = size {
                element = element.with_box(w, h);
            }
            let built = build_url(swapper.config(), &mut element, zone)?;
            for diagnostic in &built.diagnostics {
                eprintln!("warning: {diagnostic}");
            }
            apply(&mut element, &built.url);
            println!("{}", element.rendered().unwrap_or_default());
        }
        Command::Simulate { scene, json } => {
            let swapper = load_swapper(&cli.config)?;
            let mut scene = Scene::load(&scene)?;
            let replay = scene.replay(&swapper);
            if json {
                println!("{}", serde_json::to_string_pretty(&scene.elements)?);
            } else {
                output::print_replay(&replay, &scene.elements);
            }
        }
        Command::Check => {
            println!("==> Checking {}", cli.config.display());
            let swapper = load_swapper(&cli.config)?;
            output::print_config_summary(swapper.config());
            println!("==> Config is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load and validate the config, then install the logger it asks for.
fn load_swapper(path: &Path) -> Result<Swapper, config::ConfigError> {
    let config = config::load_config(path)?;
    init_logger(config.logging);
    Swapper::new(config)
}

/// Install `env_logger`, defaulting to `info` when the config asks for
/// logging. `RUST_LOG` always wins.
fn init_logger(logging: bool) {
    let default = if logging { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}
