use clap::{Args, Parser, Subcommand};
use placeholder_gen::config::{self, CONFIG_FILENAME};
use placeholder_gen::imaging::{HAlign, Position, VAlign};
use placeholder_gen::provider::ImageProvider;
use placeholder_gen::session::ImageSession;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "placeholder-gen")]
#[command(about = "Placeholder images on demand")]
#[command(long_about = "\
Placeholder images on demand

Images come from named sources: flat colors, gradients, a local photo
directory, or public photo services. A selector name pins the content so the
same name gives the same picture at any size:

  placeholder-gen generate -W 640 -H 480 --selector hero
  placeholder-gen generate -W 64 -H 64 --selector hero --grayscale

Sources (default first):
  SolidColor, Gradient        always available
  Gallery                     when [gallery] path is configured
  LoremFlickr, LoremPixel,    when [remote] enabled = true
  PicsumPhotos, PlaceKitten,
  PlaceImg, Unsplash

Run 'placeholder-gen gen-config' to generate a documented placeholder.toml.")]
#[command(version)]
struct Cli {
    /// Configuration file
    #[arg(long, default_value = CONFIG_FILENAME, global = true)]
    config: PathBuf,

    /// Log debug events (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Produce one image and print its path (or data URL)
    Generate(GenerateArgs),
    /// List registered sources, default first
    Sources,
    /// Print a stock placeholder.toml with all options documented
    GenConfig,
}

#[derive(Args)]
struct GenerateArgs {
    #[arg(short = 'W', long)]
    width: u32,
    #[arg(short = 'H', long)]
    height: u32,
    /// Source name (default: first registered)
    #[arg(long)]
    source: Option<String>,
    /// Selector name; repeats give the same content
    #[arg(long)]
    selector: Option<String>,
    /// Output format extension (default from config)
    #[arg(long)]
    format: Option<String>,
    /// Outlined label in the bottom-right corner
    #[arg(long)]
    text: Option<String>,
    #[arg(long)]
    grayscale: bool,
    /// 0-100
    #[arg(long)]
    blur: Option<u8>,
    /// -100..100
    #[arg(long, allow_hyphen_values = true)]
    brightness: Option<i8>,
    /// -100..100
    #[arg(long, allow_hyphen_values = true)]
    contrast: Option<i8>,
    #[arg(long)]
    gamma: Option<f32>,
    /// 0-100
    #[arg(long)]
    opacity: Option<u8>,
    #[arg(long)]
    negative: bool,
    /// Logo file placed in the top-right corner
    #[arg(long)]
    logo: Option<PathBuf>,
    /// Directory to save into (default from config, then system temp dir)
    #[arg(long, conflicts_with = "data_url")]
    output: Option<PathBuf>,
    /// Print a data URL instead of saving a file
    #[arg(long)]
    data_url: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Generate(args) => {
            let config = config::load_config(&cli.config)?;
            let mut provider = ImageProvider::from_config(&config)?;
            let mut session = provider.create_session(
                args.width,
                args.height,
                args.selector.as_deref(),
                args.source.as_deref(),
            )?;
            apply_transforms(&mut session, &args)?;
            if args.data_url {
                println!("{}", session.to_data_url()?);
            } else {
                let path = session.save(args.output.as_deref())?;
                println!("{}", path.display());
            }
        }
        Command::Sources => {
            let config = config::load_config(&cli.config)?;
            let provider = ImageProvider::from_config(&config)?;
            for name in provider.source_names() {
                println!("{name}");
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Filters first, then the logo, then the label so it stays legible.
fn apply_transforms(
    session: &mut ImageSession,
    args: &GenerateArgs,
) -> placeholder_gen::Result<()> {
    if let Some(format) = &args.format {
        session.set_format(format)?;
    }
    if args.grayscale {
        session.grayscale()?;
    }
    if let Some(amount) = args.blur {
        session.blur(amount)?;
    }
    if let Some(level) = args.brightness {
        session.brightness(level)?;
    }
    if let Some(level) = args.contrast {
        session.contrast(level)?;
    }
    if let Some(gamma) = args.gamma {
        session.gamma(gamma)?;
    }
    if let Some(percent) = args.opacity {
        session.opacity(percent)?;
    }
    if args.negative {
        session.negative()?;
    }
    if let Some(logo) = &args.logo {
        session.insert_image(logo.as_path(), Position::new(HAlign::Right, VAlign::Top), 0)?;
    }
    if let Some(text) = &args.text {
        session.text(text)?;
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
