use chrono::Local;
use clap::Parser;
use log::{LevelFilter, info};
use std::path::PathBuf;
use std::process::ExitCode;
use swipe_gal::config::{self, Overrides};
use swipe_gal::process::{self, ProcessConfig};
use swipe_gal::profile::BuildProfile;
use swipe_gal::rendition::BuildContext;
use swipe_gal::types::RenditionSpec;
use swipe_gal::{generate, output};

#[derive(Parser)]
#[command(name = "swipe-gal")]
#[command(about = "Build a static, swipeable photo gallery from a list of images")]
#[command(long_about = "\
Build a static, swipeable photo gallery from a list of images

Every JPEG or PNG source is published into the output directory together
with two renditions: a proportionally scaled large view (<name>_small.<ext>)
and a smart-cropped thumbnail (<name>_thm.<ext>). The gallery page lists the
sources in command-line order.

Renditions newer than their source are reused, so re-running over the same
files only re-encodes what changed. Files named like renditions and files
with other extensions are ignored.

  swipe-gal -o site -t \"Spring\" shots/*.jpg

Size flags and the title override values from --config:

  title = \"Untitled\"
  [thumbnail]  width = 256, height = 256
  [small]      width = 2048, height = 2048
  [encoding]   jpeg_quality = 90
  [processing] max_workers = 8   # default: one worker per source")]
struct Cli {
    /// Log progress details
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Log debug diagnostics
    #[arg(short = 'V', long)]
    debug: bool,

    /// Thumbnail width [default: 256]
    #[arg(long = "tw", value_name = "PX")]
    thumb_width: Option<u32>,

    /// Thumbnail height [default: 256]
    #[arg(long = "th", value_name = "PX")]
    thumb_height: Option<u32>,

    /// Large view bounding width [default: 2048]
    #[arg(long = "sw", value_name = "PX")]
    small_width: Option<u32>,

    /// Large view bounding height [default: 2048]
    #[arg(long = "sh", value_name = "PX")]
    small_height: Option<u32>,

    /// Output directory (created if missing)
    #[arg(short = 'o', long)]
    output: PathBuf,

    /// Gallery title [default: Untitled]
    #[arg(short = 't', long)]
    title: Option<String>,

    /// Write a JSON build-timing profile to this file
    #[arg(long, value_name = "FILE")]
    cpuprofile: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum concurrent build workers [default: one per source]
    #[arg(short = 'j', long, value_name = "N")]
    jobs: Option<usize>,

    /// Source images, in gallery order
    sources: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match build(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("swipe-gal: {e}");
            ExitCode::FAILURE
        }
    }
}

/// `-V` → debug, `-v` → info, otherwise `RUST_LOG` or warnings only.
fn init_logging(cli: &Cli) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if cli.debug {
        builder.filter_level(LevelFilter::Debug);
    } else if cli.verbose {
        builder.filter_level(LevelFilter::Info);
    }
    builder.init();
}

fn build(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let overrides = Overrides {
        title: cli.title.clone(),
        thumbnail_width: cli.thumb_width,
        thumbnail_height: cli.thumb_height,
        small_width: cli.small_width,
        small_height: cli.small_height,
        max_workers: cli.jobs,
    };
    let config = config::load_config(cli.config.as_deref(), &overrides)?;

    std::fs::create_dir_all(&cli.output).map_err(|e| {
        format!(
            "could not create output directory {}: {e}",
            cli.output.display()
        )
    })?;

    let ctx = BuildContext {
        output_dir: cli.output.clone(),
        small: RenditionSpec::small(config.small.width, config.small.height),
        thumbnail: RenditionSpec::thumbnail(config.thumbnail.width, config.thumbnail.height),
    };

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_process_event(&event) {
                println!("{}", line);
            }
        }
    });
    let result = process::run(
        &cli.sources,
        &ctx,
        &ProcessConfig::from_gallery_config(&config),
        Some(tx),
    );
    printer
        .join()
        .map_err(|_| "progress printer thread panicked")?;
    let result = result?;

    if let Some(path) = &cli.cpuprofile {
        let profile = BuildProfile::new(result.workers, result.elapsed, result.timings);
        profile.write(path)?;
        if let Some(slowest) = profile.slowest() {
            info!(
                "slowest source: {} ({:.1} ms)",
                slowest.file_name,
                slowest.total_ms()
            );
        }
        info!("build profile written to {}", path.display());
    }

    let photos = result.manifest.len();
    let input = generate::assemble(&config.title, result.manifest, Local::now().naive_local());
    generate::write_gallery(&cli.output, &input)?;

    output::print_summary(
        &config.title,
        &cli.output.join("index.html"),
        photos,
        &result.stats,
    );
    Ok(())
}
