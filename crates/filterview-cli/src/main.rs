//! filterview - load a photo, run a filter over it, save the result

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use filterview_core::filter::{AdjustmentsFilter, GrayscaleFilter};
use filterview_core::{FilterState, ImageFilter, ImageView, ViewConfig, ViewEvent};
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "filterview")]
#[command(author, version, about = "Apply a photo filter and save the result")]
#[command(long_about = "
Loads a photo (honoring its EXIF orientation), runs a filter over it and
saves the result as <pictures>/filters/<epoch-ms>.jpg.

Examples:
  filterview info photo.jpg
  filterview apply photo.jpg --filter grayscale
  filterview apply photo.jpg --filter adjust --exposure 0.5 --saturation -30
  filterview apply file:///home/me/photo.jpg -o /tmp/out -q 85
  filterview apply photo.jpg --config view.json
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show size and orientation of a photo
    #[command(visible_alias = "i")]
    Info(InfoArgs),

    /// Filter a photo and save it
    #[command(visible_alias = "a")]
    Apply(ApplyArgs),
}

#[derive(Args)]
struct InfoArgs {
    /// Path or file:// URI
    source: String,
}

#[derive(Args)]
struct ApplyArgs {
    /// Path or file:// URI
    source: String,

    /// Filter to run
    #[arg(short, long, value_enum, default_value = "grayscale")]
    filter: FilterKind,

    /// Exposure in stops (adjust filter)
    #[arg(long, allow_hyphen_values = true)]
    exposure: Option<f32>,

    /// Contrast, -100 to 100 (adjust filter)
    #[arg(long, allow_hyphen_values = true)]
    contrast: Option<f32>,

    /// Temperature, -100 warm to 100 cool (adjust filter)
    #[arg(long, allow_hyphen_values = true)]
    temperature: Option<f32>,

    /// Saturation, -100 to 100 (adjust filter)
    #[arg(long, allow_hyphen_values = true)]
    saturation: Option<f32>,

    /// JSON view config; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pictures directory; images go into its "filters" subdirectory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// JPEG quality (1-100) [default: 90]
    #[arg(short, long)]
    quality: Option<u8>,

    /// Give up waiting for the filter after this many seconds
    #[arg(long, default_value = "60")]
    timeout: u64,
}

#[derive(Clone, Copy, ValueEnum)]
enum FilterKind {
    Grayscale,
    Adjust,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Info(args) => cmd_info(args),
        Commands::Apply(args) => cmd_apply(args),
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_info(args: InfoArgs) -> Result<()> {
    let mut view = ImageView::new(ViewConfig::default());
    view.set_source(&args.source);
    if view.image().is_empty() {
        bail!("could not load {}", args.source);
    }

    let (width, height) = view.implicit_size();
    println!("source:      {}", view.source());
    println!("size:        {}x{}", width, height);
    println!(
        "orientation: {:?} (EXIF {})",
        view.orientation(),
        view.orientation().exif_code()
    );
    Ok(())
}

fn cmd_apply(args: ApplyArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => ViewConfig::load(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => ViewConfig::default(),
    };
    if let Some(dir) = &args.output_dir {
        config.pictures_dir = dir.clone();
    }
    if let Some(quality) = args.quality {
        config.jpeg_quality = quality;
    }

    let mut view = ImageView::new(config);
    view.set_source(&args.source);
    if view.image().is_empty() {
        bail!("could not load {}", args.source);
    }
    log_events(&mut view);

    match args.filter {
        FilterKind::Grayscale => {
            let filter: Arc<dyn ImageFilter> = Arc::new(GrayscaleFilter::new());
            view.apply_filter(Some(&filter));
            wait_for_result(&mut view, args.timeout)?;
        }
        FilterKind::Adjust => {
            let adjustments = Arc::new(AdjustmentsFilter::new());
            let filter: Arc<dyn ImageFilter> = adjustments.clone();
            // Attaching a parameterized filter resets it; set values afterwards.
            view.apply_filter(Some(&filter));
            let values = [
                ("exposure", args.exposure),
                ("contrast", args.contrast),
                ("temperature", args.temperature),
                ("saturation", args.saturation),
            ];
            for (name, value) in values {
                if let Some(value) = value {
                    adjustments.set_parameter(name, value);
                }
            }
            view.reapply_filter();
            wait_for_result(&mut view, args.timeout)?;
        }
    }

    let saved = view
        .save_image()
        .with_context(|| format!("Failed to save filtered {}", args.source))?;
    log_events(&mut view);

    info!(file = %saved.file_name, "done");
    println!("{}", saved.path.display());
    Ok(())
}

/// Pump filter results the way a UI event loop would.
fn wait_for_result(view: &mut ImageView, timeout_secs: u64) -> Result<()> {
    if !view.is_applying() {
        bail!("the filter declined the image (check parameter ranges)");
    }

    let deadline = Instant::now() + Duration::from_secs(timeout_secs);
    while view.is_applying() {
        view.process_filter_results();
        log_events(view);
        if Instant::now() >= deadline {
            bail!("filter did not finish within {}s", timeout_secs);
        }
        thread::sleep(Duration::from_millis(10));
    }

    debug_assert_eq!(view.filter_state(), FilterState::Filtered);
    Ok(())
}

fn log_events(view: &mut ImageView) {
    for event in view.drain_events() {
        match event {
            ViewEvent::ImageChanged(image) => {
                debug!(width = image.width, height = image.height, "image changed")
            }
            other => debug!(?other, "view event"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filterview_core::{DecodedImage, FilterParameter, FilterSink};
    use std::path::Path;
    use std::sync::Mutex;

    /// Accepts every request and never answers it.
    #[derive(Default)]
    struct StalledFilter {
        pending: Mutex<Vec<FilterSink>>,
    }

    impl ImageFilter for StalledFilter {
        fn name(&self) -> &str {
            "stalled"
        }

        fn parameters(&self) -> Vec<FilterParameter> {
            Vec::new()
        }

        fn apply(&self, _image: Arc<DecodedImage>, sink: FilterSink) -> bool {
            self.pending.lock().unwrap().push(sink);
            true
        }

        fn reset_parameters(&self) {}
    }

    fn write_png(dir: &Path) -> String {
        let path = dir.join("in.png");
        image::RgbaImage::from_pixel(6, 4, image::Rgba([200, 40, 40, 255]))
            .save(&path)
            .unwrap();
        path.to_string_lossy().into_owned()
    }

    fn loaded_view(dir: &Path) -> ImageView {
        let mut view = ImageView::new(ViewConfig::with_pictures_dir(dir));
        view.set_source(&write_png(dir));
        view
    }

    fn apply_args(argv: &[&str]) -> ApplyArgs {
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Apply(args) => args,
            Commands::Info(_) => panic!("expected apply"),
        }
    }

    #[test]
    fn test_parse_info() {
        let cli = Cli::try_parse_from(["filterview", "info", "photo.jpg"]).unwrap();
        match cli.command {
            Commands::Info(args) => assert_eq!(args.source, "photo.jpg"),
            Commands::Apply(_) => panic!("expected info"),
        }
        assert!(!cli.verbose);
    }

    #[test]
    fn test_parse_apply_negative_values() {
        let args = apply_args(&[
            "filterview",
            "apply",
            "photo.jpg",
            "--filter",
            "adjust",
            "--saturation",
            "-30",
            "--exposure",
            "-1.5",
            "-q",
            "85",
        ]);

        assert!(matches!(args.filter, FilterKind::Adjust));
        assert_eq!(args.saturation, Some(-30.0));
        assert_eq!(args.exposure, Some(-1.5));
        assert_eq!(args.contrast, None);
        assert_eq!(args.quality, Some(85));
        assert!(args.config.is_none());
    }

    #[test]
    fn test_parse_apply_defaults() {
        let args = apply_args(&["filterview", "a", "photo.jpg"]);
        assert!(matches!(args.filter, FilterKind::Grayscale));
        assert_eq!(args.quality, None);
        assert_eq!(args.timeout, 60);
    }

    #[test]
    fn test_parse_rejects_unknown_filter() {
        assert!(Cli::try_parse_from(["filterview", "apply", "x.jpg", "--filter", "sepia"]).is_err());
    }

    #[test]
    fn test_wait_fails_when_filter_declines() {
        let tmp = tempfile::tempdir().unwrap();
        let mut view = loaded_view(tmp.path());
        let adjustments = Arc::new(AdjustmentsFilter::new());
        let filter: Arc<dyn ImageFilter> = adjustments.clone();
        view.apply_filter(Some(&filter));
        adjustments.set_parameter("exposure", 50.0);
        view.reapply_filter();

        let err = wait_for_result(&mut view, 1).unwrap_err();
        assert!(err.to_string().contains("declined"));
    }

    #[test]
    fn test_wait_times_out_without_result() {
        let tmp = tempfile::tempdir().unwrap();
        let mut view = loaded_view(tmp.path());
        let stalled = Arc::new(StalledFilter::default());
        let filter: Arc<dyn ImageFilter> = stalled.clone();
        view.apply_filter(Some(&filter));

        let err = wait_for_result(&mut view, 0).unwrap_err();
        assert!(err.to_string().contains("did not finish"));
        assert!(view.is_applying());
        assert_eq!(stalled.pending.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_wait_returns_once_filtered() {
        let tmp = tempfile::tempdir().unwrap();
        let mut view = loaded_view(tmp.path());
        let filter: Arc<dyn ImageFilter> = Arc::new(GrayscaleFilter::new());
        view.apply_filter(Some(&filter));

        wait_for_result(&mut view, 5).unwrap();
        assert_eq!(view.filter_state(), FilterState::Filtered);
    }

    fn saved_files(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    fn is_timestamped_jpeg(name: &str) -> bool {
        name.strip_suffix(".jpg")
            .is_some_and(|stem| !stem.is_empty() && stem.chars().all(|c| c.is_ascii_digit()))
    }

    #[test]
    fn test_apply_writes_timestamped_jpeg() {
        let tmp = tempfile::tempdir().unwrap();
        let source = write_png(tmp.path());
        let out = tmp.path().join("out");
        let out_arg = out.to_string_lossy().into_owned();

        let args = apply_args(&[
            "filterview",
            "apply",
            &source,
            "--filter",
            "adjust",
            "--saturation",
            "-100",
            "-o",
            &out_arg,
        ]);
        cmd_apply(args).unwrap();

        let files = saved_files(&out.join("filters"));
        assert_eq!(files.len(), 1);
        assert!(is_timestamped_jpeg(&files[0]), "{}", files[0]);

        let written = image::open(out.join("filters").join(&files[0])).unwrap();
        assert_eq!((written.width(), written.height()), (6, 4));
    }

    #[test]
    fn test_apply_reads_config_file() {
        let tmp = tempfile::tempdir().unwrap();
        let source = write_png(tmp.path());
        let pictures = tmp.path().join("pictures");
        let config_path = tmp.path().join("view.json");
        let mut config = ViewConfig::with_pictures_dir(&pictures);
        config.subdirectory = "edits".to_string();
        std::fs::write(&config_path, config.to_json().unwrap()).unwrap();
        let config_arg = config_path.to_string_lossy().into_owned();

        cmd_apply(apply_args(&["filterview", "apply", &source, "--config", &config_arg])).unwrap();

        let files = saved_files(&pictures.join("edits"));
        assert_eq!(files.len(), 1);
        assert!(is_timestamped_jpeg(&files[0]), "{}", files[0]);
    }

    #[test]
    fn test_apply_fails_on_missing_source() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("nope.png").to_string_lossy().into_owned();
        let out_arg = tmp.path().to_string_lossy().into_owned();

        let err = cmd_apply(apply_args(&["filterview", "apply", &missing, "-o", &out_arg]))
            .unwrap_err();
        assert!(err.to_string().contains("could not load"));
        assert!(!tmp.path().join("filters").exists());
    }
}
