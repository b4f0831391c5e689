use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "covercraft", version)]
struct Cli {
    /// Engine config JSON; defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a print export of a design.
    Export(ExportArgs),
    /// Render an on-screen preview (guides shown) for a display area.
    Preview(PreviewArgs),
    /// Run a crop session and print the resulting crop transform as JSON.
    Crop(CropArgs),
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Design JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Asset root; defaults to the design's directory.
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Output path; defaults to `cover_<size>.<ext>` next to the design.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Print resolution; defaults to the config's export dpi.
    #[arg(long)]
    dpi: Option<f64>,

    /// Output encoding.
    #[arg(long, value_enum, default_value_t = FormatChoice::Png)]
    format: FormatChoice,

    /// JPEG quality.
    #[arg(long, default_value_t = 90)]
    quality: u8,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Design JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Asset root; defaults to the design's directory.
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Display container width in pixels.
    #[arg(long, default_value_t = 1280.0)]
    width: f64,

    /// Display container height in pixels.
    #[arg(long, default_value_t = 720.0)]
    height: f64,

    /// Fit the current book instead of the largest reference size.
    #[arg(long)]
    mobile: bool,
}

#[derive(Parser, Debug)]
struct CropArgs {
    /// Design JSON; its layout, slot and mask select the crop window.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Image to crop, relative to the asset root.
    #[arg(long)]
    image: String,

    /// Asset root; defaults to the design's directory.
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Zoom as a multiple of the cover scale.
    #[arg(long, default_value_t = 1.0)]
    zoom: f64,

    /// Number of quarter turns.
    #[arg(long, default_value_t = 0)]
    rotate: u8,

    /// Pan in reference-frame units.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    dx: f64,

    /// Pan in reference-frame units.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    dy: f64,

    /// Write the design back with the cropped image set.
    #[arg(long)]
    write: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Png,
    Jpeg,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    match cli.cmd {
        Command::Export(args) => cmd_export(config, args),
        Command::Preview(args) => cmd_preview(config, args),
        Command::Crop(args) => cmd_crop(config, args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<covercraft::EngineConfig> {
    let cfg = match path {
        Some(p) => covercraft::EngineConfig::from_path(p)?,
        None => covercraft::EngineConfig::default(),
    };
    let cfg = cfg.with_env_overrides();
    cfg.validate()?;
    Ok(cfg)
}

fn asset_root(design: &Path, assets: Option<PathBuf>) -> PathBuf {
    assets.unwrap_or_else(|| {
        design
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    })
}

fn make_engine(
    config: covercraft::EngineConfig,
    root: PathBuf,
) -> anyhow::Result<covercraft::CoverEngine<covercraft::AssetCache<covercraft::FsAssetSource>>> {
    let loader = covercraft::AssetCache::new(covercraft::FsAssetSource::new(root));
    Ok(covercraft::CoverEngine::new(config, loader)?)
}

fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn cmd_export(config: covercraft::EngineConfig, args: ExportArgs) -> anyhow::Result<()> {
    let design = covercraft::DesignState::from_path(&args.in_path)?;
    let dpi = args.dpi.unwrap_or(config.export_dpi);
    let format = match args.format {
        FormatChoice::Png => covercraft::ExportFormat::Png,
        FormatChoice::Jpeg => covercraft::ExportFormat::Jpeg {
            quality: args.quality,
        },
    };
    let mut engine = make_engine(config, asset_root(&args.in_path, args.assets))?;

    let raster = engine.export(&design, dpi, format)?;
    tracing::info!(width = raster.width, height = raster.height, dpi, "exported");

    let out = args.out.unwrap_or_else(|| {
        args.in_path
            .with_file_name(raster.file_name(design.book_size_cm))
    });
    write_output(&out, &raster.bytes)
}

fn cmd_preview(config: covercraft::EngineConfig, args: PreviewArgs) -> anyhow::Result<()> {
    let design = covercraft::DesignState::from_path(&args.in_path)?;
    let area = if args.mobile {
        covercraft::DisplayArea::mobile(args.width, args.height)
    } else {
        covercraft::DisplayArea::desktop(args.width, args.height)
    };
    let mut engine = make_engine(config, asset_root(&args.in_path, args.assets))?;

    let Some(rendered) = engine.resolve_and_render(&area, &design)? else {
        anyhow::bail!("display area {}x{} is too small", args.width, args.height);
    };
    tracing::info!(
        ppi = rendered.frame.ppi,
        width = rendered.raster.width,
        height = rendered.raster.height,
        "preview rendered"
    );
    write_output(&args.out, &rendered.raster.encode_png()?)
}

fn cmd_crop(config: covercraft::EngineConfig, args: CropArgs) -> anyhow::Result<()> {
    let mut design = covercraft::DesignState::from_path(&args.in_path)?;
    let mut engine = make_engine(config, asset_root(&args.in_path, args.assets))?;

    let mut session = engine.start_crop(&design, &args.image)?;
    for _ in 0..args.rotate % 4 {
        session.rotate();
    }
    session.set_zoom(session.cover_scale() * args.zoom);
    session.drag_by(args.dx, args.dy);
    let crop = session.apply();

    println!(
        "{}",
        serde_json::to_string_pretty(&crop).context("serialize crop transform")?
    );

    if args.write {
        design.set_main_image(covercraft::ImageRef::cropped(args.image, crop));
        let json = serde_json::to_string_pretty(&design).context("serialize design")?;
        write_output(&args.in_path, json.as_bytes())?;
    }
    Ok(())
}
