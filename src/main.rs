use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use faceform::report::AnalysisReport;
use faceform::{config, input, Analyzer};
use log::{info, warn};

#[derive(Parser)]
#[command(name = "faceform")]
#[command(
    version,
    about = "Facial symmetry scoring and face shape classification from landmarks"
)]
struct Cli {
    /// Config file (defaults to the system config path)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score symmetry, classify shape and write both annotated images
    Analyze {
        /// Face image
        #[arg(short, long)]
        image: PathBuf,
        /// Landmark JSON produced by the landmark model
        #[arg(short, long)]
        landmarks: PathBuf,
        /// Directory for the annotated images (overrides config)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
        /// Also write the JSON report to this file
        #[arg(short, long)]
        report: Option<PathBuf>,
        /// Embed base64 JPEGs in the report
        #[arg(long)]
        embed_images: bool,
    },
    /// Print the symmetry index for a landmark file
    Symmetry {
        #[arg(short, long)]
        landmarks: PathBuf,
    },
    /// Print the face shape for a landmark file
    Shape {
        #[arg(short, long)]
        landmarks: PathBuf,
    },
    /// Print the effective config, or write the defaults
    Config {
        #[arg(long)]
        write: bool,
    },
}

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_target(false)
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze {
            image,
            landmarks,
            out_dir,
            report,
            embed_images,
        } => {
            let out_dir = out_dir.unwrap_or_else(|| cfg.output_dir.clone());
            let embed = embed_images || cfg.embed_images;
            analyze(&cfg, &image, &landmarks, &out_dir, report.as_deref(), embed)
        }
        Commands::Symmetry { landmarks } => symmetry(&cfg, &landmarks),
        Commands::Shape { landmarks } => shape(&cfg, &landmarks),
        Commands::Config { write } => show_config(&cfg, cli.config.as_deref(), write),
    }
}

fn analyze(
    cfg: &config::Config,
    image_path: &Path,
    landmarks_path: &Path,
    out_dir: &Path,
    report_path: Option<&Path>,
    embed_images: bool,
) -> Result<()> {
    let image = input::load_image(image_path)?;
    let landmarks = input::load_landmarks(landmarks_path)?;
    info!(
        "Analyzing {} ({}x{}) with {} landmarks",
        image_path.display(),
        image.width(),
        image.height(),
        landmarks.len()
    );

    let analyzer = Analyzer::new(cfg.analysis.clone());
    let (analysis, encoded) = analyzer
        .analyze_encoded(&image, &landmarks)
        .with_context(|| {
            format!(
                "Failed to encode annotated images at quality {}",
                analyzer.config().jpeg_quality
            )
        })?;

    if analysis.five_points.is_none() {
        warn!(
            "Landmark layout not recognized ({} points); symmetry image shows landmarks only",
            landmarks.len()
        );
    }

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;
    let symmetry_path = out_dir.join("symmetry.jpg");
    let shape_path = out_dir.join("face_shape.jpg");
    std::fs::write(&symmetry_path, &encoded.symmetry)
        .with_context(|| format!("writing {}", symmetry_path.display()))?;
    std::fs::write(&shape_path, &encoded.shape)
        .with_context(|| format!("writing {}", shape_path.display()))?;
    info!("Saved {} and {}", symmetry_path.display(), shape_path.display());

    let mut report = AnalysisReport::new(landmarks.len(), &analysis);
    if embed_images {
        report = report.with_images(&encoded);
    }
    let json = report.to_json()?;

    if let Some(path) = report_path {
        std::fs::write(path, &json).with_context(|| format!("writing {}", path.display()))?;
        info!("Report written to {}", path.display());
    }
    println!("{}", json);
    Ok(())
}

fn symmetry(cfg: &config::Config, landmarks_path: &Path) -> Result<()> {
    let landmarks = input::load_landmarks(landmarks_path)?;
    let analyzer = Analyzer::new(cfg.analysis.clone());
    let (result, _) = analyzer.symmetry(&landmarks);

    println!("Symmetry index: {:.2}%", result.index);
    println!("{}", result.description());
    Ok(())
}

fn shape(cfg: &config::Config, landmarks_path: &Path) -> Result<()> {
    let landmarks = input::load_landmarks(landmarks_path)?;
    let analyzer = Analyzer::new(cfg.analysis.clone());
    let result = analyzer.shape(&landmarks);

    println!("Face shape: {}", result.shape_name());
    println!("{}", result.description);
    if let Some(m) = result.measurements {
        println!(
            "  height {:.1}, cheekbones {:.1}, forehead {:.1}, jaw {:.1}",
            m.face_height, m.cheekbone_width, m.forehead_width, m.jaw_width
        );
    }
    Ok(())
}

fn show_config(cfg: &config::Config, path: Option<&Path>, write: bool) -> Result<()> {
    if write {
        let target = path.unwrap_or(&config::CONFIG_PATH);
        config::save_config(&config::Config::default(), Some(target))
            .with_context(|| format!("writing {}", target.display()))?;
        info!("Default config written to {}", target.display());
        return Ok(());
    }
    print!("{}", toml::to_string_pretty(cfg)?);
    Ok(())
}
