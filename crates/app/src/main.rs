use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};

use audio_vase_core::{
    parse_stl, write_ascii_stl, write_binary_stl, AppConfig, AudioDecoder, FeatureExtractor,
    GenerationSettings, VasePipeline, WavDecoder,
};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

fn main() -> audio_vase_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyse {
            input,
            output,
            segment_ms,
        } => run_analyse(&input, output.as_deref(), segment_ms),
        Commands::Generate(args) => run_generate(&args),
        Commands::Inspect { input } => run_inspect(&input),
    }
}

fn run_analyse(
    input: &Path,
    output: Option<&Path>,
    segment_ms: Option<f32>,
) -> audio_vase_core::Result<()> {
    tracing::info!(?input, ?output, "running feature analysis");

    let extractor = match segment_ms {
        Some(ms) => FeatureExtractor::with_segment_seconds(ms / 1_000.0)?,
        None => FeatureExtractor::default(),
    };
    let audio = WavDecoder::new().decode_file(input)?;
    let features = extractor.extract(&audio)?;

    let json = serde_json::to_string_pretty(&features)?;
    match output {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}

fn run_generate(args: &GenerateArgs) -> audio_vase_core::Result<()> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if args.seed.is_some() {
        config.noise_seed = args.seed;
    }
    args.shape.apply(&mut config.generation);

    let pipeline = VasePipeline::from_config(&config)?;
    tracing::info!(
        input = ?args.input,
        output = ?args.output,
        seed = pipeline.noise().seed(),
        "generating vase"
    );

    let bytes = fs::read(&args.input)?;
    let features = pipeline.analyse(&WavDecoder::new(), &bytes)?;

    let base = match &args.base {
        Some(path) => Some(parse_stl(&fs::read(path)?)?),
        None => None,
    };
    let mesh = pipeline.generate_with_base(&features, base.as_ref())?;

    let writer = BufWriter::new(File::create(&args.output)?);
    if args.binary {
        write_binary_stl(&mesh, &args.name, writer)?;
    } else {
        write_ascii_stl(&mesh, &args.name, writer)?;
    }

    tracing::info!(
        triangles = mesh.triangle_count(),
        output = ?args.output,
        "wrote vase"
    );
    Ok(())
}

fn run_inspect(input: &Path) -> audio_vase_core::Result<()> {
    let mesh = parse_stl(&fs::read(input)?)?;
    match mesh.bounds() {
        Some(bounds) => tracing::info!(
            triangles = mesh.triangle_count(),
            min = ?bounds.min,
            max = ?bounds.max,
            footprint_radius = bounds.footprint_radius(),
            "parsed mesh"
        ),
        None => tracing::warn!(?input, "mesh contains no triangles"),
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Turn audio tracks into printable vases", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract loudness and brightness features and print them as JSON.
    Analyse {
        /// WAV file to analyse.
        input: PathBuf,
        /// Write the JSON here instead of standard output.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Segment length in milliseconds.
        #[arg(long)]
        segment_ms: Option<f32>,
    },
    /// Generate a vase mesh from an audio file and save it as STL.
    Generate(GenerateArgs),
    /// Parse an STL file and report its size.
    Inspect {
        /// ASCII or binary STL file.
        input: PathBuf,
    },
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// WAV file driving the shape.
    input: PathBuf,
    /// Destination STL file.
    output: PathBuf,
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Noise seed; overrides the configuration.
    #[arg(long)]
    seed: Option<u64>,
    /// STL mesh to place under the vase.
    #[arg(long)]
    base: Option<PathBuf>,
    /// Write binary instead of ASCII STL.
    #[arg(long)]
    binary: bool,
    /// Solid name stored in the STL file.
    #[arg(long, default_value = "audio_vase")]
    name: String,
    #[command(flatten)]
    shape: ShapeOverrides,
}

/// Optional overrides for individual generation settings.
#[derive(Args, Debug, Default)]
struct ShapeOverrides {
    #[arg(long)]
    height: Option<f32>,
    #[arg(long)]
    base_radius: Option<f32>,
    #[arg(long)]
    top_radius: Option<f32>,
    #[arg(long)]
    radial_segments: Option<u32>,
    #[arg(long)]
    height_segments: Option<u32>,
    /// Displacement per unit of amplitude.
    #[arg(long)]
    gain: Option<f32>,
    #[arg(long)]
    noise_scale: Option<f32>,
    #[arg(long)]
    noise_intensity: Option<f32>,
    /// Amplitude smoothing factor in [0, 0.5).
    #[arg(long)]
    smoothing: Option<f32>,
}

impl ShapeOverrides {
    fn apply(&self, settings: &mut GenerationSettings) {
        let overrides = [
            (self.height, &mut settings.height),
            (self.base_radius, &mut settings.base_radius),
            (self.top_radius, &mut settings.top_radius),
            (self.gain, &mut settings.amplitude_gain),
            (self.noise_scale, &mut settings.noise_scale),
            (self.noise_intensity, &mut settings.noise_intensity),
            (self.smoothing, &mut settings.smoothing_factor),
        ];
        for (value, slot) in overrides {
            if let Some(value) = value {
                *slot = value;
            }
        }

        if let Some(segments) = self.radial_segments {
            settings.radial_segments = segments;
        }
        if let Some(segments) = self.height_segments {
            settings.height_segments = segments;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_only_touch_given_fields() {
        let mut settings = GenerationSettings::default();
        let overrides = ShapeOverrides {
            height: Some(12.0),
            radial_segments: Some(24),
            ..Default::default()
        };
        overrides.apply(&mut settings);

        assert_eq!(settings.height, 12.0);
        assert_eq!(settings.radial_segments, 24);
        assert_eq!(settings.base_radius, GenerationSettings::default().base_radius);
    }

    #[test]
    fn parses_generate_command() {
        let cli = Cli::try_parse_from([
            "audio-vase",
            "generate",
            "song.wav",
            "vase.stl",
            "--seed",
            "7",
            "--gain",
            "3.5",
            "--binary",
        ])
        .unwrap();

        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.shape.gain, Some(3.5));
        assert!(args.binary);
        assert_eq!(args.name, "audio_vase");
    }
}
