//! Photoseal CLI
//!
//! Thin front end over the library: resolves configuration and key
//! material, then runs either the full capture-and-seal pipeline or
//! the sealer alone.

use clap::{ArgAction, Parser, Subcommand};
use photoseal::{
    capture::{Camera, CaptureSource, FileConfig, MockCamera},
    pipeline::{Pipeline, PipelineError, PlaintextPolicy},
    seal::{KeyError, SealKey, Sealer},
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

/// Exit status for configuration and key-source problems; matches
/// `PipelineError::InvalidConfig`.
const EXIT_CONFIG: u8 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "photoseal",
    version,
    about = "Capture a photo and seal it with AES-256-CBC",
    disable_help_subcommand = true
)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// File holding the hex-encoded 32-byte key
    #[arg(long, global = true)]
    key_file: Option<PathBuf>,

    /// Environment variable holding the hex-encoded key
    #[arg(long, global = true)]
    key_env: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Capture one frame and seal it to <OUTPUT>.enc
    Capture {
        /// Image path; the extension picks the container (jpg, png, bmp)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Camera device index
        #[arg(long)]
        device: Option<u32>,
        /// Capture a single luminance channel
        #[arg(long, action = ArgAction::SetTrue)]
        grayscale: bool,
        /// Use a synthetic camera instead of hardware
        #[arg(long, action = ArgAction::SetTrue)]
        mock: bool,
        /// Delete the plaintext image after sealing
        #[arg(long, action = ArgAction::SetTrue)]
        remove_plaintext: bool,
    },
    /// Seal an existing file to <FILE>.enc
    Seal {
        /// File to seal
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load config {}: {}", path.display(), e);
                return ExitCode::from(EXIT_CONFIG);
            }
        },
        None => FileConfig::default(),
    };
    if let Some(path) = cli.key_file {
        config.seal.key_file = Some(path);
    }
    if let Some(var) = cli.key_env {
        config.seal.key_env = var;
    }

    let key = match load_key(&config) {
        Ok(key) => key,
        Err(KeyError::InvalidLength { got }) => {
            return fail(PipelineError::InvalidKeyLength { got });
        }
        Err(e) => {
            error!("Failed to load key: {}", e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    match cli.command {
        Commands::Capture {
            output,
            device,
            grayscale,
            mock,
            remove_plaintext,
        } => {
            if let Some(path) = output {
                config.output.path = path;
            }
            if let Some(id) = device {
                config.capture.device_id = id;
            }
            config.capture.grayscale |= grayscale;
            config.seal.remove_plaintext |= remove_plaintext;

            info!("Photoseal v{}", photoseal::VERSION);
            let result = if mock {
                info!("Using mock camera input");
                capture_and_seal(MockCamera::new(), &config, &key)
            } else {
                capture_with_hardware(&config, &key)
            };
            finish(result)
        }
        Commands::Seal { file } => {
            let result = Sealer::new()
                .seal_with_key(&file, &key)
                .map_err(PipelineError::from);
            finish(result)
        }
    }
}

fn load_key(config: &FileConfig) -> Result<SealKey, KeyError> {
    match &config.seal.key_file {
        Some(path) => SealKey::from_key_file(path),
        None => SealKey::from_env_var(&config.seal.key_env),
    }
}

fn capture_and_seal<C: Camera>(
    camera: C,
    config: &FileConfig,
    key: &SealKey,
) -> Result<PathBuf, PipelineError> {
    let policy = if config.seal.remove_plaintext {
        PlaintextPolicy::Remove
    } else {
        PlaintextPolicy::Keep
    };
    let source = CaptureSource::new(camera, config.capture.clone());
    Pipeline::new(source)
        .plaintext_policy(policy)
        .run_with_key(&config.output.path, key)
}

#[cfg(feature = "camera")]
fn capture_with_hardware(config: &FileConfig, key: &SealKey) -> Result<PathBuf, PipelineError> {
    capture_and_seal(photoseal::capture::NokhwaCamera::new(), config, key)
}

#[cfg(not(feature = "camera"))]
fn capture_with_hardware(_config: &FileConfig, _key: &SealKey) -> Result<PathBuf, PipelineError> {
    Err(PipelineError::DeviceUnavailable(
        "built without the `camera` feature; rebuild with it or pass --mock".into(),
    ))
}

fn finish(result: Result<PathBuf, PipelineError>) -> ExitCode {
    match result {
        Ok(artifact) => {
            println!("{}", artifact.display());
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

fn fail(e: PipelineError) -> ExitCode {
    error!("{}", e);
    ExitCode::from(e.exit_code())
}
