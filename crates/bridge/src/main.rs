use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueHint};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;
use uncrustify_bridge::process::{ConfigStatus, ConfigValidator, ExecutableProbe, ExecutableStatus};
use uncrustify_bridge::project::{BridgeSettings, SettingsStore, TomlSettingsStore};
use uncrustify_bridge::style::{export, StyleSettings};
use uncrustify_bridge::{FormattingOutcome, FormattingRequest, FormattingService};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Format sources with Uncrustify using editor code style settings",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Translate style settings into an Uncrustify config file
    Export {
        /// Style settings (TOML)
        #[arg(long, value_hint = ValueHint::FilePath)]
        style: PathBuf,

        /// Output file, stdout if omitted
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Check that a path is an Uncrustify executable
    CheckExe {
        #[arg(value_hint = ValueHint::ExecutablePath)]
        path: PathBuf,
    },

    /// Dry-run a config file to check Uncrustify accepts it
    CheckConfig {
        /// Uncrustify executable
        #[arg(long, value_hint = ValueHint::ExecutablePath)]
        exe: PathBuf,

        #[arg(value_hint = ValueHint::FilePath)]
        config: PathBuf,
    },

    /// Format a source file
    Format {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// Bridge settings (TOML)
        #[arg(long, value_hint = ValueHint::FilePath)]
        settings: Option<PathBuf>,

        /// Style settings (TOML) used when no config file is found
        #[arg(long, value_hint = ValueHint::FilePath)]
        style: Option<PathBuf>,

        /// Directory searched for uncrustify.cfg, the file's directory by default
        #[arg(long, value_hint = ValueHint::DirPath)]
        project_root: Option<PathBuf>,

        /// Uncrustify executable, overrides the settings
        #[arg(long, value_hint = ValueHint::ExecutablePath)]
        exe: Option<PathBuf>,

        /// Editor language ID (e.g. CPP, JAVA), checked instead of the extension
        #[arg(long)]
        language: Option<String>,

        /// Write the result back instead of printing it
        #[arg(short, long)]
        write: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Export { style, output } => export_config(&style, output.as_deref()),
        Command::CheckExe { path } => check_exe(&path).await,
        Command::CheckConfig { exe, config } => check_config(&exe, &config).await,
        Command::Format {
            file,
            settings,
            style,
            project_root,
            exe,
            language,
            write,
        } => {
            let mut settings = match settings {
                Some(path) => TomlSettingsStore::new(path).load()?,
                None => BridgeSettings::default(),
            };
            if let Some(exe) = exe {
                settings.executable_path = exe;
            }
            let style = load_style(style.as_deref())?;
            format_file(file, settings, style, project_root, language, write).await
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_style(path: Option<&Path>) -> Result<StyleSettings> {
    match path {
        Some(path) => StyleSettings::from_path(path)
            .with_context(|| format!("Error reading style settings '{}'", path.display())),
        None => Ok(StyleSettings::default()),
    }
}

fn export_config(style: &Path, output: Option<&Path>) -> Result<()> {
    let export = export(&load_style(Some(style))?);
    for warning in &export.warnings {
        eprintln!("warning: {warning}");
    }

    match output {
        Some(path) => export
            .config
            .write_to_path(path)
            .with_context(|| format!("Error writing config '{}'", path.display())),
        None => {
            print!("{}", export.config);
            Ok(())
        }
    }
}

async fn check_exe(path: &Path) -> Result<()> {
    let probe = ExecutableProbe::new(BridgeSettings::default().timeout());
    match probe.verify(path).await {
        ExecutableStatus::Valid(version) => {
            println!("{version}");
            Ok(())
        }
        ExecutableStatus::Invalid(reason) => {
            bail!("'{}' is not a usable Uncrustify executable: {reason}", path.display())
        }
        ExecutableStatus::Cancelled => bail!("Verification was cancelled"),
    }
}

async fn check_config(exe: &Path, config: &Path) -> Result<()> {
    let validator = ConfigValidator::new(BridgeSettings::default().timeout());
    let status = validator
        .verify(exe, config)
        .await
        .with_context(|| format!("Failed to run '{}'", exe.display()))?;

    match status {
        ConfigStatus::Valid => {
            println!("{} is valid", config.display());
            Ok(())
        }
        ConfigStatus::Invalid { output } => {
            eprint!("{output}");
            bail!("'{}' was rejected by Uncrustify", config.display())
        }
        ConfigStatus::Cancelled => bail!("Validation was cancelled"),
    }
}

async fn format_file(
    file: PathBuf,
    settings: BridgeSettings,
    style: StyleSettings,
    project_root: Option<PathBuf>,
    language: Option<String>,
    write: bool,
) -> Result<()> {
    if !settings.formatting_enabled {
        bail!("Formatting is disabled in the settings");
    }

    let service = FormattingService::new(settings, style);
    match language.as_deref() {
        Some(id) if !service.can_format_language(id) => {
            bail!("Language '{}' is not supported by Uncrustify", id)
        }
        Some(_) => {}
        None if !service.can_format(&file) => {
            bail!("'{}' is not a file Uncrustify can format", file.display())
        }
        None => {}
    }

    let text = fs::read_to_string(&file)
        .with_context(|| format!("Error reading file '{}'", file.display()))?;
    let root = project_root.or_else(|| {
        file.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
    });

    let mut request = FormattingRequest::new(&file, text);
    if let Some(root) = root {
        request = request.with_project_root(root);
    }

    match service.format(request).await {
        FormattingOutcome::Completed(formatted) if write => fs::write(&file, formatted)
            .with_context(|| format!("Error writing file '{}'", file.display())),
        FormattingOutcome::Completed(formatted) => {
            print!("{formatted}");
            Ok(())
        }
        FormattingOutcome::Failed(err) => bail!("{}: {}", err.title(), err.message()),
        FormattingOutcome::Cancelled => bail!("Formatting was cancelled"),
    }
}
