//! Backend subcommands - descriptor set in, generated files out

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use similar::TextDiff;
use tracing::debug;

use kubeproto_codegen::{GeneratedFile, Target, generate};
use kubeproto_core::config::CONFIG_FILE_NAME;
use kubeproto_core::descriptor::decode_descriptor_set;
use kubeproto_core::lister::default_primary_files;
use kubeproto_core::{GeneratorConfig, build_schema};

use crate::error::{CliError, Result};

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Serialized FileDescriptorSet (protoc --include_imports -o FILE)
    #[arg(long, value_name = "FILE")]
    pub descriptor_set: PathBuf,

    /// Generate only for these files (default: files nothing else imports)
    #[arg(long = "file", value_name = "NAME")]
    pub files: Vec<String>,

    /// Configuration file (default: kubeproto.yaml next to the descriptor set)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory generated files are written under
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Compare with the files on disk instead of writing them
    #[arg(long)]
    pub check: bool,
}

pub fn run(target: Target, args: &GenerateArgs) -> Result<()> {
    let config = load_config(args)?;
    let output_dir = config.output_dir();

    let bytes = fs::read(&args.descriptor_set)
        .map_err(|e| CliError::io("failed to read descriptor set", &args.descriptor_set, e))?;
    let set = decode_descriptor_set(&bytes)?;

    let primary = if args.files.is_empty() {
        default_primary_files(&set)
    } else {
        args.files.clone()
    };
    debug!(files = ?primary, "primary files");

    let schema = build_schema(&set, &primary, &config.modules)?;
    let files = generate(target, &schema, &config)?;

    if files.is_empty() {
        println!(
            "  {} {}",
            style("○").yellow(),
            style(format!("{} produced no files", target)).dim()
        );
        return Ok(());
    }

    if args.check {
        check(&files, &output_dir)
    } else {
        write(&files, &output_dir)
    }
}

/// Resolve the configuration and apply command-line overrides
///
/// A relative `outputDir` from a config file is taken relative to that file.
fn load_config(args: &GenerateArgs) -> Result<GeneratorConfig> {
    let path = match &args.config {
        Some(path) => Some(path.clone()),
        None => {
            let candidate = parent_dir(&args.descriptor_set).join(CONFIG_FILE_NAME);
            candidate.exists().then_some(candidate)
        }
    };

    let mut config = match &path {
        Some(path) => {
            let mut config = GeneratorConfig::load_from(path).map_err(|source| CliError::Config {
                path: path.clone(),
                source,
            })?;
            if let Some(dir) = config.output_dir.take() {
                config.output_dir = Some(parent_dir(path).join(dir));
            }
            debug!(path = %path.display(), "loaded config");
            config
        }
        None => GeneratorConfig::default(),
    };

    if let Some(dir) = &args.output_dir {
        config.output_dir = Some(dir.clone());
    }
    Ok(config)
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn write(files: &[GeneratedFile], output_dir: &Path) -> Result<()> {
    for file in files {
        let path = output_dir.join(&file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| CliError::io("failed to create directory", parent, e))?;
        }
        fs::write(&path, &file.content).map_err(|e| CliError::io("failed to write", &path, e))?;
        println!("  {} {}", style("✓").green().bold(), path.display());
    }
    Ok(())
}

fn check(files: &[GeneratedFile], output_dir: &Path) -> Result<()> {
    let mut stale = 0;

    for file in files {
        let path = output_dir.join(&file.path);
        let current = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(e) => return Err(CliError::io("failed to read", &path, e)),
        };

        if current == file.content {
            println!("  {} {}", style("✓").green().bold(), path.display());
            continue;
        }

        stale += 1;
        println!("  {} {}", style("✗").red().bold(), path.display());
        print_diff(&current, &file.content, &file.path);
    }

    if stale > 0 {
        return Err(CliError::CheckFailed {
            stale,
            total: files.len(),
        });
    }
    Ok(())
}

fn print_diff(old: &str, new: &str, path: &Path) {
    let old_header = format!("a/{}", path.display());
    let new_header = format!("b/{}", path.display());
    let diff = TextDiff::from_lines(old, new);
    let unified = diff
        .unified_diff()
        .context_radius(3)
        .header(&old_header, &new_header)
        .to_string();

    for line in unified.lines() {
        let styled = if line.starts_with("+++") || line.starts_with("---") {
            style(line).bold()
        } else if line.starts_with('+') {
            style(line).green()
        } else if line.starts_with('-') {
            style(line).red()
        } else if line.starts_with("@@") {
            style(line).cyan()
        } else {
            style(line).dim()
        };
        println!("{}", styled);
    }
}
