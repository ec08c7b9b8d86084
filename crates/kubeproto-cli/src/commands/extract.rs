//! Extract command - infer a .proto file from Rust API types

use std::fs;
use std::path::{Path, PathBuf};

use console::style;

use kubeproto_extract::{ExtractOptions, ExtractWarning, extract};

use crate::error::{CliError, Result};

pub fn run(dir: &Path, options: ExtractOptions, output: Option<&Path>) -> Result<()> {
    let extraction = extract(dir, options)?;
    print_warnings(&extraction.warnings, dir);

    let proto = extraction.render();
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .map_err(|e| CliError::io("failed to create directory", parent, e))?;
            }
            fs::write(path, &proto).map_err(|e| CliError::io("failed to write", path, e))?;
            eprintln!(
                "  {} {} {}",
                style("✓").green().bold(),
                path.display(),
                style(format!(
                    "({} messages, {} enums)",
                    extraction.file.messages.len(),
                    extraction.file.enums.len()
                ))
                .dim()
            );
        }
        None => print!("{}", proto),
    }
    Ok(())
}

/// Warnings go to stderr so stdout stays a clean .proto file
fn print_warnings(warnings: &[ExtractWarning], dir: &Path) {
    if warnings.is_empty() {
        return;
    }

    eprintln!();
    eprintln!("  {}", style("Review Required").bold().yellow());
    eprintln!("  {}", style("───────────────").dim());
    for warning in warnings {
        let file: PathBuf = warning
            .file
            .strip_prefix(dir)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| warning.file.clone());
        let location = match warning.line {
            Some(line) => format!("{}:{}", file.display(), line),
            None => file.display().to_string(),
        };
        eprintln!(
            "  {} {} {}",
            style("⚠").yellow(),
            style(&warning.declaration).bold(),
            style(location).dim()
        );
        eprintln!("    {}", warning.message);
    }
    eprintln!();
}
