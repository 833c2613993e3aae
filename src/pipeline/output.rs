//! Output handling for reports.

use anyhow::{Context, Result};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Target for output - either stdout or a file
#[derive(Debug, Clone)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    /// Create output target from optional path
    #[must_use]
    pub fn from_option(path: Option<PathBuf>) -> Self {
        match path {
            Some(p) => Self::File(p),
            None => Self::Stdout,
        }
    }

    /// Check if output is to a terminal
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stdout) && std::io::stdout().is_terminal()
    }
}

/// Determine if color should be used based on flags, environment and target
#[must_use]
pub fn should_use_color(no_color_flag: bool, target: &OutputTarget) -> bool {
    !no_color_flag && std::env::var("NO_COLOR").is_err() && target.is_terminal()
}

/// Write output to the target (stdout or file)
pub fn write_output(content: &str, target: &OutputTarget, quiet: bool) -> Result<()> {
    match target {
        OutputTarget::Stdout => {
            print!("{content}");
            Ok(())
        }
        OutputTarget::File(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            if !quiet {
                tracing::info!("Report written to {}", path.display());
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_target_from_option() {
        assert!(matches!(OutputTarget::from_option(None), OutputTarget::Stdout));
        let path = PathBuf::from("/tmp/report.json");
        match OutputTarget::from_option(Some(path.clone())) {
            OutputTarget::File(p) => assert_eq!(p, path),
            OutputTarget::Stdout => panic!("Expected File variant"),
        }
    }

    #[test]
    fn test_file_target_never_colored() {
        let target = OutputTarget::File(PathBuf::from("/tmp/report.txt"));
        assert!(!should_use_color(false, &target));
        assert!(!should_use_color(true, &OutputTarget::Stdout));
    }

    #[test]
    fn test_write_output_to_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.txt");
        write_output("hello\n", &OutputTarget::File(path.clone()), true).expect("write");
        assert_eq!(std::fs::read_to_string(path).expect("read"), "hello\n");
    }
}
