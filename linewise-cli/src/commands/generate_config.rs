//! Generate config command implementation

use anyhow::{Context, Result};
use clap::Args;
use linewise_core::config::defaults;
use std::path::PathBuf;

/// Arguments for the generate-config command
#[derive(Debug, Args)]
pub struct GenerateConfigArgs {
    /// Output file path
    #[arg(short, long, value_name = "FILE", required = true)]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

impl GenerateConfigArgs {
    /// Execute the generate-config command
    pub fn execute(&self) -> Result<()> {
        if self.output.exists() && !self.force {
            anyhow::bail!(
                "{} already exists (use --force to overwrite)",
                self.output.display()
            );
        }

        std::fs::write(&self.output, generate_template())
            .with_context(|| format!("Failed to write to {}", self.output.display()))?;

        println!("✓ Configuration template written to {}", self.output.display());
        println!();
        println!("Use it with:");
        println!(
            "   linewise split -i input.txt --config {}",
            self.output.display()
        );

        Ok(())
    }
}

/// Generate template configuration content
pub fn generate_template() -> String {
    format!(
        r#"# linewise configuration

[reader]
# Literal separator; escapes \n \r \t \0 \\ are resolved.
# Without separator or pattern, `split` and `count` use \r\n, \r or \n,
# and --cooperative uses \n.
# separator = "\n"

# Regular-expression separator, exclusive with `separator`
# pattern = "\r\n|\n"

# Encoding label understood by the WHATWG Encoding Standard
encoding = "{encoding}"

# Chunk size in bytes
buffer_size = {buffer_size}

[output]
# "text" or "json"
format = "text"

# Prefix the final line of each file with [last]
show_last = false

# Pretty print JSON output
pretty_json = true
"#,
        encoding = defaults::ENCODING_LABEL,
        buffer_size = defaults::BUFFER_SIZE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CliConfig;
    use tempfile::TempDir;

    #[test]
    fn test_template_parses_to_defaults() {
        let config = CliConfig::parse(&generate_template()).unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn test_execute_writes_file() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("linewise.toml");

        let args = GenerateConfigArgs {
            output: output.clone(),
            force: false,
        };
        args.execute().unwrap();

        let content = std::fs::read_to_string(&output).unwrap();
        assert!(content.contains("[reader]"));
        assert!(content.contains("buffer_size = 1024"));
    }

    #[test]
    fn test_existing_file_needs_force() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("linewise.toml");
        std::fs::write(&output, "keep me").unwrap();

        let args = GenerateConfigArgs {
            output: output.clone(),
            force: false,
        };
        assert!(args.execute().is_err());
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "keep me");

        let args = GenerateConfigArgs {
            output: output.clone(),
            force: true,
        };
        args.execute().unwrap();
        assert!(std::fs::read_to_string(&output).unwrap().contains("[output]"));
    }
}
