use clap::Parser;
use sandpit_core::DocumentId;
use std::path::PathBuf;
use std::time::Duration;

/// One `--edit DOC=TEXT` argument.
#[derive(Debug, Clone, PartialEq)]
pub struct Edit {
    pub document: DocumentId,
    pub text: String,
}

fn parse_edit(value: &str) -> Result<Edit, String> {
    let (document, text) = value
        .split_once('=')
        .ok_or_else(|| format!("invalid edit '{}', expected DOC=TEXT", value))?;
    Ok(Edit {
        document: DocumentId::from(document),
        // Allow escaped newlines on the command line.
        text: text.replace("\\n", "\n"),
    })
}

fn parse_millis(value: &str) -> Result<Duration, String> {
    value
        .parse()
        .map(Duration::from_millis)
        .map_err(|_| format!("invalid timeout '{}'", value))
}

#[derive(Parser, Debug)]
#[command(name = "sandpit")]
#[command(about = "Drives a workspace manifest through the analysis workers")]
#[command(version)]
pub struct Cli {
    /// Workspace manifest (JSON)
    pub manifest: PathBuf,

    /// Replace a document's text, as DOC=TEXT; `\n` is a newline
    #[arg(long = "edit", value_name = "DOC=TEXT", value_parser = parse_edit)]
    pub edits: Vec<Edit>,

    /// Format the active document after the edits
    #[arg(long)]
    pub format: bool,

    /// Save the active document under this directory
    #[arg(long = "save", value_name = "DIR")]
    pub save_dir: Option<PathBuf>,

    /// How long to wait for analysis to settle, in milliseconds
    #[arg(long, value_name = "MS", default_value = "5000", value_parser = parse_millis)]
    pub timeout: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_options() {
        let cli = Cli::try_parse_from([
            "sandpit", "ws.json", "--edit", "m1=let a;\\nlet b;", "--format", "--save", "out", "--timeout", "100",
        ])
        .unwrap();
        assert_eq!(cli.manifest, PathBuf::from("ws.json"));
        assert_eq!(
            cli.edits,
            vec![Edit {
                document: DocumentId::from("m1"),
                text: "let a;\nlet b;".to_string(),
            }]
        );
        assert!(cli.format);
        assert_eq!(cli.save_dir, Some(PathBuf::from("out")));
        assert_eq!(cli.timeout, Duration::from_millis(100));
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["sandpit", "ws.json"]).unwrap();
        assert!(cli.edits.is_empty());
        assert!(!cli.format);
        assert_eq!(cli.save_dir, None);
        assert_eq!(cli.timeout, Duration::from_millis(5000));
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(Cli::try_parse_from(["sandpit"]).is_err());
        assert!(Cli::try_parse_from(["sandpit", "ws.json", "--edit", "novalue"]).is_err());
        assert!(Cli::try_parse_from(["sandpit", "ws.json", "--timeout", "soon"]).is_err());
        assert!(Cli::try_parse_from(["sandpit", "ws.json", "--bogus"]).is_err());
        assert!(Cli::try_parse_from(["sandpit", "a.json", "b.json"]).is_err());
    }
}
