use std::path::PathBuf;

use clap::Parser;

use crate::core::DEFAULT_RENUMBER_RE;

#[derive(Parser, Debug)]
#[command(name = "retag", version)]
#[command(about = "Rule-driven batch editor for audio file tags", long_about = None)]
pub struct Cli {
    /// Files or directories to process
    #[arg(required = true, num_args = 1..)]
    pub names: Vec<PathBuf>,

    /// Show what would change without writing anything
    #[arg(short, long)]
    pub dryrun: bool,

    /// Inline JSON configuration, applied on top of --config-file
    #[arg(short, long, value_name = "JSON")]
    pub config: Option<String>,

    /// JSON configuration file ("-" reads standard input)
    #[arg(short = 'f', long, value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    /// Keep ID3v1 tags instead of removing them after saving
    #[arg(short = '1', long)]
    pub keep_v1: bool,

    /// Print the tags found in each file and exit
    #[arg(long)]
    pub list_tags: bool,

    /// Strip a numbering prefix from titles; the first group is kept
    #[arg(
        long,
        value_name = "REGEX",
        num_args = 0..=1,
        default_missing_value = DEFAULT_RENUMBER_RE
    )]
    pub renumber: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Log to the terminal only
    #[arg(long)]
    pub no_log_file: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "retag", "-d", "-1", "-c", r#"{"title": "x"}"#, "-f", "-", "a.mp3", "dir",
        ])
        .unwrap();
        assert!(cli.dryrun);
        assert!(cli.keep_v1);
        assert_eq!(cli.config.as_deref(), Some(r#"{"title": "x"}"#));
        assert_eq!(cli.config_file, Some(PathBuf::from("-")));
        assert_eq!(cli.names, vec![PathBuf::from("a.mp3"), PathBuf::from("dir")]);
        assert!(cli.renumber.is_none());
    }

    #[test]
    fn test_renumber_default_and_explicit() {
        let cli = Cli::try_parse_from(["retag", "a.mp3", "--renumber"]).unwrap();
        assert_eq!(cli.renumber.as_deref(), Some(DEFAULT_RENUMBER_RE));

        let cli = Cli::try_parse_from(["retag", "--renumber=\\d+ (.*)", "a.mp3"]).unwrap();
        assert_eq!(cli.renumber.as_deref(), Some("\\d+ (.*)"));
    }

    #[test]
    fn test_names_are_required() {
        assert!(Cli::try_parse_from(["retag", "-d"]).is_err());
    }
}
