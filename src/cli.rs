//! Command-line interface definitions.
//!
//! Global options may also come from the environment; every command is a
//! subcommand.
//!
//! # Examples
//!
//! ```sh
//! jobscope top 10 --csv
//! jobscope search Lisboa Acme 5
//! jobscope type 123456
//! jobscope skills 2023-01-01 2023-06-30
//! jobscope get jobID 123456 --csv
//! jobscope statistics zone --limit 100 --out statistics.csv
//! jobscope list skills "data scientist" --csv
//! ```

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// itjobs.pt API key
    #[arg(long, env = "ITJOBS_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the N most recent job postings
    Top {
        n: usize,
        #[command(flatten)]
        export: CsvExport,
    },

    /// List up to N part-time postings for a company in a locality
    Search {
        locality: String,
        company: String,
        n: usize,
        #[command(flatten)]
        export: CsvExport,
    },

    /// Classify a posting as remote, hybrid, onsite or other
    #[command(name = "type")]
    Type { job_id: u64 },

    /// Count skill mentions in postings published between two dates
    Skills { start: String, end: String },

    /// Fetch a single posting
    Get {
        #[command(subcommand)]
        target: GetTarget,
    },

    /// Aggregate statistics over all postings
    Statistics {
        #[command(subcommand)]
        view: StatisticsView,
    },

    /// Lists scraped from the review site
    List {
        #[command(subcommand)]
        view: ListView,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct CsvExport {
    /// Also export the result to CSV
    #[arg(long)]
    pub csv: bool,

    /// CSV file path (defaults to a name derived from the arguments)
    #[arg(long, default_value = "")]
    pub csv_path: String,
}

impl CsvExport {
    /// Where to write, if exporting.
    pub fn target(&self, default_name: impl FnOnce() -> String) -> Option<String> {
        if !self.csv {
            return None;
        }
        if self.csv_path.is_empty() {
            Some(default_name())
        } else {
            Some(self.csv_path.clone())
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum GetTarget {
    /// A posting by id, enriched with its company's review page
    #[command(name = "jobID")]
    JobId {
        id: u64,
        /// Export as key,value CSV (job_<ID>.csv)
        #[arg(long)]
        csv: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum StatisticsView {
    /// Postings per zone and job type, written to CSV
    Zone {
        /// Page size used against the API (not a total)
        #[arg(long, default_value_t = 100)]
        limit: usize,
        /// Output CSV path
        #[arg(long, default_value = "statistics.csv")]
        out: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ListView {
    /// Top-10 tags on the review site's job search for a position
    Skills {
        position: String,
        /// Also export to CSV
        #[arg(long)]
        csv: bool,
        /// Output CSV path
        #[arg(long, default_value = "skills.csv")]
        out: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_with_csv() {
        let cli = Cli::parse_from(["jobscope", "top", "5", "--csv"]);
        match cli.command {
            Command::Top { n, export } => {
                assert_eq!(n, 5);
                assert_eq!(export.target(|| "top_5.csv".into()).as_deref(), Some("top_5.csv"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_csv_path_overrides_default() {
        let cli = Cli::parse_from(["jobscope", "top", "5", "--csv", "--csv-path", "/tmp/x.csv"]);
        let Command::Top { export, .. } = cli.command else {
            panic!("expected top");
        };
        assert_eq!(export.target(|| unreachable!()).as_deref(), Some("/tmp/x.csv"));
    }

    #[test]
    fn test_no_csv_means_no_target() {
        let export = CsvExport::default();
        assert_eq!(export.target(|| "x.csv".into()), None);
    }

    #[test]
    fn test_search_positional_args() {
        let cli = Cli::parse_from(["jobscope", "search", "Lisboa", "Acme", "3"]);
        let Command::Search { locality, company, n, .. } = cli.command else {
            panic!("expected search");
        };
        assert_eq!((locality.as_str(), company.as_str(), n), ("Lisboa", "Acme", 3));
    }

    #[test]
    fn test_get_job_id() {
        let cli = Cli::parse_from(["jobscope", "get", "jobID", "42", "--csv"]);
        let Command::Get { target: GetTarget::JobId { id, csv } } = cli.command else {
            panic!("expected get jobID");
        };
        assert_eq!(id, 42);
        assert!(csv);
    }

    #[test]
    fn test_statistics_zone_defaults() {
        let cli = Cli::parse_from(["jobscope", "statistics", "zone"]);
        let Command::Statistics { view: StatisticsView::Zone { limit, out } } = cli.command else {
            panic!("expected statistics zone");
        };
        assert_eq!(limit, 100);
        assert_eq!(out, "statistics.csv");
    }

    #[test]
    fn test_list_skills_and_global_config() {
        let cli = Cli::parse_from([
            "jobscope",
            "list",
            "skills",
            "data scientist",
            "--config",
            "jobscope.yaml",
        ]);
        assert_eq!(cli.config.as_deref(), Some("jobscope.yaml"));
        let Command::List { view: ListView::Skills { position, csv, out } } = cli.command else {
            panic!("expected list skills");
        };
        assert_eq!(position, "data scientist");
        assert!(!csv);
        assert_eq!(out, "skills.csv");
    }

    #[test]
    fn test_type_and_skills() {
        let cli = Cli::parse_from(["jobscope", "type", "7"]);
        assert!(matches!(cli.command, Command::Type { job_id: 7 }));
        let cli = Cli::parse_from(["jobscope", "skills", "2023-01-01", "2023-06-30"]);
        assert!(matches!(cli.command, Command::Skills { .. }));
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
