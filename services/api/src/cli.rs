use crate::demo::{run_demo, DemoArgs};
use crate::report::{run_catalogue, run_dashboard, run_report, DashboardArgs, ReportArgs};
use crate::server;
use campus_analytics::error::AppError;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Campus Analytics",
    about = "Serve and print aggregate statistics over academic records",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run one report and print its rows
    Report(ReportArgs),
    /// List the available reports
    Catalogue,
    /// Run every report and print one panel per report
    Dashboard(DashboardArgs),
    /// Print the dashboard for the bundled demo dataset
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// JSON record file or CSV directory (overrides APP_DATA_PATH)
    #[arg(long)]
    pub(crate) data: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Report(args) => run_report(args),
        Command::Catalogue => run_catalogue(),
        Command::Dashboard(args) => run_dashboard(args),
        Command::Demo(args) => run_demo(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::OutputFormat;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn report_accepts_negative_limit_and_format() {
        let cli = Cli::try_parse_from([
            "campus-analytics-api",
            "report",
            "topCourses",
            "--limit",
            "-3",
            "--format",
            "csv",
        ])
        .expect("arguments parse");

        match cli.command {
            Some(Command::Report(args)) => {
                assert_eq!(args.name, "topCourses");
                assert_eq!(args.limit, Some(-3));
                assert_eq!(args.format, OutputFormat::Csv);
                assert!(args.data.is_none());
            }
            other => panic!("expected report command, got {other:?}"),
        }
    }

    #[test]
    fn missing_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["campus-analytics-api"]).expect("arguments parse");
        assert!(cli.command.is_none());
    }
}
