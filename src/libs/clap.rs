use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::time::OffsetTime;

use crate::args::StandardArgs;
use crate::subcommands::{cluster_families, cluster_network, kinship, kinship_estimate};

#[derive(Parser, Debug)]
#[command(author, version, about, styles=get_styles())]
pub struct Arguments {
    #[command(subcommand)]
    cmd: SubCommand,
}

#[derive(Args, Debug, Clone)]
pub struct LogAndVerbosity {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, default_value_t = 3)]
    pub verbosity: u8,

    /// A file path to save logs to
    #[arg(short, long)]
    pub log_file: Option<PathBuf>,

    /// Silence all warning and info messages
    #[arg(long)]
    pub silent: bool,
}

#[derive(Subcommand, Debug)]
pub enum SubCommand {
    /// Compute exact kinship and inbreeding coefficients per family
    Kinship {
        #[command(flatten)]
        args: StandardArgs,

        #[command(flatten)]
        log_and_verbosity: LogAndVerbosity,

        /// Founder kinship file with family_id, founder_id, founder_id, coefficient per row
        #[arg(short = 'k', long)]
        founder_kinship: Option<PathBuf>,

        /// Individuals of interest file with family_id, individual_id per row (default: everyone)
        #[arg(short = 'i', long)]
        interest: Option<PathBuf>,

        /// Number of threads
        #[arg(short = 't', long, default_value_t = 8)]
        threads: usize,
    },

    /// Estimate kinship coefficients by sampling inheritance paths
    KinshipEstimate {
        #[command(flatten)]
        args: StandardArgs,

        #[command(flatten)]
        log_and_verbosity: LogAndVerbosity,

        /// Number of sampling iterations
        #[arg(long, default_value_t = 10000)]
        iterations: usize,

        /// Seed for the random number generator
        #[arg(long)]
        seed: Option<u64>,

        /// Founder kinship file with family_id, founder_id, founder_id, coefficient per row
        #[arg(short = 'k', long)]
        founder_kinship: Option<PathBuf>,

        /// Individuals of interest file with family_id, individual_id per row (default: everyone)
        #[arg(short = 'i', long)]
        interest: Option<PathBuf>,
    },

    /// Group individuals into families from pedigree parent links
    ClusterFamilies {
        #[command(flatten)]
        args: StandardArgs,

        #[command(flatten)]
        log_and_verbosity: LogAndVerbosity,
    },

    /// Find clusters in a weighted network given as a from,to,weight edge list
    ClusterNetwork {
        #[command(flatten)]
        args: StandardArgs,

        #[command(flatten)]
        log_and_verbosity: LogAndVerbosity,

        /// Minimum edge weight to include in the clustering
        #[arg(long, default_value_t = 0.0)]
        threshold: f64,
    },
}

impl SubCommand {
    pub fn threads(&self) -> usize {
        match self {
            SubCommand::Kinship { threads, .. } => *threads,
            _ => 1,
        }
    }

    #[rustfmt::skip]
    pub fn log_and_verbosity(&self) -> (u8, &Option<PathBuf>, bool) {
        match self {
            SubCommand::Kinship { log_and_verbosity, .. }
            | SubCommand::KinshipEstimate { log_and_verbosity, .. }
            | SubCommand::ClusterFamilies { log_and_verbosity, .. }
            | SubCommand::ClusterNetwork { log_and_verbosity, .. }
            => (log_and_verbosity.verbosity, &log_and_verbosity.log_file, log_and_verbosity.silent),
        }
    }

    #[rustfmt::skip]
    pub fn output(&self) -> Option<PathBuf> {
        match self {
            SubCommand::Kinship { args: StandardArgs { output, .. }, ..}
            | SubCommand::KinshipEstimate { args: StandardArgs { output, .. }, ..}
            | SubCommand::ClusterFamilies { args: StandardArgs { output, .. }, ..}
            | SubCommand::ClusterNetwork { args: StandardArgs { output, .. }, ..}
            => Some(output.clone()),
        }
    }
}

pub fn run_args(args: Arguments) -> Result<()> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(args.cmd.threads())
        .build_global()?;

    let (verbosity, log_file, is_silent) = args.cmd.log_and_verbosity();

    let (level, wrtr, _guard) = init_tracing(verbosity, log_file, is_silent)?;

    let timer = time::format_description::parse("[hour]:[minute]:[second].[subsecond digits:3]")?;
    let time_offset = time::UtcOffset::current_local_offset().unwrap_or(time::UtcOffset::UTC);
    let timer = OffsetTime::new(time_offset, timer);

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(wrtr)
        .with_timer(timer)
        .init();

    if let Some(output) = args.cmd.output() {
        if let Err(e) = std::fs::create_dir(output.clone()) {
            match e.kind() {
                std::io::ErrorKind::AlreadyExists => (),
                _ => return Err(eyre!("Error creating directory {output:?}")),
            }
        }
    }

    run_cmd(args.cmd)?;

    Ok(())
}

#[rustfmt::skip]
pub fn run_cmd(cmd: SubCommand) -> Result<()> {
    match cmd {
        SubCommand::Kinship { args, founder_kinship, interest, .. }
            => kinship::run(args, founder_kinship, interest)?,

        SubCommand::KinshipEstimate { args, iterations, seed, founder_kinship, interest, .. }
            => kinship_estimate::run(args, iterations, seed, founder_kinship, interest)?,

        SubCommand::ClusterFamilies { args, .. } => cluster_families::run(args)?,
        SubCommand::ClusterNetwork { args, threshold, .. } => cluster_network::run(args, threshold)?,
    };
    Ok(())
}

pub fn init_tracing(
    verbosity: u8,
    log_file: &Option<PathBuf>,
    is_silent: bool,
) -> Result<(Level, NonBlocking, WorkerGuard)> {
    let level = if is_silent {
        Level::ERROR
    } else {
        match verbosity {
            0 => unreachable!(),
            1 => Level::ERROR,
            2 => Level::WARN,
            3 => Level::INFO,
            4 => Level::DEBUG,
            5..=u8::MAX => Level::TRACE,
        }
    };

    // Write logs to stderr or file
    let (wrtr, _guard) = match log_file {
        Some(path) => {
            let file = std::fs::File::options()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)?;
            tracing_appender::non_blocking(file)
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    Ok((level, wrtr, _guard))
}

pub fn get_styles() -> clap::builder::Styles {
    clap::builder::Styles::styled()
        .usage(
            anstyle::Style::new()
                .bold()
                .underline()
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
        )
        .header(
            anstyle::Style::new()
                .bold()
                .underline()
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
        )
        .literal(
            anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
        )
        .invalid(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
        )
        .error(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
        )
        .valid(
            anstyle::Style::new()
                .bold()
                .underline()
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
        )
        .placeholder(
            anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing() {
        let (level, _, _) = init_tracing(1, &None, false).unwrap();
        assert_eq!(Level::ERROR, level);
        let (level, _, _) = init_tracing(2, &None, false).unwrap();
        assert_eq!(Level::WARN, level);
        let (level, _, _) = init_tracing(3, &None, false).unwrap();
        assert_eq!(Level::INFO, level);
        let (level, _, _) = init_tracing(4, &None, false).unwrap();
        assert_eq!(Level::DEBUG, level);
        let (level, _, _) = init_tracing(5, &None, false).unwrap();
        assert_eq!(Level::TRACE, level);
    }

    #[test]
    fn test_threads() {
        let log_and_verbosity = LogAndVerbosity {
            verbosity: 3,
            log_file: None,
            silent: false,
        };

        let subcommand = SubCommand::ClusterFamilies {
            args: StandardArgs::default(),
            log_and_verbosity: log_and_verbosity.clone(),
        };
        assert_eq!(1, subcommand.threads());

        let subcommand = SubCommand::Kinship {
            args: StandardArgs::default(),
            log_and_verbosity,
            founder_kinship: None,
            interest: None,
            threads: 8,
        };
        assert_eq!(8, subcommand.threads());
    }
}
