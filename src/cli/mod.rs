pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "dragnet")]
#[command(about = "Aggregate in-scope bug bounty targets across platforms", long_about = None)]
pub struct Cli {
    /// Number of concurrent program-scope fetches (defaults to the config value)
    #[arg(short = 'n', long, global = true)]
    pub concurrency: Option<usize>,

    /// Fields to print per scope entry: t (target), d (description),
    /// c (category), u (program URL)
    #[arg(short, long, default_value = "t", global = true)]
    pub output: String,

    /// Delimiter between printed fields
    #[arg(short, long, default_value = " ", global = true)]
    pub delimiter: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Aggregate in-scope targets from HackerOne
    Hackerone {
        /// HackerOne username
        #[arg(short, long)]
        username: String,

        /// HackerOne API token
        #[arg(short, long)]
        token: String,

        /// Category keyword: domain, wildcard, url, cidr, mobile, android,
        /// apple, other, hardware, code, executable, allinfra, all
        #[arg(short, long, default_value = "all")]
        categories: String,

        /// Only scope entries eligible for bounty
        #[arg(short, long)]
        bounty_only: bool,

        /// Only private (invited) programs
        #[arg(short, long)]
        private_only: bool,

        /// Only public programs
        #[arg(long)]
        public_only: bool,

        /// Only programs currently accepting submissions
        #[arg(short, long)]
        active_only: bool,
    },
    /// Aggregate in-scope targets from Bugcrowd
    Bugcrowd {
        /// Value of the _crowdcontrol_session_key session cookie
        #[arg(short, long)]
        token: String,

        /// Category keyword: url, api, mobile, android, apple, other,
        /// hardware, allinfra, all
        #[arg(short, long, default_value = "all")]
        categories: String,

        /// Only bounty-paying programs (exclude VDPs)
        #[arg(short, long)]
        bounty_only: bool,

        /// Only private (invited) programs
        #[arg(short, long)]
        private_only: bool,
    },
}
