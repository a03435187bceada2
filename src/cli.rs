use clap::{Parser, Subcommand};
use slink::LogMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "slink")]
#[command(about = "Personal link bookmarking with a supervised ingestion service")]
#[command(version)]
pub struct Cli {
    /// Config file path (defaults to slink.yaml, searched upwards)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Where logs go: screen, file or all (overrides `log` in the config)
    #[arg(long, value_name = "MODE", global = true)]
    pub log: Option<LogMode>,

    /// Log file used by the file and all modes (overrides `log_file`)
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the web application, supervising the ingestion service
    Serve {
        /// Address to listen on (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides server.port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Do not start or delegate to the ingestion service
        #[arg(long)]
        no_ingest: bool,
    },
    /// Run the ingestion service
    Ingest {
        /// Address to listen on (overrides ingest.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides ingest.port)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Add a link from the command line
    Add {
        /// Link description
        #[arg(short, long)]
        description: String,

        /// Link URL
        #[arg(short, long)]
        url: String,

        /// Category id
        #[arg(short = 't', long = "type")]
        type_id: Option<i64>,

        /// Icon URL or file name
        #[arg(short, long)]
        icon: Option<String>,
    },
    /// Check configuration, database and ingestion service
    Doctor {
        /// Skip the network probe of the ingestion service
        #[arg(long)]
        quick: bool,

        /// Open the database and report its tables and link count
        #[arg(long)]
        test_db: bool,
    },
}
