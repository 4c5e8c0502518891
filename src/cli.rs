use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cfntoolkit")]
#[command(about = "Custom resource handlers for CloudFormation stacks", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server that accepts lifecycle events
    Server(ServerArgs),
    /// Process a single lifecycle event and print the result envelope
    Invoke(InvokeArgs),
    /// List the supported password hashing schemes
    Schemes,
}

#[derive(clap::Args, Debug)]
pub struct ServerArgs {
    /// Address to bind the HTTP server to; defaults to `server.bind_addr`
    #[arg(long)]
    pub address: Option<SocketAddr>,
}

#[derive(clap::Args, Debug)]
pub struct InvokeArgs {
    /// Path to the event JSON, or `-` for stdin
    #[arg(long, default_value = "-")]
    pub event: PathBuf,

    /// Build the envelope without delivering it to the ResponseURL
    #[arg(long)]
    pub dry_run: bool,
}
