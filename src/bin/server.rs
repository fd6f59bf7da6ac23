use clap::Parser;
use quedis::{server, Error};

/// A Redis-compatible key-value server. Every command is serialized through
/// a single execution worker, so concurrent clients never race on the store.
#[derive(Parser, Debug)]
#[command(name = "quedis")]
struct Args {
    /// The port to listen on
    #[arg(short, long, default_value_t = 6379, env = "QUEDIS_PORT")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let Args { port } = Args::parse();

    server::run(port).await
}
