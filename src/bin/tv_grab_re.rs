use clap::Parser;
use tv_grab::cli::{init_logger, run, GrabberArgs};
use tv_grab::reunion::Reunion;

/// Grab TV listings for Reunion Island in XMLTV format.
#[derive(Parser)]
#[command(version)]
struct Opts {
    #[command(flatten)]
    args: GrabberArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    init_logger(opts.args.quiet);
    run::<Reunion>(&opts.args).await
}
