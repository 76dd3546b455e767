use clap::{Parser, ValueEnum};
use tv_grab::cli::{init_logger, run, GrabberArgs};
use tv_grab::norway::Norway;
use tv_grab::reunion::Reunion;

#[derive(Parser)]
#[command(version, about = "Grab TV listings in XMLTV format")]
struct Opts {
    #[arg(value_enum)]
    country: Country,
    #[command(flatten)]
    args: GrabberArgs,
}
#[derive(Clone, ValueEnum)]
enum Country {
    Norway,
    Reunion,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    init_logger(opts.args.quiet);
    match opts.country {
        Country::Norway => run::<Norway>(&opts.args).await,
        Country::Reunion => run::<Reunion>(&opts.args).await,
    }
}
