use std::{
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use clap::Args;
use log::info;
use url::Url;

use crate::{
    api::GrabClient,
    channel_config::{default_config_path, ChannelConfig, ConfigLoadError},
    chrono_util::today_in,
    configure::configure,
    grab::{grab, grab_dates, list_channels, GrabOptions, Listings},
    grabber_trait::Grabber,
    progress::channel_day_bar,
    xmltv::{SourceInfo, XmltvWriter},
};

/// The options every XMLTV grabber understands.
#[derive(Clone, Debug, Args)]
pub struct GrabberArgs {
    /// Choose the channels to grab and save them to the config file
    #[arg(long)]
    pub configure: bool,
    /// Config file to use instead of ~/.xmltv/<grabber>.toml
    #[arg(long, value_name = "FILE")]
    pub config_file: Option<PathBuf>,
    /// Write the listings to FILE instead of standard output
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,
    /// Number of days to grab (default: all available)
    #[arg(long)]
    pub days: Option<u32>,
    /// Start grabbing this many days after today
    #[arg(long, default_value_t = 0)]
    pub offset: u32,
    /// Only report warnings and errors, and hide the progress bar
    #[arg(long)]
    pub quiet: bool,
    /// Write every available channel and exit
    #[arg(long)]
    pub list_channels: bool,
    /// Print the supported XMLTV capabilities and exit
    #[arg(long)]
    pub capabilities: bool,
    /// Print a description of the grabber and exit
    #[arg(long)]
    pub description: bool,
}

pub fn init_logger(quiet: bool) {
    let level = if quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

pub async fn run<T: Grabber>(args: &GrabberArgs) -> anyhow::Result<()> {
    if args.capabilities {
        println!("baseline\nmanualconfig");
        return Ok(());
    }
    if args.description {
        println!("{}", T::DESCRIPTION);
        return Ok(());
    }

    let config_path = args
        .config_file
        .clone()
        .unwrap_or_else(default_config_path::<T>);

    if args.configure {
        let previous = load_or_default(&config_path)?;
        let mut client = GrabClient::<T>::new(previous.base_url::<T>()?)?;
        let config = configure(&mut client, &previous).await?;
        config.save(&config_path)?;
        info!("Saved {} channels to {config_path:?}.", config.channels.len());
        return Ok(());
    }

    if args.list_channels {
        let config = load_or_default(&config_path)?;
        let mut client = GrabClient::<T>::new(config.base_url::<T>()?)?;
        let listings = list_channels(&mut client).await?;
        write_listings::<T>(&listings, args.output.as_deref(), client.base_url())?;
        info!("Listed {} channels.", listings.channels.len());
        return Ok(());
    }

    let config = ChannelConfig::load(&config_path)
        .with_context(|| format!("While loading {config_path:?}"))?;
    if config.channels.is_empty() {
        bail!("No channels are configured in {config_path:?}.  Run with --configure.");
    }
    let dates = grab_dates(
        today_in(T::TIMEZONE),
        GrabOptions {
            days: args.days,
            offset: args.offset,
        },
        T::MAX_DAYS,
    );
    let mut client = GrabClient::<T>::new(config.base_url::<T>()?)?;
    let progress = channel_day_bar((config.channels.len() * dates.len()) as u64, args.quiet);
    let listings = grab(&mut client, &config, &dates, &progress).await?;
    write_listings::<T>(&listings, args.output.as_deref(), client.base_url())
}

fn load_or_default(path: &Path) -> anyhow::Result<ChannelConfig> {
    match ChannelConfig::load(path) {
        Ok(config) => {
            info!("Loaded the config from {path:?}.");
            Ok(config)
        }
        Err(ConfigLoadError::NotFound) => Ok(ChannelConfig::default()),
        Err(e) => Err(e).with_context(|| format!("While loading {path:?}")),
    }
}

fn write_listings<T: Grabber>(
    listings: &Listings,
    output: Option<&Path>,
    source_url: &Url,
) -> anyhow::Result<()> {
    let inner: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(fs_err::File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    let source_name = source_url.host_str().unwrap_or(source_url.as_str());
    let generator = format!("{} {}", T::NAME, env!("CARGO_PKG_VERSION"));
    let mut writer = XmltvWriter::new(
        inner,
        &SourceInfo {
            source_info_url: source_url.as_str(),
            source_info_name: source_name,
            generator_info_name: &generator,
        },
    )?;
    listings.write(&mut writer)?;
    writer.finish()?;
    Ok(())
}
