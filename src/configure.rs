use std::{collections::HashSet, fmt::Display};

use anyhow::bail;
use inquire::{InquireError, MultiSelect};
use log::info;
use url::Url;

use crate::{
    api::GrabClient,
    channel_config::{ChannelConfig, ConfiguredChannel},
    grabber_trait::Grabber,
    schema::Channel,
};

struct ChannelOption<'a>(&'a Channel);
impl Display for ChannelOption<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display_name)?;
        if let Some(broadcaster) = &self.0.broadcaster {
            write!(f, " ({broadcaster})")?;
        }
        Ok(())
    }
}

/// Asks which of the site's channels to grab and returns the resulting config.
///
/// Channels present in `previous` start out selected; with no previous config every
/// channel does.
pub async fn configure<T: Grabber>(
    client: &mut GrabClient<T>,
    previous: &ChannelConfig,
) -> anyhow::Result<ChannelConfig> {
    let channels = client.fetch_channel_list().await?;
    let defaults = default_selection(&channels, previous);

    let options = channels.iter().map(ChannelOption).collect();
    let selected = match MultiSelect::new(
        &format!("Select the channels to grab ({})", T::DESCRIPTION),
        options,
    )
    .with_default(&defaults)
    .with_page_size(20)
    .prompt()
    {
        Ok(selected) => selected,
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
            bail!("Configuration was cancelled; nothing was saved.")
        }
        Err(e) => return Err(e.into()),
    };
    info!("Selected {} of {} channels.", selected.len(), channels.len());

    Ok(build_config(
        previous.base_url.clone(),
        selected.into_iter().map(|option| option.0),
    ))
}

fn default_selection(channels: &[Channel], previous: &ChannelConfig) -> Vec<usize> {
    if previous.channels.is_empty() {
        return (0..channels.len()).collect();
    }
    channels
        .iter()
        .enumerate()
        .filter(|(_, c)| previous.contains(&c.id))
        .map(|(i, _)| i)
        .collect()
}

/// Builds a config from the chosen channels, keeping their order and dropping repeated ids.
pub fn build_config<'a>(
    base_url: Option<Url>,
    selected: impl IntoIterator<Item = &'a Channel>,
) -> ChannelConfig {
    let mut seen = HashSet::new();
    let channels = selected
        .into_iter()
        .filter(|c| seen.insert(c.id.clone()))
        .map(ConfiguredChannel::from)
        .collect();
    ChannelConfig { base_url, channels }
}
