use std::{future::Future, io::Write};

use anyhow::bail;
use chrono::{Days, NaiveDate};
use indicatif::ProgressBar;
use log::{info, warn};

use crate::{
    api::GrabClient,
    channel_config::ChannelConfig,
    grabber_trait::Grabber,
    schedule::{merge_channel, resolve_day},
    schema::{Channel, Programme, ScheduleEntry, SiteChannelId},
    xmltv::{XmltvError, XmltvWriter},
};

#[derive(Clone, Copy, Debug)]
pub struct GrabOptions {
    /// Number of days to grab; everything the site offers when `None`.
    pub days: Option<u32>,
    /// First day to grab, relative to today.
    pub offset: u32,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct GrabSummary {
    pub pages_fetched: usize,
    pub pages_failed: usize,
    pub programmes: usize,
}

/// Where the schedule of one channel on one day comes from.
pub trait ScheduleSource {
    type Site: Grabber;

    fn schedule(
        &mut self,
        channel: &SiteChannelId,
        date: NaiveDate,
    ) -> impl Future<Output = anyhow::Result<Vec<ScheduleEntry>>>;
}

impl<T: Grabber> ScheduleSource for GrabClient<T> {
    type Site = T;

    async fn schedule(
        &mut self,
        channel: &SiteChannelId,
        date: NaiveDate,
    ) -> anyhow::Result<Vec<ScheduleEntry>> {
        self.fetch_day(channel, date).await
    }
}

/// Everything collected in one run, ready to be written.
#[derive(Debug)]
pub struct Listings {
    pub channels: Vec<Channel>,
    pub programmes: Vec<Programme>,
    pub summary: GrabSummary,
}

impl Listings {
    /// Writes every channel, then every programme.
    pub fn write<W: Write>(&self, writer: &mut XmltvWriter<W>) -> Result<(), XmltvError> {
        for channel in &self.channels {
            writer.write_channel(channel)?;
        }
        for programme in &self.programmes {
            writer.write_programme(programme)?;
        }
        Ok(())
    }
}

/// The dates to grab, limited to the `max_days` the site publishes.
pub fn grab_dates(today: NaiveDate, options: GrabOptions, max_days: u32) -> Vec<NaiveDate> {
    let end = match options.days {
        Some(days) => options.offset.saturating_add(days).min(max_days),
        None => max_days,
    };
    if options.days.is_some_and(|days| options.offset.saturating_add(days) > max_days) {
        warn!("Only {max_days} days of listings are available; grabbing up to day {end}.");
    }
    (options.offset..end)
        .filter_map(|i| today.checked_add_days(Days::new(i.into())))
        .collect()
}

/// Fetches every configured channel day by day.
///
/// A day that fails to download or parse is reported and skipped.  Nothing is written
/// until every page has been tried.
pub async fn grab<S: ScheduleSource>(
    source: &mut S,
    config: &ChannelConfig,
    dates: &[NaiveDate],
    progress: &ProgressBar,
) -> anyhow::Result<Listings> {
    let channels = config.channels.iter().map(Channel::from).collect::<Vec<_>>();

    let mut summary = GrabSummary::default();
    let mut programmes = vec![];
    for channel in &channels {
        progress.set_message(channel.display_name.clone());
        let mut channel_programmes = vec![];
        for &date in dates {
            match source.schedule(&channel.site_id, date).await {
                Ok(entries) => {
                    summary.pages_fetched += 1;
                    if entries.is_empty() {
                        progress.suspend(|| {
                            warn!("No programmes were found for {} on {date}", channel.id)
                        });
                    }
                    channel_programmes.extend(resolve_day(
                        &channel.id,
                        date,
                        entries,
                        <S::Site as Grabber>::TIMEZONE,
                        <S::Site as Grabber>::LANG,
                    ));
                }
                Err(e) => {
                    summary.pages_failed += 1;
                    progress.suspend(|| warn!("Skipping {} on {date}: {e:#}", channel.id));
                }
            }
            progress.inc(1);
        }
        programmes.extend(merge_channel(channel_programmes));
    }
    progress.finish_and_clear();

    if summary.pages_fetched == 0 && summary.pages_failed > 0 {
        bail!("Every page failed to download; no listings were written.");
    }
    summary.programmes = programmes.len();
    info!(
        "Grabbed {} programmes from {} pages ({} failed).",
        summary.programmes, summary.pages_fetched, summary.pages_failed
    );
    Ok(Listings {
        channels,
        programmes,
        summary,
    })
}

/// Every channel the site offers, without any programmes.
pub async fn list_channels<T: Grabber>(client: &mut GrabClient<T>) -> anyhow::Result<Listings> {
    let channels = client.fetch_channel_list().await?;
    Ok(Listings {
        channels,
        programmes: vec![],
        summary: GrabSummary::default(),
    })
}
