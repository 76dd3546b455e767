use std::time::Duration;

use chrono::NaiveDate;
use chrono_tz::Tz;
use scraper::Html;
use url::Url;

use crate::schema::{Channel, ScheduleEntry, SiteChannelId};

/// A listings site for one country.
pub trait Grabber: Sized {
    /// Program name, also used for the default config file.
    const NAME: &'static str;
    const DESCRIPTION: &'static str;
    /// Language tag of the scraped text.
    const LANG: &'static str;
    const TIMEZONE: Tz;

    const DEFAULT_BASE_URL: &'static str;
    const MAX_DAYS: u32;
    /// Pause between two consecutive page fetches.
    const REQUEST_INTERVAL: Duration;

    fn channel_list_url(base: &Url) -> anyhow::Result<Url>;
    fn schedule_url(base: &Url, channel: &SiteChannelId, date: NaiveDate) -> anyhow::Result<Url>;

    fn parse_channel_list(html: &Html) -> anyhow::Result<Vec<Channel>>;
    fn parse_schedule(html: &Html, date: NaiveDate) -> anyhow::Result<Vec<ScheduleEntry>>;
}
