pub mod parser;

use std::time::Duration;

use chrono::NaiveDate;
use chrono_tz::Tz;
use scraper::Html;
use url::Url;

use crate::{
    grabber_trait::Grabber,
    schema::{Channel, ScheduleEntry, SiteChannelId},
};

pub struct Reunion;
impl Grabber for Reunion {
    const NAME: &'static str = "tv_grab_re";
    const DESCRIPTION: &'static str = "Reunion Island (tv-reunion.re)";
    const LANG: &'static str = "fr";
    const TIMEZONE: Tz = chrono_tz::Indian::Reunion;

    const DEFAULT_BASE_URL: &'static str = "https://www.tv-reunion.re/";
    const MAX_DAYS: u32 = 7;
    const REQUEST_INTERVAL: Duration = Duration::from_secs(2);

    fn channel_list_url(base: &Url) -> anyhow::Result<Url> {
        Ok(base.join("chaines/")?)
    }

    fn schedule_url(base: &Url, channel: &SiteChannelId, date: NaiveDate) -> anyhow::Result<Url> {
        Ok(base.join(&format!(
            "programme/{}/{}/",
            channel,
            date.format("%d-%m-%Y")
        ))?)
    }

    fn parse_channel_list(html: &Html) -> anyhow::Result<Vec<Channel>> {
        parser::parse_channel_list(html)
    }

    fn parse_schedule(html: &Html, _date: NaiveDate) -> anyhow::Result<Vec<ScheduleEntry>> {
        parser::parse_schedule(html)
    }
}
