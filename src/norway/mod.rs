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

pub struct Norway;
impl Grabber for Norway {
    const NAME: &'static str = "tv_grab_no";
    const DESCRIPTION: &'static str = "Norway (tvguide.no)";
    const LANG: &'static str = "nb";
    const TIMEZONE: Tz = chrono_tz::Europe::Oslo;

    const DEFAULT_BASE_URL: &'static str = "https://www.tvguide.no/";
    const MAX_DAYS: u32 = 14;
    const REQUEST_INTERVAL: Duration = Duration::from_secs(1);

    fn channel_list_url(base: &Url) -> anyhow::Result<Url> {
        Ok(base.join("kanaler/")?)
    }

    fn schedule_url(base: &Url, channel: &SiteChannelId, date: NaiveDate) -> anyhow::Result<Url> {
        Ok(base.join(&format!("kanal/{}/{}/", channel, date.format("%Y-%m-%d")))?)
    }

    fn parse_channel_list(html: &Html) -> anyhow::Result<Vec<Channel>> {
        parser::parse_channel_list(&html.html())
    }

    fn parse_schedule(html: &Html, _date: NaiveDate) -> anyhow::Result<Vec<ScheduleEntry>> {
        parser::parse_schedule(&html.html())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use url::Url;

    use crate::grabber_trait::Grabber;

    use super::Norway;

    #[test]
    fn urls() {
        let base = Url::parse(Norway::DEFAULT_BASE_URL).unwrap();
        assert_eq!(
            Norway::channel_list_url(&base).unwrap().as_str(),
            "https://www.tvguide.no/kanaler/"
        );
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(
            Norway::schedule_url(&base, &"nrk1".to_owned().into(), date)
                .unwrap()
                .as_str(),
            "https://www.tvguide.no/kanal/nrk1/2024-03-09/"
        );
    }
}
