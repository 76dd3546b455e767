use std::{marker::PhantomData, time::Duration};

use anyhow::{bail, Context};
use chrono::NaiveDate;
use log::debug;
use reqwest::IntoUrl;
use scraper::Html;
use tokio::time::{sleep, Instant};
use url::Url;

use crate::{
    grabber_trait::Grabber,
    schema::{Channel, ScheduleEntry, SiteChannelId},
};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub struct GrabClient<T: Grabber> {
    client: reqwest::Client,
    base_url: Url,
    last_request: Option<Instant>,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: Grabber> GrabClient<T> {
    pub fn new(base_url: Url) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .cookie_store(true)
            .build()?;
        Ok(Self {
            client,
            base_url,
            last_request: None,
            _phantom: PhantomData,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn fetch_channel_list(&mut self) -> anyhow::Result<Vec<Channel>> {
        let url = T::channel_list_url(&self.base_url)?;
        let document = self.fetch_document(url).await?;
        let channels = T::parse_channel_list(&document)?;
        if channels.is_empty() {
            bail!("No channels were found on the channel list page");
        }
        debug!("Found {} channels", channels.len());
        Ok(channels)
    }

    pub async fn fetch_day(
        &mut self,
        channel: &SiteChannelId,
        date: NaiveDate,
    ) -> anyhow::Result<Vec<ScheduleEntry>> {
        let url = T::schedule_url(&self.base_url, channel, date)?;
        let document = self.fetch_document(url).await?;
        T::parse_schedule(&document, date)
            .with_context(|| format!("While parsing the schedule of {channel} on {date}"))
    }

    /// Downloads and parses a page, keeping at least `T::REQUEST_INTERVAL` between requests.
    pub async fn fetch_document(&mut self, url: impl IntoUrl) -> anyhow::Result<Html> {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < T::REQUEST_INTERVAL {
                sleep(T::REQUEST_INTERVAL - elapsed).await;
            }
        }
        self.last_request = Some(Instant::now());

        let url = url.into_url()?;
        debug!("GET {url}");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to fetch {url}"))?;
        if !response.status().is_success() {
            bail!(
                "Unexpected error code: server returned {:?} for {url}",
                response.status()
            );
        }
        Ok(Html::parse_document(&response.text().await?))
    }
}
