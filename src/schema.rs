use chrono::{DateTime, Duration, FixedOffset, NaiveTime};
use derive_more::{Display, From, FromStr};
use getset::{CopyGetters, Getters};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Channel identifier as it appears in XMLTV output, e.g. `nrk1.tvguide.no`.
#[derive(
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Debug,
    From,
    FromStr,
    Display,
    Serialize,
    Deserialize,
)]
pub struct ChannelId(String);
impl ChannelId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier the source site uses for a channel in its URLs.
#[derive(Clone, PartialEq, Eq, Hash, Debug, From, FromStr, Display, Serialize, Deserialize)]
pub struct SiteChannelId(String);
impl SiteChannelId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, PartialEq, Eq, Debug, TypedBuilder)]
pub struct Channel {
    pub id: ChannelId,
    pub site_id: SiteChannelId,
    #[builder(setter(into))]
    pub display_name: String,
    #[builder(default)]
    pub broadcaster: Option<String>,
}

/// Season / episode / part numbering, all one-based.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug, TypedBuilder)]
pub struct EpisodeNum {
    #[builder(default)]
    pub season: Option<u32>,
    #[builder(default)]
    pub episode: Option<u32>,
    #[builder(default)]
    pub total_episodes: Option<u32>,
    #[builder(default)]
    pub part: Option<u32>,
    #[builder(default)]
    pub total_parts: Option<u32>,
}

impl EpisodeNum {
    pub fn is_empty(&self) -> bool {
        self.season.is_none() && self.episode.is_none() && self.part.is_none()
    }

    /// The zero-based `xmltv_ns` form, e.g. `1.4/12.` for S02E05 of 12.
    pub fn xmltv_ns(&self) -> String {
        fn component(value: Option<u32>, total: Option<u32>) -> String {
            match (value, total) {
                (Some(v), Some(t)) => format!("{}/{t}", v.saturating_sub(1)),
                (Some(v), None) => v.saturating_sub(1).to_string(),
                (None, _) => String::new(),
            }
        }
        format!(
            "{}.{}.{}",
            component(self.season, None),
            component(self.episode, self.total_episodes),
            component(self.part, self.total_parts),
        )
    }

    /// The human-readable form, e.g. `S02E05`.
    pub fn onscreen(&self) -> Option<String> {
        let season = self.season.map(|s| format!("S{s:02}"));
        let episode = self.episode.map(|e| format!("E{e:02}"));
        let part = self.part.map(|p| match self.total_parts {
            Some(t) => format!(" ({p}/{t})"),
            None => format!(" ({p})"),
        });
        let res = [season, episode, part].into_iter().flatten().join("");
        (!res.is_empty()).then_some(res)
    }
}

impl std::fmt::Display for EpisodeNum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.xmltv_ns())
    }
}

#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct ProgrammeFlags {
    pub subtitled: bool,
    pub rerun: bool,
    pub premiere: bool,
}

/// One listing as found on a day page, in the site's local time.
#[derive(Clone, PartialEq, Eq, Debug, TypedBuilder)]
pub struct ScheduleEntry {
    pub start: NaiveTime,
    #[builder(default)]
    pub stop: Option<NaiveTime>,
    #[builder(default)]
    pub duration: Option<Duration>,
    #[builder(setter(into))]
    pub title: String,
    #[builder(default)]
    pub sub_title: Option<String>,
    #[builder(default)]
    pub description: Option<String>,
    #[builder(default)]
    pub categories: Vec<String>,
    #[builder(default)]
    pub episode: Option<EpisodeNum>,
    #[builder(default)]
    pub flags: ProgrammeFlags,
}

#[derive(Clone, PartialEq, Eq, Debug, Getters, CopyGetters)]
pub struct Programme {
    #[getset(get = "pub")]
    channel: ChannelId,
    #[getset(get_copy = "pub")]
    start: DateTime<FixedOffset>,
    #[getset(get_copy = "pub")]
    stop: Option<DateTime<FixedOffset>>,
    #[getset(get_copy = "pub")]
    lang: &'static str,
    #[getset(get = "pub")]
    title: String,
    #[getset(get = "pub")]
    sub_title: Option<String>,
    #[getset(get = "pub")]
    description: Option<String>,
    #[getset(get = "pub")]
    categories: Vec<String>,
    #[getset(get_copy = "pub")]
    episode: Option<EpisodeNum>,
    #[getset(get_copy = "pub")]
    flags: ProgrammeFlags,
}

impl Programme {
    pub fn from_entry(
        channel: ChannelId,
        entry: ScheduleEntry,
        start: DateTime<FixedOffset>,
        stop: Option<DateTime<FixedOffset>>,
        lang: &'static str,
    ) -> Self {
        Self {
            channel,
            start,
            stop,
            lang,
            title: entry.title,
            sub_title: entry.sub_title,
            description: entry.description,
            categories: entry.categories,
            episode: entry.episode.filter(|e| !e.is_empty()),
            flags: entry.flags,
        }
    }

    pub(crate) fn set_stop(&mut self, stop: DateTime<FixedOffset>) {
        self.stop = Some(stop);
    }
}
