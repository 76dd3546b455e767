use anyhow::Context;
use chrono::NaiveTime;
use itertools::Itertools;
use log::{debug, warn};
use regex::Captures;
use tv_grab_utils::{regex, text::html_to_text};

use crate::schema::{Channel, EpisodeNum, ProgrammeFlags, ScheduleEntry, SiteChannelId};

pub fn parse_channel_list(html: &str) -> anyhow::Result<Vec<Channel>> {
    let select = regex!(r#"(?s)<select[^>]*\bname="channel"[^>]*>(.*?)</select>"#)
        .captures(html)
        .context("Channel <select> not found")?;
    let mut ret = vec![];
    for option in regex!(r#"(?s)<option\b([^>]*)>(.*?)</option>"#).captures_iter(&select[1]) {
        let attributes = &option[1];
        let Some(site_id) = attribute(attributes, "value").filter(|v| !v.is_empty()) else {
            continue;
        };
        let broadcaster = attribute(attributes, "data-broadcaster").filter(|b| !b.is_empty());
        ret.push(
            Channel::builder()
                .id(format!("{site_id}.tvguide.no").into())
                .site_id(SiteChannelId::from(site_id))
                .display_name(html_to_text(&option[2]))
                .broadcaster(broadcaster)
                .build(),
        );
    }
    // A channel may appear under several option groups.
    Ok(ret.into_iter().unique_by(|c| c.id.clone()).collect())
}

fn attribute(attributes: &str, name: &str) -> Option<String> {
    regex!(r#"([\w-]+)="([^"]*)""#)
        .captures_iter(attributes)
        .find(|c| &c[1] == name)
        .map(|c| html_to_text(&c[2]))
}

pub fn parse_schedule(html: &str) -> anyhow::Result<Vec<ScheduleEntry>> {
    let mut ret = vec![];
    for block in regex!(r#"(?s)<li class="programme[^"]*">(.*?)</li>"#).captures_iter(html) {
        let block = &block[1];
        match parse_programme(block) {
            Ok(Some(entry)) => ret.push(entry),
            Ok(None) => debug!("Skipped a programme block without time or title"),
            Err(e) => warn!("Skipped a programme that could not be parsed: {e:#}"),
        }
    }
    Ok(ret)
}

fn parse_programme(block: &str) -> anyhow::Result<Option<ScheduleEntry>> {
    let Some(start) = regex!(r#"<span class="time">\s*(\d{1,2})[:.](\d{2})\s*</span>"#)
        .captures(block)
        .map(parse_time)
        .transpose()?
    else {
        return Ok(None);
    };
    let stop = regex!(r#"<span class="stop">\s*(\d{1,2})[:.](\d{2})\s*</span>"#)
        .captures(block)
        .map(parse_time)
        .transpose()?;
    let Some(raw_title) = first_text(block, regex!(r#"(?s)<h3 class="title">(.*?)</h3>"#)) else {
        return Ok(None);
    };

    let mut flags = ProgrammeFlags::default();
    let title = strip_title_markers(&raw_title, &mut flags);
    if title.is_empty() {
        return Ok(None);
    }
    for marker in regex!(r#"(?s)<span class="marker">(.*?)</span>"#).captures_iter(block) {
        apply_marker(&html_to_text(&marker[1]), &mut flags);
    }

    let sub_title = first_text(block, regex!(r#"(?s)<span class="subtitle">(.*?)</span>"#));
    let description = first_text(block, regex!(r#"(?s)<p class="desc">(.*?)</p>"#));
    let info = first_text(block, regex!(r#"(?s)<span class="info">(.*?)</span>"#));
    let categories = regex!(r#"(?s)<span class="category">(.*?)</span>"#)
        .captures_iter(block)
        .map(|c| html_to_text(&c[1]))
        .filter(|c| !c.is_empty())
        .collect();

    let episode = [&info, &sub_title, &description]
        .into_iter()
        .flatten()
        .map(|s| parse_episode(s))
        .find(|e| !e.is_empty());
    // A sub-title that only carries the numbering is not a real sub-title.
    let sub_title = sub_title.filter(|s| !strip_episode_text(s).is_empty());

    Ok(Some(
        ScheduleEntry::builder()
            .start(start)
            .stop(stop)
            .title(title)
            .sub_title(sub_title)
            .description(description)
            .categories(categories)
            .episode(episode)
            .flags(flags)
            .build(),
    ))
}

fn first_text(block: &str, pattern: &regex::Regex) -> Option<String> {
    pattern
        .captures(block)
        .map(|c| html_to_text(&c[1]))
        .filter(|s| !s.is_empty())
}

fn parse_time(c: Captures) -> anyhow::Result<NaiveTime> {
    let hour: u32 = c[1].parse()?;
    let minute: u32 = c[2].parse()?;
    // Late-night listings are sometimes written as 24:30, 25:00 and so on.
    NaiveTime::from_hms_opt(hour % 24, minute, 0)
        .with_context(|| format!("Invalid time: {}", &c[0]))
}

fn strip_title_markers(title: &str, flags: &mut ProgrammeFlags) -> String {
    let marker = regex!(r"\s*\(([RTP])\)");
    for c in marker.captures_iter(title) {
        match &c[1] {
            "R" => flags.rerun = true,
            "T" => flags.subtitled = true,
            _ => flags.premiere = true,
        }
    }
    marker.replace_all(title, "").trim().to_owned()
}

fn apply_marker(marker: &str, flags: &mut ProgrammeFlags) {
    let marker = marker.to_lowercase();
    if marker.contains("reprise") {
        flags.rerun = true;
    }
    if marker.contains("tekst") {
        flags.subtitled = true;
    }
    if marker.contains("premiere") {
        flags.premiere = true;
    }
}

pub fn parse_episode(text: &str) -> EpisodeNum {
    let mut ret = EpisodeNum::default();
    if let Some(c) = regex!(r"(?i)\bepisode\s+(\d+)(?:\s*(?:av|/)\s*(\d+))?").captures(text) {
        ret.episode = c[1].parse().ok();
        ret.total_episodes = c.get(2).and_then(|m| m.as_str().parse().ok());
    } else if let Some(c) = regex!(r"\((\d+):(\d+)\)").captures(text) {
        ret.episode = c[1].parse().ok();
        ret.total_episodes = c[2].parse().ok();
    }
    if let Some(c) = regex!(r"(?i)\bsesong\s+(\d+)").captures(text) {
        ret.season = c[1].parse().ok();
    }
    if let Some(c) = regex!(r"(?i)\bdel\s+(\d+)(?:\s*(?:av|/)\s*(\d+))?").captures(text) {
        ret.part = c[1].parse().ok();
        ret.total_parts = c.get(2).and_then(|m| m.as_str().parse().ok());
    }
    ret
}

fn strip_episode_text(text: &str) -> String {
    let text = regex!(r"(?i)\b(?:episode|del)\s+\d+(?:\s*(?:av|/)\s*\d+)?").replace_all(text, "");
    let text = regex!(r"(?i)\bsesong\s+\d+").replace_all(&text, "");
    let text = regex!(r"\(\d+:\d+\)").replace_all(&text, "");
    text.trim_matches(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
        .to_owned()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;
    use scraper::Html;

    use crate::schema::{EpisodeNum, ProgrammeFlags};

    use super::{parse_channel_list, parse_episode, parse_schedule, strip_title_markers};

    const CHANNELS: &str = r#"<html><body>
<form action="/kanal/">
  <select id="kanalvalg" name="channel">
    <option value="">Velg kanal</option>
    <option value="nrk1" data-broadcaster="NRK">NRK1</option>
    <option value="tv2" data-broadcaster="TV 2 Gruppen">TV 2 Direkte</option>
    <option value="tvnorge">TVNorge</option>
  </select>
</form>
<select name="day"><option value="i-dag">I dag</option></select>
</body></html>"#;

    const SCHEDULE: &str = r#"<html><body>
<ul class="schedule">
  <li class="programme">
    <span class="time">19:00</span> - <span class="stop">19:45</span>
    <h3 class="title">Dagsrevyen</h3>
    <span class="category">Nyheter</span>
    <p class="desc">Nyheter fra inn- og utland.</p>
    <span class="marker">Tekstet</span>
  </li>
  <li class="programme">
    <span class="time">20:55</span>
    <h3 class="title">Side om side (R)</h3>
    <span class="subtitle">Sesong 2. Episode 3 av 12</span>
    <span class="category">Komedie</span>
    <p class="desc">Norsk komiserie. Geir og Anne &amp; naboene.</p>
  </li>
  <li class="programme">
    <span class="time">23.10</span>
    <h3 class="title">Krimserie (T)</h3>
    <span class="subtitle">Mordet p&aring; brygga</span>
    <span class="info">(4:6) Del 1 av 2</span>
    <span class="marker">Premiere</span>
  </li>
  <li class="programme">
    <span class="time">00:35</span>
    <h3 class="title">Nattsending</h3>
  </li>
  <li class="programme ad"><h3 class="title">Reklame</h3></li>
</ul>
</body></html>"#;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn channel_list() {
        let html = Html::parse_document(CHANNELS).html();
        let channels = parse_channel_list(&html).unwrap();
        assert_eq!(channels.len(), 3);
        assert_eq!(channels[0].id.as_str(), "nrk1.tvguide.no");
        assert_eq!(channels[0].site_id.as_str(), "nrk1");
        assert_eq!(channels[0].display_name, "NRK1");
        assert_eq!(channels[0].broadcaster.as_deref(), Some("NRK"));
        assert_eq!(channels[1].display_name, "TV 2 Direkte");
        assert_eq!(channels[2].broadcaster, None);
    }

    #[test]
    fn channel_list_without_select() {
        assert!(parse_channel_list("<html><body></body></html>").is_err());
    }

    #[test]
    fn schedule() {
        let html = Html::parse_document(SCHEDULE).html();
        let entries = parse_schedule(&html).unwrap();
        assert_eq!(entries.len(), 4);

        let news = &entries[0];
        assert_eq!(news.start, time(19, 0));
        assert_eq!(news.stop, Some(time(19, 45)));
        assert_eq!(news.title, "Dagsrevyen");
        assert_eq!(news.categories, ["Nyheter"]);
        assert_eq!(
            news.description.as_deref(),
            Some("Nyheter fra inn- og utland.")
        );
        assert!(news.flags.subtitled);
        assert!(!news.flags.rerun);
        assert_eq!(news.episode, None);

        let comedy = &entries[1];
        assert_eq!(comedy.title, "Side om side");
        assert!(comedy.flags.rerun);
        assert_eq!(comedy.sub_title, None);
        assert_eq!(
            comedy.description.as_deref(),
            Some("Norsk komiserie. Geir og Anne & naboene.")
        );
        assert_eq!(
            comedy.episode,
            Some(
                EpisodeNum::builder()
                    .season(Some(2))
                    .episode(Some(3))
                    .total_episodes(Some(12))
                    .build()
            )
        );

        let crime = &entries[2];
        assert_eq!(crime.start, time(23, 10));
        assert_eq!(crime.title, "Krimserie");
        assert_eq!(crime.sub_title.as_deref(), Some("Mordet på brygga"));
        assert!(crime.flags.subtitled);
        assert!(crime.flags.premiere);
        assert_eq!(
            crime.episode,
            Some(
                EpisodeNum::builder()
                    .episode(Some(4))
                    .total_episodes(Some(6))
                    .part(Some(1))
                    .total_parts(Some(2))
                    .build()
            )
        );

        assert_eq!(entries[3].start, time(0, 35));
        assert_eq!(entries[3].stop, None);
    }

    #[test]
    fn channel_in_two_groups_is_listed_once() {
        let html = r#"<select name="channel">
  <optgroup label="Populære"><option value="nrk1">NRK1</option></optgroup>
  <optgroup label="NRK">
    <option value="nrk1">NRK1</option>
    <option value="nrk2">NRK2</option>
  </optgroup>
</select>"#;
        let channels = parse_channel_list(html).unwrap();
        let ids = channels.iter().map(|c| c.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, ["nrk1.tvguide.no", "nrk2.tvguide.no"]);
    }

    #[test]
    fn malformed_programme_is_skipped() {
        let html = r#"<ul>
  <li class="programme"><span class="time">19:75</span><h3 class="title">Feil</h3></li>
  <li class="programme"><span class="time">20:00</span><h3 class="title">Debatten</h3></li>
</ul>"#;
        let entries = parse_schedule(html).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Debatten");
        assert_eq!(entries[0].start, time(20, 0));
    }

    #[test]
    fn title_markers_anywhere() {
        let mut flags = ProgrammeFlags::default();
        assert_eq!(
            strip_title_markers("Side om side (R) - finale", &mut flags),
            "Side om side - finale"
        );
        assert!(flags.rerun);
        assert!(!flags.premiere);

        let mut flags = ProgrammeFlags::default();
        assert_eq!(strip_title_markers("Krim (P) (T)", &mut flags), "Krim");
        assert!(flags.premiere);
        assert!(flags.subtitled);
    }

    #[test]
    fn episode_variants() {
        assert_eq!(parse_episode("Episode 7").episode, Some(7));
        assert_eq!(parse_episode("episode 7/10").total_episodes, Some(10));
        assert_eq!(parse_episode("Sesong 12").season, Some(12));
        assert!(parse_episode("Ingen nummer her").is_empty());
    }
}
