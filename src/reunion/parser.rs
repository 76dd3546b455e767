use anyhow::{bail, Context};
use chrono::{Duration, NaiveTime};
use itertools::Itertools;
use log::{debug, warn};
use scraper::{ElementRef, Html};
use tv_grab_utils::{regex, selector, text::element_text};

use crate::schema::{Channel, EpisodeNum, ProgrammeFlags, ScheduleEntry, SiteChannelId};

pub fn parse_channel_list(html: &Html) -> anyhow::Result<Vec<Channel>> {
    let list = html
        .select(selector!("ul.chaines"))
        .next()
        .context("ul.chaines not found")?;
    list.select(selector!("li"))
        .filter_map(|li| {
            let a = li.select(selector!("a[data-chaine]")).next()?;
            Some((li, a))
        })
        .map(|(li, a)| -> anyhow::Result<Channel> {
            let site_id = a
                .value()
                .attr("data-chaine")
                .context("Attribute `data-chaine` not found")?
                .trim()
                .to_owned();
            let broadcaster = li
                .select(selector!("span.diffuseur"))
                .next()
                .map(element_text)
                .filter(|b| !b.is_empty());
            Ok(Channel::builder()
                .id(format!("{site_id}.tv-reunion.re").into())
                .site_id(SiteChannelId::from(site_id))
                .display_name(element_text(a))
                .broadcaster(broadcaster)
                .build())
        })
        .process_results(|channels| channels.unique_by(|c| c.id.clone()).collect())
}

pub fn parse_schedule(html: &Html) -> anyhow::Result<Vec<ScheduleEntry>> {
    let mut ret = vec![];
    for div in html.select(selector!("div.emission")) {
        match parse_emission(div) {
            Ok(Some(entry)) => ret.push(entry),
            Ok(None) => debug!("Skipped an emission without time or title"),
            Err(e) => warn!("Skipped an emission that could not be parsed: {e:#}"),
        }
    }
    Ok(ret)
}

fn parse_emission(div: ElementRef) -> anyhow::Result<Option<ScheduleEntry>> {
    let Some(start) = find_text(div, selector!("span.horaire")) else {
        return Ok(None);
    };
    let start = parse_horaire(&start)?;
    let Some(title) = find_text(div, selector!(".titre")) else {
        return Ok(None);
    };

    let duration = find_text(div, selector!(".duree"))
        .map(|d| parse_duree(&d))
        .transpose()?;
    let sub_title = find_text(div, selector!(".sous-titre"));
    let description = find_text(div, selector!(".resume"));
    let categories = div
        .select(selector!(".genre"))
        .map(element_text)
        .filter(|g| !g.is_empty())
        .collect();

    let mut episode = EpisodeNum::default();
    if let Some(saison) = find_text(div, selector!(".saison")) {
        if let Some(c) = regex!(r"(\d+)").captures(&saison) {
            episode.season = c[1].parse().ok();
        }
    }
    if let Some(text) = find_text(div, selector!(".episode")) {
        if let Some(c) = regex!(r"(\d+)(?:\s*/\s*(\d+))?").captures(&text) {
            episode.episode = c[1].parse().ok();
            episode.total_episodes = c.get(2).and_then(|m| m.as_str().parse().ok());
        }
    }
    if let Some(text) = find_text(div, selector!(".partie")) {
        if let Some(c) = regex!(r"(\d+)(?:\s*/\s*(\d+))?").captures(&text) {
            episode.part = c[1].parse().ok();
            episode.total_parts = c.get(2).and_then(|m| m.as_str().parse().ok());
        }
    }

    let mut flags = ProgrammeFlags {
        rerun: selector!(".rediffusion").matches(&div),
        ..Default::default()
    };
    for picto in div.select(selector!("img.picto")) {
        let alt = picto.value().attr("alt").unwrap_or_default().to_lowercase();
        if alt.contains("sous-titr") || alt.contains("malentendant") {
            flags.subtitled = true;
        }
        if alt.contains("rediffusion") {
            flags.rerun = true;
        }
        if alt.contains("inédit") || alt.contains("inedit") {
            flags.premiere = true;
        }
    }

    Ok(Some(
        ScheduleEntry::builder()
            .start(start)
            .duration(duration)
            .title(title)
            .sub_title(sub_title)
            .description(description)
            .categories(categories)
            .episode((!episode.is_empty()).then_some(episode))
            .flags(flags)
            .build(),
    ))
}

fn find_text(e: ElementRef, selector: &scraper::Selector) -> Option<String> {
    e.select(selector)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty())
}

/// `20h50`, `6h05`, or `20:50`.
pub fn parse_horaire(s: &str) -> anyhow::Result<NaiveTime> {
    let c = regex!(r"^(\d{1,2})\s*[h:]\s*(\d{2})$")
        .captures(s.trim())
        .with_context(|| format!("Unexpected time format: {s:?}"))?;
    let hour: u32 = c[1].parse()?;
    let minute: u32 = c[2].parse()?;
    NaiveTime::from_hms_opt(hour % 24, minute, 0).with_context(|| format!("Invalid time: {s:?}"))
}

/// `1h30`, `2h`, `45 min`, `1 h 05`.
pub fn parse_duree(s: &str) -> anyhow::Result<Duration> {
    let c = regex!(r"^(?:(\d+)\s*h)?\s*(?:(\d+)\s*(?:min|mn)?)?$")
        .captures(s.trim())
        .with_context(|| format!("Unexpected duration format: {s:?}"))?;
    let hours: i64 = c.get(1).map_or(Ok(0), |m| m.as_str().parse())?;
    let minutes: i64 = c.get(2).map_or(Ok(0), |m| m.as_str().parse())?;
    if c.get(1).is_none() && c.get(2).is_none() {
        bail!("Empty duration: {s:?}");
    }
    Ok(Duration::hours(hours) + Duration::minutes(minutes))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveTime};
    use scraper::Html;

    use crate::schema::EpisodeNum;

    use super::{parse_channel_list, parse_duree, parse_horaire, parse_schedule};

    const CHANNELS: &str = r#"<html><body>
<nav><ul class="menu"><li><a href="/">Accueil</a></li></ul></nav>
<ul class="chaines">
  <li>
    <a href="/programme/reunion-la-1ere/" data-chaine="reunion-la-1ere">R&eacute;union La 1&egrave;re</a>
    <span class="diffuseur">France T&eacute;l&eacute;visions</span>
  </li>
  <li><a href="/programme/antenne-reunion/" data-chaine="antenne-reunion">Antenne R&eacute;union</a></li>
  <li class="separateur"></li>
</ul>
</body></html>"#;

    const SCHEDULE: &str = r#"<html><body>
<div class="grille">
  <div class="emission">
    <span class="horaire">19h30</span>
    <span class="duree">30 min</span>
    <h2 class="titre">Le Journal</h2>
    <span class="genre">Information</span>
    <img class="picto" alt="Sous-titré" src="/img/st.png">
  </div>
  <div class="emission rediffusion">
    <span class="horaire">20h50</span>
    <span class="duree">1h30</span>
    <h2 class="titre">Les Experts</h2>
    <h3 class="sous-titre">Meurtre au lagon</h3>
    <span class="genre">Série policière</span>
    <span class="saison">Saison 3</span>
    <span class="episode">Épisode 12/24</span>
    <p class="resume">  Une enquête
      à Saint-Denis.  </p>
  </div>
  <div class="emission">
    <span class="horaire">0:15</span>
    <h2 class="titre">Documentaire</h2>
    <span class="partie">Partie 1/2</span>
    <img class="picto" alt="Inédit">
  </div>
  <div class="emission pub"><span class="horaire">20h45</span></div>
</div>
</body></html>"#;

    #[test]
    fn channel_list() {
        let channels = parse_channel_list(&Html::parse_document(CHANNELS)).unwrap();
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[0].id.as_str(), "reunion-la-1ere.tv-reunion.re");
        assert_eq!(channels[0].display_name, "Réunion La 1ère");
        assert_eq!(
            channels[0].broadcaster.as_deref(),
            Some("France Télévisions")
        );
        assert_eq!(channels[1].site_id.as_str(), "antenne-reunion");
        assert_eq!(channels[1].broadcaster, None);
    }

    #[test]
    fn schedule() {
        let entries = parse_schedule(&Html::parse_document(SCHEDULE)).unwrap();
        assert_eq!(entries.len(), 3);

        let news = &entries[0];
        assert_eq!(news.start, NaiveTime::from_hms_opt(19, 30, 0).unwrap());
        assert_eq!(news.duration, Some(Duration::minutes(30)));
        assert_eq!(news.categories, ["Information"]);
        assert!(news.flags.subtitled);
        assert!(!news.flags.rerun);
        assert_eq!(news.episode, None);

        let series = &entries[1];
        assert_eq!(series.title, "Les Experts");
        assert_eq!(series.sub_title.as_deref(), Some("Meurtre au lagon"));
        assert_eq!(series.duration, Some(Duration::minutes(90)));
        assert_eq!(
            series.description.as_deref(),
            Some("Une enquête à Saint-Denis.")
        );
        assert!(series.flags.rerun);
        assert_eq!(
            series.episode,
            Some(
                EpisodeNum::builder()
                    .season(Some(3))
                    .episode(Some(12))
                    .total_episodes(Some(24))
                    .build()
            )
        );

        let documentary = &entries[2];
        assert_eq!(documentary.start, NaiveTime::from_hms_opt(0, 15, 0).unwrap());
        assert_eq!(documentary.duration, None);
        assert!(documentary.flags.premiere);
        assert_eq!(
            documentary.episode,
            Some(
                EpisodeNum::builder()
                    .part(Some(1))
                    .total_parts(Some(2))
                    .build()
            )
        );
    }

    #[test]
    fn repeated_channel_is_listed_once() {
        let html = r#"<ul class="chaines">
  <li><a data-chaine="antenne-reunion">Antenne R&eacute;union</a></li>
  <li><a data-chaine="reunion-la-1ere">R&eacute;union La 1&egrave;re</a></li>
  <li><a data-chaine="antenne-reunion">Antenne R&eacute;union</a></li>
</ul>"#;
        let channels = parse_channel_list(&Html::parse_document(html)).unwrap();
        let ids = channels.iter().map(|c| c.site_id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, ["antenne-reunion", "reunion-la-1ere"]);
    }

    #[test]
    fn malformed_emission_is_skipped() {
        let html = r#"<div class="grille">
  <div class="emission">
    <span class="horaire">19h30</span>
    <span class="duree">90 minutes</span>
    <h2 class="titre">Magazine</h2>
  </div>
  <div class="emission">
    <span class="horaire">20h50</span>
    <h2 class="titre">Film</h2>
  </div>
</div>"#;
        let entries = parse_schedule(&Html::parse_document(html)).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Film");
        assert_eq!(entries[0].start, NaiveTime::from_hms_opt(20, 50, 0).unwrap());
    }

    #[test]
    fn time_formats() {
        assert_eq!(
            parse_horaire("6h05").unwrap(),
            NaiveTime::from_hms_opt(6, 5, 0).unwrap()
        );
        assert_eq!(
            parse_horaire(" 20:50 ").unwrap(),
            NaiveTime::from_hms_opt(20, 50, 0).unwrap()
        );
        assert!(parse_horaire("vers 20h").is_err());

        assert_eq!(parse_duree("2h").unwrap(), Duration::hours(2));
        assert_eq!(parse_duree("1 h 05").unwrap(), Duration::minutes(65));
        assert_eq!(parse_duree("52mn").unwrap(), Duration::minutes(52));
        assert!(parse_duree("").is_err());
    }
}
