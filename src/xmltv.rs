//! Writer for the XMLTV listings format.
//!
//! All `<channel>` elements must precede the `<programme>` elements, as the DTD requires.

use std::{collections::HashSet, io::Write};

use quick_xml::{
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
    Writer,
};
use thiserror::Error;

use crate::{
    chrono_util::xmltv_timestamp,
    schema::{Channel, ChannelId, Programme},
};

#[derive(Debug, Error)]
pub enum XmltvError {
    #[error("Channel {0} was written after a programme")]
    ChannelAfterProgramme(ChannelId),
    #[error("Channel {0} was written twice")]
    DuplicateChannel(ChannelId),
    #[error("Failed to write XMLTV output: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to write XMLTV output: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Values of the `<tv>` root attributes.
#[derive(Clone, Debug)]
pub struct SourceInfo<'a> {
    pub source_info_url: &'a str,
    pub source_info_name: &'a str,
    pub generator_info_name: &'a str,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Section {
    Channels,
    Programmes,
}

pub struct XmltvWriter<W: Write> {
    writer: Writer<W>,
    section: Section,
    channels: HashSet<ChannelId>,
}

impl<W: Write> XmltvWriter<W> {
    /// Writes the prolog and opens the `<tv>` root.
    pub fn new(inner: W, info: &SourceInfo) -> Result<Self, XmltvError> {
        let mut writer = Writer::new_with_indent(inner, b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::DocType(BytesText::from_escaped(
            r#"tv SYSTEM "xmltv.dtd""#,
        )))?;
        writer.write_event(Event::Start(BytesStart::new("tv").with_attributes([
            ("source-info-url", info.source_info_url),
            ("source-info-name", info.source_info_name),
            ("generator-info-name", info.generator_info_name),
        ])))?;
        Ok(Self {
            writer,
            section: Section::Channels,
            channels: HashSet::new(),
        })
    }

    pub fn write_channel(&mut self, channel: &Channel) -> Result<(), XmltvError> {
        if self.section != Section::Channels {
            return Err(XmltvError::ChannelAfterProgramme(channel.id.clone()));
        }
        if !self.channels.insert(channel.id.clone()) {
            return Err(XmltvError::DuplicateChannel(channel.id.clone()));
        }

        self.writer.write_event(Event::Start(
            BytesStart::new("channel").with_attributes([("id", channel.id.as_str())]),
        ))?;
        self.text_element("display-name", &[], &channel.display_name)?;
        if let Some(broadcaster) = &channel.broadcaster {
            self.text_element("display-name", &[], broadcaster)?;
        }
        self.writer
            .write_event(Event::End(BytesEnd::new("channel")))?;
        Ok(())
    }

    pub fn write_programme(&mut self, programme: &Programme) -> Result<(), XmltvError> {
        self.section = Section::Programmes;

        let start = xmltv_timestamp(programme.start());
        let stop = programme.stop().map(xmltv_timestamp);
        let mut element = BytesStart::new("programme");
        element.push_attribute(("start", start.as_str()));
        if let Some(stop) = &stop {
            element.push_attribute(("stop", stop.as_str()));
        }
        element.push_attribute(("channel", programme.channel().as_str()));
        self.writer.write_event(Event::Start(element))?;

        let lang = [("lang", programme.lang())];
        self.text_element("title", &lang, programme.title())?;
        if let Some(sub_title) = programme.sub_title() {
            self.text_element("sub-title", &lang, sub_title)?;
        }
        if let Some(description) = programme.description() {
            self.text_element("desc", &lang, description)?;
        }
        for category in programme.categories() {
            self.text_element("category", &lang, category)?;
        }
        if let Some(episode) = programme.episode() {
            self.text_element(
                "episode-num",
                &[("system", "xmltv_ns")],
                &episode.xmltv_ns(),
            )?;
            if let Some(onscreen) = episode.onscreen() {
                self.text_element("episode-num", &[("system", "onscreen")], &onscreen)?;
            }
        }
        let flags = programme.flags();
        if flags.rerun {
            self.empty_element("previously-shown", &[])?;
        }
        if flags.premiere {
            self.empty_element("premiere", &[])?;
        }
        if flags.subtitled {
            self.empty_element("subtitles", &[("type", "teletext")])?;
        }

        self.writer
            .write_event(Event::End(BytesEnd::new("programme")))?;
        Ok(())
    }

    /// Closes the root element and hands back the underlying writer.
    pub fn finish(mut self) -> Result<W, XmltvError> {
        self.writer.write_event(Event::End(BytesEnd::new("tv")))?;
        let mut inner = self.writer.into_inner();
        inner.write_all(b"\n")?;
        inner.flush()?;
        Ok(inner)
    }

    fn text_element(
        &mut self,
        name: &str,
        attributes: &[(&str, &str)],
        text: &str,
    ) -> Result<(), XmltvError> {
        self.writer.write_event(Event::Start(
            BytesStart::new(name).with_attributes(attributes.iter().copied()),
        ))?;
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn empty_element(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), XmltvError> {
        self.writer.write_event(Event::Empty(
            BytesStart::new(name).with_attributes(attributes.iter().copied()),
        ))?;
        Ok(())
    }
}
