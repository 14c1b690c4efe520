use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::writer::Writer;

/// One `<D:response>` descriptor in a multistatus body.
#[derive(Debug, Clone)]
pub struct DavEntry {
    /// Canonical percent-encoded path; collections carry a trailing slash.
    pub href: String,
    pub display_name: String,
    pub is_collection: bool,
    pub content_length: u64,
    pub content_type: Option<String>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl DavEntry {
    pub fn folder(href: String, display_name: String, created: DateTime<Utc>, modified: DateTime<Utc>) -> Self {
        Self {
            href,
            display_name,
            is_collection: true,
            content_length: 0,
            content_type: None,
            created,
            modified,
        }
    }
}

/// Serialize descriptors into a WebDAV multistatus document.
///
/// Entries are written in input order; callers put the resolved target first
/// so clients can diff listings against a stable shape.
pub fn render_multistatus(entries: &[DavEntry]) -> Result<String> {
    let mut writer = Writer::new(Vec::new());

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    let mut root = BytesStart::new("D:multistatus");
    root.push_attribute(("xmlns:D", "DAV:"));
    writer.write_event(Event::Start(root))?;

    for entry in entries {
        write_response(&mut writer, entry)?;
    }

    writer.write_event(Event::End(BytesEnd::new("D:multistatus")))?;
    Ok(String::from_utf8(writer.into_inner())?)
}

fn write_response(writer: &mut Writer<Vec<u8>>, entry: &DavEntry) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("D:response")))?;
    write_text(writer, "D:href", &entry.href)?;

    writer.write_event(Event::Start(BytesStart::new("D:propstat")))?;
    writer.write_event(Event::Start(BytesStart::new("D:prop")))?;

    write_text(writer, "D:displayname", &entry.display_name)?;

    writer.write_event(Event::Start(BytesStart::new("D:resourcetype")))?;
    if entry.is_collection {
        writer.write_event(Event::Empty(BytesStart::new("D:collection")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("D:resourcetype")))?;

    if !entry.is_collection {
        write_text(writer, "D:getcontentlength", &entry.content_length.to_string())?;
        if let Some(content_type) = &entry.content_type {
            write_text(writer, "D:getcontenttype", content_type)?;
        }
    }

    write_text(writer, "D:getlastmodified", &http_date(entry.modified))?;
    write_text(
        writer,
        "D:creationdate",
        &entry.created.to_rfc3339_opts(SecondsFormat::Secs, true),
    )?;

    writer.write_event(Event::End(BytesEnd::new("D:prop")))?;
    write_text(writer, "D:status", "HTTP/1.1 200 OK")?;
    writer.write_event(Event::End(BytesEnd::new("D:propstat")))?;

    writer.write_event(Event::End(BytesEnd::new("D:response")))?;
    Ok(())
}

fn write_text(writer: &mut Writer<Vec<u8>>, tag: &str, value: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(value)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

/// RFC 7231 IMF-fixdate, the format `getlastmodified` requires.
fn http_date(t: DateTime<Utc>) -> String {
    t.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
