use std::io::Write;
use std::path::Path;

use chrono::SecondsFormat;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::route::{Fix, FixRole, RouteMode, RouteRecord};

use super::error::ExportError;

const CREATOR: &str = concat!("tidal-route ", env!("CARGO_PKG_VERSION"));

/// Chart symbol for a fix, as understood by OpenCPN.
pub fn symbol(fix: &Fix, mode: RouteMode) -> &'static str {
    match (fix.role, mode) {
        (FixRole::Waypoint, _) => "Diamond",
        (FixRole::Hourly, RouteMode::Dr) => "Symbol-X-Large-Magenta",
        (FixRole::Hourly, RouteMode::Eta) => "Triangle",
    }
}

/// Renders the route as a GPX 1.1 document with one `rtept` per fix.
pub fn write_route(record: &RouteRecord) -> Result<String, ExportError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    emit(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    emit(
        &mut writer,
        Event::Start(BytesStart::new("gpx").with_attributes([
            ("version", "1.1"),
            ("creator", CREATOR),
            ("xmlns", "http://www.topografix.com/GPX/1/1"),
            ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
            (
                "xsi:schemaLocation",
                "http://www.topografix.com/GPX/1/1 http://www.topografix.com/GPX/1/1/gpx.xsd",
            ),
            ("xmlns:opencpn", "http://www.opencpn.org"),
        ])),
    )?;
    emit(&mut writer, Event::Start(BytesStart::new("rte")))?;
    text_element(&mut writer, "name", record.name())?;

    for fix in record.fixes() {
        let lat = format!("{:.6}", fix.position.lat);
        let lon = format!("{:.6}", fix.position.lon);
        let mut point = BytesStart::new("rtept");
        point.push_attribute(("lat", lat.as_str()));
        point.push_attribute(("lon", lon.as_str()));

        emit(&mut writer, Event::Start(point))?;
        text_element(&mut writer, "time", &fix.time.to_rfc3339_opts(SecondsFormat::Secs, true))?;
        text_element(&mut writer, "name", &fix.name)?;
        text_element(&mut writer, "sym", symbol(fix, record.mode()))?;
        text_element(&mut writer, "type", "WPT")?;
        emit(&mut writer, Event::End(BytesEnd::new("rtept")))?;
    }

    emit(&mut writer, Event::Start(BytesStart::new("extensions")))?;
    text_element(&mut writer, "opencpn:start", record.start())?;
    text_element(&mut writer, "opencpn:end", record.end())?;
    emit(&mut writer, Event::End(BytesEnd::new("extensions")))?;

    emit(&mut writer, Event::End(BytesEnd::new("rte")))?;
    emit(&mut writer, Event::End(BytesEnd::new("gpx")))?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(String::from_utf8(bytes)?)
}

pub fn save(record: &RouteRecord, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let path = path.as_ref();
    let document = write_route(record)?;
    let mut file = std::fs::File::create(path)?;
    file.write_all(document.as_bytes())?;
    log::info!("Wrote {} ({} points) to {}", record.name(), record.fixes().len(), path.display());
    Ok(())
}

fn emit<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<(), ExportError> {
    writer.write_event(event).map_err(|e| ExportError::Xml(e.to_string()))
}

fn text_element<W: Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> Result<(), ExportError> {
    emit(writer, Event::Start(BytesStart::new(tag)))?;
    emit(writer, Event::Text(BytesText::new(text)))?;
    emit(writer, Event::End(BytesEnd::new(tag)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::current::UniformCurrent;
    use crate::navigation::RhumbLine;
    use crate::planner::{Projection, RouteProjector};
    use crate::route::{CurrentVector, Waypoint};
    use chrono::{TimeZone, Utc};

    fn route(mode: RouteMode) -> RouteRecord {
        let waypoints = vec![Waypoint::new("Needles", 50.662, -1.59), Waypoint::new("Cowes & Co", 50.77, -1.3)];
        let sampler = UniformCurrent(CurrentVector::new(60.0, 0.5));
        RouteProjector::new(&RhumbLine, &sampler)
            .project(&Projection {
                name: "solent".into(),
                mode,
                waypoints: &waypoints,
                start_time: Utc.with_ymd_and_hms(2024, 5, 4, 9, 30, 0).unwrap(),
                speed: 4.0,
            })
            .unwrap()
    }

    #[test]
    fn dr_document_layout() {
        let record = route(RouteMode::Dr);
        let gpx = write_route(&record).unwrap();

        assert!(gpx.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(gpx.contains("<gpx version=\"1.1\""));
        assert!(gpx.contains("<name>solent</name>"));
        assert_eq!(gpx.matches("<rtept ").count(), record.fixes().len());
        assert!(gpx.contains("<rtept lat=\"50.662000\" lon=\"-1.590000\">"));
        assert!(gpx.contains("<time>2024-05-04T09:30:00Z</time>"));
        assert!(gpx.contains("<name>DR1</name>"));
        assert!(gpx.contains("<sym>Symbol-X-Large-Magenta</sym>"));
        assert_eq!(gpx.matches("<sym>Diamond</sym>").count(), 2);
        assert!(gpx.contains("<opencpn:start>Needles</opencpn:start>"));
        assert!(gpx.contains("<opencpn:end>Cowes &amp; Co</opencpn:end>"));
        assert!(gpx.trim_end().ends_with("</gpx>"));
    }

    #[test]
    fn eta_points_use_triangles() {
        let record = route(RouteMode::Eta);
        let gpx = write_route(&record).unwrap();
        assert!(gpx.contains("<name>EP1</name>"));
        assert!(gpx.contains("<sym>Triangle</sym>"));
        assert!(!gpx.contains("Symbol-X-Large-Magenta"));
    }

    #[test]
    fn save_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("solent.gpx");
        let record = route(RouteMode::Dr);

        save(&record, &path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), write_route(&record).unwrap());
    }
}
