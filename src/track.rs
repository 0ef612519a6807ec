//! GPX tracks: parsing, summary statistics and the info popup text.

use jiff::Timestamp;
use jiff::tz::TimeZone;
use roxmltree::Node;
use tracing::debug;

use crate::error::ViewerError;
use crate::geo::Bounds;
use crate::geo::LatLng;
use crate::geo::path_distance;

const UNKNOWN_DATE: &str = "date inconnue";
const TRACK_HINT: &str = "Clique sur la trace pour ajouter un média à un endroit précis.";

#[derive(Debug, Clone, PartialEq)]
pub struct TrackPoint {
    pub position: LatLng,
    pub elevation: Option<f64>,
    pub time: Option<Timestamp>,
}

/// A track file loaded at startup. Immutable once built.
#[derive(Debug, Clone)]
pub struct Track {
    name: String,
    source: String,
    points: Vec<TrackPoint>,
    /// One polyline per `trkseg` (or `rte`); gaps between them are not drawn.
    segments: Vec<Vec<LatLng>>,
    bounds: Bounds,
    distance_m: f64,
}

impl Track {
    /// Parse a GPX document. Track segments (`trkseg`/`trkpt`) are preferred;
    /// routes (`rte`/`rtept`) are used when the file has no track points.
    pub fn from_gpx(name: impl Into<String>, source: impl Into<String>, text: &str) -> Result<Self, ViewerError> {
        let name = name.into();
        let doc = roxmltree::Document::parse(text)?;

        let mut runs = collect_runs(&doc, "trkseg", "trkpt");
        if runs.is_empty() {
            runs = collect_runs(&doc, "rte", "rtept");
        }

        let segments: Vec<Vec<LatLng>> = runs.iter().map(|run| run.iter().map(|p| p.position).collect()).collect();
        let Some(bounds) = Bounds::from_points(&segments.concat()) else {
            return Err(ViewerError::EmptyTrack(name));
        };
        let distance_m = segments.iter().map(|segment| path_distance(segment)).sum();
        let points = runs.into_iter().flatten().collect();

        Ok(Self { name, source: source.into(), points, segments, bounds, distance_m })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    pub fn segments(&self) -> &[Vec<LatLng>] {
        &self.segments
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn distance_m(&self) -> f64 {
        self.distance_m
    }

    pub fn start_time(&self) -> Option<Timestamp> {
        self.points.iter().find_map(|p| p.time)
    }

    pub fn end_time(&self) -> Option<Timestamp> {
        self.points.iter().rev().find_map(|p| p.time)
    }

    /// Lines of the popup shown when the track is clicked.
    pub fn summary_lines(&self, tz: &TimeZone) -> Vec<String> {
        vec![
            self.name.clone(),
            format!("Distance : {:.1} km", self.distance_m / 1000.0),
            format!("Du : {}", format_date(self.start_time(), tz)),
            format!("Au : {}", format_date(self.end_time(), tz)),
            TRACK_HINT.to_string(),
        ]
    }
}

/// `dd.mm.yyyy` in the given zone, or a placeholder when the time is unknown.
pub fn format_date(time: Option<Timestamp>, tz: &TimeZone) -> String {
    match time {
        Some(time) => time.to_zoned(tz.clone()).strftime("%d.%m.%Y").to_string(),
        None => UNKNOWN_DATE.to_string(),
    }
}

fn child_text<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.children().find(|c| c.tag_name().name() == name).and_then(|c| c.text()).map(str::trim)
}

/// Points of every `container` element in document order. Containers without
/// a usable point are dropped.
fn collect_runs(doc: &roxmltree::Document<'_>, container: &str, point: &str) -> Vec<Vec<TrackPoint>> {
    doc.descendants()
        .filter(|n| n.tag_name().name() == container)
        .map(|n| n.children().filter(|c| c.tag_name().name() == point).filter_map(parse_point).collect::<Vec<_>>())
        .filter(|run| !run.is_empty())
        .collect()
}

/// Parse a point in time. Values without an offset are read as UTC; anything
/// unparseable is `None`.
pub fn parse_timestamp(text: &str) -> Option<Timestamp> {
    let text = text.trim();
    if let Ok(timestamp) = text.parse::<Timestamp>() {
        return Some(timestamp);
    }
    let civil = text.parse::<jiff::civil::DateTime>().ok()?;
    civil.to_zoned(TimeZone::UTC).ok().map(|zoned| zoned.timestamp())
}

fn parse_point(node: Node<'_, '_>) -> Option<TrackPoint> {
    let lat = node.attribute("lat")?.trim().parse::<f64>().ok()?;
    let lng = node.attribute("lon")?.trim().parse::<f64>().ok()?;
    let position = LatLng::new(lat, lng);
    if !position.is_valid() {
        debug!("skipping invalid GPX point {lat}, {lng}");
        return None;
    }

    let elevation = child_text(node, "ele").and_then(|ele| ele.parse().ok());
    let time = child_text(node, "time").and_then(parse_timestamp);

    Some(TrackPoint { position, elevation, time })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <trk>
    <name>Sample</name>
    <trkseg>
      <trkpt lat="46.0" lon="6.0"><ele>372.0</ele><time>2025-06-01T08:00:00Z</time></trkpt>
      <trkpt lat="46.0" lon="6.1"><ele>380.5</ele></trkpt>
      <trkpt lat="46.1" lon="6.1"><time>2025-06-03T17:30:00Z</time></trkpt>
    </trkseg>
  </trk>
</gpx>"#;

    #[test]
    fn parses_track_points_in_order() {
        let track = Track::from_gpx("Activity 1", "data/a.gpx", SAMPLE).unwrap();
        assert_eq!(track.segments(), &[vec![LatLng::new(46.0, 6.0), LatLng::new(46.0, 6.1), LatLng::new(46.1, 6.1)]]);
        assert_eq!(track.points()[0].elevation, Some(372.0));
        assert_eq!(track.points()[2].elevation, None);
        assert_eq!(track.bounds().north_east, LatLng::new(46.1, 6.1));
    }

    #[test]
    fn start_and_end_skip_untimed_points() {
        let track = Track::from_gpx("Activity 1", "data/a.gpx", SAMPLE).unwrap();
        assert_eq!(track.start_time(), Some("2025-06-01T08:00:00Z".parse().unwrap()));
        assert_eq!(track.end_time(), Some("2025-06-03T17:30:00Z".parse().unwrap()));
    }

    #[test]
    fn summary_formats_distance_and_dates() {
        let track = Track::from_gpx("Activity 1", "data/a.gpx", SAMPLE).unwrap();
        let lines = track.summary_lines(&TimeZone::UTC);
        assert_eq!(lines[0], "Activity 1");
        // ~7.7 km east then ~11.1 km north
        assert_eq!(lines[1], format!("Distance : {:.1} km", track.distance_m() / 1000.0));
        assert!(track.distance_m() > 18_000.0 && track.distance_m() < 19_500.0);
        assert_eq!(lines[2], "Du : 01.06.2025");
        assert_eq!(lines[3], "Au : 03.06.2025");
    }

    #[test]
    fn missing_times_use_placeholder() {
        let gpx = r#"<gpx><trk><trkseg><trkpt lat="1" lon="2"/><trkpt lat="1.5" lon="2"/></trkseg></trk></gpx>"#;
        let track = Track::from_gpx("T", "t.gpx", gpx).unwrap();
        let lines = track.summary_lines(&TimeZone::UTC);
        assert_eq!(lines[2], "Du : date inconnue");
        assert_eq!(lines[3], "Au : date inconnue");
    }

    #[test]
    fn falls_back_to_route_points() {
        let gpx = r#"<gpx><rte><rtept lat="10" lon="20"/><rtept lat="11" lon="21"/></rte></gpx>"#;
        let track = Track::from_gpx("Route", "r.gpx", gpx).unwrap();
        assert_eq!(track.segments().len(), 1);
        assert_eq!(track.points().len(), 2);
    }

    #[test]
    fn rejects_empty_and_broken_documents() {
        let empty = Track::from_gpx("Empty", "e.gpx", "<gpx><trk/></gpx>");
        assert!(matches!(empty, Err(ViewerError::EmptyTrack(name)) if name == "Empty"));

        let broken = Track::from_gpx("Broken", "b.gpx", "<gpx><trk>");
        assert!(matches!(broken, Err(ViewerError::Gpx(_))));
    }

    #[test]
    fn skips_points_with_bad_coordinates() {
        let gpx = r#"<gpx><trk><trkseg><trkpt lat="abc" lon="2"/><trkpt lat="95" lon="2"/><trkpt lat="1" lon="2"/></trkseg></trk></gpx>"#;
        let track = Track::from_gpx("T", "t.gpx", gpx).unwrap();
        assert_eq!(track.segments(), &[vec![LatLng::new(1.0, 2.0)]]);
    }

    #[test]
    fn segments_stay_separate() {
        let gpx = r#"<gpx>
  <trk><trkseg><trkpt lat="0" lon="0"/><trkpt lat="0" lon="0.01"/></trkseg>
       <trkseg><trkpt lat="1" lon="1"/><trkpt lat="1" lon="1.01"/></trkseg></trk>
  <trk><trkseg/><trkseg><trkpt lat="2" lon="2"/></trkseg></trk>
</gpx>"#;
        let track = Track::from_gpx("Paused", "p.gpx", gpx).unwrap();
        assert_eq!(track.segments().len(), 3);
        assert_eq!(track.points().len(), 5);

        // The ~157 km jump between segments is not part of the distance
        let expected = path_distance(&track.segments()[0]) + path_distance(&track.segments()[1]);
        assert!((track.distance_m() - expected).abs() < 1e-6);
        assert!(track.distance_m() < 3_000.0);
        assert_eq!(track.bounds().north_east, LatLng::new(2.0, 2.0));
    }

    #[test]
    fn timestamps_without_offset_are_utc() {
        assert_eq!(parse_timestamp("2025-06-01T08:00:00.123456"), Some("2025-06-01T08:00:00.123456Z".parse().unwrap()));
        assert_eq!(parse_timestamp(" 2025-06-01T08:00:00+02:00 "), Some("2025-06-01T06:00:00Z".parse().unwrap()));
        assert_eq!(parse_timestamp("yesterday"), None);
    }
}
