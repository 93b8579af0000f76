use tabled::builder::Builder;
use tabled::settings::Style;

use crate::route::{Fix, RouteRecord, RouteSummary};

/// Shown where a value does not apply.
pub const NOT_APPLICABLE: &str = "----";

const TIME_FORMAT: &str = "%a %d-%b-%Y %H:%M";

fn or_dash(value: Option<String>) -> String {
    value.unwrap_or_else(|| NOT_APPLICABLE.to_string())
}

pub fn summary_table(summaries: &[RouteSummary]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Name", "Type", "Start", "End", "Departs", "Arrives", "Hours", "Distance"]);

    for s in summaries {
        builder.push_record([
            s.name.clone(),
            s.mode.to_string(),
            s.start.clone(),
            s.end.clone(),
            s.start_time.format(TIME_FORMAT).to_string(),
            s.end_time.format(TIME_FORMAT).to_string(),
            format!("{:.1}", s.elapsed_hours),
            format!("{:.1}", s.distance),
        ]);
    }

    builder.build().with(Style::modern()).to_string()
}

fn fix_row(fix: &Fix) -> [String; 10] {
    [
        fix.name.clone(),
        format!("{:8.4}", fix.position.lat),
        format!("{:9.4}", fix.position.lon),
        fix.time.format(TIME_FORMAT).to_string(),
        or_dash(fix.leg_distance.map(|d| format!("{:.1}", d))),
        or_dash(fix.leg_bearing.map(|b| format!("{:03.0}", b))),
        or_dash(fix.course.map(|c| format!("{:03.0}", c))),
        format!("{:5.1}", fix.speed_over_ground),
        or_dash(fix.current.map(|c| format!("{:03.0}", c.set))),
        or_dash(fix.current.map(|c| format!("{:.1}", c.rate))),
    ]
}

/// One row per fix: distance and bearing run from the previous fix, then
/// course to steer and speed over ground leaving it.
pub fn fix_table(record: &RouteRecord) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Name", "Lat", "Lon", "Time", "Dist", "Brg", "CTS", "SOG", "Set", "Rate"]);
    for fix in record.fixes() {
        builder.push_record(fix_row(fix));
    }

    let table = builder.build().with(Style::modern()).to_string();
    format!(
        "{} ({}) {} -> {}, {:.1} NM in {:.1} h\n{}",
        record.name(),
        record.mode(),
        record.start(),
        record.end(),
        record.distance(),
        record.elapsed_hours(),
        table
    )
}
