//! Output formats for decoded tables.

use std::io::{self, Write};

use chrono::NaiveDateTime;
use serde::Serialize;
use uniarch_core::Table;

use crate::run::Decoded;

/// Timestamp layout used in CSV and series output
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Header line `timestamp,<columns>`, then one line per row.
pub fn write_csv(out: &mut dyn Write, table: &Table) -> io::Result<()> {
    let header: Vec<String> = std::iter::once("timestamp".to_string())
        .chain(table.columns().iter().map(|c| csv_field(&c.display_name())))
        .collect();
    writeln!(out, "{}", header.join(","))?;

    for (ts, row) in table.timestamps().iter().zip(table.rows()) {
        write!(out, "{}", ts.format(TIMESTAMP_FORMAT))?;
        for value in row {
            write!(out, ",{}", value)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn write_json(out: &mut dyn Write, table: &Table) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, table)?;
    writeln!(out)
}

#[derive(Serialize)]
struct Point {
    x: String,
    y: f32,
}

#[derive(Serialize)]
struct Series {
    name: String,
    points: Vec<Point>,
}

fn series(table: &Table) -> Vec<Series> {
    table
        .columns()
        .iter()
        .enumerate()
        .map(|(i, column)| Series {
            name: column.display_name(),
            points: table
                .series(i)
                .into_iter()
                .flatten()
                .map(|(ts, y)| Point {
                    x: ts.format(TIMESTAMP_FORMAT).to_string(),
                    y,
                })
                .collect(),
        })
        .collect()
}

/// One `{name, points: [{x, y}]}` object per column, ready for charting.
/// Non-finite values come out as `null`.
pub fn write_series(out: &mut dyn Write, table: &Table) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, &series(table))?;
    writeln!(out)
}

struct Stats {
    min: f32,
    max: f32,
    mean: f64,
    non_finite: usize,
}

fn column_stats(values: impl Iterator<Item = f32>) -> Stats {
    let mut stats = Stats {
        min: f32::INFINITY,
        max: f32::NEG_INFINITY,
        mean: 0.0,
        non_finite: 0,
    };
    let mut sum = 0f64;
    let mut count = 0usize;
    for v in values {
        if !v.is_finite() {
            stats.non_finite += 1;
            continue;
        }
        stats.min = stats.min.min(v);
        stats.max = stats.max.max(v);
        sum += f64::from(v);
        count += 1;
    }
    if count > 0 {
        stats.mean = sum / count as f64;
    }
    stats
}

fn time_range(timestamps: &[NaiveDateTime]) -> String {
    match (timestamps.first(), timestamps.last()) {
        (Some(first), Some(last)) => format!(
            "{} .. {}",
            first.format(TIMESTAMP_FORMAT),
            last.format(TIMESTAMP_FORMAT)
        ),
        _ => "-".to_string(),
    }
}

/// Short human-readable report of how the archive was decoded.
pub fn write_summary(out: &mut dyn Write, decoded: &Decoded) -> io::Result<()> {
    let table = &decoded.table;
    let strategy = decoded
        .strategy
        .map(|s| s.to_string())
        .unwrap_or_else(|| "fixed (--width)".to_string());

    writeln!(out, "File size:  {} bytes", decoded.bytes)?;
    writeln!(out, "Offset:     {} bytes", decoded.offset)?;
    writeln!(out, "Strategy:   {}", strategy)?;
    writeln!(out, "Row width:  {} fields", decoded.width)?;
    writeln!(out, "Rows:       {}", table.row_count())?;
    writeln!(out, "Columns:    {}", table.column_count())?;
    writeln!(out, "Time range: {}", time_range(table.timestamps()))?;

    if table.is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    for (i, column) in table.columns().iter().enumerate() {
        let stats = column_stats(table.series(i).into_iter().flatten().map(|(_, v)| v));
        write!(
            out,
            "{:>4}  {:<24} min {:<12} max {:<12} mean {:.3}",
            i + 1,
            column.display_name(),
            stats.min,
            stats.max,
            stats.mean
        )?;
        if stats.non_finite > 0 {
            write!(out, "  ({} non-finite)", stats.non_finite)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uniarch_core::table::build_columns;
    use uniarch_core::{ColumnDefinition, InferenceStrategy};

    fn ts(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, minute, 0)
            .unwrap()
    }

    fn table() -> Table {
        let defs = [ColumnDefinition::new("U, phase A", "V")];
        Table::new(
            vec![ts(0), ts(1)],
            build_columns(2, Some(&defs)),
            vec![vec![230.5, 1.0], vec![f32::NAN, 2.0]],
        )
        .unwrap()
    }

    fn render(f: impl Fn(&mut dyn Write) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_csv() {
        let text = render(|out| write_csv(out, &table()));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "timestamp,\"U, phase A [V]\",Value2");
        assert_eq!(lines[1], "2024-01-01T00:00:00.000,230.5,1");
        assert_eq!(lines[2], "2024-01-01T00:01:00.000,NaN,2");
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_series() {
        let text = render(|out| write_series(out, &table()));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["name"], "U, phase A [V]");
        assert_eq!(value[0]["points"][0]["x"], "2024-01-01T00:00:00.000");
        assert_eq!(value[0]["points"][0]["y"], 230.5);
        assert!(value[0]["points"][1]["y"].is_null());
        assert_eq!(value[1]["points"][1]["y"], 2.0);
    }

    #[test]
    fn test_json() {
        let text = render(|out| write_json(out, &table()));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["columns"][1]["name"], "Value2");
        assert_eq!(value["rows"][0][1], 1.0);
        assert_eq!(value["timestamps"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_summary() {
        let decoded = Decoded {
            strategy: Some(InferenceStrategy::MarkerPeriodicity),
            width: 4,
            offset: 4,
            bytes: 36,
            table: table(),
        };
        let text = render(|out| write_summary(out, &decoded));
        assert!(text.contains("Strategy:   marker-periodicity"));
        assert!(text.contains("Rows:       2"));
        assert!(text.contains("(1 non-finite)"));
        assert!(text.contains("Time range: 2024-01-01T00:00:00.000 .. 2024-01-01T00:01:00.000"));
    }

    #[test]
    fn test_column_stats() {
        let stats = column_stats([1.0, 3.0, f32::INFINITY].into_iter());
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 3.0);
        assert_eq!(stats.mean, 2.0);
        assert_eq!(stats.non_finite, 1);
    }
}
