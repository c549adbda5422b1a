use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

use crate::app::DailyInfo;
use crate::config::ResolvedConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_daily_info(result: &DailyInfo) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_config(config: &ResolvedConfig) -> io::Result<()> {
        Self::print_json(config)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

pub struct TableOutput;

impl TableOutput {
    const HEADERS: [&'static str; 9] = [
        "type",
        "cnpj",
        "date",
        "total",
        "quota",
        "net_assets",
        "inflow",
        "outflow",
        "holders",
    ];

    pub fn print_daily_info(result: &DailyInfo) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        Self::render(&mut stdout, result)
    }

    pub fn render<W: Write>(out: &mut W, result: &DailyInfo) -> io::Result<()> {
        let rows: Vec<[&str; 9]> = result.records.iter().map(|r| r.fields()).collect();
        let mut widths = Self::HEADERS.map(str::len);
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.len());
            }
        }

        write_row(out, &Self::HEADERS, &widths)?;
        for row in &rows {
            write_row(out, row, &widths)?;
        }
        writeln!(out, "source: {}", result.source_url)
    }
}

fn write_row<W: Write>(out: &mut W, cells: &[&str; 9], widths: &[usize; 9]) -> io::Result<()> {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(out, "{}", line.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::parse_records;

    #[test]
    fn table_has_header_and_rows() {
        let result = DailyInfo {
            source_url: "http://example.test/inf.zip".to_string(),
            fetched_at: "2022-11-02T00:00:00+00:00".to_string(),
            records: parse_records("FI;00.017.024/0001-53;2022-11-01;1;2;3;4;5;6\n"),
        };
        let mut buf = Vec::new();
        TableOutput::render(&mut buf, &result).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("type"));
        assert!(lines[1].contains("00.017.024/0001-53"));
        assert_eq!(lines[2], "source: http://example.test/inf.zip");
    }
}
