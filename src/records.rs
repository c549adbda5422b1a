use crate::domain::FundRecord;

pub const FIELD_DELIMITER: char = ';';
pub const FIELD_COUNT: usize = 9;

#[derive(Debug, Clone, Default)]
pub struct ParsedReport {
    pub records: Vec<FundRecord>,
    pub short_lines: usize,
}

pub fn parse_report(text: &str) -> ParsedReport {
    let mut report = ParsedReport::default();
    for line in text.split('\n') {
        if line.trim().is_empty() {
            continue;
        }
        let (record, complete) = parse_line(line);
        if !complete {
            report.short_lines += 1;
        }
        report.records.push(record);
    }
    if report.short_lines > 0 {
        tracing::warn!(
            short_lines = report.short_lines,
            "some report lines had missing columns"
        );
    }
    report
}

pub fn parse_records(text: &str) -> Vec<FundRecord> {
    parse_report(text).records
}

/// Maps one `;`-separated line onto a record by column position.
///
/// Missing columns become empty strings; the flag is `false` when that happened.
pub fn parse_line(line: &str) -> (FundRecord, bool) {
    let mut columns = line.split(FIELD_DELIMITER).map(clean_field);
    let mut present = 0usize;
    let mut next = || match columns.next() {
        Some(value) => {
            present += 1;
            value
        }
        None => String::new(),
    };

    // TP_FUNDO;CNPJ_FUNDO;DT_COMPTC;VL_TOTAL;VL_QUOTA;VL_PATRIM_LIQ;CAPTC_DIA;RESG_DIA;NR_COTST
    let record = FundRecord {
        fund_type: next(),
        cnpj: next(),
        date: next(),
        total_volume: next(),
        quota_value: next(),
        net_asset_volume: next(),
        daily_fundraising: next(),
        daily_withdraw: next(),
        number_of_shareholders: next(),
    };
    (record, present == FIELD_COUNT)
}

fn clean_field(raw: &str) -> String {
    raw.chars().filter(|ch| !ch.is_control()).collect::<String>().trim().to_string()
}
