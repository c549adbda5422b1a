use crate::domain::{Cnpj, FundRecord};

/// Latest record per requested CNPJ, in request order; every record when `cnpjs` is empty.
pub fn select_latest<S: AsRef<str>>(records: &[FundRecord], cnpjs: &[S]) -> Vec<FundRecord> {
    if cnpjs.is_empty() {
        return records.to_vec();
    }

    let mut selected = Vec::with_capacity(cnpjs.len());
    for requested in cnpjs {
        let cnpj = Cnpj::normalize(requested.as_ref());
        match latest_for(records, &cnpj) {
            Some(record) => selected.push(record.clone()),
            None => tracing::debug!(%cnpj, "no record for CNPJ"),
        }
    }
    selected
}

pub fn latest_for<'a>(records: &'a [FundRecord], cnpj: &Cnpj) -> Option<&'a FundRecord> {
    if !cnpj.is_canonical() {
        return None;
    }
    records
        .iter()
        .rev()
        .find(|record| record.cnpj.contains(cnpj.as_str()))
}
