use std::io::Read;

use flate2::read::GzDecoder;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

use crate::error::CvmError;
use crate::transport::CvmTransport;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub href: Option<String>,
}

/// A parsed index page that can expose its listing container.
///
/// Entries come back in page order, which is publication order: the last
/// entry is the newest file.
pub trait ListingDocument {
    /// `None` when the page has no listing container at all.
    fn entries(&self) -> Option<Vec<ListingEntry>>;
}

#[derive(Debug)]
pub struct HtmlListing {
    document: Html,
    container: Selector,
}

impl HtmlListing {
    pub fn parse(html: &str, selector: &str) -> Result<Self, CvmError> {
        let container = Selector::parse(selector)
            .map_err(|_| CvmError::InvalidSelector(selector.to_string()))?;
        Ok(Self {
            document: Html::parse_document(html),
            container,
        })
    }
}

impl ListingDocument for HtmlListing {
    fn entries(&self) -> Option<Vec<ListingEntry>> {
        let container = self.document.select(&self.container).next()?;
        let entries = container
            .children()
            .filter_map(ElementRef::wrap)
            .map(|element| ListingEntry {
                href: element
                    .value()
                    .attr("href")
                    .map(str::trim)
                    .filter(|href| !href.is_empty())
                    .map(str::to_string),
            })
            .collect();
        Some(entries)
    }
}

pub fn latest_href(document: &dyn ListingDocument) -> Result<String, CvmError> {
    let entries = document.entries().ok_or(CvmError::MalformedIndex)?;
    let newest = entries.last().ok_or(CvmError::EmptyIndex)?;
    newest.href.clone().ok_or(CvmError::MissingLink)
}

pub fn decode_index_payload(bytes: &[u8]) -> Result<String, CvmError> {
    if bytes.starts_with(&GZIP_MAGIC) {
        let mut decoder = GzDecoder::new(bytes);
        let mut raw = Vec::new();
        decoder
            .read_to_end(&mut raw)
            .map_err(|err| CvmError::Decompress(err.to_string()))?;
        return Ok(String::from_utf8_lossy(&raw).into_owned());
    }
    Ok(String::from_utf8_lossy(bytes).into_owned())
}

// The index URL names the directory holding the archives, slash or not.
pub fn join_archive_url(index_url: &str, href: &str) -> Result<String, CvmError> {
    let mut base =
        Url::parse(index_url).map_err(|err| CvmError::InvalidUrl(format!("{index_url}: {err}")))?;
    if !base.path().ends_with('/') {
        let directory = format!("{}/", base.path());
        base.set_path(&directory);
    }
    let joined = base
        .join(href)
        .map_err(|err| CvmError::InvalidUrl(format!("{href}: {err}")))?;
    Ok(joined.to_string())
}

pub struct IndexResolver<'a, T: CvmTransport + ?Sized> {
    transport: &'a T,
    index_url: &'a str,
    selector: &'a str,
}

impl<'a, T: CvmTransport + ?Sized> IndexResolver<'a, T> {
    pub fn new(transport: &'a T, index_url: &'a str, selector: &'a str) -> Self {
        Self {
            transport,
            index_url,
            selector,
        }
    }

    pub fn resolve(&self) -> Result<String, CvmError> {
        let payload = self.transport.get_bytes(self.index_url)?;
        let html = decode_index_payload(&payload)?;
        let listing = HtmlListing::parse(&html, self.selector)?;
        let href = latest_href(&listing)?;
        let url = join_archive_url(self.index_url, &href)?;
        tracing::debug!(%url, "resolved newest archive");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use assert_matches::assert_matches;
    use flate2::Compression;
    use flate2::write::GzEncoder;

    use super::*;
    use crate::config::DEFAULT_INDEX_SELECTOR;

    const PAGE: &str = r#"<html><body><div class="wrapper"><h1>Index</h1><pre>
<a href="../">../</a>
<a href="inf_diario_fi_202210.zip">inf_diario_fi_202210.zip</a>   01-Nov-2022 09:12  45M
<a href="inf_diario_fi_202211.zip">inf_diario_fi_202211.zip</a>   02-Nov-2022 09:10  3M
</pre></div></body></html>"#;

    #[test]
    fn picks_last_entry() {
        let listing = HtmlListing::parse(PAGE, DEFAULT_INDEX_SELECTOR).unwrap();
        assert_eq!(listing.entries().unwrap().len(), 3);
        assert_eq!(latest_href(&listing).unwrap(), "inf_diario_fi_202211.zip");
    }

    #[test]
    fn missing_container() {
        let listing =
            HtmlListing::parse("<html><body><pre></pre></body></html>", DEFAULT_INDEX_SELECTOR)
                .unwrap();
        assert_matches!(latest_href(&listing), Err(CvmError::MalformedIndex));
    }

    #[test]
    fn empty_container() {
        let html = r#"<html><body><div class="wrapper"><pre>
no files yet
</pre></div></body></html>"#;
        let listing = HtmlListing::parse(html, DEFAULT_INDEX_SELECTOR).unwrap();
        assert_matches!(latest_href(&listing), Err(CvmError::EmptyIndex));
    }

    #[test]
    fn newest_entry_without_href() {
        let html = r#"<html><body><div class="wrapper"><pre>
<a href="a.zip">a.zip</a>
<a>b.zip</a>
</pre></div></body></html>"#;
        let listing = HtmlListing::parse(html, DEFAULT_INDEX_SELECTOR).unwrap();
        assert_matches!(latest_href(&listing), Err(CvmError::MissingLink));
    }

    #[test]
    fn gzip_and_plain_payloads() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(PAGE.as_bytes()).unwrap();
        let gz = encoder.finish().unwrap();

        assert_eq!(decode_index_payload(&gz).unwrap(), PAGE);
        assert_eq!(decode_index_payload(PAGE.as_bytes()).unwrap(), PAGE);
    }

    #[test]
    fn truncated_gzip_is_rejected() {
        let err = decode_index_payload(&[0x1f, 0x8b, 0x08]).unwrap_err();
        assert_matches!(err, CvmError::Decompress(_));
    }

    #[test]
    fn joins_relative_and_absolute_links() {
        let base = "http://dados.example.test/FI/DOC/INF_DIARIO/DADOS/";
        assert_eq!(
            join_archive_url(base, "inf_diario_fi_202211.zip").unwrap(),
            "http://dados.example.test/FI/DOC/INF_DIARIO/DADOS/inf_diario_fi_202211.zip"
        );
        assert_eq!(
            join_archive_url(base, "https://mirror.example.test/x.zip").unwrap(),
            "https://mirror.example.test/x.zip"
        );
    }

    #[test]
    fn index_url_without_slash_joins_inside_it() {
        assert_eq!(
            join_archive_url(
                "http://dados.example.test/FI/DOC/INF_DIARIO/DADOS",
                "inf_diario_fi_202211.zip"
            )
            .unwrap(),
            "http://dados.example.test/FI/DOC/INF_DIARIO/DADOS/inf_diario_fi_202211.zip"
        );
        assert_eq!(
            join_archive_url("http://dados.example.test/DADOS?dir=1", "a.zip").unwrap(),
            "http://dados.example.test/DADOS/a.zip"
        );
    }

    #[test]
    fn invalid_selector() {
        assert_matches!(
            HtmlListing::parse(PAGE, "div >>> ["),
            Err(CvmError::InvalidSelector(_))
        );
    }
}
