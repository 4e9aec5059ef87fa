// src/extract/mod.rs

pub mod headers;
pub mod table;
pub mod text;

pub use headers::{extract_headers, validate_headers, HeaderMismatch, HeaderReport};
pub use table::{walk, walk_table, HeaderDataMap, RawCell, TableWalker};
pub use text::{clean, split_list};

use scraper::Html;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::record::{self, Record, RecordError};

/// Why a page produced no record.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Rejection {
    #[error("header mismatch: {0}")]
    HeaderMismatch(#[from] HeaderMismatch),
    #[error("detail table not found")]
    TableNotFound,
    #[error("no header/data pairs parsed")]
    EmptyData,
    #[error("validation failed: {0}")]
    Validation(#[from] RecordError),
}

impl Rejection {
    /// Short classification used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Rejection::HeaderMismatch(_) => "header-fatal",
            Rejection::TableNotFound => "table-missing",
            Rejection::EmptyData => "empty-data",
            Rejection::Validation(_) => "validation-failure",
        }
    }

    /// Pages without a syllabus table (index/listing pages) are expected, not errors.
    pub fn is_not_a_syllabus(&self) -> bool {
        matches!(self, Rejection::TableNotFound | Rejection::EmptyData)
    }
}

/// Run the whole pipeline over one page:
///  1) parse HTML
///  2) extract + validate headers
///  3) walk the detail table
///  4) build the record
pub fn extract(html: &str, source_id: &str) -> Result<Record, Rejection> {
    let doc = Html::parse_document(html);

    let observed = extract_headers(&doc);
    validate_headers(&observed, source_id)?;

    let map = walk(&doc).ok_or(Rejection::TableNotFound)?;
    if map.is_empty() {
        return Err(Rejection::EmptyData);
    }

    Ok(record::build(&map, source_id)?)
}

/// Like [`extract`], but logs the rejection and returns `None` instead.
#[tracing::instrument(level = "debug", skip(html), fields(source = %source_id))]
pub fn parse(html: &str, source_id: &str) -> Option<Record> {
    match extract(html, source_id) {
        Ok(record) => {
            info!(source = %source_id, lecture_code = %record.lecture_code, "extracted");
            Some(record)
        }
        Err(rej) if rej.is_not_a_syllabus() => {
            warn!(source = %source_id, kind = rej.kind(), "skipping page: {}", rej);
            None
        }
        Err(rej) => {
            error!(source = %source_id, kind = rej.kind(), "rejected page: {}", rej);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FIELDS;
    use std::{
        io,
        sync::{Arc, Mutex},
    };
    use tracing_subscriber::{fmt::MakeWriter, EnvFilter, FmtSubscriber};

    const SAMPLE: &str = include_str!("../../tests/fixtures/html/small/2025_AA_10000100.html");
    const INDEX: &str = include_str!("../../tests/fixtures/html/small/index.html");

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,syllabus_harvester=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    /// Captures formatted log output for the duration of a closure.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;
        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
        let sink = Captured::default();
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::new("debug"))
            .with_ansi(false)
            .with_writer(sink.clone())
            .finish();
        let out = tracing::subscriber::with_default(subscriber, f);
        let text = String::from_utf8_lossy(&sink.0.lock().unwrap()).into_owned();
        (out, text)
    }

    #[test]
    fn sample_page_extracts() {
        init_test_logging();
        let rec = parse(SAMPLE, "AA10000100").expect("sample page should parse");
        assert_eq!(rec.year, "2025年度");
        assert_eq!(rec.lecture_code, "10000100");
        assert_eq!(rec.subject_name, "大学教育入門[1総総,1文,1経]");
        assert_eq!(rec.instructor_name, "林 光緒");
        assert_eq!(rec.campus, "東広島");
        assert_eq!(rec.term, "1年次生 前期 １ターム");
        assert_eq!(rec.lecture_type, "講義");
        assert_eq!(rec.lecture_type_detail, "対面, オンライン(オンデマンド型)");
        assert_eq!(rec.credits.get(), 2);
        assert_eq!(rec.language, "B : 日本語・英語");
        assert_eq!(rec.keywords, vec!["大学での学び", "持続可能性", "キャリア"]);
        assert_eq!(rec.media_equipment, vec!["テキスト", "配布資料", "moodle"]);
        assert_eq!(rec.learning_methods, vec!["ディスカッション", "グループワーク"]);
        assert!(rec.plan.contains("第1回 オリエンテーション 第2回"));
        assert_eq!(rec.other, "");
    }

    #[test]
    fn sample_record_has_exactly_the_schema_keys() {
        let rec = extract(SAMPLE, "AA10000100").unwrap();
        let keys: Vec<String> = rec.to_map().keys().cloned().collect();
        let expected: Vec<String> = FIELDS.iter().map(|f| f.key.to_string()).collect();
        assert_eq!(keys, expected);
    }

    #[test]
    fn parsing_is_idempotent() {
        let a = extract(SAMPLE, "AA10000100").unwrap();
        let b = extract(SAMPLE, "AA10000100").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_map(), b.to_map());
    }

    #[test]
    fn renamed_header_is_fatal() {
        let html = SAMPLE.replace(
            r#"<TH class="detail-head" align="center" width="150">年度</TH>"#,
            r#"<TH class="detail-head" align="center" width="150">間違った年度</TH>"#,
        );
        assert_ne!(html, SAMPLE);
        let err = extract(&html, "header_mismatch_test").unwrap_err();
        assert_eq!(err.kind(), "header-fatal");
        assert!(parse(&html, "header_mismatch_test").is_none());
    }

    #[test]
    fn missing_header_degrades_to_empty_field() {
        let html = SAMPLE.replace(
            r#"<TR><TH class="detail-head" align="center" width="150">開設期</TH><TD class="detail-data">1年次生&nbsp;&nbsp;&nbsp;前期&nbsp;&nbsp;&nbsp;１ターム</TD></TR>"#,
            "",
        );
        assert_ne!(html, SAMPLE);
        let doc = Html::parse_document(&html);
        let report = validate_headers(&extract_headers(&doc), "missing_term").unwrap();
        assert_eq!(report.missing.iter().copied().collect::<Vec<_>>(), vec!["開設期"]);

        let (rec, logs) = capture_logs(|| parse(&html, "missing_term"));
        let rec = rec.expect("record still built");
        assert_eq!(rec.term, "");
        assert_eq!(rec.lecture_code, "10000100");
        assert!(logs.contains("expected headers missing"));
        assert!(logs.contains("WARN"));
    }

    #[test]
    fn fractional_credits_reject_page() {
        let html = SAMPLE.replace(
            r#"<TD class="detail-data">2.0</TD>"#,
            r#"<TD class="detail-data">1.5</TD>"#,
        );
        assert_ne!(html, SAMPLE);
        assert_eq!(
            extract(&html, "fractional").unwrap_err(),
            Rejection::Validation(RecordError::FractionalCredits(1.5))
        );
        assert!(parse(&html, "fractional").is_none());
    }

    #[test]
    fn index_page_is_skipped_without_errors() {
        let (rec, logs) = capture_logs(|| parse(INDEX, "index_test"));
        assert!(rec.is_none());
        assert!(!logs.contains("ERROR"), "unexpected error log:\n{}", logs);
        assert!(logs.contains("skipping page"));
    }

    const HEADERLESS_TABLE: &str = "<html><body><blockquote>\
        <table><tr><td>シラバス</td></tr></table>\
        <table><tr><td>no headers</td></tr><tr><td colspan=\"2\">still none</td></tr></table>\
        </blockquote></body></html>";

    #[test]
    fn table_without_pairs_is_empty_data() {
        assert_eq!(extract(HEADERLESS_TABLE, "headerless"), Err(Rejection::EmptyData));
        let (rec, logs) = capture_logs(|| parse(HEADERLESS_TABLE, "headerless"));
        assert!(rec.is_none());
        assert!(!logs.contains("ERROR"), "unexpected error log:\n{}", logs);
        assert!(logs.contains("empty-data"));
    }

    #[test]
    fn overflowing_colspan_is_rejected_not_panicking() {
        let html = "<html><body><blockquote>\
            <table><tr><td>nav</td></tr></table>\
            <table><tr><th class=\"detail-head\">年度</th>\
            <td colspan=\"18446744073709551615\">2025</td></tr></table>\
            </blockquote></body></html>";
        let result = std::panic::catch_unwind(|| parse(html, "huge_colspan"));
        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn non_syllabus_html_is_none() {
        let html = "<html><body><p>This is not a syllabus table.</p></body></html>";
        assert_eq!(extract(html, "invalid").unwrap_err(), Rejection::TableNotFound);
        assert!(parse(html, "invalid").is_none());
    }
}
