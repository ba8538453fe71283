//! Naver News adapter.
//!
//! Search results come from the portal's news tab, one day at a time. Each
//! result that is syndicated on Naver's own article host carries a
//! `네이버뉴스` link; those are the links collected. Sports articles live on a
//! separate host with a different layout and are skipped.
//!
//! # URL Pattern
//!
//! ```text
//! https://search.naver.com/search.naver?where=news&sm=tab_jum&query=<kw>
//!     &ds=2023.07.30&de=2023.07.30&start=11&nso=so%3Ar%2Cp%3Afrom20230730to20230730
//! ```

use super::NewsSite;
use crate::error::CrawlError;
use crate::fetcher::{Document, element_text};
use crate::models::{ArticleRecord, QUERY_DATE_FORMAT};
use crate::utils::{normalize_body_text, reformat_timestamp};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use scraper::Selector;
use tracing::debug;
use url::Url;

const SEARCH_BASE: &str = "https://search.naver.com/search.naver";
const NO_RESULTS_MARKER: &str = "검색결과가 없습니다";
const PORTAL_LINK_LABEL: &str = "네이버뉴스";
const SPORTS_MARKER: &str = "sports";

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

static ANCHOR: Lazy<Selector> = Lazy::new(|| selector("a"));
static NEXT_PAGE: Lazy<Selector> =
    Lazy::new(|| selector("#main_pack > div.api_sc_page_wrap > div > a.btn_next"));
static BODY: Lazy<Selector> = Lazy::new(|| selector("#newsct_article"));
static TITLE: Lazy<Selector> = Lazy::new(|| {
    selector("#ct > div.media_end_head.go_trans > div.media_end_head_title > h2")
});
static MEDIA_LOGO: Lazy<Selector> = Lazy::new(|| {
    selector(
        "#ct > div.media_end_head.go_trans > div.media_end_head_top > a > \
         img.media_end_head_top_logo_img.light_type",
    )
});
static TIMESTAMP: Lazy<Selector> = Lazy::new(|| {
    selector(
        "#ct > div.media_end_head.go_trans > div.media_end_head_info.nv_notrans > \
         div.media_end_head_info_datestamp > div:nth-child(1) > span",
    )
});

/// Layout adapter for `search.naver.com` and `n.news.naver.com`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaverNews;

impl NewsSite for NaverNews {
    fn search_url(&self, keyword: &str, day: NaiveDate, page: u32) -> String {
        let dotted = day.format(QUERY_DATE_FORMAT).to_string();
        let compact = day.format("%Y%m%d").to_string();
        let start = page * 10 + 1;
        format!(
            "{SEARCH_BASE}?where=news&sm=tab_jum&query={}&ds={dotted}&de={dotted}\
             &start={start}&nso=so%3Ar%2Cp%3Afrom{compact}to{compact}",
            urlencoding::encode(keyword)
        )
    }

    fn is_empty_results(&self, doc: &Document) -> bool {
        doc.contains_text(NO_RESULTS_MARKER)
    }

    fn article_links(&self, doc: &Document) -> Vec<String> {
        let mut links = Vec::new();
        for anchor in doc.select_all(&ANCHOR) {
            if element_text(&anchor) != PORTAL_LINK_LABEL {
                continue;
            }
            let Some(href) = anchor.value().attr("href") else {
                debug!("Portal link without href; skipping");
                continue;
            };
            if href.contains(SPORTS_MARKER) {
                continue;
            }
            match resolve(href) {
                Some(url) => links.push(url),
                None => debug!(%href, "Unresolvable portal link; skipping"),
            }
        }
        links
    }

    fn has_next_page(&self, doc: &Document) -> bool {
        match doc.select_one(&NEXT_PAGE) {
            Some(control) => control.value().attr("aria-disabled") != Some("true"),
            None => false,
        }
    }

    fn parse_article(&self, url: &str, doc: &Document) -> Result<Option<ArticleRecord>, CrawlError> {
        let Some(body) = doc.select_one(&BODY) else {
            return Ok(None);
        };
        let text = normalize_body_text(&element_text(&body));

        let missing = |field: &'static str| CrawlError::MissingField {
            url: url.to_string(),
            field,
        };

        let title = doc
            .select_one(&TITLE)
            .map(|t| element_text(&t))
            .ok_or_else(|| missing("title"))?;
        let media = doc
            .select_one(&MEDIA_LOGO)
            .and_then(|img| img.value().attr("title"))
            .ok_or_else(|| missing("media"))?
            .to_string();
        let raw_date = doc
            .select_one(&TIMESTAMP)
            .and_then(|span| span.value().attr("data-date-time"))
            .ok_or_else(|| missing("date"))?;
        let date = reformat_timestamp(raw_date).ok_or_else(|| CrawlError::InvalidTimestamp {
            url: url.to_string(),
            value: raw_date.to_string(),
        })?;

        Ok(Some(ArticleRecord {
            url: url.to_string(),
            text,
            title,
            media,
            date,
        }))
    }
}

/// Resolve a result link against the search host.
///
/// Absolute links are kept byte for byte so that deduplication sees the
/// portal's own spelling. Only http(s) targets are accepted.
fn resolve(href: &str) -> Option<String> {
    match Url::parse(href) {
        Ok(absolute) => is_web(&absolute).then(|| href.to_string()),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let joined = Url::parse(SEARCH_BASE).ok()?.join(href).ok()?;
            is_web(&joined).then(|| joined.to_string())
        }
        Err(_) => None,
    }
}

fn is_web(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Minimal pages with the same structure as the live portal.

    pub fn results_page(links: &[(&str, &str)], next_disabled: Option<bool>) -> String {
        let anchors: String = links
            .iter()
            .map(|(text, href)| format!("<div class=\"info\"><a href=\"{href}\">{text}</a></div>"))
            .collect();
        let next = match next_disabled {
            Some(disabled) => format!(
                "<div class=\"api_sc_page_wrap\"><div class=\"sc_page\">\
                 <a class=\"btn_prev\" aria-disabled=\"true\">이전페이지</a>\
                 <a class=\"btn_next\" aria-disabled=\"{disabled}\">다음페이지</a>\
                 </div></div>"
            ),
            None => String::new(),
        };
        format!(
            "<html><body><div id=\"main_pack\"><ul class=\"list_news\">{anchors}</ul>{next}</div></body></html>"
        )
    }

    pub fn no_results_page() -> String {
        "<html><body><div id=\"main_pack\"><div class=\"not_found02\">\
         <p>'test'에 대한 검색결과가 없습니다.</p></div></div></body></html>"
            .to_string()
    }

    pub struct ArticleParts<'a> {
        pub body: Option<&'a str>,
        pub title: Option<&'a str>,
        pub media: Option<&'a str>,
        pub timestamp: Option<&'a str>,
    }

    impl Default for ArticleParts<'_> {
        fn default() -> Self {
            Self {
                body: Some("\n\t 첫 문단입니다.\n\t두 번째   문단입니다. \n"),
                title: Some("테스트 기사 제목"),
                media: Some("연합뉴스"),
                timestamp: Some("2023-07-30 14:22:05"),
            }
        }
    }

    pub fn article_page(parts: ArticleParts<'_>) -> String {
        let title = parts
            .title
            .map(|t| format!("<div class=\"media_end_head_title\"><h2 id=\"title_area\"><span>{t}</span></h2></div>"))
            .unwrap_or_default();
        let media = parts
            .media
            .map(|m| {
                format!(
                    "<div class=\"media_end_head_top\"><a href=\"https://media.naver.com/press/001\">\
                     <img class=\"media_end_head_top_logo_img light_type\" title=\"{m}\" alt=\"{m}\"></a></div>"
                )
            })
            .unwrap_or_default();
        let timestamp = parts
            .timestamp
            .map(|ts| {
                format!(
                    "<div class=\"media_end_head_info nv_notrans\"><div class=\"media_end_head_info_datestamp\">\
                     <div class=\"media_end_head_info_datestamp_bunch\"><em>입력</em>\
                     <span class=\"_ARTICLE_DATE_TIME\" data-date-time=\"{ts}\">2023.07.30. 오후 2:22</span></div>\
                     </div></div>"
                )
            })
            .unwrap_or_default();
        let body = parts
            .body
            .map(|b| format!("<div id=\"dic_area\"><article id=\"newsct_article\">{b}</article></div>"))
            .unwrap_or_default();
        format!(
            "<html><body><div id=\"ct\"><div class=\"media_end_head go_trans\">{media}{title}{timestamp}</div>{body}</div></body></html>"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{ArticleParts, article_page, no_results_page, results_page};
    use super::*;

    const ARTICLE: &str = "https://n.news.naver.com/article/001/000123";

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_search_url_parameters() {
        let url = NaverNews.search_url("test", day("2023-07-30"), 0);
        assert_eq!(
            url,
            "https://search.naver.com/search.naver?where=news&sm=tab_jum&query=test\
             &ds=2023.07.30&de=2023.07.30&start=1&nso=so%3Ar%2Cp%3Afrom20230730to20230730"
        );
        let third = NaverNews.search_url("test", day("2023-07-30"), 2);
        assert!(third.contains("&start=21&"));
    }

    #[test]
    fn test_search_url_encodes_keyword() {
        let url = NaverNews.search_url("마이데이터 규제", day("2023-01-01"), 0);
        assert!(url.contains("query=%EB%A7%88%EC%9D%B4%EB%8D%B0%EC%9D%B4%ED%84%B0%20%EA%B7%9C%EC%A0%9C&"));
    }

    #[test]
    fn test_portal_link_is_included() {
        let doc = Document::parse(&results_page(&[("네이버뉴스", ARTICLE)], Some(false)));
        assert_eq!(NaverNews.article_links(&doc), vec![ARTICLE.to_string()]);
    }

    #[test]
    fn test_sports_link_is_excluded() {
        let doc = Document::parse(&results_page(
            &[("네이버뉴스", "https://sports.news.naver.com/news?oid=001&aid=000123")],
            Some(false),
        ));
        assert!(NaverNews.article_links(&doc).is_empty());
    }

    #[test]
    fn test_other_anchor_text_is_excluded() {
        let doc = Document::parse(&results_page(
            &[
                ("연합뉴스", "https://www.yna.co.kr/view/AKR1"),
                ("네이버뉴스 ", ARTICLE),
                ("네이버", ARTICLE),
            ],
            Some(false),
        ));
        assert!(NaverNews.article_links(&doc).is_empty());
    }

    #[test]
    fn test_link_qualification_is_pure() {
        let html = results_page(
            &[
                ("네이버뉴스", ARTICLE),
                ("네이버뉴스", "https://n.news.naver.com/article/023/000456"),
                ("네이버뉴스", "https://sports.news.naver.com/x"),
            ],
            None,
        );
        let first = NaverNews.article_links(&Document::parse(&html));
        let second = NaverNews.article_links(&Document::parse(&html));
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_absolute_links_are_kept_verbatim() {
        let raw = "HTTPS://N.News.Naver.com/article/001/1?a=b c";
        let doc = Document::parse(&results_page(&[("네이버뉴스", raw)], None));
        assert_eq!(NaverNews.article_links(&doc), vec![raw.to_string()]);
    }

    #[test]
    fn test_relative_links_resolve_against_search_host() {
        let doc = Document::parse(&results_page(&[("네이버뉴스", "/p/crd/rd?u=1")], None));
        assert_eq!(
            NaverNews.article_links(&doc),
            vec!["https://search.naver.com/p/crd/rd?u=1".to_string()]
        );
    }

    #[test]
    fn test_non_web_schemes_are_dropped() {
        let doc = Document::parse(&results_page(
            &[
                ("네이버뉴스", "javascript:void(0)"),
                ("네이버뉴스", "mailto:desk@example.com"),
                ("네이버뉴스", ARTICLE),
            ],
            None,
        ));
        assert_eq!(NaverNews.article_links(&doc), vec![ARTICLE.to_string()]);
    }

    #[test]
    fn test_title_text_is_not_trimmed() {
        let doc = Document::parse(&article_page(ArticleParts {
            title: Some(" 공백이 있는 제목 "),
            ..Default::default()
        }));
        let record = NaverNews.parse_article(ARTICLE, &doc).unwrap().unwrap();
        assert_eq!(record.title, " 공백이 있는 제목 ");
    }

    #[test]
    fn test_no_results_marker() {
        assert!(NaverNews.is_empty_results(&Document::parse(&no_results_page())));
        assert!(!NaverNews.is_empty_results(&Document::parse(&results_page(&[], Some(false)))));
    }

    #[test]
    fn test_next_page_control() {
        let enabled = Document::parse(&results_page(&[], Some(false)));
        let disabled = Document::parse(&results_page(&[], Some(true)));
        let absent = Document::parse(&results_page(&[], None));
        assert!(NaverNews.has_next_page(&enabled));
        assert!(!NaverNews.has_next_page(&disabled));
        assert!(!NaverNews.has_next_page(&absent));
    }

    #[test]
    fn test_parse_well_formed_article() {
        let doc = Document::parse(&article_page(ArticleParts::default()));
        let record = NaverNews.parse_article(ARTICLE, &doc).unwrap().unwrap();
        assert_eq!(record.url, ARTICLE);
        assert_eq!(record.text, "첫 문단입니다.두 번째   문단입니다.");
        assert_eq!(record.title, "테스트 기사 제목");
        assert_eq!(record.media, "연합뉴스");
        assert_eq!(record.date, day("2023-07-30"));
    }

    #[test]
    fn test_missing_body_is_empty_not_error() {
        let doc = Document::parse(&article_page(ArticleParts {
            body: None,
            title: None,
            ..Default::default()
        }));
        assert!(NaverNews.parse_article(ARTICLE, &doc).unwrap().is_none());
    }

    #[test]
    fn test_missing_header_fields_are_errors() {
        for field in ["title", "media", "date"] {
            let mut parts = ArticleParts::default();
            match field {
                "title" => parts.title = None,
                "media" => parts.media = None,
                _ => parts.timestamp = None,
            }
            let doc = Document::parse(&article_page(parts));
            match NaverNews.parse_article(ARTICLE, &doc) {
                Err(CrawlError::MissingField { field: missing, .. }) => assert_eq!(missing, field),
                other => panic!("expected missing {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_malformed_timestamp_is_error() {
        let doc = Document::parse(&article_page(ArticleParts {
            timestamp: Some("2023.07.30. 오후 2:22"),
            ..Default::default()
        }));
        assert!(matches!(
            NaverNews.parse_article(ARTICLE, &doc),
            Err(CrawlError::InvalidTimestamp { .. })
        ));
    }
}
