use crate::browser::FixtureBrowser;
use crate::config::HarvestConfig;
use crate::scrapers::summary::SummaryFetcher;
use std::time::Duration;

const ARTICLE: &str = "https://news.example/brasil/story";

fn fetcher() -> SummaryFetcher {
    let config = HarvestConfig::default();
    SummaryFetcher::new(
        Duration::from_secs(1),
        config.summary_selectors,
        config.max_summary_chars,
    )
}

async fn fetch(page: &str) -> Option<String> {
    let mut browser = FixtureBrowser::new().with_page(ARTICLE, page);
    fetcher().fetch(&mut browser, ARTICLE).await.unwrap()
}

#[tokio::test]
async fn test_generic_paragraph_first_line() {
    let page = "<html><body><div><p>  Opening line<br>second line  </p><p>Other</p></div></body></html>";
    assert_eq!(fetch(page).await.as_deref(), Some("Opening line"));
}

#[tokio::test]
async fn test_generic_paragraph_truncated() {
    let lead = "a".repeat(1200);
    let page = format!("<html><body><p>{}</p></body></html>", lead);
    let summary = fetch(&page).await.unwrap();
    assert_eq!(summary, "a".repeat(1000));
}

#[tokio::test]
async fn test_specific_selector_preferred() {
    let page = r#"<html><body>
        <p>Cookie banner text</p>
        <div class="entry-content"><p>Entry lead</p></div>
        <article><p>Article lead</p></article>
    </body></html>"#;
    assert_eq!(fetch(page).await.as_deref(), Some("Article lead"));
}

#[tokio::test]
async fn test_structural_selectors_in_order() {
    let page = r#"<html><body>
        <p>Cookie banner text</p>
        <main><p>Main lead</p></main>
        <div class="post-content"><p>Post lead</p></div>
    </body></html>"#;
    assert_eq!(fetch(page).await.as_deref(), Some("Post lead"));
}

#[tokio::test]
async fn test_empty_match_moves_to_next_selector() {
    let page = r#"<html><body>
        <article><p>   </p></article>
        <main><p>Main lead</p></main>
    </body></html>"#;
    assert_eq!(fetch(page).await.as_deref(), Some("Main lead"));
}

#[tokio::test]
async fn test_no_paragraphs() {
    let page = "<html><body><div>No paragraphs at all</div></body></html>";
    assert_eq!(fetch(page).await, None);
}

#[tokio::test]
async fn test_navigation_failure_is_absent() {
    let mut browser = FixtureBrowser::new().with_broken_page(ARTICLE);
    assert_eq!(fetcher().fetch(&mut browser, ARTICLE).await.unwrap(), None);
}
