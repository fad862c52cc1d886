//! End-to-end extraction of realistic article pages.

use rs_article_extract::{extract, extract_with_options, Author, Options, Site};

const STRUCTURED_ARTICLE: &str = r#"<!DOCTYPE html>
<html lang="EN-gb">
<head>
    <meta charset="utf-8">
    <title>Rail Strike Called Off | The Daily Ledger</title>
    <meta name="description" content="Unions and operators reached a late agreement.">
    <meta name="news_keywords" content="rail, strikes">
    <link rel="canonical" href="https://ledger.example.com/news/rail-strike-called-off">
    <meta property="og:type" content="article">
    <meta property="og:title" content="Rail strike called off (OG)">
    <meta property="og:site_name" content="The Daily Ledger">
    <meta property="article:section" content="Transport">
    <script type="application/ld+json">
    {
        "@context": "https://schema.org",
        "@type": "NewsArticle",
        "headline": "Rail strike called off after late-night talks",
        "datePublished": "2024-03-01T08:00:00Z",
        "dateModified": "2024-03-01T10:15:00+01:00",
        "articleSection": ["UK", "Transport"],
        "keywords": "Rail, unions",
        "author": {"@type": "Person", "name": "Priya Shah", "url": "https://ledger.example.com/staff/priya-shah"},
        "publisher": {"@type": "Organization", "name": "The Daily Ledger", "url": "https://ledger.example.com/"}
    }
    </script>
</head>
<body>
    <header><a href="/">The Daily Ledger</a></header>
    <nav><a href="/uk">UK</a> <a href="/world">World</a></nav>
    <article>
        <h1>Rail strike called off after late-night talks</h1>
        <figure>
            <img src="/media/station.jpg" alt="A quiet station">
            <figcaption>Commuters at a station on Tuesday.</figcaption>
        </figure>
        <div class="story-body">
            <p>A national rail strike planned for Thursday has been called off.</p>
            <p>Talks between unions and operators ran until <strong>2am</strong>, according to <a href="https://unions.example.org/statement">a statement</a>.</p>
            <p>Services are expected to run normally for the rest of the week.</p>
        </div>
        <iframe src="https://www.youtube.com/embed/r41l5tr1k3"></iframe>
        <p><a href="/docs/agreement.pdf">Read the agreement</a></p>
    </article>
    <footer><p>All rights reserved.</p></footer>
</body>
</html>"#;

#[test]
fn structured_sources_take_priority() {
    let record = extract(STRUCTURED_ARTICLE).unwrap();

    assert_eq!(
        record.url.as_deref(),
        Some("https://ledger.example.com/news/rail-strike-called-off")
    );
    assert_eq!(
        record.title.as_deref(),
        Some("Rail strike called off after late-night talks")
    );
    assert_eq!(
        record.description.as_deref(),
        Some("Unions and operators reached a late agreement.")
    );
    assert_eq!(record.language.as_deref(), Some("en-GB"));
    assert_eq!(record.published.as_deref(), Some("2024-03-01T08:00:00+00:00"));
    assert_eq!(record.modified.as_deref(), Some("2024-03-01T10:15:00+01:00"));
    assert_eq!(record.categories, vec!["UK", "Transport"]);
    assert_eq!(
        record.site,
        vec![Site {
            name: Some("The Daily Ledger".to_string()),
            url: Some("https://ledger.example.com/".to_string()),
        }]
    );

    let p = &record.provenance;
    assert_eq!(p.url, Some("canonical"));
    assert_eq!(p.title, Some("json_ld_headline"));
    assert_eq!(p.description, Some("head"));
    assert_eq!(p.language, Some("html"));
    assert_eq!(p.published, Some("json_ld"));
    assert_eq!(p.modified, Some("json_ld"));
}

#[test]
fn keywords_merge_every_source() {
    let record = extract(STRUCTURED_ARTICLE).unwrap();
    assert_eq!(record.keywords, vec!["Rail", "strikes", "unions"]);
    assert_eq!(record.provenance.keywords, vec!["json_ld", "news_keywords"]);
}

#[test]
fn authors_fall_back_to_json_ld() {
    let record = extract(STRUCTURED_ARTICLE).unwrap();
    assert_eq!(
        record.authors,
        vec![Author {
            name: Some("Priya Shah".to_string()),
            url: Some("https://ledger.example.com/staff/priya-shah".to_string()),
            image_url: None,
        }]
    );
    assert_eq!(record.provenance.authors, Some("json_ld"));
}

#[test]
fn body_text_skips_boilerplate() {
    let record = extract(STRUCTURED_ARTICLE).unwrap();
    assert_eq!(
        record.content,
        vec![
            "A national rail strike planned for Thursday has been called off.",
            "Talks between unions and operators ran until 2am, according to a statement.",
            "Services are expected to run normally for the rest of the week.",
        ]
    );
    let text = record.text();
    assert!(!text.contains("All rights reserved"));
    assert!(!text.contains("World"));
}

#[test]
fn assets_are_resolved_against_canonical_url() {
    let record = extract(STRUCTURED_ARTICLE).unwrap();

    assert_eq!(record.images.len(), 1);
    assert_eq!(record.images[0].url, "https://ledger.example.com/media/station.jpg");
    assert_eq!(
        record.images[0].alt_text.as_deref(),
        Some("Commuters at a station on Tuesday.")
    );

    assert_eq!(record.videos.len(), 1);
    assert_eq!(record.videos[0].url, "https://www.youtube.com/embed/r41l5tr1k3");
    assert_eq!(record.videos[0].alt_text, None);

    assert_eq!(record.documents.len(), 1);
    assert_eq!(
        record.documents[0].url,
        "https://ledger.example.com/docs/agreement.pdf"
    );
    assert_eq!(record.documents[0].alt_text.as_deref(), Some("Read the agreement"));

    let statement = record
        .links
        .iter()
        .find(|l| l.url == "https://unions.example.org/statement")
        .expect("inline link from body text");
    assert_eq!(statement.text.as_deref(), Some("a statement"));
}

#[test]
fn page_url_option_used_when_page_declares_none() {
    let html = r#"<html><body><article>
        <p>A short report with an <a href="/more">internal link</a>.</p>
    </article></body></html>"#;
    let options = Options {
        url: Some("https://blog.example.net/2024/05/post".to_string()),
        ..Options::default()
    };
    let record = extract_with_options(html, &options).unwrap();
    assert_eq!(record.url.as_deref(), Some("https://blog.example.net/2024/05/post"));
    assert_eq!(record.provenance.url, None);
    assert_eq!(record.links[0].url, "https://blog.example.net/more");
    assert_eq!(record.links[0].text.as_deref(), Some("internal link"));
}

#[test]
fn raw_title_kept_when_cleaning_disabled() {
    let html = "<html><head><title>Quarterly Results | Example Corp</title></head><body><p>Numbers.</p></body></html>";
    let options = Options {
        clean_title: false,
        ..Options::default()
    };
    let record = extract_with_options(html, &options).unwrap();
    assert_eq!(record.title.as_deref(), Some("Quarterly Results | Example Corp"));
    assert_eq!(record.provenance.title, Some("title"));
}

#[test]
fn record_serializes_with_camel_case_keys() {
    let record = extract(STRUCTURED_ARTICLE).unwrap();
    let json = serde_json::to_value(&record).unwrap();
    assert!(json.get("commentAreas").is_some());
    assert_eq!(
        json["images"][0]["altText"],
        "Commuters at a station on Tuesday."
    );
    assert_eq!(json["provenance"]["title"], "json_ld_headline");
}

#[test]
fn microdata_timestamps_are_used_without_structured_data() {
    let html = r#"<html><head>
        <meta itemprop="dateModified" content="2023-11-06">
    </head><body><article>
        <time itemprop="datePublished" datetime="2023-11-05T09:30:00+02:00">5 November</time>
        <p>Body text of a page with microdata only.</p>
    </article></body></html>"#;
    let record = extract(html).unwrap();
    assert_eq!(record.published.as_deref(), Some("2023-11-05T09:30:00+02:00"));
    assert_eq!(record.provenance.published, Some("time"));
    assert_eq!(record.modified.as_deref(), Some("2023-11-06T00:00:00"));
    assert_eq!(record.provenance.modified, Some("meta"));
}

#[test]
fn page_header_heading_does_not_compete_for_title() {
    let html = r#"<html><body>
        <header><h1>Coastal Times</h1></header>
        <article>
            <h1>Harbour Reopens After Storm</h1>
            <p>Boats returned to the harbour on Monday after a week of repairs.</p>
        </article>
    </body></html>"#;
    let record = extract(html).unwrap();
    assert_eq!(record.title.as_deref(), Some("Harbour Reopens After Storm"));
    assert_eq!(record.provenance.title, Some("h1"));
}

#[test]
fn hidden_timestamps_are_ignored() {
    let html = r#"<html><body><article>
        <div style="display:none">
            <time itemprop="datePublished" datetime="1999-01-01">1 January 1999</time>
        </div>
        <p>A page whose only timestamp is hidden from readers.</p>
    </article></body></html>"#;
    let record = extract(html).unwrap();
    assert_eq!(record.published, None);
    assert_eq!(record.provenance.published, None);

    let options = Options {
        clear_invisible: false,
        ..Options::default()
    };
    let record = extract_with_options(html, &options).unwrap();
    assert_eq!(record.published.as_deref(), Some("1999-01-01T00:00:00"));
    assert_eq!(record.provenance.published, Some("time"));
}

#[test]
fn body_meta_microdata_is_pruned_with_empty_elements() {
    let html = r#"<html><body><article>
        <meta itemprop="dateModified" content="2023-11-06">
        <p>The only modification date sits in an empty body element.</p>
    </article></body></html>"#;
    let record = extract(html).unwrap();
    assert_eq!(record.modified, None);
}
