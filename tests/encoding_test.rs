use rs_article_extract::{extract_bytes, Error, Options};

#[test]
fn utf8_content_handled_correctly() {
    let html = "\
        <html>\
        <head><meta charset=\"utf-8\"></head>\
        <body><article>\
            <p>Special characters survive: é, ñ, ü, 中文</p>\
        </article></body>\
        </html>"
        .as_bytes();

    let record = extract_bytes(html, &Options::default()).expect("extraction failed");
    assert_eq!(record.content, vec!["Special characters survive: é, ñ, ü, 中文"]);
}

/// é = 0xE9, ñ = 0xF1, ü = 0xFC in ISO-8859-1
#[test]
fn iso88591_converted_to_utf8() {
    let html = b"<html>\
        <head><meta charset=\"ISO-8859-1\"><title>Caf\xE9 espa\xF1ol</title></head>\
        <body><article><p>M\xFCnchen</p></article></body></html>";

    let record = extract_bytes(html, &Options::default()).expect("extraction failed");
    assert_eq!(record.title.as_deref(), Some("Café español"));
    assert_eq!(record.content, vec!["München"]);
}

#[test]
fn content_type_meta_declares_charset() {
    let html = b"<html><head>\
        <meta http-equiv=\"Content-Type\" content=\"text/html; charset=windows-1252\">\
        </head><body><p>\x93Quoted\x94 \x80 price</p></body></html>";

    let record = extract_bytes(html, &Options::default()).expect("extraction failed");
    assert_eq!(record.content, vec!["\u{201c}Quoted\u{201d} \u{20ac} price"]);
}

#[test]
fn byte_order_mark_wins_over_declaration() {
    let mut html = vec![0xEF, 0xBB, 0xBF];
    html.extend_from_slice(
        "<html><head><meta charset=\"ISO-8859-1\"></head><body><p>naïve café</p></body></html>"
            .as_bytes(),
    );

    let record = extract_bytes(&html, &Options::default()).expect("extraction failed");
    assert_eq!(record.content, vec!["naïve café"]);
}

#[test]
fn utf16_with_bom_is_decoded() {
    let mut html = vec![0xFF, 0xFE];
    for unit in "<html><body><p>Grüße aus Köln</p></body></html>".encode_utf16() {
        html.extend_from_slice(&unit.to_le_bytes());
    }

    let record = extract_bytes(&html, &Options::default()).expect("extraction failed");
    assert_eq!(record.content, vec!["Grüße aus Köln"]);
}

#[test]
fn undeclared_encoding_defaults_to_utf8() {
    let html = "<html><body><p>Ünïcödé without a declaration</p></body></html>".as_bytes();
    let record = extract_bytes(html, &Options::default()).expect("extraction failed");
    assert_eq!(record.content, vec!["Ünïcödé without a declaration"]);
}

#[test]
fn mostly_undecodable_bytes_are_rejected() {
    let mut html = b"<p>".to_vec();
    html.extend(std::iter::repeat(0xFF).take(200));
    let result = extract_bytes(&html, &Options::default());
    assert!(matches!(result, Err(Error::Encoding(_))));
}

#[test]
fn stray_invalid_bytes_are_replaced() {
    let html = b"<html><body><p>Mostly fine \xFF text</p></body></html>";
    let record = extract_bytes(html, &Options::default()).expect("extraction failed");
    assert_eq!(record.content, vec!["Mostly fine \u{FFFD} text"]);
}
