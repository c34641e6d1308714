use pretty_assertions::assert_eq;
use tabharvest_engine::{
    decode_body, extract_page, is_login_redirect, TableExtractor, ViewsTableExtractor,
};

fn markers() -> Vec<String> {
    vec!["login".to_string(), "shibboleth".to_string()]
}

#[test]
fn decode_respects_charset_header() {
    let bytes = b"caf\xe9"; // iso-8859-1
    let decoded = decode_body(bytes, Some("text/html; charset=ISO-8859-1")).unwrap();
    assert_eq!(decoded.html, "café");
    assert!(
        decoded.encoding_label.eq_ignore_ascii_case("ISO-8859-1")
            || decoded.encoding_label.eq_ignore_ascii_case("windows-1252")
    );
}

#[test]
fn decode_handles_utf8_bom() {
    let bytes = b"\xEF\xBB\xBFhello";
    let decoded = decode_body(bytes, Some("text/html")).unwrap();
    assert_eq!(decoded.html, "hello");
    assert_eq!(decoded.encoding_label, "UTF-8");
}

#[test]
fn decode_accepts_quoted_charset() {
    let decoded = decode_body("naïve".as_bytes(), Some("text/html; Charset=\"utf-8\"")).unwrap();
    assert_eq!(decoded.html, "naïve");
}

#[test]
fn extractor_reads_trimmed_body_cells_and_skips_cellless_rows() {
    let html = r#"
    <html><body>
      <table class="sticky-header"><tbody><tr><td>not me</td></tr></tbody></table>
      <table class="views-table cols-8">
        <thead><tr><th>Name</th><th>Acronym</th></tr></thead>
        <tbody>
          <tr class="odd"><td>  <a href="/o/1">Alpha   Org</a> </td><td>AO</td></tr>
          <tr class="spacer"></tr>
          <tr class="even"><td>Beta</td><td></td><td>1999</td></tr>
        </tbody>
      </table>
    </body></html>
    "#;

    let rows = ViewsTableExtractor::default().extract_rows(html).unwrap();

    assert_eq!(
        rows,
        vec![
            vec!["Alpha   Org".to_string(), "AO".to_string()],
            vec!["Beta".to_string(), String::new(), "1999".to_string()],
        ]
    );
}

#[test]
fn missing_table_reports_login_only_from_final_url() {
    let extractor = ViewsTableExtractor::default();
    let html = "<html><body><a href=\"/login\">login</a></body></html>";

    let on_login = extract_page(
        &extractor,
        html,
        "https://idp.example.edu/idp/profile/SAML2/Redirect/SSO?login=1",
        &markers(),
    );
    assert_eq!(on_login.rows, None);
    assert!(on_login.login_redirect);

    let elsewhere = extract_page(&extractor, html, "https://example.org/ybio?page=4", &markers());
    assert_eq!(elsewhere.rows, None);
    assert!(!elsewhere.login_redirect);
}

#[test]
fn found_table_never_reports_login() {
    let html = r#"<table class="views-table"><tbody><tr><td>x</td></tr></tbody></table>"#;
    let extraction = extract_page(
        &ViewsTableExtractor::default(),
        html,
        "https://example.org/Shibboleth.sso/Login",
        &markers(),
    );
    assert_eq!(extraction.rows.map(|r| r.len()), Some(1));
    assert!(!extraction.login_redirect);
}

#[test]
fn login_markers_are_case_insensitive() {
    assert!(is_login_redirect("https://x.org/Shibboleth.sso/SAML2", &markers()));
    assert!(!is_login_redirect("https://x.org/ybio?page=2", &markers()));
}

#[test]
fn custom_selectors_are_supported() {
    let extractor = ViewsTableExtractor::with_selectors("table#orgs", "td").unwrap();
    let html = r#"<table id="orgs"><tbody><tr><td>a</td></tr></tbody></table>"#;
    assert_eq!(extractor.extract_rows(html), Some(vec![vec!["a".to_string()]]));
    assert!(ViewsTableExtractor::with_selectors("table[", "td").is_none());
}

#[test]
fn each_text_node_is_trimmed_before_joining() {
    let html = r#"<table class="views-table"><tbody>
        <tr><td>Foo <b>Bar</b></td><td> Geneva
        </td></tr>
    </tbody></table>"#;

    let rows = ViewsTableExtractor::default().extract_rows(html).unwrap();

    assert_eq!(rows, vec![vec!["FooBar".to_string(), "Geneva".to_string()]]);
}
