use assert_matches::assert_matches;

use filing_extractor::crawler::find_primary_document_name;
use filing_extractor::error::ExtractorError;

fn find(html: &str) -> Result<String, ExtractorError> {
    find_primary_document_name(html.as_bytes())
}

#[test]
fn first_marked_row_wins() {
    let html = r#"
        <body>
          <table>
            <caption>Table</caption>
            <tr><td>1</td><td>foo.htm</td></tr>
            <tr><td>1</td><td>bar.htm</td></tr>
            <tr><td>3</td></tr>
          </table>
        </body>"#;
    assert_eq!(find(html).unwrap(), "foo.htm");
}

#[test]
fn first_file_in_row_wins() {
    let html = r#"
        <table>
          <tr><td>1</td><td>foo.htm</td><td>bar.htm</td></tr>
          <tr><td>1</td><td>baz.htm</td></tr>
        </table>"#;
    assert_eq!(find(html).unwrap(), "foo.htm");
}

#[test]
fn marked_row_without_file_does_not_fall_back() {
    let html = r#"
        <table>
          <tr><td>1</td></tr>
          <tr><td>1</td><td>baz.htm</td></tr>
        </table>
        <table>
          <tr><td>1</td><td>qux.htm</td></tr>
        </table>"#;
    assert_matches!(find(html), Err(ExtractorError::NotFound(_)));
}

#[test]
fn tables_without_marker_are_passed_over() {
    let html = r#"
        <table><tr><td>2</td><td>skip.htm</td></tr></table>
        <table><tr><td>1</td><td>main.htm</td></tr></table>"#;
    assert_eq!(find(html).unwrap(), "main.htm");
}

#[test]
fn marker_outside_tables_is_ignored() {
    let html = r#"
        <div><span>1</span><span>loose.htm</span></div>
        <table><tr><td>1</td><td>tabled.htm</td></tr></table>"#;
    assert_eq!(find(html).unwrap(), "tabled.htm");
}

#[test]
fn nested_table_is_searched() {
    let html = r#"
        <table>
          <tr><td>
            <table><tr><td>1</td><td>inner.htm</td></tr></table>
          </td></tr>
        </table>"#;
    assert_eq!(find(html).unwrap(), "inner.htm");
}

#[test]
fn html_and_bare_suffix_are_not_primary() {
    let html = r#"
        <table><tr><td>1</td><td>.htm</td><td>page.html</td></tr></table>"#;
    assert_matches!(find(html), Err(ExtractorError::NotFound(_)));
}

#[test]
fn empty_and_tableless_pages() {
    assert_matches!(find(""), Err(ExtractorError::NotFound(_)));
    assert_matches!(
        find("<p>1</p><p>doc.htm</p>"),
        Err(ExtractorError::NotFound(_))
    );
}

#[test]
fn registry_index_page() {
    let html = r#"<!DOCTYPE html>
<html><head><title>EDGAR Filing Documents for 0000320193-23-000106</title></head>
<body>
<div id="formDiv">
  <div id="formHeader"><div id="formName"><strong>Form 10-K</strong> - Annual report</div></div>
  <div class="formContent">
    <table class="tableFile" summary="Document Format Files">
      <tr>
        <th scope="col">Seq</th>
        <th scope="col">Description</th>
        <th scope="col">Document</th>
        <th scope="col">Type</th>
        <th scope="col">Size</th>
      </tr>
      <tr>
        <td scope="row">1</td>
        <td scope="row">10-K</td>
        <td scope="row"><a href="/ix?doc=/Archives/edgar/data/320193/000032019323000106/aapl-20230930.htm">aapl-20230930.htm</a> <span>iXBRL</span></td>
        <td scope="row">10-K</td>
        <td scope="row">9281953</td>
      </tr>
      <tr class="blueRow">
        <td scope="row">2</td>
        <td scope="row">EX-4.1</td>
        <td scope="row"><a href="/Archives/edgar/data/320193/000032019323000106/a10-kexhibit4109302023.htm">a10-kexhibit4109302023.htm</a></td>
        <td scope="row">EX-4.1</td>
        <td scope="row">60225</td>
      </tr>
    </table>
  </div>
</div>
</body></html>"#;
    assert_eq!(find(html).unwrap(), "aapl-20230930.htm");
}

#[test]
fn invalid_utf8_is_tolerated() {
    let mut bytes = b"<table><tr><td>1</td><td>doc.htm</td><td>".to_vec();
    bytes.extend_from_slice(&[0xff, 0xfe]);
    bytes.extend_from_slice(b"</td></tr></table>");
    assert_eq!(find_primary_document_name(&bytes).unwrap(), "doc.htm");
}
