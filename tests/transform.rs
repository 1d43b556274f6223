use chrono::{NaiveDate, TimeZone, Utc};

use filing_extractor::transform::{
    DirectoryPayload, FilingsPayload, parse_acceptance_date, parse_last_modified,
    parse_short_date, to_directory, to_filings,
};

fn filings_payload(json: &str) -> FilingsPayload {
    serde_json::from_str(json).unwrap()
}

#[test]
fn empty_payload() {
    let payload = filings_payload(
        r#"{"filings":{"recent":{"accessionNumber":[],"form":[],"filingDate":[],"reportDate":[],"acceptanceDateTime":[]}}}"#,
    );
    assert!(to_filings(payload).is_empty());
}

#[test]
fn only_uninteresting_forms() {
    let payload = filings_payload(
        r#"{"filings":{"recent":{
            "accessionNumber":["a","b","c"],
            "form":["11-K","10-K/A","8-Q"],
            "filingDate":["","",""],
            "reportDate":["","",""],
            "acceptanceDateTime":["","",""]
        }}}"#,
    );
    assert!(to_filings(payload).is_empty());
}

#[test]
fn interesting_filings_among_others() {
    let payload = filings_payload(
        r#"{"cik":"320193","name":"Apple Inc.","filings":{"recent":{
            "accessionNumber":["0000320193-23-000106","x","y","0000320193-23-000077"],
            "form":["10-K","10-K/A","8-Q","10-Q"],
            "filingDate":["2008-01-02","","","2023-08-04"],
            "reportDate":["2023-12-31","","","2023-07-01"],
            "acceptanceDateTime":["2023-12-14T18:15:12.000Z","","","2023-08-03T18:04:43.000Z"]
        }}}"#,
    );
    let filings = to_filings(payload);
    assert_eq!(filings.len(), 2);

    let first = &filings[0];
    assert_eq!(first.raw_id, "0000320193-23-000106");
    assert_eq!(first.canonical_id, "000032019323000106");
    assert_eq!(first.form, "10-K");
    assert_eq!(first.filing_date, NaiveDate::from_ymd_opt(2008, 1, 2));
    assert_eq!(first.report_date, NaiveDate::from_ymd_opt(2023, 12, 31));
    assert_eq!(
        first.acceptance_date,
        Some(Utc.with_ymd_and_hms(2023, 12, 14, 18, 15, 12).unwrap())
    );
    assert_eq!(filings[1].form, "10-Q");
}

#[test]
fn bad_dates_never_drop_the_record() {
    let payload = filings_payload(
        r#"{"filings":{"recent":{
            "accessionNumber":["0001-23-45"],
            "form":["10-Q"],
            "filingDate":["not a date"],
            "reportDate":[""],
            "acceptanceDateTime":["2023-08-15"]
        }}}"#,
    );
    let filings = to_filings(payload);
    assert_eq!(filings.len(), 1);
    assert_eq!(filings[0].filing_date, None);
    assert_eq!(filings[0].report_date, None);
    assert_eq!(filings[0].acceptance_date, None);
}

#[test]
fn short_date_arrays_are_tolerated() {
    let payload = filings_payload(
        r#"{"filings":{"recent":{
            "accessionNumber":["0001-23-45","0001-23-46"],
            "form":["10-K","10-Q"],
            "filingDate":["2024-01-05"]
        }}}"#,
    );
    let filings = to_filings(payload);
    assert_eq!(filings.len(), 2);
    assert!(filings[0].filing_date.is_some());
    assert_eq!(filings[1].filing_date, None);
}

#[test]
fn directory_items() {
    let payload: DirectoryPayload = serde_json::from_str(
        r#"{"directory":{"name":"/Archives/edgar/data/320193/000032019323000106","item":[
            {"last-modified":"2004-09-10 16:47:30","name":"ex32.txt","type":"text.gif","size":"2048"},
            {"last-modified":"2023-12-14T18:15:12.000Z","name":"k2004.htm","size":""},
            {"name":"noext"}
        ]}}"#,
    )
    .unwrap();
    let documents = to_directory(payload);
    assert_eq!(documents.len(), 3);

    assert_eq!(documents[0].name, "ex32.txt");
    assert_eq!(documents[0].extension.as_deref(), Some(".txt"));
    assert_eq!(documents[0].size, Some(2048));
    assert_eq!(
        documents[0].last_modified,
        NaiveDate::from_ymd_opt(2004, 9, 10).and_then(|d| d.and_hms_opt(16, 47, 30))
    );
    assert!(documents[0].content.is_empty());

    assert_eq!(documents[1].size, None);
    assert_eq!(documents[1].last_modified, None);

    assert_eq!(documents[2].extension, None);
}

#[test]
fn odd_item_fields_degrade_to_unknown() {
    let payload: DirectoryPayload = serde_json::from_str(
        r#"{"directory":{"item":[
            {"name":"a.htm","size":1024.5,"last-modified":20240405},
            {"name":"b.htm","size":-1,"last-modified":null},
            {"name":"c.htm","size":true,"last-modified":{"at":"2024-04-05"}},
            {"name":"d.htm","size":null,"last-modified":["2024-04-05 16:00:00"]},
            {"name":"e.htm","size":512,"last-modified":"2024-04-05 16:00:00"}
        ]}}"#,
    )
    .unwrap();
    let documents = to_directory(payload);
    let names: Vec<&str> = documents.iter().map(|doc| doc.name.as_str()).collect();
    assert_eq!(names, vec!["a.htm", "b.htm", "c.htm", "d.htm", "e.htm"]);
    for document in &documents[..4] {
        assert_eq!(document.size, None, "{}", document.name);
        assert_eq!(document.last_modified, None, "{}", document.name);
    }
    assert_eq!(documents[4].size, Some(512));
    assert!(documents[4].last_modified.is_some());
}

#[test]
fn layouts() {
    assert!(parse_short_date("").is_none());
    assert!(parse_last_modified("").is_none());
    assert_eq!(
        parse_short_date("2023-08-15"),
        NaiveDate::from_ymd_opt(2023, 8, 15)
    );
    assert!(parse_last_modified("2008-03-06 04:20:59").is_some());
    assert!(parse_acceptance_date("2023-12-14T18:15:12.000Z").is_some());
}
