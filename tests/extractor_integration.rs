//! Extractor integration tests: walk a real directory tree of XML files

use abr_search::extractor::{Extractor, BusinessRecord, UNKNOWN};
use std::fs;
use tempfile::TempDir;

fn write_file(dir: &std::path::Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

fn setup_tree() -> TempDir {
    let temp = TempDir::new().unwrap();

    write_file(
        temp.path(),
        "20240801_part1.xml",
        r#"<Transfer>
            <ABR>
                <NonIndividualName><NonIndividualNameText>ACME PLUMBING PTY LTD</NonIndividualNameText></NonIndividualName>
                <BusinessAddress><AddressDetails><State>NSW</State><Postcode>2000</Postcode></AddressDetails></BusinessAddress>
            </ABR>
            <ABR>
                <BusinessAddress><AddressDetails><State>VIC</State><Postcode>3000</Postcode></AddressDetails></BusinessAddress>
            </ABR>
        </Transfer>"#,
    );

    let nested = temp.path().join("part2");
    fs::create_dir(&nested).unwrap();
    write_file(
        &nested,
        "20240801_part2.xml",
        r#"<Transfer>
            <ABR>
                <NonIndividualName><NonIndividualNameText>OUTBACK TOURS</NonIndividualNameText></NonIndividualName>
                <BusinessAddress><AddressDetails><State>NT</State><Postcode>0800</Postcode></AddressDetails></BusinessAddress>
                <BusinessAddress><AddressDetails><State>SA</State><Postcode>5000</Postcode></AddressDetails></BusinessAddress>
            </ABR>
        </Transfer>"#,
    );

    // Non-XML files in the tree are skipped
    write_file(temp.path(), "README.txt", "not xml");

    temp
}

#[test]
fn walks_tree_and_extracts_all_records() {
    let temp = setup_tree();
    let extractor = Extractor::new(temp.path());

    let records: Vec<BusinessRecord> = extractor
        .records()
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(records.len(), 3);
}

#[test]
fn record_without_name_defaults_to_unknown() {
    let temp = setup_tree();
    let extractor = Extractor::new(temp.path());

    let records: Vec<BusinessRecord> = extractor
        .records()
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    let nameless = records.iter().find(|r| r.state == "VIC").unwrap();
    assert_eq!(nameless.company_name, UNKNOWN);
    assert_eq!(nameless.postcode, "3000");
}

#[test]
fn only_first_business_address_survives() {
    let temp = setup_tree();
    let extractor = Extractor::new(temp.path());

    let records: Vec<BusinessRecord> = extractor
        .records()
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    let outback = records
        .iter()
        .find(|r| r.company_name == "OUTBACK TOURS")
        .unwrap();
    assert_eq!(outback.state, "NT");
    assert_eq!(outback.postcode, "0800");
}

#[test]
fn file_order_is_deterministic() {
    let temp = setup_tree();
    let extractor = Extractor::new(temp.path());

    let files = extractor.xml_files().unwrap();
    let mut sorted = files.clone();
    sorted.sort();
    assert_eq!(files, sorted);
    assert_eq!(files.len(), 2);
}

#[test]
fn empty_tree_yields_no_records() {
    let temp = TempDir::new().unwrap();
    let extractor = Extractor::new(temp.path());

    assert_eq!(extractor.records().unwrap().count(), 0);
}

#[test]
fn malformed_xml_surfaces_an_error() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "broken.xml", "<Transfer><ABR></Transfer>");

    let extractor = Extractor::new(temp.path());
    let results: Vec<_> = extractor.records().unwrap().collect();
    assert!(results.iter().any(|r| r.is_err()));
}
