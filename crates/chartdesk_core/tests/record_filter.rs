use chartdesk_core::{
    filter_records, Allergy, Attachment, PatientRecord, PersonalInformation, RecordKey,
    RecordStore, Severity, StoreContext,
};

fn patient(first_name: &str, last_name: &str) -> PatientRecord {
    PatientRecord::new(PersonalInformation {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        ..PersonalInformation::default()
    })
}

fn image() -> Attachment {
    Attachment::new("image/png", vec![0x89, 0x50, 0x4e, 0x47]).unwrap()
}

#[tokio::test]
async fn diagnosis_prefix_query_finds_exactly_the_matching_record() {
    let store = RecordStore::new(StoreContext::in_memory());
    let mut john = patient("John", "Smith");
    john.push_diagnosis("Hypertension");
    let john_key = store.put(john, Some(image())).await.unwrap();

    let mut emily = patient("Emily", "Jones");
    emily.push_diagnosis("Asthma");
    store.put(emily, Some(image())).await.unwrap();

    let hits = filter_records("hyperten", store.list_all().await.unwrap());
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].key(), Some(&john_key));

    let none = filter_records("appendicitis", store.list_all().await.unwrap());
    assert!(none.is_empty());
}

#[tokio::test]
async fn allergy_matches_in_any_case() {
    let store = RecordStore::new(StoreContext::in_memory());
    let mut record = patient("John", "Smith");
    record.push_allergy(Allergy::new("Penicillin", Severity::Severe));
    store.put(record, Some(image())).await.unwrap();
    store.put(patient("Emily", "Jones"), Some(image())).await.unwrap();

    for query in ["penicillin", "PENICILLIN", "Penicillin", "penic"] {
        let hits = filter_records(query, store.list_all().await.unwrap());
        assert_eq!(hits.len(), 1, "query `{query}`");
        assert_eq!(hits[0].record.personal_information.first_name, "John");
    }
}

#[tokio::test]
async fn trailing_space_is_not_ignored() {
    let store = RecordStore::new(StoreContext::in_memory());
    store.put(patient("Johnson", "Doe"), Some(image())).await.unwrap();

    let listing = store.list_all().await.unwrap();
    assert!(filter_records("john ", listing.clone()).is_empty());
    assert_eq!(filter_records("JOHN", listing).len(), 1);
}

#[tokio::test]
async fn empty_query_returns_every_record_newest_first() {
    let store = RecordStore::new(StoreContext::in_memory());
    for (key, name) in [
        ("2026-05-01T08:00:00.000Z", "t2"),
        ("2026-05-01T07:00:00.000Z", "t1"),
        ("2026-05-01T09:00:00.000Z", "t3"),
    ] {
        let mut record = patient(name, "Doe");
        record.key = Some(RecordKey::new(key));
        store.put(record, Some(image())).await.unwrap();
    }

    let ordered = filter_records("", store.list_all().await.unwrap());
    let names = ordered
        .iter()
        .map(|s| s.record.personal_information.first_name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["t3", "t2", "t1"]);
}

#[tokio::test]
async fn filtering_never_changes_stored_records() {
    let store = RecordStore::new(StoreContext::in_memory());
    store.put(patient("John", "Smith"), Some(image())).await.unwrap();

    let before = store.list_all().await.unwrap();
    let _ = filter_records("smith", before.clone());
    let after = store.list_all().await.unwrap();
    assert_eq!(before, after);
}
