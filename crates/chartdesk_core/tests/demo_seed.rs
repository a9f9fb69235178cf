use chartdesk_core::{
    filter_records, CoreConfig, DemoSeeder, PatientRecord, PersonalInformation, RecordStore,
    SeedOutcome, StoreContext,
};
use chrono::Duration;
use rusqlite::Connection;

fn patient(first_name: &str, mrn: &str) -> PatientRecord {
    PatientRecord::new(PersonalInformation {
        first_name: first_name.to_string(),
        last_name: "Demo".to_string(),
        medical_record_number: mrn.to_string(),
        ..PersonalInformation::default()
    })
}

#[tokio::test]
async fn seeding_twice_writes_one_set() {
    let store = RecordStore::new(StoreContext::in_memory());
    let seeder = DemoSeeder::new(store.clone());

    let first = seeder.seed_if_needed().await.unwrap();
    assert!(matches!(first, SeedOutcome::Seeded { written: 20 }));
    let second = seeder.seed_if_needed().await.unwrap();
    assert!(matches!(second, SeedOutcome::AlreadyAttempted));
    assert_eq!(second.written(), 0);

    assert_eq!(store.count().await.unwrap(), 20);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_seeders_on_one_context_write_one_set() {
    let store = RecordStore::new(StoreContext::in_memory());

    let first = DemoSeeder::new(store.clone());
    let second = DemoSeeder::new(store.clone());
    let (a, b) = tokio::join!(first.seed_if_needed(), second.seed_if_needed());

    let written = [a.unwrap(), b.unwrap()]
        .iter()
        .map(SeedOutcome::written)
        .collect::<Vec<_>>();
    assert_eq!(written.iter().sum::<usize>(), 20);
    assert!(written.contains(&0));
    assert_eq!(store.count().await.unwrap(), 20);
}

#[tokio::test]
async fn marker_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = CoreConfig::new(dir.path().join("chartdesk.sqlite3"));

    let store = RecordStore::new(StoreContext::new(&config));
    DemoSeeder::new(store.clone()).seed_if_needed().await.unwrap();
    drop(store);

    let restarted = RecordStore::new(StoreContext::new(&config));
    let outcome = DemoSeeder::new(restarted.clone())
        .seed_if_needed()
        .await
        .unwrap();
    assert!(matches!(outcome, SeedOutcome::AlreadyAttempted));
    assert_eq!(restarted.count().await.unwrap(), 20);
}

#[tokio::test]
async fn seeding_does_not_rerun_after_user_deletes_everything() {
    let store = RecordStore::new(StoreContext::in_memory());
    let seeder = DemoSeeder::new(store.clone());
    seeder.seed_if_needed().await.unwrap();

    for stored in store.list_all().await.unwrap() {
        if let Some(key) = stored.key() {
            store.delete(key).await.unwrap();
        }
    }

    let outcome = seeder.seed_if_needed().await.unwrap();
    assert!(matches!(outcome, SeedOutcome::AlreadyAttempted));
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn first_seeded_record_sorts_first() {
    let store = RecordStore::new(StoreContext::in_memory());
    let seeder = DemoSeeder::with_records(
        store.clone(),
        vec![
            patient("Newest", "MRN-1"),
            patient("Middle", "MRN-2"),
            patient("Oldest", "MRN-3"),
        ],
    )
    .with_spacing(Duration::seconds(1));
    seeder.seed_if_needed().await.unwrap();

    let ordered = filter_records("", store.list_all().await.unwrap());
    let names = ordered
        .iter()
        .map(|s| s.record.personal_information.first_name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Newest", "Middle", "Oldest"]);
    assert!(ordered
        .iter()
        .all(|s| s.attachment.media_type() == "image/svg+xml"));

    let newest = ordered[0].key().and_then(|key| key.timestamp()).unwrap();
    let oldest = ordered[2].key().and_then(|key| key.timestamp()).unwrap();
    assert_eq!(newest - oldest, Duration::seconds(2));
}

#[tokio::test]
async fn partial_failure_still_marks_seeding_attempted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chartdesk.sqlite3");
    let store = RecordStore::new(StoreContext::new(&CoreConfig::new(&path)));
    store.context().init().await.unwrap();

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TRIGGER reject_mrn BEFORE INSERT ON patient_records
         WHEN NEW.medical_record_number = 'MRN-2'
         BEGIN
             SELECT RAISE(ABORT, 'rejected');
         END;",
    )
    .unwrap();
    drop(conn);

    let seeder = DemoSeeder::with_records(
        store.clone(),
        vec![
            patient("One", "MRN-1"),
            patient("Two", "MRN-2"),
            patient("Three", "MRN-3"),
        ],
    );

    match seeder.seed_if_needed().await.unwrap() {
        SeedOutcome::Partial { written, failure } => {
            assert_eq!(written, 2);
            assert_eq!(failure.attempted, 3);
            assert_eq!(failure.failures.len(), 1);
            assert!(failure.to_string().contains("1 of 3"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    let again = seeder.seed_if_needed().await.unwrap();
    assert!(matches!(again, SeedOutcome::AlreadyAttempted));
    assert_eq!(store.count().await.unwrap(), 2);
}

#[tokio::test]
async fn unavailable_storage_is_reported_without_marking() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"file").unwrap();
    let config = CoreConfig::new(blocker.join("chartdesk.sqlite3"));

    let store = RecordStore::new(StoreContext::new(&config));
    assert!(DemoSeeder::new(store.clone()).seed_if_needed().await.is_err());

    std::fs::remove_file(&blocker).unwrap();
    let outcome = DemoSeeder::new(store.clone()).seed_if_needed().await.unwrap();
    assert!(matches!(outcome, SeedOutcome::Seeded { written: 20 }));
}
