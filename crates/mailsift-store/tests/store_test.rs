use mailsift_core::{JobId, ListKind, MxStatus, StoreConfig, Verdict};
use mailsift_store::{Batch, JobQuery, MemoryStore, ProgressStore};
use std::sync::Arc;

fn verdict(email: &str) -> Verdict {
    Verdict {
        email: email.to_string(),
        valid_format: true,
        domain: Some("gmail.com".to_string()),
        allowlisted: true,
        disposable: false,
        mx: MxStatus::Unknown,
    }
}

async fn seeded_store(items: usize) -> (Arc<MemoryStore>, JobId) {
    let store = Arc::new(MemoryStore::new(&StoreConfig::default()));
    let job = JobId::generate();
    store.init(&job, items as u64).await.unwrap();

    let mut batch = Batch::new();
    for i in 0..items {
        let email = format!("user{i}@gmail.com");
        batch.push_checked(email.clone(), verdict(&email));
    }
    store.apply_batch(&job, batch).await.unwrap();
    (store, job)
}

#[tokio::test]
async fn test_pagination_is_exhaustive_and_non_overlapping() {
    let (store, job) = seeded_store(23).await;
    let expected = store.dump(&job, ListKind::Valid).await.unwrap();
    assert_eq!(expected.len(), 23);

    for limit in [1, 4, 7, 23, 50] {
        let mut offset = 0;
        let mut collected = Vec::new();
        loop {
            let page = store.chunk(&job, ListKind::Valid, offset, limit).await.unwrap();
            assert_eq!(page.next_offset, offset + page.items.len());
            collected.extend(page.items);
            offset = page.next_offset;
            if page.eof {
                break;
            }
        }
        assert_eq!(collected, expected, "limit {limit}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_mark_seen_never_double_inserts() {
    let store = Arc::new(MemoryStore::default());
    let job = JobId::generate();
    store.init(&job, 0).await.unwrap();

    let mut handles = Vec::new();
    for worker in 0..8 {
        let store = store.clone();
        let job = job.clone();
        handles.push(tokio::spawn(async move {
            let mut first_sightings = 0u64;
            for i in 0..50 {
                let raw = if worker % 2 == 0 {
                    format!("Shared{i}@gmail.com")
                } else {
                    format!("shared{i}@GMAIL.com")
                };
                if !store.mark_seen(&job, &raw).await.unwrap() {
                    first_sightings += 1;
                }
            }
            first_sightings
        }));
    }

    let mut firsts = 0;
    for handle in handles {
        firsts += handle.await.unwrap();
    }

    let snap = store.snapshot(&job).await.unwrap();
    assert_eq!(firsts, 50);
    assert_eq!(snap.counters.duplicates, 8 * 50 - 50);
    assert_eq!(snap.counters.processed, snap.counters.duplicates);
}

#[tokio::test]
async fn test_query_export_and_status() {
    let (store, job) = seeded_store(3).await;
    let query = JobQuery::new(store.clone());

    let mut out = Vec::new();
    let written = query.export(&job, ListKind::Valid, &mut out).await.unwrap();
    assert_eq!(written, 3);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "user0@gmail.com\nuser1@gmail.com\nuser2@gmail.com\n"
    );

    assert_eq!(
        query.status(&job).await.unwrap(),
        mailsift_core::JobStatus::Running
    );
    store.finish(&job).await.unwrap();
    assert_eq!(query.status(&job).await.unwrap(), mailsift_core::JobStatus::Done);

    let snap = query.snapshot(&job).await.unwrap();
    let json = serde_json::to_value(&snap).unwrap();
    assert_eq!(json["counters"]["valid"], 3);
    assert_eq!(json["status"], "done");
    assert_eq!(json["recent"][0]["raw"], "user2@gmail.com");
}
