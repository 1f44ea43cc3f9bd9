//! Concurrent writers and process restarts against a real data directory.

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use anyhow::Result;
use guestbook::{StoreConfig, WishStore};
use tempfile::TempDir;

const WRITERS: usize = 20;

#[test]
fn test_concurrent_appends_lose_nothing() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store = Arc::new(WishStore::at_path(temp_dir.path())?);
    let before = store.list_all().len();

    let barrier = Arc::new(Barrier::new(WRITERS));
    let mut handles = vec![];

    for i in 0..WRITERS {
        let store = Arc::clone(&store);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            store
                .append(&format!("Tamu {i}"), &format!("Selamat {i}"))
                .expect("append failed")
        }));
    }

    for handle in handles {
        let returned = handle.join().unwrap();
        assert!(returned.len() > before);
    }

    let wishes = store.list_all();
    assert_eq!(wishes.len(), before + WRITERS);

    for i in 0..WRITERS {
        let hits = wishes
            .iter()
            .filter(|m| m.name == format!("Tamu {i}") && m.text == format!("Selamat {i}"))
            .count();
        assert_eq!(hits, 1, "payload {i} should be stored exactly once");
    }

    let ids: HashSet<_> = wishes.iter().map(|m| m.id.clone()).collect();
    assert_eq!(ids.len(), wishes.len());

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_appends_from_async_tasks() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store = Arc::new(WishStore::at_path(temp_dir.path())?);

    let tasks: Vec<_> = (0..WRITERS)
        .map(|i| {
            let store = Arc::clone(&store);
            tokio::task::spawn_blocking(move || store.append("Tamu", &format!("pesan {i}")))
        })
        .collect();

    for task in tasks {
        task.await??;
    }

    assert_eq!(store.list_all().len(), 2 + WRITERS);
    Ok(())
}

#[test]
fn test_readers_never_see_partial_writes() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store = Arc::new(WishStore::at_path(temp_dir.path())?);

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for i in 0..100 {
                store.append("Penulis", &format!("pesan {i}")).expect("append failed");
            }
        })
    };

    // Every strict read must parse: a reader may only observe whole documents
    let mut last_len = 0;
    while !writer.is_finished() {
        let wishes = store.load()?;
        assert!(wishes.len() >= last_len);
        last_len = wishes.len();
    }
    writer.join().unwrap();

    assert_eq!(store.load()?.len(), 102);
    Ok(())
}

#[test]
fn test_restart_keeps_order() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = StoreConfig::with_data_dir(temp_dir.path());

    let after_append = {
        let store = WishStore::open(config.clone())?;
        assert_eq!(store.list_all().len(), 2);

        let wishes = store.append("Sari", "Barakallah")?;
        assert_eq!(wishes.len(), 3);
        assert_eq!(wishes[0].name, "Sari");
        assert_eq!(wishes[0].text, "Barakallah");
        wishes
    };

    let reopened = WishStore::open(config)?;
    assert_eq!(reopened.list_all(), after_append);

    // Ids issued after a restart still sort above everything stored before it
    let newest_before = after_append[0].id.as_number().unwrap();
    let wishes = reopened.append("Budi", "Selamat ya!")?;
    assert!(wishes[0].id.as_number().unwrap() > newest_before);

    Ok(())
}
