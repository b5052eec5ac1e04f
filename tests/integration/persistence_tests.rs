//! Persistence tests
//!
//! Host locks and pool seat counters must reach the database together.

use hostsync::db::{FolderPoolRepository, HostRepository};
use hostsync::models::FolderPoolEntry;

use crate::common::{HostFactory, HostFixtures, TestApp};

#[tokio::test]
async fn test_sync_persists_locks_and_seats_together() {
    let app = TestApp::new().await;
    app.insert_host(&HostFixtures::web()).await;
    app.insert_host(&HostFixtures::db()).await;

    let host_repo = HostRepository::new(app.state.db.clone());
    let hosts = host_repo.get_all().await.unwrap();
    let mut report = app.state.sync.evaluate_hosts(hosts).await.unwrap();
    assert!(report.failed.is_empty());

    let saved = host_repo
        .save_with_seats(&mut report.hosts, &app.state.pool.snapshot())
        .await
        .unwrap();
    assert!(saved >= 1);
    assert!(report.hosts.iter().all(|h| !h.needs_save()));

    let web = host_repo.get("web01.example.com").await.unwrap().unwrap();
    assert_eq!(web.get_folder(), Some("/pool/a"));

    let pools = FolderPoolRepository::new(app.state.db.clone())
        .get_all()
        .await
        .unwrap();
    assert_eq!(pools[0].folder_path, "/pool/a");
    assert_eq!(pools[0].taken_seats, 1);
    assert_eq!(
        host_repo.count_locked_to("/pool/a").await.unwrap(),
        pools[0].taken_seats
    );
}

#[tokio::test]
async fn test_failed_seat_write_keeps_hosts_unsaved() {
    let app = TestApp::new().await;
    let host_repo = HostRepository::new(app.state.db.clone());

    let mut host = HostFactory::new().create().build();
    host.lock_to_folder(Some("/pool/a".to_string()));
    let mut hosts = vec![host];

    // More seats taken than the folder has violates the table constraint
    let mut overbooked = FolderPoolEntry::new("/pool/a", 1);
    overbooked.taken_seats = 5;

    let result = host_repo.save_with_seats(&mut hosts, &[overbooked]).await;
    assert!(result.is_err());

    assert!(hosts[0].needs_save());
    assert!(host_repo.get(&hosts[0].hostname).await.unwrap().is_none());
    assert_eq!(host_repo.count_locked_to("/pool/a").await.unwrap(), 0);
}
