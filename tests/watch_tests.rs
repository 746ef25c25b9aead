use flow_navigator::commands::watch_metadata;
use flow_navigator::core::debounce::RefreshDebouncer;
use flow_navigator::core::git::GitRepo;
use flow_navigator::core::{BranchKind, FlowSession, Settings, WorkspaceContext};
use std::time::Duration;

mod common;
use common::{fixtures::*, repository::*};

#[cfg(test)]
mod watch_tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_checkout_publishes_one_snapshot() -> anyhow::Result<()> {
        let repo = create_workflow_repo()?;
        let session = FlowSession::open(WorkspaceContext::new(&repo.path, Settings::default()))?;
        let synchronizer = session.synchronizer();
        let mut updates = synchronizer.subscribe();

        let debouncer = RefreshDebouncer::spawn(synchronizer.clone(), Duration::from_millis(300));
        let metadata_dir = GitRepo::open(&repo.path)?.get_repo_path();
        let _watcher = watch_metadata(&metadata_dir, debouncer.handle())?;

        checkout(&repo.path, "develop")?;

        tokio::time::timeout(Duration::from_secs(10), updates.changed()).await??;
        let snapshot = updates.borrow_and_update().clone();
        assert_eq!(snapshot.current.kind, BranchKind::Base("develop".to_string()));
        assert!(snapshot.exists("feature"));
        assert!(snapshot.exists("release"));

        // The whole checkout falls inside one quiet window.
        tokio::time::sleep(Duration::from_millis(900)).await;
        assert!(!updates.has_changed()?);

        debouncer.shutdown();
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_no_changes_no_snapshot() -> anyhow::Result<()> {
        let repo = create_workflow_repo()?;
        let session = FlowSession::open(WorkspaceContext::new(&repo.path, Settings::default()))?;
        let synchronizer = session.synchronizer();
        let updates = synchronizer.subscribe();

        let debouncer = RefreshDebouncer::spawn(synchronizer.clone(), Duration::from_millis(100));
        let metadata_dir = GitRepo::open(&repo.path)?.get_repo_path();
        let _watcher = watch_metadata(&metadata_dir, debouncer.handle())?;

        create_file(&repo.path, "notes.txt", "not tracked")?;
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert!(!updates.has_changed()?);
        debouncer.shutdown();
        Ok(())
    }
}
