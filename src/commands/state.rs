use crate::commands::{cache_snapshot, open_session};
use crate::core::{
    debounce::{RefreshDebouncer, RefreshTrigger},
    error::Result,
    git::GitRepo,
    output::{print_info, print_snapshot},
    UiStateSnapshot, WorkspaceContext,
};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Serialize)]
struct StateReport<'a> {
    #[serde(flatten)]
    snapshot: &'a UiStateSnapshot,
    flags: BTreeMap<String, bool>,
}

/// Refresh once and print the snapshot. Succeeds outside a repository with
/// the all-false state.
pub async fn execute_state(context: WorkspaceContext, json: bool) -> Result<()> {
    let session = open_session(context)?;
    let snapshot = session.refresh().await;
    cache_snapshot(session.context(), &snapshot);

    if json {
        let report = StateReport {
            flags: snapshot.flags(),
            snapshot: &snapshot,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_snapshot(&snapshot);
    }
    Ok(())
}

/// Whether a filesystem event under the metadata directory can change branch
/// state. Object writes and lock files are ignored.
pub fn is_metadata_change(metadata_dir: &Path, event: &notify::Event) -> bool {
    if !(event.kind.is_create() || event.kind.is_modify() || event.kind.is_remove()) {
        return false;
    }
    event.paths.iter().any(|path| {
        let Ok(relative) = path.strip_prefix(metadata_dir) else {
            return false;
        };
        let noisy = relative.starts_with("objects")
            || relative.extension().is_some_and(|ext| ext == "lock");
        !noisy
    })
}

/// Fire `trigger` for every relevant change under `metadata_dir`. Watching
/// stops when the returned watcher is dropped.
pub fn watch_metadata(metadata_dir: &Path, trigger: RefreshTrigger) -> Result<RecommendedWatcher> {
    let watched = metadata_dir.to_path_buf();
    let mut watcher =
        notify::recommended_watcher(move |event: notify::Result<notify::Event>| match event {
            Ok(event) if is_metadata_change(&watched, &event) => {
                trigger.fire();
            }
            Ok(_) => {}
            Err(e) => log::warn!("Watch error: {e}"),
        })?;
    watcher.watch(metadata_dir, RecursiveMode::Recursive)?;
    Ok(watcher)
}

/// Print the snapshot every time it changes until interrupted.
pub async fn execute_watch(context: WorkspaceContext) -> Result<()> {
    let metadata_dir = GitRepo::open(&context.repo_path)?.get_repo_path();
    let window = context.settings.refresh_debounce();
    let session = open_session(context)?;
    let synchronizer = session.synchronizer();
    let mut updates = synchronizer.subscribe();

    let debouncer = RefreshDebouncer::spawn(synchronizer.clone(), window);
    let watcher = watch_metadata(&metadata_dir, debouncer.handle())?;

    print_info(&format!(
        "Watching {} (Ctrl-C to stop)",
        metadata_dir.display()
    ));
    synchronizer.refresh().await;

    let mut last_printed: Option<UiStateSnapshot> = None;
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                if last_printed.as_ref() != Some(&snapshot) {
                    print_snapshot(&snapshot);
                    cache_snapshot(session.context(), &snapshot);
                    last_printed = Some(snapshot);
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    debouncer.shutdown();
    drop(watcher);
    Ok(())
}
