//! Predefined repository scenarios

#![allow(dead_code)]

use super::repository::*;
use flow_navigator::core::error::Result;

/// `main`, `develop`, two features and a release, checked out on `feature/login`
pub fn create_workflow_repo() -> Result<TestRepo> {
    let repo = setup_test_repo_with_develop()?;

    create_branch(&repo.path, "feature/login")?;
    create_branch(&repo.path, "feature/api")?;
    create_branch(&repo.path, "release/1.0")?;
    checkout(&repo.path, "feature/login")?;

    Ok(repo)
}

/// Branch types defined in git config: a custom `chore/` kind and no hotfixes
pub fn create_custom_types_repo() -> Result<TestRepo> {
    let repo = setup_test_repo_with_develop()?;

    set_config(&repo.path, "gitflow.branch.main.type", "base")?;
    set_config(&repo.path, "gitflow.branch.develop.type", "base")?;
    set_config(&repo.path, "gitflow.branch.develop.parent", "main")?;
    set_config(&repo.path, "gitflow.branch.feature.type", "topic")?;
    set_config(&repo.path, "gitflow.branch.feature.parent", "develop")?;
    set_config(&repo.path, "gitflow.branch.feature.prefix", "feature/")?;
    set_config(&repo.path, "gitflow.branch.chore.type", "topic")?;
    set_config(&repo.path, "gitflow.branch.chore.parent", "develop")?;
    set_config(&repo.path, "gitflow.branch.chore.prefix", "chore/")?;

    create_branch(&repo.path, "chore/deps")?;
    checkout(&repo.path, "chore/deps")?;

    Ok(repo)
}
