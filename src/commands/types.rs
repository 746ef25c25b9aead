use crate::commands::open_session;
use crate::core::{
    error::Result, output::print_section_header, BranchTypeConfig, WorkspaceContext,
};
use colored::*;

fn describe(config: &BranchTypeConfig) -> String {
    let mut details = Vec::new();
    if let Some(parent) = &config.parent {
        details.push(format!("parent {parent}"));
    }
    if let Some(start) = &config.start_point {
        details.push(format!("starts from {start}"));
    }
    if config.is_topic() {
        details.push(format!("finish {}", config.upstream_strategy));
        details.push(format!("update {}", config.downstream_strategy));
    }
    if config.creates_tag {
        details.push(if config.tag_prefix.is_empty() {
            "tags".to_string()
        } else {
            format!("tags {}*", config.tag_prefix)
        });
    }
    if config.auto_update {
        details.push("auto-update".to_string());
    }
    details.join(", ")
}

/// List the branch types this repository's workflow configuration defines.
pub fn execute_types(context: WorkspaceContext) -> Result<()> {
    let session = open_session(context)?;
    let registry = session.registry();

    print_section_header("Base branches");
    for config in registry.base_types() {
        println!(
            "  {} {}",
            config.base_branch_name().blue(),
            describe(config).bright_black()
        );
    }

    print_section_header("Topic branches");
    for config in registry.topic_types() {
        println!(
            "  {:<10} {:<12} {}",
            config.name.green(),
            config.prefix.white(),
            describe(config).bright_black()
        );
    }
    println!();
    Ok(())
}
