//! Layered resolution of command arguments.
//!
//! Three layers feed every option, highest first:
//! 1. the explicit per-invocation choice ([`ExplicitChoice`])
//! 2. the persisted operation override ([`OperationOverride`])
//! 3. the branch-type default ([`BranchTypeConfig`], i.e. git config)
//!
//! Each option resolves on its own. A layer left at `use-git-config` defers to
//! the layer below for that option only. Options whose bottom layer is the
//! workflow tool's own git config emit no flag when nothing above it is set;
//! tag creation is the exception and always emits `--tag` or `--notag`.

use crate::core::error::{FlowNavigatorError, Result};
use crate::core::registry::{BranchTypeConfig, BranchTypeRegistry, MergeStrategy};
use crate::core::settings::{
    ExplicitChoice, FastForwardMode, Operation, OperationOverride, RetentionMode, Setting,
};

/// Which layer a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Explicit,
    Override,
    BranchDefault,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    pub value: T,
    pub layer: Layer,
}

fn pick<T: Clone>(explicit: &Setting<T>, persisted: &Setting<T>, default: T) -> Resolved<T> {
    pick_optional(explicit, persisted).unwrap_or(Resolved {
        value: default,
        layer: Layer::BranchDefault,
    })
}

fn pick_optional<T: Clone>(explicit: &Setting<T>, persisted: &Setting<T>) -> Option<Resolved<T>> {
    if let Some(value) = explicit.value() {
        return Some(Resolved {
            value: value.clone(),
            layer: Layer::Explicit,
        });
    }
    persisted.value().map(|value| Resolved {
        value: value.clone(),
        layer: Layer::Override,
    })
}

/// Ordered flags and positional values appended after the command target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedArguments(Vec<String>);

impl ResolvedArguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, arg: impl Into<String>) {
        self.0.push(arg.into());
    }

    pub fn contains(&self, arg: &str) -> bool {
        self.0.iter().any(|a| a == arg)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl<S: Into<String>> FromIterator<S> for ResolvedArguments {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Typed result of resolution, before it is flattened into flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOptions {
    pub operation: Operation,
    pub strategy: Resolved<MergeStrategy>,
    pub tag: Resolved<bool>,
    pub sign_tag: bool,
    pub prompt_for_tag_message: bool,
    pub tag_message: Option<String>,
    pub tag_message_file: Option<Resolved<String>>,
    pub retention: RetentionMode,
    pub force_delete: bool,
    pub fetch: bool,
    pub fast_forward: Option<FastForwardMode>,
    pub preserve_merges: Option<bool>,
    pub base_ref: Option<String>,
}

impl ResolvedOptions {
    /// The typed tag message, trimmed. Blank counts as no message.
    pub fn tag_message(&self) -> Option<&str> {
        self.tag_message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }

    /// A finish that tags, with prompting enabled and no message source chosen
    /// for this invocation.
    pub fn needs_tag_message_prompt(&self) -> bool {
        let explicit_file = self
            .tag_message_file
            .as_ref()
            .is_some_and(|file| file.layer == Layer::Explicit);
        self.operation == Operation::Finish
            && self.tag.value
            && self.prompt_for_tag_message
            && self.tag_message().is_none()
            && !explicit_file
    }

    /// Flatten into the flag list for the resolved operation.
    pub fn to_arguments(&self) -> ResolvedArguments {
        let mut args = ResolvedArguments::new();
        match self.operation {
            Operation::Start => {
                if let Some(base) = &self.base_ref {
                    args.push(base.clone());
                }
                if self.fetch {
                    args.push("--fetch");
                }
            }
            Operation::Update => {
                if self.strategy.layer != Layer::BranchDefault {
                    match self.strategy.value {
                        MergeStrategy::Rebase => args.push("--rebase"),
                        _ => args.push("--no-rebase"),
                    }
                }
            }
            Operation::Finish => self.push_finish_arguments(&mut args),
        }
        args
    }

    fn push_finish_arguments(&self, args: &mut ResolvedArguments) {
        if self.strategy.layer != Layer::BranchDefault {
            match self.strategy.value {
                MergeStrategy::Rebase => args.push("--rebase"),
                MergeStrategy::Squash => args.push("--squash"),
                MergeStrategy::Merge => {
                    args.push("--no-rebase");
                    args.push("--no-squash");
                }
            }
        }

        if self.tag.value {
            args.push("--tag");
            if self.sign_tag {
                args.push("--sign");
            }
            if let Some(message) = self.tag_message() {
                args.push("--message");
                args.push(message);
            } else if let Some(file) = &self.tag_message_file {
                args.push("--messagefile");
                args.push(file.value.clone());
            }
        } else {
            args.push("--notag");
        }

        // Delete is the tool's own behavior and has no flag.
        match self.retention {
            RetentionMode::Delete => {}
            RetentionMode::Keep => args.push("--keep"),
            RetentionMode::KeepLocal => args.push("--keeplocal"),
            RetentionMode::KeepRemote => args.push("--keepremote"),
        }
        if self.force_delete {
            args.push("--force-delete");
        }

        match self.fast_forward {
            Some(FastForwardMode::NoFf) => args.push("--no-ff"),
            Some(FastForwardMode::Ff) => args.push("--ff"),
            None => {}
        }
        match self.preserve_merges {
            Some(true) => args.push("--preserve-merges"),
            Some(false) => args.push("--no-preserve-merges"),
            None => {}
        }
    }
}

/// Resolve options for a branch type already looked up in the registry.
pub fn resolve_options(
    config: &BranchTypeConfig,
    operation: Operation,
    overrides: &OperationOverride,
    explicit: &ExplicitChoice,
) -> Result<ResolvedOptions> {
    let chosen = &explicit.overrides;

    let default_strategy = match operation {
        Operation::Update => config.downstream_strategy,
        _ => config.upstream_strategy,
    };
    let strategy = pick(&chosen.merge, &overrides.merge, default_strategy);
    if operation == Operation::Update && strategy.value == MergeStrategy::Squash {
        return Err(FlowNavigatorError::invalid_override(
            &config.name,
            operation.as_str(),
            "merge",
            "update cannot squash",
        ));
    }

    let options = ResolvedOptions {
        operation,
        strategy,
        tag: pick(&chosen.tag, &overrides.tag, config.creates_tag),
        sign_tag: pick(&chosen.sign_tag, &overrides.sign_tag, false).value,
        prompt_for_tag_message: pick(
            &chosen.prompt_for_tag_message,
            &overrides.prompt_for_tag_message,
            false,
        )
        .value,
        tag_message: explicit.tag_message.clone(),
        tag_message_file: pick_optional(&chosen.tag_message_file, &overrides.tag_message_file),
        retention: pick(&chosen.retention, &overrides.retention, RetentionMode::Delete).value,
        force_delete: pick(&chosen.force_delete, &overrides.force_delete, false).value,
        fetch: pick(&chosen.fetch, &overrides.fetch, false).value,
        fast_forward: pick_optional(&chosen.fast_forward, &overrides.fast_forward)
            .map(|r| r.value),
        preserve_merges: pick_optional(&chosen.preserve_merges, &overrides.preserve_merges)
            .map(|r| r.value),
        base_ref: explicit.base_ref.clone().filter(|b| !b.trim().is_empty()),
    };

    log::debug!(
        "Resolved {} {}: strategy={} ({:?}), tag={} ({:?})",
        config.name,
        operation,
        options.strategy.value,
        options.strategy.layer,
        options.tag.value,
        options.tag.layer
    );
    Ok(options)
}

/// Resolves (kind, operation) pairs against a registry.
#[derive(Debug, Clone, Copy)]
pub struct SettingsResolver<'a> {
    registry: &'a BranchTypeRegistry,
}

impl<'a> SettingsResolver<'a> {
    pub fn new(registry: &'a BranchTypeRegistry) -> Self {
        Self { registry }
    }

    /// Typed resolution. Fails with `UnknownBranchType` for anything that is
    /// not a registered topic kind; there is no generic fallback.
    pub fn resolve_options(
        &self,
        kind: &str,
        operation: Operation,
        overrides: &OperationOverride,
        explicit: &ExplicitChoice,
    ) -> Result<ResolvedOptions> {
        let config = self.registry.topic(kind)?;
        resolve_options(config, operation, overrides, explicit)
    }

    pub fn resolve(
        &self,
        kind: &str,
        operation: Operation,
        overrides: &OperationOverride,
        explicit: &ExplicitChoice,
    ) -> Result<ResolvedArguments> {
        Ok(self
            .resolve_options(kind, operation, overrides, explicit)?
            .to_arguments())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> BranchTypeRegistry {
        BranchTypeRegistry::preset()
    }

    fn finish(kind: &str, overrides: &OperationOverride) -> Result<ResolvedArguments> {
        SettingsResolver::new(&registry()).resolve(
            kind,
            Operation::Finish,
            overrides,
            &ExplicitChoice::default(),
        )
    }

    #[test]
    fn test_release_finish_tags_by_default() -> Result<()> {
        let args = finish("release", &OperationOverride::default())?;
        assert!(args.contains("--tag"));
        assert!(!args.contains("--notag"));
        Ok(())
    }

    #[test]
    fn test_feature_finish_disables_tag_explicitly() -> Result<()> {
        let args = finish("feature", &OperationOverride::default())?;
        assert_eq!(args, ResolvedArguments::from_iter(["--notag"]));
        Ok(())
    }

    #[test]
    fn test_tag_axis_is_total() -> Result<()> {
        for kind in ["feature", "bugfix", "release", "hotfix", "support"] {
            for tag in [Setting::UseGitConfig, Setting::Value(true), Setting::Value(false)] {
                let overrides = OperationOverride {
                    tag,
                    ..OperationOverride::default()
                };
                let args = finish(kind, &overrides)?;
                assert!(args.contains("--tag") ^ args.contains("--notag"));
            }
        }
        Ok(())
    }

    #[test]
    fn test_operation_override_rebase_wins_over_default_merge() -> Result<()> {
        let overrides = OperationOverride {
            merge: Setting::Value(MergeStrategy::Rebase),
            ..OperationOverride::default()
        };
        let options = SettingsResolver::new(&registry()).resolve_options(
            "feature",
            Operation::Finish,
            &overrides,
            &ExplicitChoice::default(),
        )?;

        assert_eq!(options.strategy.value, MergeStrategy::Rebase);
        assert_eq!(options.strategy.layer, Layer::Override);
        assert!(options.to_arguments().contains("--rebase"));
        Ok(())
    }

    #[test]
    fn test_overriding_merge_leaves_tag_untouched() -> Result<()> {
        let plain = finish("release", &OperationOverride::default())?;
        let rebased = finish(
            "release",
            &OperationOverride {
                merge: Setting::Value(MergeStrategy::Rebase),
                ..OperationOverride::default()
            },
        )?;

        assert_eq!(plain.contains("--tag"), rebased.contains("--tag"));
        assert_eq!(plain.contains("--notag"), rebased.contains("--notag"));
        Ok(())
    }

    #[test]
    fn test_explicit_beats_override_beats_default() -> Result<()> {
        let overrides = OperationOverride {
            tag: Setting::Value(false),
            merge: Setting::Value(MergeStrategy::Squash),
            ..OperationOverride::default()
        };
        let explicit = ExplicitChoice {
            overrides: OperationOverride {
                tag: Setting::Value(true),
                ..OperationOverride::default()
            },
            ..ExplicitChoice::default()
        };

        let options = SettingsResolver::new(&registry()).resolve_options(
            "feature",
            Operation::Finish,
            &overrides,
            &explicit,
        )?;
        assert!(options.tag.value);
        assert_eq!(options.tag.layer, Layer::Explicit);
        assert_eq!(options.strategy.value, MergeStrategy::Squash);
        assert_eq!(options.strategy.layer, Layer::Override);
        Ok(())
    }

    #[test]
    fn test_sentinel_at_explicit_layer_defers() -> Result<()> {
        let overrides = OperationOverride {
            merge: Setting::Value(MergeStrategy::Rebase),
            ..OperationOverride::default()
        };
        let explicit = ExplicitChoice {
            overrides: OperationOverride {
                merge: Setting::UseGitConfig,
                ..OperationOverride::default()
            },
            ..ExplicitChoice::default()
        };

        let args = SettingsResolver::new(&registry()).resolve(
            "feature",
            Operation::Finish,
            &overrides,
            &explicit,
        )?;
        assert!(args.contains("--rebase"));
        Ok(())
    }

    #[test]
    fn test_default_strategy_emits_no_flag() -> Result<()> {
        let args = finish("hotfix", &OperationOverride::default())?;
        assert!(!args.contains("--rebase"));
        assert!(!args.contains("--no-rebase"));
        assert!(!args.contains("--squash"));
        Ok(())
    }

    #[test]
    fn test_retention_and_force_delete_are_independent() -> Result<()> {
        let cases = [
            (RetentionMode::Delete, None),
            (RetentionMode::Keep, Some("--keep")),
            (RetentionMode::KeepLocal, Some("--keeplocal")),
            (RetentionMode::KeepRemote, Some("--keepremote")),
        ];
        for (mode, flag) in cases {
            let overrides = OperationOverride {
                retention: Setting::Value(mode),
                force_delete: Setting::Value(true),
                ..OperationOverride::default()
            };
            let args = finish("feature", &overrides)?;
            let keep_flags = ["--keep", "--keeplocal", "--keepremote"]
                .iter()
                .filter(|f| args.contains(f))
                .count();

            assert_eq!(keep_flags, usize::from(flag.is_some()));
            if let Some(flag) = flag {
                assert!(args.contains(flag));
            }
            assert!(args.contains("--force-delete"));
        }
        Ok(())
    }

    #[test]
    fn test_fast_forward_and_preserve_merges_only_when_set() -> Result<()> {
        let args = finish("feature", &OperationOverride::default())?;
        assert!(!args.contains("--no-ff"));
        assert!(!args.contains("--preserve-merges"));

        let overrides = OperationOverride {
            fast_forward: Setting::Value(FastForwardMode::NoFf),
            preserve_merges: Setting::Value(false),
            ..OperationOverride::default()
        };
        let args = finish("feature", &overrides)?;
        assert!(args.contains("--no-ff"));
        assert!(args.contains("--no-preserve-merges"));
        Ok(())
    }

    #[test]
    fn test_tag_message_trimmed_and_dropped_when_blank() -> Result<()> {
        let reg = registry();
        let resolver = SettingsResolver::new(&reg);
        let mut explicit = ExplicitChoice {
            tag_message: Some("   ".to_string()),
            ..ExplicitChoice::default()
        };
        let overrides = OperationOverride::default();

        let args = resolver.resolve("release", Operation::Finish, &overrides, &explicit)?;
        assert!(!args.contains("--message"));

        explicit.tag_message = Some("  Release 1.4  ".to_string());
        let args = resolver.resolve("release", Operation::Finish, &overrides, &explicit)?;
        let slice = args.as_slice();
        let at = slice.iter().position(|a| a == "--message").unwrap();
        assert_eq!(slice[at + 1], "Release 1.4");
        Ok(())
    }

    #[test]
    fn test_prompt_skipped_only_for_explicit_message_source() -> Result<()> {
        let reg = registry();
        let resolver = SettingsResolver::new(&reg);
        let overrides = OperationOverride {
            prompt_for_tag_message: Setting::Value(true),
            tag_message_file: Setting::Value("CHANGES.md".to_string()),
            ..OperationOverride::default()
        };
        let mut explicit = ExplicitChoice::default();

        // A persisted file does not answer the prompt for this invocation.
        let options = resolver.resolve_options("release", Operation::Finish, &overrides, &explicit)?;
        assert!(options.needs_tag_message_prompt());

        explicit.tag_message = Some(" \t ".to_string());
        let options = resolver.resolve_options("release", Operation::Finish, &overrides, &explicit)?;
        assert!(options.needs_tag_message_prompt());

        explicit.tag_message = None;
        explicit.overrides.tag_message_file = Setting::Value("NOTES.md".to_string());
        let options = resolver.resolve_options("release", Operation::Finish, &overrides, &explicit)?;
        assert!(!options.needs_tag_message_prompt());
        assert_eq!(
            options.to_arguments(),
            ResolvedArguments::from_iter(["--tag", "--messagefile", "NOTES.md"])
        );
        Ok(())
    }

    #[test]
    fn test_tag_message_ignored_without_tag() -> Result<()> {
        let explicit = ExplicitChoice {
            tag_message: Some("unused".to_string()),
            ..ExplicitChoice::default()
        };
        let args = SettingsResolver::new(&registry()).resolve(
            "feature",
            Operation::Finish,
            &OperationOverride::default(),
            &explicit,
        )?;
        assert!(!args.contains("--message"));
        Ok(())
    }

    #[test]
    fn test_start_puts_base_before_flags() -> Result<()> {
        let explicit = ExplicitChoice {
            base_ref: Some("release/2.0".to_string()),
            ..ExplicitChoice::default()
        };
        let overrides = OperationOverride {
            fetch: Setting::Value(true),
            ..OperationOverride::default()
        };
        let args = SettingsResolver::new(&registry()).resolve(
            "feature",
            Operation::Start,
            &overrides,
            &explicit,
        )?;
        assert_eq!(args, ResolvedArguments::from_iter(["release/2.0", "--fetch"]));
        Ok(())
    }

    #[test]
    fn test_update_uses_downstream_strategy_and_rejects_squash() -> Result<()> {
        let reg = registry();
        let resolver = SettingsResolver::new(&reg);
        let options = resolver.resolve_options(
            "feature",
            Operation::Update,
            &OperationOverride::default(),
            &ExplicitChoice::default(),
        )?;
        assert_eq!(options.strategy.value, MergeStrategy::Rebase);
        assert!(options.to_arguments().is_empty());

        let squash = OperationOverride {
            merge: Setting::Value(MergeStrategy::Squash),
            ..OperationOverride::default()
        };
        let result = resolver.resolve(
            "feature",
            Operation::Update,
            &squash,
            &ExplicitChoice::default(),
        );
        assert!(matches!(result, Err(FlowNavigatorError::InvalidOverride { .. })));
        Ok(())
    }

    #[test]
    fn test_resolution_is_deterministic() -> Result<()> {
        let overrides = OperationOverride {
            retention: Setting::Value(RetentionMode::KeepLocal),
            sign_tag: Setting::Value(true),
            ..OperationOverride::default()
        };
        assert_eq!(finish("hotfix", &overrides)?, finish("hotfix", &overrides)?);
        Ok(())
    }

    #[test]
    fn test_unknown_kind_never_falls_back() {
        let result = finish("chore", &OperationOverride::default());
        assert!(matches!(
            result,
            Err(FlowNavigatorError::UnknownBranchType { ref name }) if name == "chore"
        ));
    }
}
