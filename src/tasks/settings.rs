//! Settings template merge and credential profile check.
use anyhow::Result;
use serde_json::Value;
use std::path::Path;

use super::{Context, Task};
use crate::logging::LogEntry;
use crate::resources::helpers::fs::is_regular_file;
use crate::settings::SettingsMerge;

/// Merge the settings template into the installed settings document.
#[derive(Debug)]
pub struct MergeGlobalSettings;

impl Task for MergeGlobalSettings {
    fn name(&self) -> &'static str {
        "Merge settings"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.selection.scope.includes_global() && is_regular_file(&ctx.config.settings_template())
    }

    fn run(&self, ctx: &Context) -> Result<()> {
        let dest = ctx.config.settings_target();
        let merge = SettingsMerge {
            template: ctx.config.settings_template(),
            label: ctx.label(&dest),
            dest,
            policy: ctx.config.manifest.settings.clone(),
            model: ctx.model.clone(),
        };
        if let Some(model) = &merge.model {
            ctx.log.debug(&format!("default model: {model}"));
        }
        ctx.record_all(merge.apply()?);

        if let Some(template) = merge.template_value()
            && let Some(profile) = aws_profile(&template)
            && !aws_profile_configured(&ctx.config.aws_config(), profile)
        {
            ctx.record(LogEntry::warning(format!(
                "AWS profile '{profile}' not found in {}, run: aws configure sso --profile {profile}",
                ctx.label(&ctx.config.aws_config())
            )));
        }
        Ok(())
    }
}

/// `env.AWS_PROFILE` of a settings document.
fn aws_profile(settings: &Value) -> Option<&str> {
    settings
        .get("env")?
        .get("AWS_PROFILE")?
        .as_str()
        .filter(|p| !p.is_empty())
}

/// Whether the AWS CLI config at `path` declares `profile`.
///
/// The `default` profile is declared as `[default]`, every other one as
/// `[profile <name>]`. An unreadable file declares nothing.
fn aws_profile_configured(path: &Path, profile: &str) -> bool {
    let Ok(text) = std::fs::read_to_string(path) else {
        return false;
    };
    let wanted = if profile == "default" {
        "[default]".to_string()
    } else {
        format!("[profile {profile}]")
    };
    text.lines().any(|line| line.trim() == wanted)
}
