//! Check operation - summarize a resolved config.

use tsb_config::{ExtensionAxis, ResolvedConfig};

use crate::reports::CheckReport;

/// Build the check report for a resolved config.
///
/// Errors never reach here: the pipeline stops at the first one.
pub fn check(resolved: &ResolvedConfig) -> CheckReport {
    let warnings = resolved
        .warnings()
        .map(|diag| match &diag.location {
            Some(loc) => format!("{}\n  --> {}", diag.message, loc),
            None => diag.message.clone(),
        })
        .collect();

    let options_chain = resolved
        .tsconfig
        .iter()
        .flat_map(|options| options.chain.iter())
        .map(|path| path.display().to_string())
        .collect();

    let extensions = ExtensionAxis::ALL
        .iter()
        .map(|axis| (axis.hook_field(), resolved.extensions.get(*axis).len()))
        .collect();

    CheckReport {
        config_path: resolved.config_path.clone(),
        command: resolved.command.to_string(),
        mode: resolved.mode.to_string(),
        main: resolved.main.display().to_string(),
        bundle: resolved
            .main_out_dir
            .join(resolved.bundle_file_name())
            .display()
            .to_string(),
        options_chain,
        env_count: resolved.env.len(),
        index_html_env_count: resolved.index_html_env.len(),
        hooks: resolved.hooks.names().map(str::to_string).collect(),
        extensions,
        warnings,
    }
}
