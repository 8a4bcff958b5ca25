//! Text rendering helpers for CLI surfaces.

use clap::ValueEnum;
use colored::Colorize;

use crate::mounts::plan::MountPlan;
use crate::mounts::state::MountState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Shorten a mount argument for listing. The middle of the host path is
/// dropped so the service list and the folder name stay readable.
pub fn elide_middle(source: &str, max_chars: usize) -> String {
    let chars: Vec<char> = source.chars().collect();
    if chars.len() <= max_chars || max_chars <= 3 {
        return source.to_string();
    }
    let keep = max_chars - 3;
    let head = keep / 2;
    let tail = keep - head;
    let mut out: String = chars[..head].iter().collect();
    out.push_str("...");
    out.extend(&chars[chars.len() - tail..]);
    out
}

/// One `Bind-mount:` line per service, app services first.
pub fn render_plan(plan: &MountPlan) -> String {
    let mut out = String::new();
    for bind in plan.app_binds().chain(plan.job_binds()) {
        out.push_str(&format!(
            "{} {} -> {} in {}\n",
            "Bind-mount:".bright_cyan(),
            bind.host_path.display(),
            bind.container_path,
            bind.service
        ));
    }
    out
}

pub fn render_state(label: &str, state: &MountState, fingerprint: &str) -> String {
    let mut out = format!(
        "{} generation {} ({} directive(s), fingerprint {})\n",
        format!("[{}]", label).bold(),
        state.generation,
        state.directives.len(),
        &fingerprint[..fingerprint.len().min(12)]
    );
    if state.is_empty() {
        out.push_str("  no bind-mounts\n");
        return out;
    }
    for d in &state.directives {
        let services = d.services.iter().cloned().collect::<Vec<_>>().join(",");
        out.push_str(&format!(
            "  {} {}\n    {} -> {} in {}\n",
            "-".bright_yellow(),
            elide_middle(&d.source, 80),
            d.host_path.display(),
            d.container_path,
            services
        ));
    }
    out
}
