use colored::Colorize;
use skyport_cloud::{Diagnostics, Severity};

/// Status line on stderr; stdout is reserved for state.
pub fn progress(message: String) {
    eprintln!("{}", message.blue());
}

pub fn print_diagnostics(diags: &Diagnostics) {
    for diag in &diags.items {
        let label = match diag.severity {
            Severity::Error => "Error:".red().bold(),
            Severity::Warning => "Warning:".yellow().bold(),
        };
        eprintln!("{} {}", label, diag.summary);
        if !diag.detail.is_empty() {
            for line in diag.detail.lines() {
                eprintln!("  {}", line);
            }
        }
        eprintln!();
    }
}
