use colored::Colorize;
use skyport_provider::RESOURCE_TYPES;

pub fn list_resources() {
    println!("{}", "Supported resource types:".bold());
    for name in RESOURCE_TYPES {
        println!("  • {}", name.cyan());
    }
}
