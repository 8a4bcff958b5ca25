use colored::Colorize;

fn main() {
    if let Err(e) = mountctl::run() {
        eprintln!("{} {}", "error:".bright_red().bold(), e);
        std::process::exit(if e.is_usage_error() { 2 } else { 1 });
    }
}
