use colored::Colorize;

pub fn handle_error(err: anyhow::Error) -> ! {
    eprintln!("{} {:#}", "Error:".red().bold(), err);

    let msg = format!("{:#}", err).to_lowercase();

    if msg.contains("preset not found") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  List available presets with:");
        eprintln!("  {} chatbench preset list", "$".dimmed());
    }

    if msg.contains("http 503") || msg.contains("no completion provider") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  Start the server with an OpenAI key:");
        eprintln!("  {} OPENAI_API_KEY=<key> chatbench-server", "$".dimmed());
    }

    if msg.contains("connection refused") || msg.contains("error sending request") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  Make sure chatbench-server is running, or point at it with:");
        eprintln!("  {} chatbench --server http://host:3001 ...", "$".dimmed());
    }

    std::process::exit(1);
}
