use clap::Parser;
use colored::Colorize;
use dotenv::dotenv;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use std::sync::Arc;

use resume_rag::commands::CommandHandler;
use resume_rag::config::AppConfig;
use resume_rag::manager::ResumeManager;
use resume_rag::providers::openai::OpenAIProvider;
use resume_rag::providers::traits::CompletionProvider;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long)]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    colored::control::set_override(true);
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let config = AppConfig::from_env(args.api_key)?;

    let provider: Arc<dyn CompletionProvider> = Arc::new(OpenAIProvider::new(&config));
    println!(
        "{} {}",
        "Resume assistant using".cyan(),
        provider.model_info().cyan().bold()
    );

    let manager = ResumeManager::new(provider.clone(), &config);
    let mut command_handler = CommandHandler::new(manager, provider);

    // Show initial help menu
    command_handler.handle_command("help").await.ok();

    let mut rl = Editor::<(), DefaultHistory>::new()?;

    loop {
        match rl.readline("👤 ") {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(input);

                if input == "exit" || input == "quit" {
                    break;
                }

                if let Err(e) = command_handler.handle_command(input).await {
                    println!("{}", e.red());
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    Ok(())
}
