use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};

use inbox_mind::auth::secrets;
use inbox_mind::config::load_config;
use inbox_mind::llm::GroqClient;
use inbox_mind::mail::ImapClient;
use inbox_mind::terminal::run_tui;

#[derive(Parser)]
#[command(name = "inbox_mind")]
#[command(about = "Chat with an AI about your most recent emails", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Open the login form and chat (default)
    Chat {
        /// Pre-fill the email address field
        #[arg(long)]
        address: Option<String>,
    },

    /// Store the model API key in the OS keyring
    SetApiKey,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.cmd.unwrap_or(Command::Chat { address: None }) {
        Command::SetApiKey => {
            eprintln!("Paste API key (end with Ctrl-D):");
            let mut key = String::new();
            std::io::Read::read_to_string(&mut std::io::stdin(), &mut key)?;
            let key = key.trim();
            if key.is_empty() {
                return Err(anyhow!("no key given"));
            }
            secrets::save_api_key(key)?;
            println!("Saved API key to keyring");
            Ok(())
        }

        Command::Chat { address } => {
            let cfg = load_config().map_err(|e| anyhow!("Configuration error: {e}"))?;

            let api_key = secrets::resolve_api_key(&cfg.api_key_env)?;
            let model = GroqClient::new(api_key)?
                .with_api_base(&cfg.api_base)
                .with_model(&cfg.model)
                .with_temperature(cfg.temperature);

            let mailbox = ImapClient::new(&cfg.imap_server, cfg.imap_port)
                .with_folder(&cfg.folder)
                .with_window(cfg.fetch_count);

            run_tui(&mailbox, &model, address.or(cfg.user_email))
        }
    }
}
