//! Photo push client

mod constants;
mod download;
mod keypair;
mod logger;
mod subscribe;
mod upload;

use clap::{Parser, Subcommand};
use common::RecipientId;
use constants::{DEFAULT_KEY_DIR, DEFAULT_SERVER_URL};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "client")]
#[command(about = "Photo push client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new VAPID key pair for the server
    GenerateVapidKeys {
        /// Directory to write the PEM files into
        #[arg(short, long, default_value = DEFAULT_KEY_DIR)]
        out_dir: PathBuf,
        /// Overwrite existing keys
        #[arg(short, long)]
        force: bool,
    },
    /// Print the server's VAPID public key
    PublicKey {
        /// Server URL
        #[arg(short, long, default_value = DEFAULT_SERVER_URL)]
        server: String,
    },
    /// Register a browser push subscription
    Subscribe {
        /// Push service endpoint URL
        #[arg(short, long)]
        endpoint: String,
        /// Subscriber public key (base64url)
        #[arg(short, long)]
        p256dh: String,
        /// Subscriber auth secret (base64url)
        #[arg(short, long)]
        auth: String,
        /// Server URL
        #[arg(short, long, default_value = DEFAULT_SERVER_URL)]
        server: String,
    },
    /// Upload a photo and notify recipients
    SendPhoto {
        /// Photo to upload
        #[arg(short, long)]
        file: PathBuf,
        /// Recipient id, repeatable
        #[arg(short, long = "recipient")]
        recipients: Vec<String>,
        /// Sender name shown in the notification
        #[arg(long)]
        from: Option<String>,
        /// Server URL
        #[arg(short, long, default_value = DEFAULT_SERVER_URL)]
        server: String,
    },
    /// Download a stored photo
    FetchPhoto {
        /// Photo filename as returned by send-photo
        filename: String,
        /// Where to write the photo (default: ./<filename>)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Server URL
        #[arg(short, long, default_value = DEFAULT_SERVER_URL)]
        server: String,
    },
}

fn main() -> anyhow::Result<()> {
    logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::GenerateVapidKeys { out_dir, force } => {
            keypair::generate_vapid_keys(&out_dir, force)?;
        }
        Commands::PublicKey { server } => {
            println!("{}", subscribe::fetch_public_key(&server)?);
        }
        Commands::Subscribe {
            endpoint,
            p256dh,
            auth,
            server,
        } => {
            let user_id = subscribe::subscribe(&server, &endpoint, &p256dh, &auth)?;
            println!("✓ Subscribed");
            println!("Recipient ID: {}", user_id);
        }
        Commands::SendPhoto {
            file,
            recipients,
            from,
            server,
        } => {
            let recipients = recipients.into_iter().map(RecipientId::new).collect();
            let result = upload::send_photo(&server, &file, recipients, from)?;
            println!("✓ {}", result.message);
            println!("Filename: {}", result.filename);
        }
        Commands::FetchPhoto {
            filename,
            output,
            server,
        } => {
            download::fetch_photo(&server, &filename, output.as_deref())?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_send_photo_collects_recipients() {
        let cli = Cli::try_parse_from([
            "client",
            "send-photo",
            "--file",
            "a.jpg",
            "--recipient",
            "1",
            "-r",
            "2",
        ])
        .unwrap();
        match cli.command {
            Commands::SendPhoto {
                recipients, server, ..
            } => {
                assert_eq!(recipients, vec!["1", "2"]);
                assert_eq!(server, DEFAULT_SERVER_URL);
            }
            _ => panic!("expected send-photo"),
        }
    }
}
