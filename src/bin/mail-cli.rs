#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! CLI for reading mail over IMAP (read-only)

use clap::{Parser, Subcommand};
use mail_retrieval::{Email, EmailSummary, MailClient, MailConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mail-cli")]
#[command(about = "Read-only IMAP mail retrieval")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// List the most recent emails
    Recent {
        /// Folder to read from
        #[arg(long, default_value = "INBOX")]
        folder: String,

        /// Number of messages (defaults to IMAP_FETCH_COUNT)
        #[arg(long)]
        count: Option<u32>,
    },

    /// Show a single email by identifier
    Show {
        /// Email identifier
        uid: u32,

        /// Folder containing the email
        #[arg(long, default_value = "INBOX")]
        folder: String,
    },

    /// List available mailboxes
    Folders,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = MailConfig::from_env()?;
    let client = MailClient::new(config);

    match &args.command {
        Command::Recent { folder, count } => {
            cmd_recent(&client, &args, folder, *count).await?;
        }
        Command::Show { uid, folder } => {
            cmd_show(&client, &args, folder, *uid).await?;
        }
        Command::Folders => {
            cmd_folders(&client, &args).await?;
        }
    }

    Ok(())
}

async fn cmd_recent(
    client: &MailClient,
    args: &Args,
    folder: &str,
    count: Option<u32>,
) -> anyhow::Result<()> {
    let emails = match count {
        Some(count) => client.fetch_recent(folder, count).await?,
        None => client.fetch_latest(folder).await?,
    };

    if args.json {
        let summaries: Vec<EmailSummary> = emails.iter().map(Email::as_summary).collect();
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        print_email_table(&emails);
    }

    Ok(())
}

async fn cmd_show(client: &MailClient, args: &Args, folder: &str, uid: u32) -> anyhow::Result<()> {
    let Some(email) = client.fetch_by_uid(folder, uid).await? else {
        anyhow::bail!("No message {uid} in {folder}");
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&email.as_summary())?);
    } else {
        print_email_detail(&email);
    }

    Ok(())
}

async fn cmd_folders(client: &MailClient, args: &Args) -> anyhow::Result<()> {
    let mailboxes = client.list_mailboxes().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&mailboxes)?);
    } else {
        for mailbox in &mailboxes {
            println!("{:<30} {}", mailbox.clean_name, mailbox.original_name);
        }
    }

    Ok(())
}

fn print_email_table(emails: &[Email]) {
    if emails.is_empty() {
        println!("No emails found.");
        return;
    }

    let header = format!("{:<8} {:<20} {:<30} {}", "UID", "Date", "From", "Subject");
    println!("{header}");
    println!("{}", "-".repeat(100));

    for email in emails {
        println!(
            "{:<8} {:<20} {:<30} {}",
            email.uid(),
            email.date().format("%Y-%m-%d %H:%M"),
            truncate(email.from(), 28),
            truncate(email.subject(), 40),
        );
    }

    println!("\n{} email(s)", emails.len());
}

fn print_email_detail(email: &Email) {
    println!("UID:     {}", email.uid());
    println!("Date:    {}", email.date().format("%Y-%m-%d %H:%M:%S"));
    println!("From:    {}", email.from());
    println!("To:      {}", email.to());
    println!("Subject: {}", email.subject());
    println!("Msg-ID:  {}", email.message_id().unwrap_or("-"));
    println!("Size:    {}", email.size());

    let flags: Vec<String> = email.flags().iter().map(ToString::to_string).collect();
    println!("Flags:   {}", flags.join(" "));

    if let Some(references) = email.references() {
        println!("Refs:    {references}");
    }

    println!("\n--- Body ---\n");
    println!("{}", email.text().or_else(|| email.body()).unwrap_or(""));

    if !email.attachments().is_empty() {
        println!("\n--- Attachments ---");
        for attachment in email.attachments() {
            println!(
                "  {} ({}, {} bytes)",
                attachment.filename(),
                attachment.content_type(),
                attachment.size()
            );
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}
