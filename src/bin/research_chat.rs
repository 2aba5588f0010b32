// Terminal front end for the chat endpoint

use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use research_chat_backend::client::{ChatSession, ClientError};
use research_chat_backend::history::Role;

const DEFAULT_ENDPOINT: &str = "http://localhost:3000/api/chat";

fn prompt() -> Result<()> {
    print!("> ");
    std::io::stdout().flush()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    research_chat_backend::init_tracing("warn");

    let endpoint =
        std::env::var("CHAT_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
    let session = ChatSession::new(endpoint.as_str());

    println!("技術記事リサーチャー ({})", endpoint);
    println!("Type a topic, /history to show the conversation, /quit to exit.");
    prompt()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let message = line.trim_end();
        match message {
            "" => {}
            "/quit" => break,
            "/history" => {
                for turn in session.turns() {
                    let who = match turn.role {
                        Role::User => "you",
                        Role::Assistant => "agent",
                        Role::System => "system",
                    };
                    println!("[{}] {}", who, turn.content);
                }
            }
            _ => {
                println!("thinking...");
                match session.send(message).await {
                    Ok(reply) => println!("{}\n", reply),
                    Err(ClientError::Busy) => println!("Still waiting for the previous answer."),
                    Err(e) => println!("[system] Error: {}\n", e),
                }
            }
        }
        prompt()?;
    }

    Ok(())
}
