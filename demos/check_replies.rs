use std::io;

use m4u::{Credentials, M4uClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let username = required_env("M4U_USERNAME")?;
    let password = required_env("M4U_PASSWORD")?;
    let confirm = std::env::var("M4U_CONFIRM").map_or(true, |value| value != "0");

    let mut client = M4uClient::builder(Credentials::new(username, password)?).build()?;
    let replies = client.check_replies(confirm).await?;
    if replies.is_empty() {
        println!("no replies");
    }
    for reply in replies {
        println!(
            "{} at {}: {}",
            reply.phone_number,
            reply.received_at.value(),
            reply.text
        );
    }

    Ok(())
}

fn required_env(name: &str) -> Result<String, io::Error> {
    std::env::var(name).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{name} environment variable is required"),
        )
    })
}
