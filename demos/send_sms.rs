use std::io;

use m4u::{Credentials, M4uClient, MessageOptions};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let username = required_env("M4U_USERNAME")?;
    let password = required_env("M4U_PASSWORD")?;
    let phone = required_env("M4U_PHONE")?;
    let message =
        std::env::var("M4U_MESSAGE").unwrap_or_else(|_| "Hello from the m4u demo.".to_owned());

    let mut client = M4uClient::builder(Credentials::new(username, password)?).build()?;
    let mut outbox = client.outbox();
    outbox.add(phone, message, MessageOptions::default())?;

    let status = client.send_outbox(&outbox).await?;
    println!(
        "sent {} message(s): {} {}",
        outbox.len(),
        status.code,
        status.message
    );

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
