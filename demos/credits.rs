use std::io;

use m4u::{Credentials, M4uClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let username = std::env::var("M4U_USERNAME").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "M4U_USERNAME environment variable is required",
        )
    })?;
    let password = std::env::var("M4U_PASSWORD").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "M4U_PASSWORD environment variable is required",
        )
    })?;

    let mut client = M4uClient::builder(Credentials::new(username, password)?).build()?;
    let credits = client.credits_remaining().await?;
    println!("credits remaining: {credits}");

    Ok(())
}
