use mongodb::{options::ClientOptions, Client};

const APP_NAME: &str = "skills-report";

/// Builds a client from a MongoDB URI. Servers are not contacted until the
/// first operation.
pub async fn establish_connection(uri: &str) -> Result<Client, mongodb::error::Error> {
    let mut options = ClientOptions::parse(uri).await?;
    if options.app_name.is_none() {
        options.app_name = Some(APP_NAME.to_string());
    }
    Client::with_options(options)
}
