use std::time::Duration;

use reqwest::{Client, ClientBuilder};

/// Client builder with the common timeout.
pub fn builder() -> ClientBuilder {
    Client::builder().timeout(Duration::from_secs(10))
}
