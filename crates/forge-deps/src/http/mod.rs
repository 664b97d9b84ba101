mod client;

pub use client::{HttpAuth, HttpClient, HttpClientConfig, HttpError};
