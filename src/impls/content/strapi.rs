use std::time::Duration;

use reqwest::{Client, Request};
use serde::Deserialize;

use crate::core::models::event::Event;
use crate::core::ports::content::ContentSource;
use crate::error::Error;

const CURRENT_EVENT_QUERY: [(&str, &str); 4] = [
    ("filters[is_current][$eq]", "true"),
    ("populate[schedule_items][sort][0]", "date:asc"),
    ("populate[schedule_items][sort][1]", "time:asc"),
    ("pagination[limit]", "1"),
];

#[derive(Debug, Deserialize)]
struct Listing {
    #[serde(default)]
    data: Vec<Event>,
}

pub struct Strapi {
    client: Client,
    base_url: String,
}

impl Strapi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    fn current_event_request(&self) -> Result<Request, Error> {
        let request = self
            .client
            .get(format!("{}/api/hackathons", self.base_url))
            .header("Content-Type", "application/json")
            .query(&CURRENT_EVENT_QUERY)
            .build()?;
        Ok(request)
    }
}

impl ContentSource for Strapi {
    async fn current_event(&self) -> Result<Option<Event>, Error> {
        let request = self.current_event_request()?;
        let listing: Listing = self.client.execute(request).await?.error_for_status()?.json().await?;
        let event = listing.data.into_iter().next();
        if event.is_none() {
            log::warn!("no current hackathon found (is_current = true)");
        }
        Ok(event)
    }
}
