use crate::core::models::event::Event;
use crate::error::Error;

pub trait ContentSource {
    /// The event currently flagged as running, if the content service has one.
    async fn current_event(&self) -> Result<Option<Event>, Error>;
}
