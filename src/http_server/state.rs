use crate::resolver::PlaylistResolver;
use crate::resolver::types::RequestCounter;

pub struct AppState {
    pub resolver: PlaylistResolver,
    /// Created once at start-up, shared by every request.
    pub counter: RequestCounter,
}

impl AppState {
    pub fn new(resolver: PlaylistResolver) -> Self {
        Self {
            resolver,
            counter: RequestCounter::new(),
        }
    }
}
