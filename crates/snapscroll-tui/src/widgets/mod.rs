mod deck;
mod header;
mod status_bar;

pub use deck::DeckWidget;
pub use header::HeaderWidget;
pub use status_bar::StatusBarWidget;
