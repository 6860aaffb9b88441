// UI layer: presentation only.
// Reads and mutates AppState; never touches files or the network.

pub mod panels;
pub mod plot;
pub mod table;
