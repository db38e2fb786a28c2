mod book_entry;
mod order;
mod side;

pub use book_entry::BookEntry;
pub use order::{OrderId, ProductId};
pub use side::Side;
