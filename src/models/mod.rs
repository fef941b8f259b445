pub mod entry;
pub mod request;

pub use entry::{Collection, CollectionPayload, EntityKind, Entry, EntryList, EntryView, NewEntry};
pub use request::{CreateRequest, DeleteRequest, PairedEntry, UpdateRequest};
