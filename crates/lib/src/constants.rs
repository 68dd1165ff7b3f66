//! Constants used throughout the Larder library.
//!
//! Collection names and the document field names the engine reads and writes.
//! Any other fields on a document are carried through untouched.

/// Default name of the ordered collection.
pub const GROCERY: &str = "grocery";

/// Default name of the unordered collection.
pub const FRIDGE: &str = "fridge";

/// Prefix for per-tenant collection paths.
pub const USERS: &str = "users";

/// Identity field on every item document.
pub const ITEM_ID: &str = "item_id";

/// Display name of an item.
pub const NAME: &str = "name";

/// Item quantity, always positive.
pub const QUANTITY: &str = "quantity";

/// Free-form notes.
pub const NOTES: &str = "notes";

/// Whether a grocery item is selected for migration.
pub const ACTIVE: &str = "active";

/// 1-based position of a grocery item.
pub const POSITION: &str = "position";

/// Timestamp a fridge item was added.
pub const ADDED: &str = "added";
