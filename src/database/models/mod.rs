pub mod feed_item;
pub mod profile;
pub mod user;

pub use feed_item::FeedItem;
pub use profile::{NewProfile, Profile, ProfileChanges};
pub use user::User;
