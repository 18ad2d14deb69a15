pub mod composer;

pub use composer::{FeedComposer, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
