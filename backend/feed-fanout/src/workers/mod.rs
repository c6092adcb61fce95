pub mod feed_update;

pub use feed_update::FeedUpdateWorker;
