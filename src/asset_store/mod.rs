pub mod http;
pub mod mock;
pub mod variant;

pub use http::HttpAssetStore;
pub use mock::MockAssetStore;
pub use variant::AssetStoreVariant;
