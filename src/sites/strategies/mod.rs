pub mod event_platform;
pub mod flagship;
pub mod generic;
pub mod listicle;
pub mod official_venue;
pub mod vendor_application;

pub use event_platform::EventPlatformStrategy;
pub use flagship::{FlagshipStrategy, FlagshipVenue};
pub use generic::GenericStrategy;
pub use listicle::ListicleStrategy;
pub use official_venue::OfficialVenueStrategy;
pub use vendor_application::VendorApplicationStrategy;
