//! Business logic services.

#![allow(missing_docs)]

pub mod account;
pub mod audience;
pub mod club;
pub mod event;
pub mod feed;
pub mod permission;
pub mod post;
pub mod profile;
pub mod visibility;

pub use account::{AccountService, SignInInput, SignUpInput};
pub use audience::{AudienceError, AudienceSelection, AudienceSpec, resolve_audience};
pub use club::{ClubService, CreateClubInput, UpdateClubInput};
pub use event::{CreateEventInput, EventService, RsvpCounts, UpdateEventInput};
pub use feed::{
    FeedBroadcaster, FeedCache, FeedItem, FeedPublisher, FeedScope, FeedSubscription,
    NoOpFeedPublisher,
};
pub use permission::{Actor, EventContext, can_delete_event, can_edit_event, can_publish_event};
pub use post::{CreatePostInput, PostScope, PostService};
pub use profile::{ProfileService, UpdateProfileInput};
pub use visibility::{PublishState, filter_visible, is_visible_to_public, publish_state};
