//! Database entities.

pub mod club;
pub mod club_member;
pub mod event;
pub mod event_audience;
pub mod event_rsvp;
pub mod major;
pub mod post;
pub mod profile;
pub mod user;

pub use club::Entity as Club;
pub use club_member::Entity as ClubMember;
pub use event::Entity as Event;
pub use event_audience::Entity as EventAudience;
pub use event_rsvp::Entity as EventRsvp;
pub use major::Entity as Major;
pub use post::Entity as Post;
pub use profile::Entity as Profile;
pub use user::Entity as User;
