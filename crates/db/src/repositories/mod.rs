//! Repository layer - one repository per aggregate.

pub mod club;
pub mod event;
pub mod major;
pub mod post;
pub mod profile;
pub mod user;

pub use club::ClubRepository;
pub use event::EventRepository;
pub use major::MajorRepository;
pub use post::PostRepository;
pub use profile::ProfileRepository;
pub use user::UserRepository;
