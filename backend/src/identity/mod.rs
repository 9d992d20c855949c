//! Identity callback adapter.
//!
//! The claim mapper turns untrusted provider claims into an [`IdentityProfile`];
//! the callbacks copy that profile into the session token on issue and out of the
//! token into the public session view on read. Both hooks are pure.

mod callbacks;
mod profile;

pub use callbacks::{SessionCallbacks, WorldIdCallbacks};
pub use profile::{IdentityProfile, ProfileError, WORLD_ID_CLAIMS_NAMESPACE};
