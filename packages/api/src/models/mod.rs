//! # Records exchanged with the rally functions
//!
//! Every record has a camelCase wire shape shared by server and client, a
//! permissive `*Input` type used to deserialise request bodies, and (server
//! only) a snake_case row type where the table layout differs from the wire
//! shape.
//!
//! | Module | Table | Wire type | Validated type |
//! |--------|-------|-----------|----------------|
//! | [`profile`] | `user_profiles` | [`Profile`] | [`Profile`] |
//! | [`codriver`] | `codrivers` | [`Codriver`] | [`NewCodriver`] |
//! | [`car`] | `cars` | [`Car`] | [`NewCar`] |
//! | [`rally`] | `rallies` | [`Rally`] | [`NewRally`] |
//! | [`permission`] | `user_permissions` | [`PermissionGrant`] | — |

mod fields;

pub mod car;
pub mod codriver;
pub mod permission;
pub mod profile;
pub mod rally;

pub use car::{Car, CarInput, CarUpdate, Engine, Insurance, NewCar};
pub use codriver::{Codriver, CodriverInput, CodriverUpdate, NewCodriver};
pub use fields::IdInput;
pub use permission::{has_permission, Permission, PermissionGrant};
pub use profile::{IceContact, Profile, ProfileInput};
pub use rally::{NewRally, Organizer, Rally, RallyFile, RallyInput, Registration};

#[cfg(feature = "server")]
pub use car::CarRow;
#[cfg(feature = "server")]
pub use profile::ProfileRow;
#[cfg(feature = "server")]
pub use rally::RallyRow;
