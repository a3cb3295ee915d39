//! Typed property system.
//!
//! Entities describe themselves through properties: typed values keyed by
//! a [`PropertyId`] (an enum plus up to four params). Values live in
//! [`PropertyCollection`]s, which can overlay a parent collection. The
//! [`PropertyInfoTable`] records each property's declared type so typed
//! readers and writers can convert values consistently.

mod collection;
mod error;
mod id;
mod info;
mod value;

pub use collection::{PropertyCollection, PropertyCollectionRef};
pub use error::PropertyError;
pub use id::{PropertyEnum, PropertyId, PropertyParam};
pub use info::{PropertyInfo, PropertyInfoTable, PropertyParamInfo, PropertyParamType};
pub use value::{PropertyDataType, PropertyValue, TimeSpan};
