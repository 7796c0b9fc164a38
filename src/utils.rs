// Copyright 2017 Dmitry Tantsur <divius.inside@gmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Various utilities.

#![allow(dead_code)] // various things are unused with --no-default-features

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Define an enumeration with a fixed protocol representation.
///
/// The first form maps to strings, the second one to an arbitrary carrier type. Both
/// forms may specify a default variant that unknown values are mapped to.
macro_rules! protocol_enum {
    {$(#[$attr:meta])* enum $name:ident: $carrier:ty {
        $($(#[$iattr:meta])* $item:ident = $val:expr),+
    }} => (
        protocol_enum! {
            $(#[$attr])*
            __private $name: $carrier {
                $($(#[$iattr])* $item = $val),+
            }
        }

        impl<'de> ::serde::de::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
                    where D: ::serde::de::Deserializer<'de> {
                let value: $carrier = ::serde::de::Deserialize::deserialize(deserializer)?;
                match value {
                    $($val => Ok($name::$item)),+,
                    other => {
                        use ::serde::de::Error;
                        let err = format!("Unexpected {}: {}", stringify!($name), other);
                        Err(D::Error::custom(err))
                    }
                }
            }
        }

        impl ::serde::ser::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
                    where S: ::serde::ser::Serializer {
                ::serde::ser::Serialize::serialize(&<$carrier>::from(*self), serializer)
            }
        }
    );

    {$(#[$attr:meta])* enum $name:ident {
        $($(#[$iattr:meta])* $item:ident = $val:expr),+
    }} => (
        protocol_enum! {
            $(#[$attr])*
            __private $name: String {
                $($(#[$iattr])* $item = $val),+
            }
        }

        impl<'de> ::serde::de::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
                    where D: ::serde::de::Deserializer<'de> {
                let value = <String as ::serde::de::Deserialize>::deserialize(deserializer)?;
                match value.as_ref() {
                    $($val => Ok($name::$item)),+,
                    other => {
                        use ::serde::de::Error;
                        let err = format!("Unexpected {}: {}", stringify!($name), other);
                        Err(D::Error::custom(err))
                    }
                }
            }
        }

        impl ::serde::ser::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
                    where S: ::serde::ser::Serializer {
                serializer.serialize_str(
                    match *self {
                        $($name::$item => $val),+,
                    }
                )
            }
        }
    );

    {$(#[$attr:meta])* enum $name:ident = $default:ident {
        $($(#[$iattr:meta])* $item:ident = $val:expr),+
    }} => (
        protocol_enum! {
            $(#[$attr])*
            __private $name: String {
                $($(#[$iattr])* $item = $val),+
            }
        }

        impl Default for $name {
            fn default() -> $name {
                $name::$default
            }
        }

        impl<'de> ::serde::de::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
                    where D: ::serde::de::Deserializer<'de> {
                let value = <String as ::serde::de::Deserialize>::deserialize(deserializer)?;
                Ok(match value.as_ref() {
                    $($val => $name::$item),+,
                    _ => Default::default()
                })
            }
        }

        impl ::serde::ser::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
                    where S: ::serde::ser::Serializer {
                serializer.serialize_str(
                    match *self {
                        $($name::$item => $val),+,
                    }
                )
            }
        }
    );

    {$(#[$attr:meta])* __private $name:ident: $carrier:ty {
        $($(#[$iattr:meta])* $item:ident = $val:expr),+
    }} => (
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$iattr])* $item),+,
        }

        impl From<$name> for $carrier {
            /// Converts the enum to the carrier value.
            fn from(value: $name) -> $carrier {
                match value {
                    $($name::$item => $val.into()),+,
                }
            }
        }

        impl ::std::fmt::Display for $name {
            /// Displays the underlying protocol value.
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                <$carrier>::from(*self).fmt(f)
            }
        }
    );
}

/// Define an enumeration of query filters.
///
/// Each variant carries one value that is converted to a string via `Display`.
macro_rules! query_filter {
    {$(#[$attr:meta])* enum $name:ident {
        $($(#[$iattr:meta])* $item:ident($type:ty) = $key:expr),+ $(,)?
    }} => (
        $(#[$attr])*
        #[derive(Debug, Clone)]
        pub enum $name {
            $($(#[$iattr])* $item($type)),+,
        }

        impl $crate::common::QueryItem for $name {
            fn query_item(&self) -> $crate::Result<(&str, ::std::borrow::Cow<'_, str>)> {
                Ok(match self {
                    $($name::$item(value) => ($key, ::std::borrow::Cow::Owned(value.to_string()))),+,
                })
            }
        }
    );
}

/// Generate a getter for a field of the inner protocol structure.
macro_rules! transparent_property {
    ($(#[$attr:meta])* $name:ident: ref $type:ty) => (
        $(#[$attr])*
        #[inline]
        pub fn $name(&self) -> &$type {
            &self.inner.$name
        }
    );

    ($(#[$attr:meta])* $name:ident: $type:ty) => (
        $(#[$attr])*
        #[inline]
        pub fn $name(&self) -> $type {
            self.inner.$name
        }
    );
}

/// Generate a setter and a builder method for a field of a creation request.
macro_rules! creation_field {
    ($(#[$attr:meta])* $set_func:ident, $with_func:ident -> $name:ident: $type:ty) => (
        $(#[$attr])*
        #[allow(unused_results)]
        pub fn $set_func<S: Into<$type>>(&mut self, value: S) {
            self.inner.$name = value.into();
        }

        $(#[$attr])*
        #[inline]
        pub fn $with_func<S: Into<$type>>(mut self, value: S) -> Self {
            self.$set_func(value);
            self
        }
    );

    ($(#[$attr:meta])* $set_func:ident, $with_func:ident -> $name:ident: optional $type:ty) => (
        $(#[$attr])*
        #[allow(unused_results)]
        pub fn $set_func<S: Into<$type>>(&mut self, value: S) {
            self.inner.$name = Some(value.into());
        }

        $(#[$attr])*
        #[inline]
        pub fn $with_func<S: Into<$type>>(mut self, value: S) -> Self {
            self.$set_func(value);
            self
        }
    );
}

/// Generate a setter that marks a field of the inner structure as modified.
///
/// The owning structure must have a `dirty: HashSet<&'static str>` field.
macro_rules! update_field {
    ($(#[$attr:meta])* $set_func:ident, $with_func:ident -> $name:ident: optional $type:ty) => (
        $(#[$attr])*
        #[allow(unused_results)]
        pub fn $set_func<S: Into<$type>>(&mut self, value: S) {
            self.inner.$name = Some(value.into());
            self.dirty.insert(stringify!($name));
        }

        $(#[$attr])*
        #[inline]
        pub fn $with_func<S: Into<$type>>(mut self, value: S) -> Self {
            self.$set_func(value);
            self
        }
    );

    ($(#[$attr:meta])* $set_func:ident, $with_func:ident -> $name:ident: $type:ty) => (
        $(#[$attr])*
        #[allow(unused_results)]
        pub fn $set_func<S: Into<$type>>(&mut self, value: S) {
            self.inner.$name = value.into();
            self.dirty.insert(stringify!($name));
        }

        $(#[$attr])*
        #[inline]
        pub fn $with_func<S: Into<$type>>(mut self, value: S) -> Self {
            self.$set_func(value);
            self
        }
    );
}

/// Copy modified fields into an update request, wrapping them into `Some`.
macro_rules! save_fields {
    ($self:ident -> $update:ident: $($field:ident)+) => (
        $(
            if $self.dirty.contains(stringify!($field)) {
                $update.$field = Some($self.inner.$field.clone());
            }
        )+
    );
}

/// Copy modified optional fields into an update request.
macro_rules! save_option_fields {
    ($self:ident -> $update:ident: $($field:ident)+) => (
        $(
            if $self.dirty.contains(stringify!($field)) {
                $update.$field = $self.inner.$field.clone();
            }
        )+
    );
}

protocol_enum! {
    /// Sorting request.
    enum SortDir {
        /// Sorting in ascending order.
        Asc = "asc",
        /// Sorting in descending order.
        Desc = "desc"
    }
}

/// Sorting request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sort<T> {
    /// Sorting by given field in ascendant order.
    Asc(T),
    /// Sorting by given field in descendant order.
    Desc(T),
}

impl<T> Sort<T> {
    /// Split into the field and the direction.
    pub fn unwrap(self) -> (T, SortDir) {
        match self {
            Sort::Asc(val) => (val, SortDir::Asc),
            Sort::Desc(val) => (val, SortDir::Desc),
        }
    }
}

/// Deserialize an empty mapping as a default value.
///
/// Some services return `{}` instead of `null` for missing objects.
pub fn empty_map_as_default<'de, D, T>(des: D) -> ::std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(des)?;
    match value {
        Value::Null => Ok(T::default()),
        Value::Object(ref map) if map.is_empty() => Ok(T::default()),
        other => T::deserialize(other).map_err(serde::de::Error::custom),
    }
}

/// Deserialize an empty string as `None`.
pub fn empty_as_none<'de, D, T>(des: D) -> ::std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(des)?;
    match value {
        Value::Null => Ok(None),
        Value::String(ref s) if s.is_empty() => Ok(None),
        other => T::deserialize(other)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Check if the value is equal to its default.
#[inline]
pub fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

/// A default value of `true`.
#[inline]
pub fn some_truth() -> bool {
    true
}
