// Copyright 2023 Dmitry Tantsur <dtantsur@protonmail.com>
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

//! Free-form node dictionaries with typed accessors for well-known keys.

use std::borrow::Cow;
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};
use serde_json::Value;

macro_rules! info_map {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
        pub struct $name(pub HashMap<String, Value>);

        impl Deref for $name {
            type Target = HashMap<String, Value>;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }

        impl From<HashMap<String, Value>> for $name {
            fn from(value: HashMap<String, Value>) -> $name {
                $name(value)
            }
        }

        impl $name {
            #[inline]
            #[allow(dead_code)]
            fn subfield(&self, key: &str) -> Option<&String> {
                match self.0.get(key) {
                    Some(Value::String(s)) => Some(s),
                    _ => None,
                }
            }
        }
    };
}

macro_rules! info_string_field {
    ($(#[$attr:meta])* $func:ident, $set_func:ident, $with_func:ident -> $key:expr) => {
        $(#[$attr])*
        pub fn $func(&self) -> Option<&String> {
            self.subfield($key)
        }

        $(#[$attr])*
        pub fn $set_func<S: Into<String>>(&mut self, value: S) {
            let _ = self.0.insert($key.into(), Value::String(value.into()));
        }

        $(#[$attr])*
        #[inline]
        pub fn $with_func<S: Into<String>>(mut self, value: S) -> Self {
            self.$set_func(value);
            self
        }
    };
}

info_map! {
    /// Driver-specific information (BMC credentials, deploy images, etc).
    DriverInfo
}

info_map! {
    /// Instance-specific information.
    InstanceInfo
}

info_map! {
    /// Node properties.
    Properties
}

/// Common image checksums.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageChecksum<'s> {
    /// MD5 checksum (legacy).
    MD5(Cow<'s, str>),
    /// SHA256 checksum.
    SHA256(Cow<'s, str>),
    /// SHA512 checksum.
    SHA512(Cow<'s, str>),
}

impl ImageChecksum<'_> {
    fn algorithm(&self) -> &'static str {
        match self {
            ImageChecksum::MD5(..) => "md5",
            ImageChecksum::SHA256(..) => "sha256",
            ImageChecksum::SHA512(..) => "sha512",
        }
    }

    fn into_value(self) -> String {
        match self {
            ImageChecksum::MD5(s) | ImageChecksum::SHA256(s) | ImageChecksum::SHA512(s) => {
                s.into_owned()
            }
        }
    }
}

impl DriverInfo {
    info_string_field! {
        #[doc = "Deploy kernel image (an image ID or a URL)."]
        deploy_kernel, set_deploy_kernel, with_deploy_kernel -> "deploy_kernel"
    }

    info_string_field! {
        #[doc = "Deploy ramdisk image (an image ID or a URL)."]
        deploy_ramdisk, set_deploy_ramdisk, with_deploy_ramdisk -> "deploy_ramdisk"
    }
}

impl InstanceInfo {
    info_string_field! {
        #[doc = "ISO image to boot in case of the ramdisk deploy."]
        boot_iso, set_boot_iso, with_boot_iso -> "boot_iso"
    }

    info_string_field! {
        #[doc = "Image to write to disk in case of a normal deployment."]
        image_source, set_image_source, with_image_source -> "image_source"
    }

    /// Checksum of the image (if the algorithm is supported).
    ///
    /// The `image_os_hash_*` pair takes precedence over the legacy MD5 `image_checksum`.
    pub fn image_checksum(&self) -> Option<ImageChecksum<'_>> {
        if let Some(algo) = self.subfield("image_os_hash_algo") {
            let value = Cow::Borrowed(self.subfield("image_os_hash_value")?.as_str());
            return match algo.as_str() {
                "md5" => Some(ImageChecksum::MD5(value)),
                "sha256" => Some(ImageChecksum::SHA256(value)),
                "sha512" => Some(ImageChecksum::SHA512(value)),
                _ => None,
            };
        }

        self.subfield("image_checksum")
            .map(|value| ImageChecksum::MD5(Cow::Borrowed(value.as_str())))
    }

    /// Set the checksum of the image.
    #[allow(unused_results)]
    pub fn set_image_checksum(&mut self, value: ImageChecksum<'_>) {
        if let ImageChecksum::MD5(..) = value {
            self.0.remove("image_os_hash_algo");
            self.0.remove("image_os_hash_value");
            self.0
                .insert("image_checksum".into(), Value::String(value.into_value()));
        } else {
            self.0.remove("image_checksum");
            self.0.insert(
                "image_os_hash_algo".into(),
                Value::String(value.algorithm().into()),
            );
            self.0
                .insert("image_os_hash_value".into(), Value::String(value.into_value()));
        }
    }

    /// Set the checksum of the image.
    #[inline]
    pub fn with_image_checksum(mut self, value: ImageChecksum<'_>) -> Self {
        self.set_image_checksum(value);
        self
    }
}

impl Properties {
    info_string_field! {
        #[doc = "CPU architecture."]
        cpu_arch, set_cpu_arch, with_cpu_arch -> "cpu_arch"
    }

    info_string_field! {
        #[doc = "Capabilities as a comma-separated list of `key:value` pairs."]
        capabilities, set_capabilities, with_capabilities -> "capabilities"
    }

    /// Root device hints.
    #[inline]
    pub fn root_device(&self) -> Option<&Value> {
        self.0.get("root_device")
    }

    /// Set root device hints.
    pub fn set_root_device<V: Into<Value>>(&mut self, hints: V) {
        let _ = self.0.insert("root_device".into(), hints.into());
    }
}

#[cfg(test)]
mod test {
    use serde_json::{json, Value};

    use super::*;

    fn instance_info(value: Value) -> InstanceInfo {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_checksum_missing() {
        let ii = InstanceInfo::default();
        assert!(ii.is_empty());
        assert!(ii.image_checksum().is_none());
        assert!(ii.image_source().is_none());
    }

    #[test]
    fn test_checksum_legacy() {
        let ii = instance_info(json!({
            "image_source": "http://url",
            "image_checksum": "abcd"
        }));
        assert_eq!(ii.image_checksum(), Some(ImageChecksum::MD5("abcd".into())));
        assert_eq!(ii.image_source().unwrap(), "http://url");
    }

    #[test]
    fn test_checksum_os_hash() {
        let ii = instance_info(json!({
            "image_checksum": "legacy",
            "image_os_hash_algo": "sha512",
            "image_os_hash_value": "abcd"
        }));
        assert_eq!(
            ii.image_checksum(),
            Some(ImageChecksum::SHA512("abcd".into()))
        );

        let ii = instance_info(json!({
            "image_os_hash_algo": "crc32",
            "image_os_hash_value": "abcd"
        }));
        assert!(ii.image_checksum().is_none());
    }

    #[test]
    fn test_set_checksum_replaces_previous() {
        let mut ii = InstanceInfo::default()
            .with_image_source("http://url")
            .with_image_checksum(ImageChecksum::MD5("abcd".into()));
        assert_eq!(ii.get("image_checksum"), Some(&json!("abcd")));

        ii.set_image_checksum(ImageChecksum::SHA256("efgh".into()));
        assert_eq!(
            serde_json::to_value(&ii).unwrap(),
            json!({
                "image_source": "http://url",
                "image_os_hash_algo": "sha256",
                "image_os_hash_value": "efgh"
            })
        );
    }

    #[test]
    fn test_properties_and_driver_info() {
        let mut props = Properties::default().with_cpu_arch("x86_64");
        props.set_root_device(json!({"name": "/dev/sda"}));
        assert_eq!(props.cpu_arch().unwrap(), "x86_64");
        assert_eq!(props.root_device(), Some(&json!({"name": "/dev/sda"})));

        let di = DriverInfo::default().with_deploy_kernel("http://images/ipa.kernel");
        assert_eq!(di.deploy_kernel().unwrap(), "http://images/ipa.kernel");
        assert!(di.deploy_ramdisk().is_none());
    }
}
