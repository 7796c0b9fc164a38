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

//! Templates and environments with nested references.
//!
//! Heat templates may refer to other files via `get_file` and to nested templates
//! via resource `type`. Environments may do the same in `resource_registry`. Before
//! sending a template to the service, all references have to be fetched, put into
//! the `files` map and rewritten to absolute URLs.
//!
//! ```rust,no_run
//! use openstack_bindings::orchestration::{DefaultFetcher, Template};
//!
//! # async fn example() -> openstack_bindings::Result<()> {
//! let mut template = Template::from_url("templates/server.yaml").await?;
//! template.validate()?;
//! template.resolve(&DefaultFetcher::new()).await?;
//! for (url, _) in template.files() {
//!     println!("Attached {}", url);
//! }
//! # Ok(()) }
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use reqwest::{Client, Url};
use serde_yaml::Value;

use crate::{Error, ErrorKind, Result};

const VERSION_KEYS: &[&str] = &[
    "heat_template_version",
    "HeatTemplateFormatVersion",
    "AWSTemplateFormatVersion",
];

/// A source of templates and files.
#[async_trait]
pub trait TemplateFetcher: Debug + Send + Sync {
    /// Fetch the contents at the given URL.
    async fn fetch(&self, url: &Url) -> Result<String>;
}

/// Fetcher supporting `http`, `https` and `file` URLs.
#[derive(Debug, Clone, Default)]
pub struct DefaultFetcher {
    client: Client,
}

impl DefaultFetcher {
    /// Create a fetcher with a new HTTP client.
    pub fn new() -> DefaultFetcher {
        DefaultFetcher::default()
    }

    /// Create a fetcher with the provided HTTP client.
    pub fn with_client(client: Client) -> DefaultFetcher {
        DefaultFetcher { client }
    }
}

#[async_trait]
impl TemplateFetcher for DefaultFetcher {
    async fn fetch(&self, url: &Url) -> Result<String> {
        match url.scheme() {
            "http" | "https" => {
                trace!("Downloading {}", url);
                let response = self.client.get(url.clone()).send().await?;
                let response = crate::error::check(response).await?;
                Ok(response.text().await?)
            }
            "file" => {
                let path = url.to_file_path().map_err(|_| {
                    Error::new(ErrorKind::InvalidInput, format!("Invalid file URL {}", url))
                })?;
                trace!("Reading {}", path.display());
                tokio::fs::read_to_string(&path).await.map_err(|e| {
                    Error::new(
                        ErrorKind::InvalidInput,
                        format!("Cannot read {}: {}", path.display(), e),
                    )
                })
            }
            other => Err(Error::new(
                ErrorKind::InvalidInput,
                format!("Unsupported URL scheme {} in {}", other, url),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Template,
    Environment,
}

#[derive(Debug, Clone)]
struct Document {
    raw: Vec<u8>,
    url: Option<Url>,
    base_url: Url,
    parsed: Value,
    files: HashMap<String, String>,
    changed: bool,
}

/// A Heat template.
#[derive(Debug, Clone)]
pub struct Template {
    document: Document,
}

/// A Heat environment.
#[derive(Debug, Clone)]
pub struct Environment {
    document: Document,
}

fn current_dir_url() -> Result<Url> {
    let cwd = std::env::current_dir().map_err(|e| {
        Error::new(
            ErrorKind::InvalidInput,
            format!("Cannot determine the current directory: {}", e),
        )
    })?;
    Url::from_directory_path(&cwd).map_err(|_| {
        Error::new(
            ErrorKind::InvalidInput,
            format!("Cannot convert {} to a URL", cwd.display()),
        )
    })
}

fn invalid_location(location: &str, err: url::ParseError) -> Error {
    Error::new(
        ErrorKind::InvalidInput,
        format!("Invalid location {}: {}", location, err),
    )
}

fn location_to_url(location: &str) -> Result<Url> {
    match Url::parse(location) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => current_dir_url()?
            .join(location)
            .map_err(|e| invalid_location(location, e)),
        Err(e) => Err(invalid_location(location, e)),
    }
}

fn is_template_name(value: &str) -> bool {
    value.ends_with(".yaml") || value.ends_with(".template")
}

/// How to treat a mapping entry.
enum Entry {
    Reference { nested: bool },
    Ignore,
    Descend { registry: bool },
}

fn classify(kind: Kind, key: &str, value: &Value, in_registry: bool) -> Entry {
    if in_registry && (key == "base_url" || key == "hooks") {
        return Entry::Ignore;
    }

    match value.as_str() {
        Some(s) if s.contains("::") => Entry::Ignore,
        Some(_) if key == "get_file" => Entry::Reference { nested: false },
        Some(s) => match kind {
            Kind::Template if key == "type" && is_template_name(s) => {
                Entry::Reference { nested: true }
            }
            Kind::Environment if in_registry => Entry::Reference {
                nested: is_template_name(s),
            },
            _ => Entry::Ignore,
        },
        None => Entry::Descend {
            registry: in_registry || (kind == Kind::Environment && key == "resource_registry"),
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Reference {
    location: String,
    nested: bool,
}

fn collect_references(value: &Value, kind: Kind, in_registry: bool, result: &mut Vec<Reference>) {
    match value {
        Value::Mapping(map) => {
            for (key, item) in map {
                let key = key.as_str().unwrap_or_default();
                match classify(kind, key, item, in_registry) {
                    Entry::Reference { nested } => {
                        if let Some(location) = item.as_str() {
                            match result.iter_mut().find(|r| r.location == location) {
                                Some(existing) => existing.nested |= nested,
                                None => result.push(Reference {
                                    location: location.to_string(),
                                    nested,
                                }),
                            }
                        }
                    }
                    Entry::Ignore => {}
                    Entry::Descend { registry } => {
                        collect_references(item, kind, registry, result)
                    }
                }
            }
        }
        Value::Sequence(items) => {
            for item in items {
                collect_references(item, kind, in_registry, result);
            }
        }
        Value::Tagged(tagged) => collect_references(&tagged.value, kind, in_registry, result),
        _ => {}
    }
}

fn rewrite_references(
    value: &mut Value,
    kind: Kind,
    in_registry: bool,
    mapping: &HashMap<String, String>,
) -> bool {
    let mut changed = false;
    match value {
        Value::Mapping(map) => {
            for (key, item) in map.iter_mut() {
                let key = key.as_str().unwrap_or_default();
                match classify(kind, key, item, in_registry) {
                    Entry::Reference { .. } => {
                        let replacement = item
                            .as_str()
                            .and_then(|location| mapping.get(location))
                            .filter(|target| item.as_str() != Some(target.as_str()))
                            .cloned();
                        if let Some(target) = replacement {
                            *item = Value::String(target);
                            changed = true;
                        }
                    }
                    Entry::Ignore => {}
                    Entry::Descend { registry } => {
                        changed |= rewrite_references(item, kind, registry, mapping);
                    }
                }
            }
        }
        Value::Sequence(items) => {
            for item in items {
                changed |= rewrite_references(item, kind, in_registry, mapping);
            }
        }
        Value::Tagged(tagged) => {
            changed |= rewrite_references(&mut tagged.value, kind, in_registry, mapping)
        }
        _ => {}
    }
    changed
}

impl Document {
    fn parse(raw: Vec<u8>, url: Option<Url>) -> Result<Document> {
        let parsed: Value = serde_yaml::from_slice(&raw).map_err(|e| {
            Error::new(
                ErrorKind::InvalidInput,
                format!("Cannot parse the document as YAML or JSON: {}", e),
            )
        })?;
        if !parsed.is_mapping() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "The document must be a mapping",
            ));
        }

        let base_url = match url {
            Some(ref url) => url.clone(),
            None => current_dir_url()?,
        };

        Ok(Document {
            raw,
            url,
            base_url,
            parsed,
            files: HashMap::new(),
            changed: false,
        })
    }

    fn contents(&self) -> Result<String> {
        if self.changed {
            serde_yaml::to_string(&self.parsed).map_err(|e| {
                Error::new(
                    ErrorKind::InvalidInput,
                    format!("Cannot serialize the document: {}", e),
                )
            })
        } else {
            String::from_utf8(self.raw.clone()).map_err(|e| {
                Error::new(
                    ErrorKind::InvalidInput,
                    format!("The document is not valid UTF-8: {}", e),
                )
            })
        }
    }

    async fn resolve<F: TemplateFetcher + ?Sized>(&mut self, kind: Kind, fetcher: &F) -> Result<()> {
        let mut resolver = Resolver {
            fetcher,
            files: std::mem::take(&mut self.files),
            resolved: HashSet::new(),
            in_progress: self.url.iter().map(|u| u.to_string()).collect(),
        };
        let result = resolver.resolve(self, kind).await;
        self.files = resolver.files;
        result
    }
}

struct Resolver<'f, F: ?Sized> {
    fetcher: &'f F,
    files: HashMap<String, String>,
    // Files that were resolved as nested templates, not just attached.
    resolved: HashSet<String>,
    in_progress: Vec<String>,
}

impl<'f, F: TemplateFetcher + ?Sized> Resolver<'f, F> {
    fn resolve<'a>(&'a mut self, document: &'a mut Document, kind: Kind) -> BoxFuture<'a, Result<()>> {
        async move {
            let mut references = Vec::new();
            collect_references(&document.parsed, kind, false, &mut references);

            let mut mapping = HashMap::with_capacity(references.len());
            for reference in references {
                let url = document.base_url.join(&reference.location).map_err(|e| {
                    Error::new(
                        ErrorKind::InvalidInput,
                        format!("Invalid reference {}: {}", reference.location, e),
                    )
                })?;
                let key = url.to_string();
                let _ = mapping.insert(reference.location.clone(), key.clone());

                if reference.nested && self.in_progress.contains(&key) {
                    return Err(Error::new(
                        ErrorKind::InvalidInput,
                        format!("Circular reference to {}", key),
                    ));
                }

                let content = match self.files.get(&key) {
                    Some(_) if !reference.nested || self.resolved.contains(&key) => {
                        trace!("{} is already fetched", key);
                        continue;
                    }
                    Some(existing) => existing.clone(),
                    None => {
                        debug!("Fetching {} referenced as {}", key, reference.location);
                        self.fetcher.fetch(&url).await?
                    }
                };

                let content = if reference.nested {
                    let mut child = Document::parse(content.into_bytes(), Some(url))?;
                    self.in_progress.push(key.clone());
                    let result = self.resolve(&mut child, Kind::Template).await;
                    let _ = self.in_progress.pop();
                    result?;
                    let _ = self.resolved.insert(key.clone());
                    child.contents()?
                } else {
                    content
                };

                let _ = self.files.insert(key, content);
            }

            if rewrite_references(&mut document.parsed, kind, false, &mapping) {
                document.changed = true;
            }
            Ok(())
        }
        .boxed()
    }
}

macro_rules! document_type {
    ($name:ident, $kind:expr) => {
        impl $name {
            /// Load from raw bytes (YAML or JSON).
            ///
            /// Relative references are resolved against the current directory.
            pub fn from_bytes<B: Into<Vec<u8>>>(raw: B) -> Result<$name> {
                $name::new(Document::parse(raw.into(), None)?)
            }

            /// Load from a string (YAML or JSON).
            ///
            /// Relative references are resolved against the current directory.
            #[allow(clippy::should_implement_trait)]
            pub fn from_str<S: Into<String>>(raw: S) -> Result<$name> {
                $name::from_bytes(raw.into().into_bytes())
            }

            /// Load from a URL or a local path using the default fetcher.
            ///
            /// Relative paths are resolved against the current directory.
            pub async fn from_url<S: AsRef<str>>(location: S) -> Result<$name> {
                $name::fetch(location, &DefaultFetcher::new()).await
            }

            /// Load from a URL or a local path using the provided fetcher.
            pub async fn fetch<S, F>(location: S, fetcher: &F) -> Result<$name>
            where
                S: AsRef<str>,
                F: TemplateFetcher + ?Sized,
            {
                let url = location_to_url(location.as_ref())?;
                debug!("Loading {:?} from {}", $kind, url);
                let raw = fetcher.fetch(&url).await?;
                $name::new(Document::parse(raw.into_bytes(), Some(url))?)
            }

            /// Base URL for relative references.
            #[inline]
            pub fn base_url(&self) -> &Url {
                &self.document.base_url
            }

            /// Override the base URL for relative references.
            #[inline]
            pub fn set_base_url(&mut self, url: Url) {
                self.document.base_url = url;
            }

            /// Override the base URL for relative references.
            #[inline]
            pub fn with_base_url(mut self, url: Url) -> Self {
                self.set_base_url(url);
                self
            }

            /// Parsed document tree.
            ///
            /// After resolution, references in the tree point to absolute URLs.
            #[inline]
            pub fn parsed(&self) -> &Value {
                &self.document.parsed
            }

            /// Files referenced by this document (after resolution).
            ///
            /// Keys are absolute URLs, values are file contents.
            #[inline]
            pub fn files(&self) -> &HashMap<String, String> {
                &self.document.files
            }

            /// Serialized document.
            ///
            /// The original contents are returned unless resolution rewrote references.
            #[inline]
            pub fn contents(&self) -> Result<String> {
                self.document.contents()
            }

            /// Fetch all references and rewrite them to absolute URLs.
            ///
            /// Files that are already known are not fetched again.
            pub async fn resolve<F: TemplateFetcher + ?Sized>(&mut self, fetcher: &F) -> Result<()> {
                self.document.resolve($kind, fetcher).await
            }

            pub(crate) fn into_parts(self) -> Result<(String, HashMap<String, String>)> {
                let contents = self.document.contents()?;
                Ok((contents, self.document.files))
            }
        }
    };
}

document_type!(Template, Kind::Template);
document_type!(Environment, Kind::Environment);

impl Template {
    fn new(document: Document) -> Result<Template> {
        Ok(Template { document })
    }

    /// Check that the template has a known version key.
    pub fn validate(&self) -> Result<()> {
        if VERSION_KEYS
            .iter()
            .any(|key| self.document.parsed.get(key).is_some())
        {
            Ok(())
        } else {
            Err(Error::new(
                ErrorKind::InvalidInput,
                "Template format version not found",
            ))
        }
    }
}

impl Environment {
    fn new(mut document: Document) -> Result<Environment> {
        let base_url = document
            .parsed
            .get("resource_registry")
            .and_then(|registry| registry.get("base_url"))
            .and_then(Value::as_str)
            .map(|base| {
                if base.ends_with('/') {
                    document.base_url.join(base)
                } else {
                    document.base_url.join(&format!("{}/", base))
                }
                .map_err(|e| invalid_location(base, e))
            })
            .transpose()?;
        if let Some(base_url) = base_url {
            debug!("Using base URL {} from the environment", base_url);
            document.base_url = base_url;
        }
        Ok(Environment { document })
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use reqwest::Url;
    use serde_yaml::Value;

    use super::{
        classify, collect_references, Entry, Environment, Kind, Reference, Template,
        TemplateFetcher,
    };
    use crate::{Error, ErrorKind, Result};

    const NOVA_CONTENT: &str = "heat_template_version: 2014-10-16
parameters:
  flavor:
    type: string
    default: 4353
resources:
  test_server:
    type: \"OS::Nova::Server\"
    properties:
      name: test-server
";

    #[derive(Debug, Default)]
    struct FakeFetcher {
        contents: HashMap<String, String>,
        requests: Mutex<Vec<String>>,
    }

    impl FakeFetcher {
        fn with(mut self, url: &str, content: &str) -> Self {
            let _ = self.contents.insert(url.to_string(), content.to_string());
            self
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TemplateFetcher for FakeFetcher {
        async fn fetch(&self, url: &Url) -> Result<String> {
            self.requests.lock().unwrap().push(url.to_string());
            self.contents
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| Error::new(ErrorKind::ResourceNotFound, url.to_string()))
        }
    }

    fn base() -> Url {
        Url::parse("http://example.com/heat/").unwrap()
    }

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn test_validate() {
        let template = Template::from_str(
            r#"{"heat_template_version": "2013-05-23", "resources": {}}"#,
        )
        .unwrap();
        assert!(template.validate().is_ok());

        let template = Template::from_str("HeatTemplateFormatVersion: 2012-12-12").unwrap();
        assert!(template.validate().is_ok());

        let template = Template::from_str("description: no version").unwrap();
        assert_eq!(
            template.validate().err().unwrap().kind(),
            ErrorKind::InvalidInput
        );
    }

    #[test]
    fn test_parse_invalid() {
        for content in ["Keep Austin Weird", "- a\n- b", "{{{"] {
            assert_eq!(
                Template::from_str(content).err().unwrap().kind(),
                ErrorKind::InvalidInput
            );
        }
    }

    #[test]
    fn test_classify_template() {
        let cases = [
            ("not_get_file", "afksdf", None),
            ("not_type", "sdfd", None),
            ("get_file", "shdfuisd", Some(false)),
            ("type", "dfsdfsd", None),
            ("type", "sdfubsduf.yaml", Some(true)),
            ("type", "sdfsdufs.template", Some(true)),
            ("type", "sdfsdf.file", None),
            ("type", "OS::Nova::Server", None),
        ];
        for (key, value, expected) in cases {
            let result = match classify(Kind::Template, key, &Value::from(value), false) {
                Entry::Reference { nested } => Some(nested),
                _ => None,
            };
            assert_eq!(result, expected, "{}: {}", key, value);
        }
        assert!(matches!(
            classify(Kind::Template, "type", &yaml("{key: value}"), false),
            Entry::Descend { registry: false }
        ));
    }

    #[test]
    fn test_collect_environment() {
        let env = yaml(
            "
parameters:
  flavor: m1.small
resource_registry:
  base_url: http://example.com/other/
  \"My::Server\": my_server.yaml
  \"OS::Quantum*\": \"OS::Neutron*\"
  script: install.sh
  resources:
    my_db_server:
      \"OS::DBInstance\": file:///home/user/db.yaml
      hooks: pre-create
",
        );
        let mut refs = Vec::new();
        collect_references(&env, Kind::Environment, false, &mut refs);
        assert_eq!(
            refs,
            vec![
                Reference {
                    location: "my_server.yaml".into(),
                    nested: true
                },
                Reference {
                    location: "install.sh".into(),
                    nested: false
                },
                Reference {
                    location: "file:///home/user/db.yaml".into(),
                    nested: true
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_resolve_type() {
        let fetcher = FakeFetcher::default().with("http://example.com/heat/my_nova.yaml", NOVA_CONTENT);
        let mut template = Template::from_str(
            "heat_template_version: 2015-04-30
resources:
  my_server:
    type: my_nova.yaml
",
        )
        .unwrap()
        .with_base_url(base());
        template.resolve(&fetcher).await.unwrap();

        assert_eq!(
            template.files().get("http://example.com/heat/my_nova.yaml").unwrap(),
            NOVA_CONTENT
        );
        assert_eq!(
            template.parsed(),
            &yaml(
                "heat_template_version: 2015-04-30
resources:
  my_server:
    type: http://example.com/heat/my_nova.yaml
"
            )
        );
        let contents = yaml(&template.contents().unwrap());
        assert_eq!(&contents, template.parsed());
    }

    #[tokio::test]
    async fn test_resolve_get_file() {
        let fetcher = FakeFetcher::default().with("http://example.com/heat/somefile", "Welcome!");
        let mut template = Template::from_str(
            "heat_template_version: 2015-04-30
resources:
  test_resource:
    type: OS::Heat::TestResource
    properties:
      value: {get_file: somefile }
",
        )
        .unwrap()
        .with_base_url(base());
        template.resolve(&fetcher).await.unwrap();

        assert_eq!(
            template.files().get("http://example.com/heat/somefile").unwrap(),
            "Welcome!"
        );
        assert_eq!(
            template.parsed()["resources"]["test_resource"]["properties"]["value"]["get_file"],
            Value::from("http://example.com/heat/somefile")
        );
        assert_eq!(
            template.parsed()["resources"]["test_resource"]["type"],
            Value::from("OS::Heat::TestResource")
        );
    }

    #[tokio::test]
    async fn test_resolve_relative_nested() {
        let substack = "heat_template_version: 2015-04-30
resources:
  my_server:
    type: ../templates/my_nova.yaml
  my_other_server:
    type: ../templates/my_nova.yaml
";
        let fetcher = FakeFetcher::default()
            .with("http://example.com/heat/templates/my_nova.yaml", NOVA_CONTENT)
            .with("http://example.com/heat/substacks/my_substack.yaml", substack);
        let mut template = Template::from_str(
            "heat_template_version: 2015-04-30
resources:
  my_stack:
    type: substacks/my_substack.yaml
",
        )
        .unwrap()
        .with_base_url(base());
        template.resolve(&fetcher).await.unwrap();

        assert_eq!(template.files().len(), 2);
        assert_eq!(
            template
                .files()
                .get("http://example.com/heat/templates/my_nova.yaml")
                .unwrap(),
            NOVA_CONTENT
        );
        let nested = yaml(
            template
                .files()
                .get("http://example.com/heat/substacks/my_substack.yaml")
                .unwrap(),
        );
        assert_eq!(
            nested["resources"]["my_server"]["type"],
            Value::from("http://example.com/heat/templates/my_nova.yaml")
        );
        assert_eq!(
            template.parsed()["resources"]["my_stack"]["type"],
            Value::from("http://example.com/heat/substacks/my_substack.yaml")
        );
        // Each file is fetched exactly once.
        assert_eq!(fetcher.requests().len(), 2);

        // Resolving again does not fetch anything.
        template.resolve(&fetcher).await.unwrap();
        assert_eq!(fetcher.requests().len(), 2);
    }

    #[test]
    fn test_collect_same_location_twice() {
        let template = yaml(
            "
outputs:
  raw:
    value: {get_file: child.yaml}
resources:
  nested:
    type: child.yaml
",
        );
        let mut refs = Vec::new();
        collect_references(&template, Kind::Template, false, &mut refs);
        assert_eq!(
            refs,
            vec![Reference {
                location: "child.yaml".into(),
                nested: true
            }]
        );
    }

    #[tokio::test]
    async fn test_resolve_get_file_then_type() {
        let child = "heat_template_version: 2015-04-30
resources:
  server:
    type: inner.yaml
";
        let fetcher = FakeFetcher::default()
            .with("http://example.com/heat/child.yaml", child)
            .with("http://example.com/heat/inner.yaml", NOVA_CONTENT);
        let mut template = Template::from_str(
            "heat_template_version: 2015-04-30
outputs:
  raw:
    value: {get_file: child.yaml}
resources:
  nested:
    type: child.yaml
",
        )
        .unwrap()
        .with_base_url(base());
        template.resolve(&fetcher).await.unwrap();

        assert_eq!(
            template.files().get("http://example.com/heat/inner.yaml").unwrap(),
            NOVA_CONTENT
        );
        let resolved_child = yaml(
            template
                .files()
                .get("http://example.com/heat/child.yaml")
                .unwrap(),
        );
        assert_eq!(
            resolved_child["resources"]["server"]["type"],
            Value::from("http://example.com/heat/inner.yaml")
        );
        assert_eq!(
            template.parsed()["outputs"]["raw"]["value"]["get_file"],
            Value::from("http://example.com/heat/child.yaml")
        );
        assert_eq!(
            template.parsed()["resources"]["nested"]["type"],
            Value::from("http://example.com/heat/child.yaml")
        );
        assert_eq!(fetcher.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_resolve_attached_file_used_as_template_later() {
        let first = "heat_template_version: 2015-04-30
resources:
  config:
    type: OS::Heat::SoftwareConfig
    properties:
      config: {get_file: child.yaml}
";
        let child = "heat_template_version: 2015-04-30
resources:
  server:
    type: inner.yaml
";
        let fetcher = FakeFetcher::default()
            .with("http://example.com/heat/first.yaml", first)
            .with("http://example.com/heat/child.yaml", child)
            .with("http://example.com/heat/inner.yaml", NOVA_CONTENT);
        let mut template = Template::from_str(
            "heat_template_version: 2015-04-30
resources:
  a_first:
    type: first.yaml
  b_nested:
    type: child.yaml
",
        )
        .unwrap()
        .with_base_url(base());
        template.resolve(&fetcher).await.unwrap();

        assert_eq!(template.files().len(), 3);
        let resolved_child = yaml(
            template
                .files()
                .get("http://example.com/heat/child.yaml")
                .unwrap(),
        );
        assert_eq!(
            resolved_child["resources"]["server"]["type"],
            Value::from("http://example.com/heat/inner.yaml")
        );
        // The attached copy is reused instead of being downloaded again.
        assert_eq!(fetcher.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_resolve_cycle() {
        let fetcher = FakeFetcher::default()
            .with(
                "http://example.com/heat/a.yaml",
                "heat_template_version: 2015-04-30\nresources:\n  b:\n    type: b.yaml\n",
            )
            .with(
                "http://example.com/heat/b.yaml",
                "heat_template_version: 2015-04-30\nresources:\n  a:\n    type: a.yaml\n",
            );
        let mut template = Template::fetch("http://example.com/heat/a.yaml", &fetcher)
            .await
            .unwrap();
        assert_eq!(template.base_url().as_str(), "http://example.com/heat/a.yaml");
        let err = template.resolve(&fetcher).await.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_resolve_unchanged() {
        let source = "{\"heat_template_version\": \"2015-04-30\", \"resources\": {}}";
        let mut template = Template::from_str(source).unwrap();
        template.resolve(&FakeFetcher::default()).await.unwrap();
        assert_eq!(template.contents().unwrap(), source);
        assert!(template.files().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_environment() {
        let fetcher = FakeFetcher::default()
            .with("http://example.com/other/my_server.yaml", NOVA_CONTENT)
            .with("http://example.com/other/install.sh", "#!/bin/sh\n");
        let mut env = Environment::from_str(
            "resource_registry:
  base_url: http://example.com/other
  \"My::Server\": my_server.yaml
  script: install.sh
  \"OS::Quantum*\": \"OS::Neutron*\"
",
        )
        .unwrap();
        assert_eq!(env.base_url().as_str(), "http://example.com/other/");
        env.resolve(&fetcher).await.unwrap();

        assert_eq!(env.files().len(), 2);
        assert_eq!(
            env.parsed()["resource_registry"]["My::Server"],
            Value::from("http://example.com/other/my_server.yaml")
        );
        assert_eq!(
            env.parsed()["resource_registry"]["base_url"],
            Value::from("http://example.com/other")
        );
        assert_eq!(
            env.parsed()["resource_registry"]["OS::Quantum*"],
            Value::from("OS::Neutron*")
        );
    }

    #[tokio::test]
    async fn test_unsupported_scheme() {
        let err = super::DefaultFetcher::new()
            .fetch(&Url::parse("ftp://example.com/a.yaml").unwrap())
            .await
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested.yaml");
        std::fs::write(&nested, NOVA_CONTENT).unwrap();
        let main = dir.path().join("main.yaml");
        std::fs::write(
            &main,
            "heat_template_version: 2015-04-30\nresources:\n  server:\n    type: nested.yaml\n",
        )
        .unwrap();

        let main_url = Url::from_file_path(&main).unwrap();
        let mut template = Template::from_url(main_url.as_str()).await.unwrap();
        template.resolve(&super::DefaultFetcher::new()).await.unwrap();

        let nested_url = Url::from_file_path(&nested).unwrap();
        assert_eq!(
            template.files().get(nested_url.as_str()).unwrap(),
            NOVA_CONTENT
        );
    }
}
