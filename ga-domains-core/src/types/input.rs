use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Operator-supplied domain configuration.
///
/// Editable only while the workflow sits at the `config` stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainConfigInput {
    /// Fully-qualified domain name.
    pub domain: String,
    /// IPv4 dotted-quad of the deployment target.
    #[serde(rename = "serverIP")]
    pub server_ip: String,
    /// Request a certificate (and deploy on 443).
    pub ssl_enabled: bool,
    /// Probe the server before submitting the configuration.
    pub auto_setup: bool,
}

impl Default for DomainConfigInput {
    fn default() -> Self {
        Self {
            domain: String::new(),
            server_ip: String::new(),
            ssl_enabled: true,
            auto_setup: true,
        }
    }
}

impl DomainConfigInput {
    pub fn new(domain: impl Into<String>, server_ip: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            server_ip: server_ip.into(),
            ..Self::default()
        }
    }
}

/// Validated input fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConfigField {
    #[serde(rename = "domain")]
    Domain,
    #[serde(rename = "serverIP")]
    ServerIp,
}

impl ConfigField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::ServerIp => "serverIP",
        }
    }
}

/// Field → message map. Empty means the input is valid.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<ConfigField, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: ConfigField, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: ConfigField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: ConfigField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn remove(&mut self, field: ConfigField) {
        self.0.remove(&field);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ConfigField, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {message}", field.as_str())?;
            first = false;
        }
        Ok(())
    }
}
