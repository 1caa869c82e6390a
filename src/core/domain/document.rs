//! Configuration document.
//!
//! One document shape serves every stage of a set: the wire form, the
//! parsed candidate, the resolved (plaintext) form handed to the delivery
//! engine, the stored (ciphertext) form and the redacted read form. Only
//! the integration type parameter changes between them.

use std::collections::BTreeMap;
use std::convert::Infallible;

use serde::{Deserialize, Serialize};

use crate::core::types::ReceiverName;

/// Top-level configuration document for one tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserConfig<I> {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub template_files: BTreeMap<String, String>,
    pub alertmanager_config: AlertingConfig<I>,
}

/// Routing tree, receivers and template references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertingConfig<I> {
    pub route: Route,
    #[serde(default)]
    pub templates: Option<Vec<String>>,
    #[serde(default = "Vec::new")]
    pub receivers: Vec<Receiver<I>>,
}

/// A node of the routing tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    #[serde(default)]
    pub receiver: ReceiverName,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_by: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_wait: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_interval: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_interval: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<Route>,
}

/// A named receiver referenced by routes, grouping one or more integrations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receiver<I> {
    pub name: ReceiverName,
    #[serde(rename = "grafana_managed_receiver_configs", default = "Vec::new")]
    pub integrations: Vec<I>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

impl Route {
    /// Every receiver name referenced by this node and its children.
    pub fn referenced_receivers(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_receivers(&mut names);
        names
    }

    fn collect_receivers<'a>(&'a self, names: &mut Vec<&'a str>) {
        if !self.receiver.is_empty() {
            names.push(&self.receiver);
        }
        for child in &self.routes {
            child.collect_receivers(names);
        }
    }
}

impl<I> UserConfig<I> {
    pub fn receivers(&self) -> &[Receiver<I>] {
        &self.alertmanager_config.receivers
    }

    /// Iterate over `(receiver name, integration)` pairs in document order.
    pub fn integrations(&self) -> impl Iterator<Item = (&ReceiverName, &I)> {
        self.alertmanager_config
            .receivers
            .iter()
            .flat_map(|r| r.integrations.iter().map(move |i| (&r.name, i)))
    }

    /// Convert every integration, consuming the document.
    pub fn try_map<J, E>(
        self,
        mut f: impl FnMut(&ReceiverName, I) -> Result<J, E>,
    ) -> Result<UserConfig<J>, E> {
        let AlertingConfig {
            route,
            templates,
            receivers,
        } = self.alertmanager_config;

        let receivers = receivers
            .into_iter()
            .map(|receiver| {
                let name = receiver.name;
                let integrations = receiver
                    .integrations
                    .into_iter()
                    .map(|i| f(&name, i))
                    .collect::<Result<Vec<_>, E>>()?;
                Ok(Receiver { name, integrations })
            })
            .collect::<Result<Vec<_>, E>>()?;

        Ok(UserConfig {
            template_files: self.template_files,
            alertmanager_config: AlertingConfig {
                route,
                templates,
                receivers,
            },
        })
    }

    /// Convert every integration by reference.
    pub fn try_map_ref<J, E>(
        &self,
        mut f: impl FnMut(&ReceiverName, &I) -> Result<J, E>,
    ) -> Result<UserConfig<J>, E> {
        let receivers = self
            .alertmanager_config
            .receivers
            .iter()
            .map(|receiver| {
                let integrations = receiver
                    .integrations
                    .iter()
                    .map(|i| f(&receiver.name, i))
                    .collect::<Result<Vec<_>, E>>()?;
                Ok(Receiver {
                    name: receiver.name.clone(),
                    integrations,
                })
            })
            .collect::<Result<Vec<_>, E>>()?;

        Ok(UserConfig {
            template_files: self.template_files.clone(),
            alertmanager_config: AlertingConfig {
                route: self.alertmanager_config.route.clone(),
                templates: self.alertmanager_config.templates.clone(),
                receivers,
            },
        })
    }

    pub fn map_ref<J>(&self, mut f: impl FnMut(&ReceiverName, &I) -> J) -> UserConfig<J> {
        match self.try_map_ref(|name, i| Ok::<_, Infallible>(f(name, i))) {
            Ok(config) => config,
            Err(never) => match never {},
        }
    }
}
