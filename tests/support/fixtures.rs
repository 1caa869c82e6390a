//! Test fixtures and constants.

use alertcfg::core::domain::PostableConfig;

/// Slack webhook URL used as a credential throughout the tests.
pub const SLACK_URL: &str = "http://averysecureurl.com/webhook";

/// Error payload message for every failed set.
pub const SET_FAILED: &str = "failed to save and apply Alertmanager configuration";

/// Rejection for a slack receiver with neither webhook URL nor token.
pub const SLACK_TOKEN_REQUIRED: &str =
    "alert validation error: token must be specified when using the Slack chat API";

/// An email receiver plus a slack receiver whose token is empty. The
/// delivery engine refuses it.
pub const SLACK_EMPTY_TOKEN: &str = r##"{
  "template_files": {},
  "alertmanager_config": {
    "route": {
      "receiver": "webhook_test",
      "group_by": ["alertname"]
    },
    "templates": [],
    "receivers": [
      {
        "name": "Kyle Email",
        "grafana_managed_receiver_configs": [
          {
            "uid": "",
            "name": "Kyle Email",
            "type": "email",
            "sendReminder": false,
            "disableResolveMessage": true,
            "frequency": "",
            "isDefault": false,
            "settings": {
              "addresses": "kyle@grafana.com",
              "singleEmail": false
            },
            "secureSettings": null,
            "Result": null
          }
        ]
      },
      {
        "name": "webhook_test",
        "grafana_managed_receiver_configs": [
          {
            "uid": "",
            "name": "webhook_test",
            "type": "slack",
            "sendReminder": false,
            "disableResolveMessage": false,
            "frequency": "",
            "isDefault": false,
            "settings": {
              "recipient": "#unified-alerting-test",
              "username": "kyle"
            },
            "secureSettings": {
              "token": ""
            },
            "Result": null
          }
        ]
      }
    ]
  }
}"##;

/// Slack receiver created with a webhook URL.
pub const SLACK_CREATE: &str = r##"{
  "template_files": {},
  "alertmanager_config": {
    "route": { "receiver": "slack.receiver" },
    "templates": null,
    "receivers": [{
      "name": "slack.receiver",
      "grafana_managed_receiver_configs": [{
        "settings": { "recipient": "#unified-alerting-test" },
        "secureSettings": { "url": "http://averysecureurl.com/webhook" },
        "type": "slack",
        "sendReminder": true,
        "name": "slack.receiver",
        "disableResolveMessage": false
      }]
    }]
  }
}"##;

/// Same receiver with a new recipient; the URL is marked unchanged.
pub const SLACK_UPDATE_UNCHANGED: &str = r##"{
  "template_files": {},
  "alertmanager_config": {
    "route": { "receiver": "slack.receiver" },
    "templates": null,
    "receivers": [{
      "name": "slack.receiver",
      "grafana_managed_receiver_configs": [{
        "settings": { "recipient": "#unified-alerting-test-but-updated" },
        "secureFields": { "url": true },
        "type": "slack",
        "sendReminder": true,
        "name": "slack.receiver",
        "disableResolveMessage": false
      }]
    }]
  }
}"##;

/// Slack receiver with the given secure values and presence flags.
pub fn slack_with(secure_settings: serde_json::Value, secure_fields: serde_json::Value) -> String {
    serde_json::json!({
        "template_files": {},
        "alertmanager_config": {
            "route": { "receiver": "slack.receiver" },
            "templates": null,
            "receivers": [{
                "name": "slack.receiver",
                "grafana_managed_receiver_configs": [{
                    "name": "slack.receiver",
                    "type": "slack",
                    "settings": { "recipient": "#alerts" },
                    "secureSettings": secure_settings,
                    "secureFields": secure_fields
                }]
            }]
        }
    })
    .to_string()
}

/// Slack receiver with a webhook URL, posting to `recipient`.
pub fn slack_for(recipient: &str) -> String {
    serde_json::json!({
        "template_files": {},
        "alertmanager_config": {
            "route": { "receiver": "slack.receiver" },
            "templates": null,
            "receivers": [{
                "name": "slack.receiver",
                "grafana_managed_receiver_configs": [{
                    "name": "slack.receiver",
                    "type": "slack",
                    "settings": { "recipient": recipient },
                    "secureSettings": { "url": SLACK_URL }
                }]
            }]
        }
    })
    .to_string()
}

/// Slack recipient of the first integration in a stored or read document.
pub fn first_recipient(config: &serde_json::Value) -> String {
    config["alertmanager_config"]["receivers"][0]["grafana_managed_receiver_configs"][0]
        ["settings"]["recipient"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

/// Parse a wire document.
pub fn document(json: &str) -> PostableConfig {
    serde_json::from_str(json).expect("fixture is not a valid document")
}

/// Receiver names of a document printed by `get`.
pub fn receiver_names(config: &serde_json::Value) -> Vec<String> {
    config["alertmanager_config"]["receivers"]
        .as_array()
        .map(|receivers| {
            receivers
                .iter()
                .filter_map(|r| r["name"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
