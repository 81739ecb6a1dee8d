//! Typed block configurations.
//!
//! `Node::config` is an untyped record so that graphs from any source can be
//! stored and round-tripped. `BlockConfig` is the closed, typed view of that
//! record for the block types this crate knows. Field names map 1:1 onto the
//! record keys.

use crate::node::ConfigRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;

/// Error returned when a string is not one of an enum field's options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownChoice {
    pub field: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.field, self.value)
    }
}

impl std::error::Error for UnknownChoice {}

/// Generates a closed set of string options for a select field.
///
/// The first listed option is the default.
macro_rules! choice_enum {
    ($(#[$meta:meta])* $name:ident, $field:literal { $($variant:ident => $wire:literal, $label:literal;)+ }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// Every option, in form order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The value stored in the config record.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }

            /// The label shown in the editor form.
            #[must_use]
            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::ALL[0]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownChoice;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|choice| choice.as_str() == s)
                    .ok_or_else(|| UnknownChoice {
                        field: $field,
                        value: s.to_string(),
                    })
            }
        }
    };
}

choice_enum!(
    /// Language model used by an `ai_prompt` block.
    AiModel, "model" {
        Gpt4o => "gpt-4o", "GPT-4o (OpenAI)";
        Gpt4oMini => "gpt-4o-mini", "GPT-4o Mini";
        Claude35Sonnet => "claude-3-5-sonnet-20241022", "Claude 3.5 Sonnet";
        Llama405b => "nvidia/llama-3.1-405b-instruct", "Llama 3.1 405B (Nvidia)";
        Llama70b => "nvidia/llama-3.1-70b-instruct", "Llama 3.1 70B (Nvidia)";
        Gemini20Flash => "google/gemini-2.0-flash-001", "Gemini 2.0 Flash";
        DeepseekChat => "deepseek/deepseek-chat", "DeepSeek Chat";
    }
);

choice_enum!(
    /// HTTP method of an `http_request` block.
    HttpMethod, "method" {
        Get => "GET", "GET";
        Post => "POST", "POST";
        Put => "PUT", "PUT";
        Delete => "DELETE", "DELETE";
    }
);

choice_enum!(
    /// Comparison of a `condition` block.
    ConditionOperator, "operator" {
        Eq => "==", "==";
        Ne => "!=", "!=";
        Contains => "contains", "contains";
        Gt => ">", ">";
        Lt => "<", "<";
    }
);

choice_enum!(
    /// Timezone a `manual_trigger` injects into the run context.
    Timezone, "timezone" {
        Utc => "UTC", "UTC";
        Ist => "IST", "IST (India)";
        Est => "EST", "EST (Eastern)";
        Pst => "PST", "PST (Pacific)";
    }
);

/// Default wait of a `delay` block, in seconds.
pub const DEFAULT_DELAY_SECONDS: f64 = 5.0;

/// Typed configuration of a block, tagged by block type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockConfig {
    AiPrompt { model: AiModel, prompt: String },
    TerminalCommand { command: String },
    WebSearch { query: String },
    HttpRequest { method: HttpMethod, url: String },
    Condition {
        field: String,
        operator: ConditionOperator,
        value: String,
    },
    Output { message: String },
    SendEmail { to: String, subject: String },
    SendTelegram { chat_id: String, message: String },
    Delay { seconds: f64 },
    ScheduleTrigger { cron: String },
    ManualTrigger { timezone: Timezone },
    /// A block type without configuration, or one this crate does not know.
    Opaque { block_type: String },
}

impl BlockConfig {
    /// Reads the typed view of a node's config record.
    ///
    /// Never fails: missing fields and unrecognized option values take their
    /// defaults, extra fields are ignored, and unknown block types become
    /// `Opaque`.
    #[must_use]
    pub fn from_node(block_type: &str, record: &ConfigRecord) -> Self {
        match block_type {
            "ai_prompt" => Self::AiPrompt {
                model: choice(record, "model"),
                prompt: text(record, "prompt"),
            },
            "terminal_command" => Self::TerminalCommand {
                command: text(record, "command"),
            },
            "web_search" => Self::WebSearch {
                query: text(record, "query"),
            },
            "http_request" => Self::HttpRequest {
                method: choice(record, "method"),
                url: text(record, "url"),
            },
            "condition" => Self::Condition {
                field: text(record, "field"),
                operator: choice(record, "operator"),
                value: text(record, "value"),
            },
            "output" => Self::Output {
                message: text(record, "message"),
            },
            "send_email" => Self::SendEmail {
                to: text(record, "to"),
                subject: text(record, "subject"),
            },
            "send_telegram" => Self::SendTelegram {
                chat_id: text(record, "chat_id"),
                message: text(record, "message"),
            },
            "delay" => Self::Delay {
                seconds: number(record, "seconds").unwrap_or(DEFAULT_DELAY_SECONDS),
            },
            "schedule_trigger" => Self::ScheduleTrigger {
                cron: text(record, "cron"),
            },
            "manual_trigger" => Self::ManualTrigger {
                timezone: choice(record, "timezone"),
            },
            other => Self::Opaque {
                block_type: other.to_string(),
            },
        }
    }

    /// The block type this config belongs to.
    #[must_use]
    pub fn block_type(&self) -> &str {
        match self {
            Self::AiPrompt { .. } => "ai_prompt",
            Self::TerminalCommand { .. } => "terminal_command",
            Self::WebSearch { .. } => "web_search",
            Self::HttpRequest { .. } => "http_request",
            Self::Condition { .. } => "condition",
            Self::Output { .. } => "output",
            Self::SendEmail { .. } => "send_email",
            Self::SendTelegram { .. } => "send_telegram",
            Self::Delay { .. } => "delay",
            Self::ScheduleTrigger { .. } => "schedule_trigger",
            Self::ManualTrigger { .. } => "manual_trigger",
            Self::Opaque { block_type } => block_type,
        }
    }

    #[must_use]
    pub fn is_opaque(&self) -> bool {
        matches!(self, Self::Opaque { .. })
    }

    /// Writes the config back as a node config record.
    #[must_use]
    pub fn to_record(&self) -> ConfigRecord {
        let mut record = ConfigRecord::new();
        let mut put = |key: &str, value: JsonValue| {
            record.insert(key.to_string(), value);
        };
        match self {
            Self::AiPrompt { model, prompt } => {
                put("model", model.as_str().into());
                put("prompt", prompt.as_str().into());
            }
            Self::TerminalCommand { command } => put("command", command.as_str().into()),
            Self::WebSearch { query } => put("query", query.as_str().into()),
            Self::HttpRequest { method, url } => {
                put("method", method.as_str().into());
                put("url", url.as_str().into());
            }
            Self::Condition {
                field,
                operator,
                value,
            } => {
                put("field", field.as_str().into());
                put("operator", operator.as_str().into());
                put("value", value.as_str().into());
            }
            Self::Output { message } => put("message", message.as_str().into()),
            Self::SendEmail { to, subject } => {
                put("to", to.as_str().into());
                put("subject", subject.as_str().into());
            }
            Self::SendTelegram { chat_id, message } => {
                put("chat_id", chat_id.as_str().into());
                put("message", message.as_str().into());
            }
            Self::Delay { seconds } => put("seconds", number_value(*seconds)),
            Self::ScheduleTrigger { cron } => put("cron", cron.as_str().into()),
            Self::ManualTrigger { timezone } => put("timezone", timezone.as_str().into()),
            Self::Opaque { .. } => {}
        }
        record
    }
}

fn text(record: &ConfigRecord, key: &str) -> String {
    match record.get(key) {
        Some(JsonValue::String(s)) => s.clone(),
        Some(JsonValue::Number(n)) => n.to_string(),
        Some(JsonValue::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn choice<T: FromStr + Default>(record: &ConfigRecord, key: &str) -> T {
    record
        .get(key)
        .and_then(JsonValue::as_str)
        .and_then(|s| s.parse().ok())
        .unwrap_or_default()
}

/// Reads a number, accepting the string form that HTML inputs produce.
pub(crate) fn number(record: &ConfigRecord, key: &str) -> Option<f64> {
    match record.get(key)? {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Whole numbers are written as integers, matching what editors send.
pub(crate) fn number_value(value: f64) -> JsonValue {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        JsonValue::from(value as i64)
    } else {
        JsonValue::from(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: JsonValue) -> ConfigRecord {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn reads_ai_prompt() {
        let config = BlockConfig::from_node(
            "ai_prompt",
            &record(json!({"model": "deepseek/deepseek-chat", "prompt": "Hi", "label": "x"})),
        );
        assert_eq!(
            config,
            BlockConfig::AiPrompt {
                model: AiModel::DeepseekChat,
                prompt: "Hi".to_string(),
            }
        );
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config = BlockConfig::from_node("delay", &ConfigRecord::new());
        assert_eq!(config, BlockConfig::Delay { seconds: 5.0 });

        let config = BlockConfig::from_node("http_request", &ConfigRecord::new());
        assert_eq!(
            config,
            BlockConfig::HttpRequest {
                method: HttpMethod::Get,
                url: String::new(),
            }
        );
    }

    #[test]
    fn unknown_option_falls_back_to_default() {
        let config = BlockConfig::from_node("manual_trigger", &record(json!({"timezone": "CET"})));
        assert_eq!(config, BlockConfig::ManualTrigger { timezone: Timezone::Utc });
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let config = BlockConfig::from_node("delay", &record(json!({"seconds": " 12 "})));
        assert_eq!(config, BlockConfig::Delay { seconds: 12.0 });
    }

    #[test]
    fn unknown_type_is_opaque() {
        let config = BlockConfig::from_node("screenshot", &record(json!({"anything": 1})));
        assert!(config.is_opaque());
        assert_eq!(config.block_type(), "screenshot");
        assert!(config.to_record().is_empty());
    }

    #[test]
    fn to_record_uses_field_names() {
        let config = BlockConfig::Condition {
            field: "status".to_string(),
            operator: ConditionOperator::Contains,
            value: "ok".to_string(),
        };
        assert_eq!(
            JsonValue::Object(config.to_record()),
            json!({"field": "status", "operator": "contains", "value": "ok"})
        );
    }

    #[test]
    fn whole_seconds_are_written_as_integers() {
        let record = BlockConfig::Delay { seconds: 5.0 }.to_record();
        assert_eq!(record["seconds"], json!(5));
        let record = BlockConfig::Delay { seconds: 1.5 }.to_record();
        assert_eq!(record["seconds"], json!(1.5));
    }

    #[test]
    fn serializes_tagged_by_block_type() {
        let config = BlockConfig::SendTelegram {
            chat_id: "42".to_string(),
            message: "done".to_string(),
        };
        let json = serde_json::to_value(&config).expect("serialize");
        assert_eq!(json["type"], "send_telegram");
        assert_eq!(json["chat_id"], "42");
    }

    #[test]
    fn choice_parse_and_labels() {
        let op: ConditionOperator = "!=".parse().expect("should parse");
        assert_eq!(op, ConditionOperator::Ne);
        assert_eq!(Timezone::Ist.label(), "IST (India)");
        let err = "PATCH".parse::<HttpMethod>().unwrap_err();
        assert!(err.to_string().contains("unknown method 'PATCH'"));
    }
}
