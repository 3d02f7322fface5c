use serde_json::{json, Value};
use std::sync::LazyLock;

pub static CONFIG_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "properties": {
            "api": {
                "type": "object",
                "properties": {
                    "base_url": { "type": "string", "format": "uri" },
                    "user_id": { "type": "integer", "minimum": 0 },
                    "request_timeout_secs": { "type": "integer", "minimum": 1 }
                },
                "additionalProperties": false
            },
            "polling": {
                "type": "object",
                "properties": {
                    "interval_secs": { "type": "integer", "minimum": 1 }
                },
                "additionalProperties": false
            },
            "retry": {
                "type": "object",
                "properties": {
                    "max_retries": { "type": "integer", "minimum": 0, "maximum": 10 }
                },
                "additionalProperties": false
            },
            "pagination": {
                "type": "object",
                "properties": {
                    "limit": { "type": "integer", "minimum": 1 }
                },
                "additionalProperties": false
            },
            "upload": {
                "type": "object",
                "properties": {
                    "force_update": { "type": "boolean" },
                    "preferences": {
                        "type": "object",
                        "properties": {
                            "long_description": { "type": "boolean" },
                            "search_terms": { "type": "boolean" },
                            "aggregated_solutions": { "type": "boolean" }
                        }
                    }
                },
                "additionalProperties": false
            }
        },
        "additionalProperties": false
    })
});
