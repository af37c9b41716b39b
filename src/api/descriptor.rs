//! `GET /config.json`: the activity descriptor Journey Builder reads when
//! the custom activity is installed

use axum::{extract::State, response::Json};
use serde_json::{Value, json};

use super::AppState;
use crate::config::ActivityConfig;
use crate::models::BranchResult;

/// Execute timeout advertised to Journey Builder, in milliseconds
const EXECUTE_TIMEOUT_MS: u32 = 10_000;

pub async fn config_json(State(state): State<AppState>) -> Json<Value> {
    Json(activity_descriptor(&state.config))
}

/// Descriptor with every endpoint URL rooted at `server.public_url`
#[must_use]
pub fn activity_descriptor(config: &ActivityConfig) -> Value {
    let base = config.server.public_url.trim_end_matches('/');
    let use_jwt = config.auth.verify_jwt;
    let lifecycle = |path: &str| {
        json!({
            "url": format!("{base}/{path}"),
            "verb": "POST",
            "useJwt": use_jwt,
        })
    };
    let outcome = |branch: BranchResult, key: &str| {
        json!({
            "key": key,
            "arguments": { "branchResult": branch },
            "metaData": { "label": branch.label() },
        })
    };

    json!({
        "workflowApiVersion": "1.1",
        "metaData": {
            "icon": "images/icon.png",
            "category": "flow",
        },
        "type": "RESTDECISION",
        "lang": {
            "en-US": {
                "name": "Weather Decision",
                "description": "Split contacts on the current weather at their location",
            },
        },
        "arguments": {
            "execute": {
                "inArguments": [{
                    "contactKey": "{{Contact.Key}}",
                    "weatherConditions": config.defaults.adverse_conditions,
                }],
                "outArguments": [],
                "url": format!("{base}/execute"),
                "verb": "POST",
                "body": "",
                "header": "",
                "format": "json",
                "useJwt": use_jwt,
                "timeout": EXECUTE_TIMEOUT_MS,
            },
        },
        "configurationArguments": {
            "save": lifecycle("save"),
            "publish": lifecycle("publish"),
            "validate": lifecycle("validate"),
            "stop": lifecycle("stop"),
        },
        "wizardSteps": [
            { "label": "Configure Weather Decision", "key": "step1" },
        ],
        "userInterfaces": {
            "configModal": { "height": 600, "width": 800, "fullscreen": false },
        },
        "schema": {
            "arguments": {
                "execute": {
                    "inArguments": [],
                    "outArguments": [
                        { "weatherCondition": { "dataType": "Text", "isNullable": false, "direction": "out" } },
                        { "temperature": { "dataType": "Number", "isNullable": true, "direction": "out" } },
                        { "humidity": { "dataType": "Number", "isNullable": true, "direction": "out" } },
                        { "description": { "dataType": "Text", "isNullable": true, "direction": "out" } },
                        { "branchResult": { "dataType": "Text", "isNullable": false, "direction": "out" } },
                    ],
                },
            },
        },
        "outcomes": [
            outcome(BranchResult::AdverseWeather, "adverse_weather"),
            outcome(BranchResult::GoodWeather, "good_weather"),
        ],
    })
}
