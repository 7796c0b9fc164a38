// Copyright 2024 Dmitry Tantsur <dtantsur@protonmail.com>
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

#![cfg(feature = "orchestration")]

use std::sync::Once;

use reqwest::Url;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use openstack_bindings::auth::NoAuth;
use openstack_bindings::common::Waiter;
use openstack_bindings::orchestration::{Environment, StackStatus, Template};
use openstack_bindings::{Cloud, ErrorKind};

static INIT: Once = Once::new();

async fn set_up() -> (MockServer, Cloud) {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });

    let server = MockServer::start().await;
    let auth =
        NoAuth::new(format!("{}/v1/abcd", server.uri())).expect("Invalid mock server URI");
    let cloud = Cloud::new(auth).await.expect("Cannot create a cloud");
    (server, cloud)
}

fn stack(status: &str) -> serde_json::Value {
    json!({
        "stack": {
            "id": "3095aefc",
            "stack_name": "my-stack",
            "stack_status": status,
            "creation_time": "2024-02-13T09:24:35Z",
            "outputs": [
                {"output_key": "server_ip", "output_value": "192.0.2.10"}
            ],
            "parameters": {"OS::stack_name": "my-stack"}
        }
    })
}

#[tokio::test]
async fn test_get_stack_follows_redirect() {
    let (server, os) = set_up().await;

    Mock::given(method("GET"))
        .and(path("/v1/abcd/stacks/my-stack"))
        .respond_with(ResponseTemplate::new(302).insert_header(
            "Location",
            format!("{}/v1/abcd/stacks/my-stack/3095aefc", server.uri()).as_str(),
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/abcd/stacks/my-stack/3095aefc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stack("CREATE_COMPLETE")))
        .expect(1)
        .mount(&server)
        .await;

    let stack = os.get_stack("my-stack").await.expect("Cannot find a stack");
    assert_eq!(stack.id(), "3095aefc");
    assert_eq!(stack.status(), StackStatus::CreateComplete);
    let output = stack.output("server_ip").expect("No output server_ip");
    assert_eq!(output.value, json!("192.0.2.10"));
    assert!(stack.output("missing").is_none());
}

#[tokio::test]
async fn test_list_stacks_with_marker() {
    let (server, os) = set_up().await;

    Mock::given(method("GET"))
        .and(path("/v1/abcd/stacks"))
        .and(query_param("marker", "3095aefc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"stacks": []})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/abcd/stacks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "stacks": [{
                "id": "3095aefc",
                "stack_name": "my-stack",
                "stack_status": "UPDATE_IN_PROGRESS",
                "creation_time": "2024-02-13T09:24:35Z"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let stacks = os.list_stacks().await.expect("Cannot list stacks");
    assert_eq!(stacks.len(), 1);
    assert_eq!(stacks[0].name(), "my-stack");
    assert_eq!(stacks[0].status(), StackStatus::UpdateInProgress);
}

#[tokio::test]
async fn test_delete_stack_and_wait() {
    let (server, os) = set_up().await;

    Mock::given(method("GET"))
        .and(path("/v1/abcd/stacks/my-stack"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stack("CREATE_COMPLETE")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/abcd/stacks/my-stack/3095aefc"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/abcd/stacks/my-stack/3095aefc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stack("DELETE_COMPLETE")))
        .expect(1)
        .mount(&server)
        .await;

    let stack = os.get_stack("my-stack").await.expect("Cannot find a stack");
    stack
        .delete()
        .await
        .expect("Cannot delete a stack")
        .wait()
        .await
        .expect("Stack deletion failed");
}

const TEMPLATE: &str = "heat_template_version: 2018-08-31
resources:
  config:
    type: OS::Heat::SoftwareConfig
    properties:
      config: {get_file: script.sh}
";

const ENVIRONMENT: &str = "parameter_defaults:
  flavor: m1.small
";

fn template(server: &MockServer) -> Template {
    let base = Url::parse(&format!("{}/templates/", server.uri())).expect("Invalid base URL");
    Template::from_str(TEMPLATE)
        .expect("Invalid template")
        .with_base_url(base)
}

async fn mount_script(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/templates/script.sh"))
        .respond_with(ResponseTemplate::new(200).set_body_string("echo hello"))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_stack(server: &MockServer, status: &str) {
    Mock::given(method("GET"))
        .and(path("/v1/abcd/stacks/my-stack/3095aefc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stack(status)))
        .mount(server)
        .await;
}

async fn received_body(server: &MockServer, verb: &str, url_path: &str) -> Value {
    let requests: Vec<Request> = server
        .received_requests()
        .await
        .expect("Request recording is disabled");
    let request = requests
        .into_iter()
        .find(|r| r.method.as_str() == verb && r.url.path() == url_path)
        .expect("Request was not received");
    request.body_json().expect("Request body is not JSON")
}

#[tokio::test]
async fn test_create_stack_resolves_templates() {
    let (server, os) = set_up().await;
    mount_script(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1/abcd/stacks"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"stack": {"id": "3095aefc"}})),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_stack(&server, "CREATE_IN_PROGRESS").await;

    let waiter = os
        .new_stack("my-stack")
        .with_template(template(&server))
        .with_environment(Environment::from_str(ENVIRONMENT).expect("Invalid environment"))
        .with_parameter("key_name", "default")
        .with_tags(vec!["web", "prod"])
        .with_timeout_mins(30u32)
        .create()
        .await
        .expect("Cannot create a stack");
    assert_eq!(waiter.current_state().id(), "3095aefc");
    assert_eq!(
        waiter.current_state().status(),
        StackStatus::CreateInProgress
    );

    let script_url = format!("{}/templates/script.sh", server.uri());
    let body = received_body(&server, "POST", "/v1/abcd/stacks").await;
    assert_eq!(body["stack_name"], json!("my-stack"));
    assert_eq!(body["tags"], json!("web,prod"));
    assert_eq!(body["timeout_mins"], json!(30));
    assert_eq!(body["parameters"], json!({"key_name": "default"}));
    assert_eq!(body["environment"], json!(ENVIRONMENT));
    assert_eq!(body["files"], json!({ script_url.clone(): "echo hello" }));
    let sent_template = body["template"].as_str().expect("No template sent");
    assert!(sent_template.contains(&script_url));
    assert!(body.get("adopt_stack_data").is_none());
}

#[tokio::test]
async fn test_create_stack_without_name() {
    let (server, os) = set_up().await;

    let err = os
        .new_stack("")
        .with_template(template(&server))
        .create()
        .await
        .err()
        .expect("Stack without a name was accepted");
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(err.to_string().contains("Missing input for argument [Name]"));
    assert!(server
        .received_requests()
        .await
        .expect("Request recording is disabled")
        .is_empty());
}

#[tokio::test]
async fn test_create_stack_without_template() {
    let (server, os) = set_up().await;

    let err = os
        .new_stack("my-stack")
        .with_parameter("key_name", "default")
        .create()
        .await
        .err()
        .expect("Stack without a template was accepted");
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(err
        .to_string()
        .contains("Missing input for argument [Template]"));
    assert!(server
        .received_requests()
        .await
        .expect("Request recording is disabled")
        .is_empty());
}

#[tokio::test]
async fn test_preview_stack() {
    let (server, os) = set_up().await;
    mount_script(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1/abcd/stacks/preview"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "stack": {
                "stack_name": "my-stack",
                "id": "None",
                "parameters": {"OS::stack_name": "my-stack"},
                "resources": [{"resource_name": "config"}]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let preview = os
        .new_stack("my-stack")
        .with_template(template(&server))
        .preview()
        .await
        .expect("Cannot preview a stack");
    assert_eq!(preview.stack_name, "my-stack");
    assert_eq!(preview.resources.len(), 1);

    let body = received_body(&server, "POST", "/v1/abcd/stacks/preview").await;
    assert_eq!(body["stack_name"], json!("my-stack"));
    assert!(body["template"].is_string());
    assert!(body.get("tags").is_none());
}

#[tokio::test]
async fn test_abandon_and_adopt_stack() {
    let (server, os) = set_up().await;
    Mock::given(method("GET"))
        .and(path("/v1/abcd/stacks/my-stack"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stack("CREATE_COMPLETE")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/abcd/stacks/my-stack/3095aefc/abandon"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "action": "CREATE",
            "environment": {"parameters": {}},
            "files": {},
            "id": "3095aefc",
            "name": "my-stack",
            "project_id": "abcd",
            "resources": {
                "config": {
                    "action": "CREATE",
                    "resource_id": "d8ae3c4b",
                    "status": "COMPLETE",
                    "type": "OS::Heat::SoftwareConfig"
                }
            },
            "status": "COMPLETE",
            "template": {"heat_template_version": "2018-08-31"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/abcd/stacks"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"stack": {"id": "3095aefc"}})),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_stack(&server, "ADOPT_IN_PROGRESS").await;

    let stack = os.get_stack("my-stack").await.expect("Cannot find a stack");
    let data = stack.abandon().await.expect("Cannot abandon a stack");
    assert_eq!(data.id, "3095aefc");
    assert_eq!(data.name, "my-stack");
    assert_eq!(data.action.as_deref(), Some("CREATE"));
    assert_eq!(data.status.as_deref(), Some("COMPLETE"));
    assert_eq!(data.project_id.as_deref(), Some("abcd"));
    assert_eq!(
        data.resources["config"]["resource_id"],
        json!("d8ae3c4b")
    );
    assert_eq!(
        data.template["heat_template_version"],
        json!("2018-08-31")
    );

    let waiter = os
        .new_stack("my-stack")
        .with_adopt_data(&data)
        .expect("Cannot serialize adoption data")
        .create()
        .await
        .expect("Cannot adopt a stack");
    assert_eq!(waiter.current_state().status(), StackStatus::AdoptInProgress);

    let body = received_body(&server, "POST", "/v1/abcd/stacks").await;
    assert!(body.get("template").is_none());
    let adopted: Value = serde_json::from_str(
        body["adopt_stack_data"]
            .as_str()
            .expect("No adoption data sent"),
    )
    .expect("Adoption data is not JSON");
    assert_eq!(adopted["id"], json!("3095aefc"));
    assert_eq!(adopted["resources"]["config"]["status"], json!("COMPLETE"));
}

#[tokio::test]
async fn test_update_stack_requires_template() {
    let (server, os) = set_up().await;
    Mock::given(method("GET"))
        .and(path("/v1/abcd/stacks/my-stack"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stack("CREATE_COMPLETE")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(202))
        .expect(0)
        .mount(&server)
        .await;

    let stack = os.get_stack("my-stack").await.expect("Cannot find a stack");
    let err = stack
        .update()
        .with_parameter("flavor", "m1.large")
        .send()
        .await
        .err()
        .expect("Update without a template was accepted");
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(err
        .to_string()
        .contains("Missing input for argument [Template]"));
}

#[tokio::test]
async fn test_update_stack() {
    let (server, os) = set_up().await;
    mount_script(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1/abcd/stacks/my-stack"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stack("CREATE_COMPLETE")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/v1/abcd/stacks/my-stack/3095aefc"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;
    mount_stack(&server, "UPDATE_IN_PROGRESS").await;

    let stack = os.get_stack("my-stack").await.expect("Cannot find a stack");
    let waiter = stack
        .update()
        .with_template(template(&server))
        .with_tags(vec!["web"])
        .send()
        .await
        .expect("Cannot update a stack");
    assert_eq!(
        waiter.current_state().status(),
        StackStatus::UpdateInProgress
    );

    let body = received_body(&server, "PUT", "/v1/abcd/stacks/my-stack/3095aefc").await;
    assert_eq!(body["tags"], json!("web"));
    assert!(body["template"].is_string());
    assert_eq!(
        body["files"][format!("{}/templates/script.sh", server.uri())],
        json!("echo hello")
    );
}

#[tokio::test]
async fn test_patch_stack_without_template() {
    let (server, os) = set_up().await;
    Mock::given(method("GET"))
        .and(path("/v1/abcd/stacks/my-stack"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stack("CREATE_COMPLETE")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/v1/abcd/stacks/my-stack/3095aefc"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;
    mount_stack(&server, "UPDATE_COMPLETE").await;

    let stack = os.get_stack("my-stack").await.expect("Cannot find a stack");
    let waiter = stack
        .patch()
        .with_parameter("flavor", "m1.large")
        .send()
        .await
        .expect("Cannot patch a stack");
    let stack = waiter.wait().await.expect("Stack update failed");
    assert_eq!(stack.status(), StackStatus::UpdateComplete);

    let body = received_body(&server, "PATCH", "/v1/abcd/stacks/my-stack/3095aefc").await;
    assert_eq!(body, json!({"parameters": {"flavor": "m1.large"}}));
}

#[tokio::test]
async fn test_create_stack_conflict() {
    let (server, os) = set_up().await;
    mount_script(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1/abcd/stacks"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": 409,
            "error": {
                "message": "The Stack (my-stack) already exists.",
                "type": "StackExists"
            },
            "explanation": "There was a conflict when trying to complete your request.",
            "title": "Conflict"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = os
        .new_stack("my-stack")
        .with_template(template(&server))
        .create()
        .await
        .err()
        .expect("Duplicate stack was accepted");
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(err.to_string().contains("already exists"));
}
