// Copyright 2018 Dmitry Tantsur <divius.inside@gmail.com>
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

//! JSON structures and protocol bits for the Orchestration API.

#![allow(missing_docs)]

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::protocol::{deser_datetime, deser_optional_datetime, Link};
use crate::common::CommaSeparated;
use crate::utils::SortDir;

protocol_enum! {
    #[doc = "Status of a stack or a stack resource."]
    enum StackStatus = Unknown {
        #[doc = "Resource is initialized but not created yet."]
        InitComplete = "INIT_COMPLETE",
        #[doc = "Creation is in progress."]
        CreateInProgress = "CREATE_IN_PROGRESS",
        #[doc = "Creation finished."]
        CreateComplete = "CREATE_COMPLETE",
        #[doc = "Creation failed."]
        CreateFailed = "CREATE_FAILED",
        #[doc = "Deletion is in progress."]
        DeleteInProgress = "DELETE_IN_PROGRESS",
        #[doc = "Deletion finished."]
        DeleteComplete = "DELETE_COMPLETE",
        #[doc = "Deletion failed."]
        DeleteFailed = "DELETE_FAILED",
        #[doc = "Update is in progress."]
        UpdateInProgress = "UPDATE_IN_PROGRESS",
        #[doc = "Update finished."]
        UpdateComplete = "UPDATE_COMPLETE",
        #[doc = "Update failed."]
        UpdateFailed = "UPDATE_FAILED",
        #[doc = "Rollback is in progress."]
        RollbackInProgress = "ROLLBACK_IN_PROGRESS",
        #[doc = "Rollback finished."]
        RollbackComplete = "ROLLBACK_COMPLETE",
        #[doc = "Rollback failed."]
        RollbackFailed = "ROLLBACK_FAILED",
        #[doc = "Suspending is in progress."]
        SuspendInProgress = "SUSPEND_IN_PROGRESS",
        #[doc = "Stack is suspended."]
        SuspendComplete = "SUSPEND_COMPLETE",
        #[doc = "Suspending failed."]
        SuspendFailed = "SUSPEND_FAILED",
        #[doc = "Resuming is in progress."]
        ResumeInProgress = "RESUME_IN_PROGRESS",
        #[doc = "Stack is resumed."]
        ResumeComplete = "RESUME_COMPLETE",
        #[doc = "Resuming failed."]
        ResumeFailed = "RESUME_FAILED",
        #[doc = "Adoption is in progress."]
        AdoptInProgress = "ADOPT_IN_PROGRESS",
        #[doc = "Adoption finished."]
        AdoptComplete = "ADOPT_COMPLETE",
        #[doc = "Adoption failed."]
        AdoptFailed = "ADOPT_FAILED",
        #[doc = "Snapshot is in progress."]
        SnapshotInProgress = "SNAPSHOT_IN_PROGRESS",
        #[doc = "Snapshot finished."]
        SnapshotComplete = "SNAPSHOT_COMPLETE",
        #[doc = "Snapshot failed."]
        SnapshotFailed = "SNAPSHOT_FAILED",
        #[doc = "Check is in progress."]
        CheckInProgress = "CHECK_IN_PROGRESS",
        #[doc = "Check finished."]
        CheckComplete = "CHECK_COMPLETE",
        #[doc = "Check failed."]
        CheckFailed = "CHECK_FAILED",
        #[doc = "Status not known to this library."]
        Unknown = "UNKNOWN"
    }
}

impl StackStatus {
    /// Whether the status denotes a failed operation.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            StackStatus::CreateFailed
                | StackStatus::DeleteFailed
                | StackStatus::UpdateFailed
                | StackStatus::RollbackFailed
                | StackStatus::SuspendFailed
                | StackStatus::ResumeFailed
                | StackStatus::AdoptFailed
                | StackStatus::SnapshotFailed
                | StackStatus::CheckFailed
        )
    }

    /// Whether an operation is still running.
    pub fn is_in_progress(&self) -> bool {
        matches!(
            self,
            StackStatus::CreateInProgress
                | StackStatus::DeleteInProgress
                | StackStatus::UpdateInProgress
                | StackStatus::RollbackInProgress
                | StackStatus::SuspendInProgress
                | StackStatus::ResumeInProgress
                | StackStatus::AdoptInProgress
                | StackStatus::SnapshotInProgress
                | StackStatus::CheckInProgress
        )
    }
}

protocol_enum! {
    #[doc = "Available sort keys for stacks."]
    enum StackSortKey {
        #[doc = "Creation time."]
        CreationTime = "creation_time",
        #[doc = "Stack name."]
        Name = "stack_name",
        #[doc = "Stack status."]
        Status = "stack_status",
        #[doc = "Last update time."]
        UpdatedTime = "updated_time"
    }
}

query_filter! {
    #[doc = "Available filters for stack listing."]
    enum StackFilter {
        #[doc = "Filter by action (e.g. `CREATE`)."]
        Action(String) = "action",
        #[doc = "List stacks of all projects (requires admin)."]
        GlobalTenant(bool) = "global_tenant",
        #[doc = "Filter by stack ID."]
        Id(String) = "id",
        #[doc = "Limit the number of results."]
        Limit(usize) = "limit",
        #[doc = "Start listing after the given stack ID."]
        Marker(String) = "marker",
        #[doc = "Filter by stack name."]
        Name(String) = "name",
        #[doc = "Stacks without all of the tags."]
        NotTags(CommaSeparated<String>) = "not_tags",
        #[doc = "Stacks without any of the tags."]
        NotTagsAny(CommaSeparated<String>) = "not_tags_any",
        #[doc = "Include deleted stacks."]
        ShowDeleted(bool) = "show_deleted",
        #[doc = "Include hidden stacks."]
        ShowHidden(bool) = "show_hidden",
        #[doc = "Include nested stacks."]
        ShowNested(bool) = "show_nested",
        #[doc = "Sort direction."]
        SortDir(SortDir) = "sort_dir",
        #[doc = "Sort key."]
        SortKey(StackSortKey) = "sort_keys",
        #[doc = "Filter by status (e.g. `COMPLETE`)."]
        Status(String) = "status",
        #[doc = "Stacks with all of the tags."]
        Tags(CommaSeparated<String>) = "tags",
        #[doc = "Stacks with any of the tags."]
        TagsAny(CommaSeparated<String>) = "tags_any",
        #[doc = "Filter by project ID."]
        Tenant(String) = "tenant"
    }
}

/// A stack output.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StackOutput {
    /// Output name.
    #[serde(rename = "output_key")]
    pub key: String,
    /// Output value.
    #[serde(rename = "output_value", default)]
    pub value: Value,
    /// Output description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Error when evaluating the output (if any).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StackSummary {
    #[serde(deserialize_with = "deser_datetime")]
    pub creation_time: DateTime<FixedOffset>,
    #[serde(default)]
    pub description: Option<String>,
    pub id: String,
    #[serde(default)]
    pub links: Vec<Link>,
    pub stack_name: String,
    pub stack_status: StackStatus,
    #[serde(default)]
    pub stack_status_reason: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(deserialize_with = "deser_optional_datetime", default)]
    pub updated_time: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Stack {
    #[serde(default)]
    pub capabilities: Vec<Value>,
    #[serde(deserialize_with = "deser_datetime")]
    pub creation_time: DateTime<FixedOffset>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub disable_rollback: bool,
    pub id: String,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub notification_topics: Vec<Value>,
    #[serde(default)]
    pub outputs: Vec<StackOutput>,
    #[serde(default)]
    pub parameters: HashMap<String, Value>,
    #[serde(default)]
    pub parent: Option<String>,
    pub stack_name: String,
    pub stack_status: StackStatus,
    #[serde(default)]
    pub stack_status_reason: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub template_description: Option<String>,
    #[serde(default)]
    pub timeout_mins: Option<u32>,
    #[serde(deserialize_with = "deser_optional_datetime", default)]
    pub updated_time: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StackRoot {
    pub stack: Stack,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StackIdentity {
    pub id: String,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StackIdentityRoot {
    pub stack: StackIdentity,
}

/// Result of a stack preview.
#[derive(Debug, Clone, Deserialize)]
pub struct StackPreview {
    /// Stack capabilities.
    #[serde(default)]
    pub capabilities: Vec<Value>,
    /// Stack description.
    #[serde(default)]
    pub description: Option<String>,
    /// Whether rollback on failure is disabled.
    #[serde(default)]
    pub disable_rollback: bool,
    /// Stack ID (always `None` for previews).
    #[serde(default)]
    pub id: Option<String>,
    /// Links to the stack.
    #[serde(default)]
    pub links: Vec<Link>,
    /// Notification topics.
    #[serde(default)]
    pub notification_topics: Vec<Value>,
    /// Resolved parameters.
    #[serde(default)]
    pub parameters: HashMap<String, Value>,
    /// Resources that would be created, possibly nested into lists.
    #[serde(default)]
    pub resources: Vec<Value>,
    /// Stack name.
    pub stack_name: String,
    /// Template description.
    #[serde(default)]
    pub template_description: Option<String>,
    /// Stack creation timeout in minutes.
    #[serde(default)]
    pub timeout_mins: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StackPreviewRoot {
    pub stack: StackPreview,
}

/// Data returned when abandoning a stack.
///
/// It can be passed back when adopting a stack.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AbandonedStack {
    /// Last action on the stack.
    #[serde(default)]
    pub action: Option<String>,
    /// Stack environment.
    #[serde(default)]
    pub environment: Value,
    /// Files used by the stack.
    #[serde(default)]
    pub files: HashMap<String, String>,
    /// Stack ID.
    pub id: String,
    /// Stack name.
    pub name: String,
    /// Project ID.
    #[serde(default)]
    pub project_id: Option<String>,
    /// Data of the stack resources.
    #[serde(default)]
    pub resources: HashMap<String, Value>,
    /// Status of the last action.
    #[serde(default)]
    pub status: Option<String>,
    /// ID of the project used for stack users.
    #[serde(default)]
    pub stack_user_project_id: Option<String>,
    /// Stack template.
    #[serde(default)]
    pub template: Value,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StackCreate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adopt_stack_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_rollback: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub files: HashMap<String, String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub parameters: HashMap<String, Value>,
    pub stack_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_mins: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StackUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_rollback: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub files: HashMap<String, String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub parameters: HashMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_mins: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Resource {
    #[serde(default)]
    pub attributes: HashMap<String, Value>,
    #[serde(deserialize_with = "deser_optional_datetime", default)]
    pub creation_time: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub links: Vec<Link>,
    pub logical_resource_id: String,
    #[serde(default)]
    pub parent_resource: Option<String>,
    #[serde(default)]
    pub physical_resource_id: Option<String>,
    #[serde(default)]
    pub required_by: Vec<String>,
    pub resource_name: String,
    pub resource_status: StackStatus,
    #[serde(default)]
    pub resource_status_reason: Option<String>,
    pub resource_type: String,
    #[serde(deserialize_with = "deser_optional_datetime", default)]
    pub updated_time: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourceRoot {
    pub resource: Resource,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourceMetadataRoot {
    #[serde(default)]
    pub metadata: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkUnhealthy {
    pub mark_unhealthy: bool,
    pub resource_status_reason: String,
}
