use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::status::RequestStatus;
use super::student::{non_blank, StudentRecord};
use crate::error::CoreError;

/// One certificate generation attempt: a batch of students tied to one
/// lesson instance. Field names follow the stored document layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CertificateRequest {
    pub id: Uuid,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub lesson_instance_id: Option<String>,
    #[serde(default)]
    pub student_details: Vec<StudentRecord>,
    pub status: RequestStatus,
    pub timestamp: jiff::Timestamp,
    #[serde(rename = "downloadURL", default)]
    pub download_url: String,
    #[serde(default)]
    pub hash: String,
    /// Whether the information sheet was handed out. `None` leaves the
    /// decision to the certificate profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub information_sheet_handed_out: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// What a creator supplies. Everything else is assigned by
/// [`CertificateRequest::new`].
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewCertificateRequest {
    pub user_id: String,
    #[serde(default)]
    pub lesson_instance_id: Option<String>,
    #[serde(default)]
    pub student_details: Vec<StudentRecord>,
    #[serde(default)]
    pub information_sheet_handed_out: Option<bool>,
}

impl NewCertificateRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.user_id.trim().is_empty() {
            return Err(CoreError::MissingField("userId".to_string()));
        }
        if non_blank(self.lesson_instance_id.as_deref()).is_none() {
            return Err(CoreError::MissingField("lessonInstanceId".to_string()));
        }
        if self.student_details.is_empty() {
            return Err(CoreError::MissingField("studentDetails".to_string()));
        }
        for (index, student) in self.student_details.iter().enumerate() {
            student.validate(index)?;
        }
        Ok(())
    }
}

impl CertificateRequest {
    /// Create a pending request. Creators never set any other status.
    pub fn new(input: NewCertificateRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            lesson_instance_id: input.lesson_instance_id,
            student_details: input.student_details,
            status: RequestStatus::Pending,
            timestamp: jiff::Timestamp::now(),
            download_url: String::new(),
            hash: String::new(),
            information_sheet_handed_out: input.information_sheet_handed_out,
            error_message: None,
        }
    }

    pub fn lesson_instance_id(&self) -> Option<&str> {
        non_blank(self.lesson_instance_id.as_deref())
    }

    /// Move to `next`, rejecting moves the lifecycle does not allow.
    pub fn transition(&mut self, next: RequestStatus) -> Result<(), CoreError> {
        if !self.status.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        Ok(())
    }

    pub fn complete(&mut self, download_url: impl Into<String>) -> Result<(), CoreError> {
        self.transition(RequestStatus::Completed)?;
        self.download_url = download_url.into();
        self.error_message = None;
        Ok(())
    }

    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), CoreError> {
        self.transition(RequestStatus::Error)?;
        self.download_url.clear();
        self.error_message = Some(message.into());
        Ok(())
    }
}

/// The message that hands a freshly created request to the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchMessage {
    pub request_id: Uuid,
}

/// What the UI polls for: where a request stands and, once it is done, the
/// link or the reason it failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RequestStatusView {
    pub id: Uuid,
    pub status: RequestStatus,
    pub progress_label: String,
    #[serde(rename = "downloadURL", default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl From<&CertificateRequest> for RequestStatusView {
    fn from(request: &CertificateRequest) -> Self {
        let completed = request.status == RequestStatus::Completed;
        let failed = request.status == RequestStatus::Error;
        Self {
            id: request.id,
            status: request.status,
            progress_label: request.status.progress_label().to_string(),
            download_url: (completed && !request.download_url.is_empty())
                .then(|| request.download_url.clone()),
            error_message: if failed {
                request.error_message.clone()
            } else {
                None
            },
        }
    }
}
