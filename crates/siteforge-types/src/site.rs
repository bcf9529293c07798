use serde::{Deserialize, Serialize};

/// The three text payloads extracted from one model response.
///
/// Markup is mandatory for a bundle to exist at all; a missing styling or
/// script segment degrades to an empty string rather than failing the turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteBundle {
    pub markup: String,
    pub styling: String,
    pub script: String,
}

/// A packaged site: one zip archive, ready for upload.
#[derive(Debug, Clone)]
pub struct SiteArchive {
    pub bytes: Vec<u8>,
}

impl SiteArchive {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Payload sent to the deploy trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployRequest {
    pub username: String,
    pub project_name: String,
    pub prompt: String,
    pub metadata: DeployMetadata,
}

/// Audit metadata carried alongside a deploy request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployMetadata {
    /// Originating channel tag, e.g. "whatsapp".
    pub source: String,
    pub message_id: String,
    pub profile_name: Option<String>,
    pub project_id: String,
    pub last_ai_summary: Option<String>,
}

/// Response from the deploy trigger. `status` is the only field the trigger
/// is required to return; unknown extra fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployStatus {
    pub status: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl DeployStatus {
    /// A deploy that reported an error status counts as a delivery failure
    /// even though the HTTP exchange succeeded.
    pub fn is_error(&self) -> bool {
        self.status.eq_ignore_ascii_case("error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deploy_status_tolerates_extra_fields() {
        let status: DeployStatus =
            serde_json::from_str(r#"{"status":"queued","deployment_id":"dpl_1"}"#).unwrap();
        assert_eq!(status.status, "queued");
        assert!(status.url.is_none());
        assert!(!status.is_error());
    }

    #[test]
    fn test_deploy_status_error_detection() {
        let status: DeployStatus = serde_json::from_str(r#"{"status":"ERROR"}"#).unwrap();
        assert!(status.is_error());
    }

    #[test]
    fn test_deploy_request_field_names() {
        let request = DeployRequest {
            username: "u1".to_string(),
            project_name: "My Site".to_string(),
            prompt: "a bakery".to_string(),
            metadata: DeployMetadata {
                source: "whatsapp".to_string(),
                message_id: "SM1".to_string(),
                profile_name: None,
                project_id: "p1".to_string(),
                last_ai_summary: None,
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["project_name"], "My Site");
        assert_eq!(json["metadata"]["message_id"], "SM1");
        assert_eq!(json["metadata"]["source"], "whatsapp");
    }
}
