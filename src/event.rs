use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Deserialize;

use crate::pipeline::Job;

/// Bucket notification payload in the S3 event shape, which MinIO webhooks
/// emit as well. Every field beyond the bucket and key is optional; real
/// deliveries vary between providers.
#[derive(Debug, Deserialize)]
pub(crate) struct Notification {
    #[serde(rename = "Records", default)]
    pub(crate) records: Vec<EventRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EventRecord {
    #[serde(rename = "eventName", default)]
    pub(crate) event_name: String,
    #[serde(rename = "eventTime")]
    pub(crate) event_time: Option<DateTime<Utc>>,
    #[serde(rename = "responseElements", default)]
    pub(crate) response_elements: ResponseElements,
    pub(crate) s3: S3Entity,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ResponseElements {
    #[serde(rename = "x-amz-request-id")]
    pub(crate) request_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct S3Entity {
    pub(crate) bucket: BucketEntity,
    pub(crate) object: ObjectEntity,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BucketEntity {
    pub(crate) name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ObjectEntity {
    pub(crate) key: String,
    #[serde(default)]
    pub(crate) size: Option<u64>,
}

impl EventRecord {
    /// Turn the record into a [`Job`], minting a local request id when the
    /// delivery carries none, or carries one that cannot name a directory.
    pub(crate) fn into_job(self) -> Job {
        let request_id = self
            .response_elements
            .request_id
            .filter(|id| is_plain_token(id))
            .unwrap_or_else(mint_request_id);
        Job {
            input_bucket: self.s3.bucket.name,
            input_key: self.s3.object.key,
            request_id,
        }
    }
}

/// The request id becomes the job's scratch directory name, so only plain
/// tokens may pass through; path separators and dot segments must not.
fn is_plain_token(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn mint_request_id() -> String {
    let mut rng = rand::rng();
    (0..8)
        .map(|_| rng.sample(rand::distr::Alphanumeric) as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const S3_EVENT: &str = r#"{
        "Records": [
            {
                "eventVersion": "2.1",
                "eventSource": "aws:s3",
                "awsRegion": "us-east-1",
                "eventTime": "2024-05-11T08:30:00.000Z",
                "eventName": "ObjectCreated:Put",
                "responseElements": {
                    "x-amz-request-id": "C3D13FE58DE4C810",
                    "x-amz-id-2": "FMyUVURIY8/IgAtTv8xRjskZQpcIZ9KG4V5Wp6S7S/JRWeUWerMUE5JgHvANOjpD"
                },
                "s3": {
                    "s3SchemaVersion": "1.0",
                    "configurationId": "video-upload",
                    "bucket": {
                        "name": "video-uploads",
                        "arn": "arn:aws:s3:::video-uploads"
                    },
                    "object": {
                        "key": "clips/weekend.mp4",
                        "size": 10485760,
                        "eTag": "0123456789abcdef0123456789abcdef"
                    }
                }
            }
        ]
    }"#;

    #[test]
    fn deserializes_an_s3_event() {
        let notification: Notification = serde_json::from_str(S3_EVENT).unwrap();
        assert_eq!(notification.records.len(), 1);
        let record = &notification.records[0];
        assert_eq!(record.event_name, "ObjectCreated:Put");
        assert!(record.event_time.is_some());
        assert_eq!(record.s3.bucket.name, "video-uploads");
        assert_eq!(record.s3.object.key, "clips/weekend.mp4");
        assert_eq!(record.s3.object.size, Some(10485760));
    }

    #[test]
    fn record_becomes_a_job_with_the_delivered_request_id() {
        let notification: Notification = serde_json::from_str(S3_EVENT).unwrap();
        let job = notification.records.into_iter().next().unwrap().into_job();
        assert_eq!(job.input_bucket, "video-uploads");
        assert_eq!(job.input_key, "clips/weekend.mp4");
        assert_eq!(job.request_id, "C3D13FE58DE4C810");
    }

    #[test]
    fn missing_request_id_gets_a_minted_one() {
        let sparse = r#"{
            "Records": [
                {
                    "eventName": "s3:ObjectCreated:Put",
                    "s3": {
                        "bucket": { "name": "video-uploads" },
                        "object": { "key": "clip.mp4" }
                    }
                }
            ]
        }"#;
        let notification: Notification = serde_json::from_str(sparse).unwrap();
        let job = notification.records.into_iter().next().unwrap().into_job();
        assert_eq!(job.request_id.len(), 8);
        assert!(job.request_id.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn request_ids_that_cannot_name_a_directory_are_replaced() {
        for delivered in ["../victim", "jobs/1", r"jobs\1", "..", ".", ""] {
            let value = serde_json::json!({
                "Records": [
                    {
                        "eventName": "s3:ObjectCreated:Put",
                        "responseElements": { "x-amz-request-id": delivered },
                        "s3": {
                            "bucket": { "name": "video-uploads" },
                            "object": { "key": "clip.mp4" }
                        }
                    }
                ]
            });
            let notification: Notification = serde_json::from_value(value).unwrap();
            let job = notification.records.into_iter().next().unwrap().into_job();
            assert_ne!(job.request_id, delivered, "kept {delivered:?}");
            assert_eq!(job.request_id.len(), 8);
            assert!(job.request_id.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn empty_payload_has_no_records() {
        let notification: Notification = serde_json::from_str("{}").unwrap();
        assert!(notification.records.is_empty());
    }
}
