//! AWS MediaConvert provider.
//!
//! MediaConvert is addressed through an account-specific endpoint. The
//! endpoint is discovered on first use and the client is rebuilt against
//! it, so discovery failures surface as submission errors inside a run.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_mediaconvert::config::{Builder, Region};
use aws_sdk_mediaconvert::error::DisplayErrorContext;
use aws_sdk_mediaconvert::types as mc;
use aws_sdk_mediaconvert::Client;
use serde_json::json;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use hl_models::TranscodeStatus;

use crate::error::{TranscodeError, TranscodeResult};
use crate::provider::{JobSnapshot, TranscodeProvider};
use crate::settings::JobSettings;

async fn shared_config(region: &str) -> aws_config::SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await
}

async fn endpoint_url(client: &Client) -> TranscodeResult<String> {
    let output = client
        .describe_endpoints()
        .send()
        .await
        .map_err(|e| TranscodeError::endpoint(DisplayErrorContext(&e).to_string()))?;

    output
        .endpoints
        .unwrap_or_default()
        .into_iter()
        .find_map(|endpoint| endpoint.url)
        .ok_or_else(|| TranscodeError::endpoint("no endpoints returned"))
}

/// Resolve the account-specific MediaConvert endpoint for `region`.
pub async fn describe_endpoint(region: &str) -> TranscodeResult<String> {
    let shared = shared_config(region).await;
    endpoint_url(&Client::new(&shared)).await
}

/// MediaConvert-backed transcode provider.
pub struct MediaConvertProvider {
    region: String,
    client: OnceCell<Client>,
}

impl MediaConvertProvider {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            client: OnceCell::new(),
        }
    }

    async fn client(&self) -> TranscodeResult<&Client> {
        self.client
            .get_or_try_init(|| async {
                let shared = shared_config(&self.region).await;
                let url = endpoint_url(&Client::new(&shared)).await?;
                info!(region = %self.region, endpoint = %url, "Resolved MediaConvert endpoint");

                let config = Builder::from(&shared).endpoint_url(url).build();
                Ok(Client::from_conf(config))
            })
            .await
    }
}

#[async_trait]
impl TranscodeProvider for MediaConvertProvider {
    async fn create_job(&self, role_arn: &str, settings: &JobSettings) -> TranscodeResult<String> {
        let client = self
            .client()
            .await
            .map_err(|e| TranscodeError::submission(e.to_string()))?;

        let output = client
            .create_job()
            .role(role_arn)
            .settings(to_sdk_settings(settings))
            .send()
            .await
            .map_err(|e| TranscodeError::submission(DisplayErrorContext(&e).to_string()))?;

        output
            .job
            .and_then(|job| job.id)
            .ok_or_else(|| TranscodeError::submission("create_job response has no job id"))
    }

    async fn get_job(&self, job_id: &str) -> TranscodeResult<JobSnapshot> {
        let client = self
            .client()
            .await
            .map_err(|e| TranscodeError::query(job_id, e.to_string()))?;

        let output = client
            .get_job()
            .id(job_id)
            .send()
            .await
            .map_err(|e| TranscodeError::query(job_id, DisplayErrorContext(&e).to_string()))?;

        let job = output
            .job
            .ok_or_else(|| TranscodeError::query(job_id, "get_job response has no job"))?;

        let status = job
            .status
            .as_ref()
            .map(|s| TranscodeStatus::from_provider(s.as_str()))
            .unwrap_or_else(|| TranscodeStatus::Unknown("MISSING".to_string()));
        debug!(job_id, status = %status, "MediaConvert job status");

        let raw = json!({
            "Id": job.id,
            "Status": status.as_str(),
            "CurrentPhase": job.current_phase.as_ref().map(|p| p.as_str()),
            "JobPercentComplete": job.job_percent_complete,
            "ErrorCode": job.error_code,
            "ErrorMessage": job.error_message,
        });

        Ok(JobSnapshot { status, raw })
    }
}

fn dimension(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn to_sdk_settings(settings: &JobSettings) -> mc::JobSettings {
    let inputs = settings
        .inputs
        .iter()
        .map(|input| mc::Input::builder().file_input(&input.file_input).build())
        .collect::<Vec<_>>();

    let output_groups = settings
        .output_groups
        .iter()
        .map(|group| {
            let outputs = group
                .outputs
                .iter()
                .map(|output| {
                    mc::Output::builder()
                        .container_settings(
                            mc::ContainerSettings::builder()
                                .container(mc::ContainerType::from(
                                    output.container_settings.container.as_str(),
                                ))
                                .build(),
                        )
                        .video_description(
                            mc::VideoDescription::builder()
                                .width(dimension(output.video_description.width))
                                .height(dimension(output.video_description.height))
                                .build(),
                        )
                        .build()
                })
                .collect::<Vec<_>>();

            let group_settings = &group.output_group_settings;
            mc::OutputGroup::builder()
                .name(&group.name)
                .output_group_settings(
                    mc::OutputGroupSettings::builder()
                        .r#type(mc::OutputGroupType::from(group_settings.group_type.as_str()))
                        .file_group_settings(
                            mc::FileGroupSettings::builder()
                                .destination(&group_settings.file_group_settings.destination)
                                .build(),
                        )
                        .build(),
                )
                .set_outputs(Some(outputs))
                .build()
        })
        .collect::<Vec<_>>();

    mc::JobSettings::builder()
        .set_inputs(Some(inputs))
        .set_output_groups(Some(output_groups))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hl_models::Rendition;

    #[test]
    fn test_sdk_settings_mirror_description() {
        let settings = JobSettings::file_group(
            "s3://videos/incoming/L/2024-01-01/a.mp4",
            "s3://videos/processed/L/2024-01-01/",
            &Rendition::defaults(),
        );
        let sdk = to_sdk_settings(&settings);

        let inputs = sdk.inputs.unwrap_or_default();
        assert_eq!(
            inputs[0].file_input.as_deref(),
            Some("s3://videos/incoming/L/2024-01-01/a.mp4")
        );

        let groups = sdk.output_groups.unwrap_or_default();
        assert_eq!(groups.len(), 1);
        let group = &groups[0];
        assert_eq!(group.name.as_deref(), Some("File Group"));

        let group_settings = group.output_group_settings.as_ref().unwrap();
        assert_eq!(group_settings.r#type, Some(mc::OutputGroupType::FileGroupSettings));
        assert_eq!(
            group_settings
                .file_group_settings
                .as_ref()
                .and_then(|f| f.destination.as_deref()),
            Some("s3://videos/processed/L/2024-01-01/")
        );

        let outputs = group.outputs.clone().unwrap_or_default();
        assert_eq!(outputs.len(), 2);
        assert_eq!(
            outputs[0].container_settings.as_ref().and_then(|c| c.container.clone()),
            Some(mc::ContainerType::Mp4)
        );
        let video = outputs[0].video_description.as_ref().unwrap();
        assert_eq!(video.width, Some(1280));
        assert_eq!(video.height, Some(720));
    }

    #[test]
    fn test_dimension_saturates() {
        assert_eq!(dimension(720), 720);
        assert_eq!(dimension(u32::MAX), i32::MAX);
    }
}
