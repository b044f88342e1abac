//! Job description builder.
//!
//! Mirrors the provider's job settings JSON: one input, one file output
//! group, one output per rendition. Only container and resolution are set;
//! codec and bitrate are left at provider defaults, which is not tuned for
//! production output.

use serde::{Deserialize, Serialize};

use hl_models::Rendition;

pub const OUTPUT_GROUP_NAME: &str = "File Group";
pub const FILE_GROUP_TYPE: &str = "FILE_GROUP_SETTINGS";
pub const MP4_CONTAINER: &str = "MP4";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobSettings {
    pub inputs: Vec<JobInput>,
    pub output_groups: Vec<OutputGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobInput {
    pub file_input: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutputGroup {
    pub name: String,
    pub output_group_settings: OutputGroupSettings,
    pub outputs: Vec<JobOutput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutputGroupSettings {
    #[serde(rename = "Type")]
    pub group_type: String,
    pub file_group_settings: FileGroupSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FileGroupSettings {
    pub destination: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobOutput {
    pub container_settings: ContainerSettings,
    pub video_description: VideoDescription,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerSettings {
    pub container: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VideoDescription {
    pub width: u32,
    pub height: u32,
}

impl JobSettings {
    /// Settings for transcoding `input` into one MP4 per rendition under `output_prefix`.
    pub fn file_group(input: &str, output_prefix: &str, renditions: &[Rendition]) -> Self {
        let outputs = renditions
            .iter()
            .map(|r| JobOutput {
                container_settings: ContainerSettings {
                    container: MP4_CONTAINER.to_string(),
                },
                video_description: VideoDescription {
                    width: r.width,
                    height: r.height,
                },
            })
            .collect();

        Self {
            inputs: vec![JobInput {
                file_input: input.to_string(),
            }],
            output_groups: vec![OutputGroup {
                name: OUTPUT_GROUP_NAME.to_string(),
                output_group_settings: OutputGroupSettings {
                    group_type: FILE_GROUP_TYPE.to_string(),
                    file_group_settings: FileGroupSettings {
                        destination: output_prefix.to_string(),
                    },
                },
                outputs,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_output_per_rendition() {
        let settings = JobSettings::file_group(
            "s3://videos/incoming/L/2024-01-01/a.mp4",
            "s3://videos/processed/L/2024-01-01/",
            &Rendition::defaults(),
        );

        assert_eq!(settings.inputs.len(), 1);
        assert_eq!(settings.output_groups.len(), 1);
        let group = &settings.output_groups[0];
        assert_eq!(group.outputs.len(), 2);
        assert_eq!(group.outputs[0].video_description.width, 1280);
        assert_eq!(group.outputs[1].video_description.height, 480);
        assert!(group.outputs.iter().all(|o| o.container_settings.container == "MP4"));
    }

    #[test]
    fn test_serializes_provider_shape() {
        let settings = JobSettings::file_group("s3://b/in.mp4", "s3://b/out/", &[Rendition::new(640, 360)]);
        let json = serde_json::to_value(&settings).unwrap();

        assert_eq!(json["Inputs"][0]["FileInput"], "s3://b/in.mp4");
        let group = &json["OutputGroups"][0];
        assert_eq!(group["Name"], "File Group");
        assert_eq!(group["OutputGroupSettings"]["Type"], "FILE_GROUP_SETTINGS");
        assert_eq!(
            group["OutputGroupSettings"]["FileGroupSettings"]["Destination"],
            "s3://b/out/"
        );
        assert_eq!(group["Outputs"][0]["ContainerSettings"]["Container"], "MP4");
        assert_eq!(group["Outputs"][0]["VideoDescription"]["Width"], 640);
        assert_eq!(group["Outputs"][0]["VideoDescription"]["Height"], 360);
    }
}
