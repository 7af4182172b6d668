use crate::core::version::{AppSpec, AppVersion, VersionId};
use proto::{legacy, persistence};
use serde::{Deserialize, Serialize};
use tracing::{event, Level};

/// Storage tag telling which byte schema a record's container section was
/// written in. Everything written today is `Container`; the legacy tags mark
/// records that predate the container model.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    Container,
    LegacyCommand,
    LegacyBlob,
}

/// Byte shape of one durable version record as handed over by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionRecord {
    pub version: VersionId,
    pub format: RecordFormat,
    /// Container section bytes, empty when the version has no container
    pub container: Vec<u8>,
    /// Remainder of the application definition, untouched
    pub payload: serde_json::Value,
}

impl VersionRecord {
    /// Write path. Always the current schema, the legacy formats are
    /// read-only.
    pub fn from_version(version: &AppVersion) -> VersionRecord {
        VersionRecord {
            version: version.version,
            format: RecordFormat::Container,
            container: version
                .spec
                .container
                .as_ref()
                .map(persistence::encode)
                .unwrap_or_default(),
            payload: version.spec.payload.clone(),
        }
    }
}

/// Turn a stored record back into a version snapshot. Total: a container
/// section the current schema cannot parse is retried with the legacy
/// command decoder instead of failing the load.
pub fn decode_record(record: &VersionRecord) -> AppVersion {
    let container = match record.format {
        RecordFormat::Container => {
            if record.container.is_empty() {
                None
            } else {
                match persistence::decode(&record.container) {
                    Ok(spec) => Some(spec),
                    Err(e) => {
                        event!(
                            Level::WARN,
                            "Version {} is not a container record ({}), trying legacy command decoding",
                            record.version,
                            e
                        );
                        Some(legacy::decode_command_envelope(&record.container))
                    }
                }
            }
        }
        RecordFormat::LegacyCommand => Some(legacy::decode_command_envelope(&record.container)),
        RecordFormat::LegacyBlob => Some(legacy::decode_image_blob(&record.container)),
    };

    AppVersion {
        version: record.version,
        spec: AppSpec {
            container,
            payload: record.payload.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use definition::container::{ContainerKind, ContainerSpec, DockerConfig};
    use prost::Message;
    use serde_json::json;

    #[test]
    fn test_record_round_trip() {
        let version = AppVersion::new(
            1_700_000_000_000,
            AppSpec {
                container: Some(ContainerSpec::from_image("redis:3".to_string())),
                payload: json!({"cpus": 0.5, "mem": 256.0}),
            },
        );
        let record = VersionRecord::from_version(&version);
        assert_eq!(record.format, RecordFormat::Container);
        assert_eq!(decode_record(&record), version);
    }

    #[test]
    fn test_record_without_container_section() {
        let version = AppVersion::new(42, AppSpec::new(None));
        let record = VersionRecord::from_version(&version);
        assert!(record.container.is_empty());
        assert_eq!(decode_record(&record).spec.container, None);
    }

    #[test]
    fn test_legacy_blob_record() {
        let record = VersionRecord {
            version: 7,
            format: RecordFormat::LegacyBlob,
            container: b"redis:3".to_vec(),
            payload: serde_json::Value::Null,
        };
        let decoded = decode_record(&record);
        assert_eq!(
            decoded.spec.container,
            Some(ContainerSpec {
                kind: ContainerKind::Docker(Some(DockerConfig::from_image("redis:3".to_string()))),
                volumes: Vec::new(),
            })
        );
    }

    #[test]
    fn test_corrupt_container_record_falls_back() {
        // Tagged as current-schema but holding legacy envelope bytes: the
        // fallback path keeps the record readable.
        let envelope = proto::legacy::CommandEnvelope {
            value: None,
            container: Some(proto::legacy::CommandContainer {
                image: Some("old/app:2".to_string()),
            }),
        };
        let record = VersionRecord {
            version: 9,
            format: RecordFormat::Container,
            container: envelope.encode_to_vec(),
            payload: serde_json::Value::Null,
        };
        let decoded = decode_record(&record);
        let spec = decoded.spec.container.unwrap();
        assert_eq!(spec.docker().unwrap().image, "old/app:2");
    }
}
