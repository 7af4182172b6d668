use crate::{KindCode, NetworkModeCode, ParseError, VolumeModeCode};
use definition::container::{
    ContainerKind, ContainerSpec, DockerConfig, Parameter, PortMapping, Protocol, Volume,
    VolumeMode,
};
use prost::Message;

/// Root of the durable record schema. Tags are the storage compatibility
/// contract and must not be renumbered.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ContainerRecord {
    #[prost(enumeration = "KindCode", tag = "1")]
    pub kind: i32,
    #[prost(message, repeated, tag = "2")]
    pub volumes: Vec<VolumeRecord>,
    #[prost(message, optional, tag = "3")]
    pub docker: Option<DockerRecord>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VolumeRecord {
    #[prost(string, tag = "1")]
    pub container_path: String,
    #[prost(string, tag = "2")]
    pub host_path: String,
    #[prost(enumeration = "VolumeModeCode", tag = "3")]
    pub mode: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DockerRecord {
    #[prost(string, tag = "1")]
    pub image: String,
    #[prost(enumeration = "NetworkModeCode", optional, tag = "2")]
    pub network: Option<i32>,
    #[prost(message, repeated, tag = "3")]
    pub port_mappings: Vec<PortMappingRecord>,
    #[prost(bool, tag = "4")]
    pub privileged: bool,
    #[prost(message, repeated, tag = "5")]
    pub parameters: Vec<ParameterRecord>,
    #[prost(bool, tag = "6")]
    pub force_pull_image: bool,
}

/// Unlike the scheduler schema this one keeps `service_port`, the routing
/// layer reads it back from storage.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PortMappingRecord {
    #[prost(uint32, tag = "1")]
    pub container_port: u32,
    #[prost(uint32, tag = "2")]
    pub host_port: u32,
    #[prost(uint32, tag = "3")]
    pub service_port: u32,
    #[prost(string, tag = "4")]
    pub protocol: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ParameterRecord {
    #[prost(string, tag = "1")]
    pub key: String,
    #[prost(string, tag = "2")]
    pub value: String,
}

impl From<&Volume> for VolumeRecord {
    fn from(volume: &Volume) -> Self {
        VolumeRecord {
            container_path: volume.container_path.clone(),
            host_path: volume.host_path.clone(),
            mode: VolumeModeCode::from(volume.mode) as i32,
        }
    }
}

impl From<&PortMapping> for PortMappingRecord {
    fn from(mapping: &PortMapping) -> Self {
        PortMappingRecord {
            container_port: u32::from(mapping.container_port),
            host_port: u32::from(mapping.host_port),
            service_port: u32::from(mapping.service_port),
            protocol: mapping.protocol.to_string(),
        }
    }
}

impl From<&DockerConfig> for DockerRecord {
    fn from(config: &DockerConfig) -> Self {
        DockerRecord {
            image: config.image.clone(),
            network: config.network.map(|n| NetworkModeCode::from(n) as i32),
            port_mappings: config
                .port_mappings
                .iter()
                .flatten()
                .map(PortMappingRecord::from)
                .collect(),
            privileged: config.privileged,
            parameters: config
                .parameters
                .iter()
                .map(|p| ParameterRecord {
                    key: p.key.clone(),
                    value: p.value.clone(),
                })
                .collect(),
            force_pull_image: config.force_pull_image,
        }
    }
}

impl From<&ContainerSpec> for ContainerRecord {
    fn from(spec: &ContainerSpec) -> Self {
        let kind = match spec.kind {
            ContainerKind::Docker(_) => KindCode::Docker,
            ContainerKind::Native(_) => KindCode::Native,
        };
        ContainerRecord {
            kind: kind as i32,
            volumes: spec.volumes.iter().map(VolumeRecord::from).collect(),
            docker: spec.docker().map(DockerRecord::from),
        }
    }
}

impl TryFrom<&VolumeRecord> for Volume {
    type Error = ParseError;

    fn try_from(record: &VolumeRecord) -> Result<Self, Self::Error> {
        let mode = VolumeModeCode::try_from(record.mode)
            .map_err(|_| ParseError::UnknownVolumeMode(record.mode))?;
        // Paths are taken as stored, validation happens at construction time
        // only so old records stay readable.
        Ok(Volume {
            container_path: record.container_path.clone(),
            host_path: record.host_path.clone(),
            mode: VolumeMode::from(mode),
        })
    }
}

impl TryFrom<&PortMappingRecord> for PortMapping {
    type Error = ParseError;

    fn try_from(record: &PortMappingRecord) -> Result<Self, Self::Error> {
        let protocol = record
            .protocol
            .parse::<Protocol>()
            .map_err(|_| ParseError::UnknownProtocol(record.protocol.clone()))?;
        Ok(PortMapping {
            container_port: record.container_port as u16,
            host_port: record.host_port as u16,
            service_port: record.service_port as u16,
            protocol,
        })
    }
}

impl TryFrom<&DockerRecord> for DockerConfig {
    type Error = ParseError;

    fn try_from(record: &DockerRecord) -> Result<Self, Self::Error> {
        let network = match record.network {
            Some(code) => Some(
                NetworkModeCode::try_from(code)
                    .map_err(|_| ParseError::UnknownNetworkMode(code))?
                    .into(),
            ),
            None => None,
        };
        let mappings = record
            .port_mappings
            .iter()
            .map(PortMapping::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DockerConfig {
            image: record.image.clone(),
            network,
            // An empty list on the wire means no mappings were stored, which
            // reads back as absent.
            port_mappings: if mappings.is_empty() {
                None
            } else {
                Some(mappings)
            },
            privileged: record.privileged,
            parameters: record
                .parameters
                .iter()
                .map(|p| Parameter {
                    key: p.key.clone(),
                    value: p.value.clone(),
                })
                .collect(),
            force_pull_image: record.force_pull_image,
        })
    }
}

impl TryFrom<ContainerRecord> for ContainerSpec {
    type Error = ParseError;

    fn try_from(record: ContainerRecord) -> Result<Self, Self::Error> {
        let kind_code =
            KindCode::try_from(record.kind).map_err(|_| ParseError::UnknownKind(record.kind))?;
        let kind = match kind_code {
            KindCode::Unspecified => return Err(ParseError::UnknownKind(record.kind)),
            KindCode::Docker => {
                let docker = record
                    .docker
                    .as_ref()
                    .map(DockerConfig::try_from)
                    .transpose()?;
                ContainerKind::Docker(docker)
            }
            KindCode::Native => ContainerKind::Native(None),
        };
        let volumes = record
            .volumes
            .iter()
            .map(Volume::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ContainerSpec { kind, volumes })
    }
}

pub fn encode(spec: &ContainerSpec) -> Vec<u8> {
    ContainerRecord::from(spec).encode_to_vec()
}

pub fn decode(bytes: &[u8]) -> Result<ContainerSpec, ParseError> {
    let record = ContainerRecord::decode(bytes)?;
    ContainerSpec::try_from(record)
}
