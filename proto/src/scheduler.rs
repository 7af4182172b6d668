use crate::{KindCode, NetworkModeCode, VolumeModeCode};
use definition::container::{ContainerKind, ContainerSpec, DockerConfig, PortMapping, Volume};
use prost::Message;

/// Launch message handed to the resource manager. Write-only: nothing in
/// this system ever reads it back, so there is no decode path.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ContainerLaunch {
    #[prost(enumeration = "KindCode", tag = "1")]
    pub kind: i32,
    #[prost(message, repeated, tag = "2")]
    pub volumes: Vec<VolumeLaunch>,
    #[prost(message, optional, tag = "3")]
    pub docker: Option<DockerLaunch>,
    /// Opaque native executor payload, forwarded verbatim when present
    #[prost(bytes = "vec", optional, tag = "4")]
    pub native: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VolumeLaunch {
    #[prost(string, tag = "1")]
    pub container_path: String,
    #[prost(string, tag = "2")]
    pub host_path: String,
    #[prost(enumeration = "VolumeModeCode", tag = "3")]
    pub mode: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DockerLaunch {
    #[prost(string, tag = "1")]
    pub image: String,
    #[prost(enumeration = "NetworkModeCode", optional, tag = "2")]
    pub network: Option<i32>,
    #[prost(message, repeated, tag = "3")]
    pub port_mappings: Vec<PortMappingLaunch>,
    #[prost(bool, tag = "4")]
    pub privileged: bool,
    #[prost(message, repeated, tag = "5")]
    pub parameters: Vec<ParameterLaunch>,
    #[prost(bool, tag = "6")]
    pub force_pull_image: bool,
}

/// Carries no `service_port`: the resource manager has no routing concept,
/// that port stays internal to the orchestrator's persistence schema.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PortMappingLaunch {
    #[prost(uint32, tag = "1")]
    pub container_port: u32,
    #[prost(uint32, tag = "2")]
    pub host_port: u32,
    #[prost(string, tag = "3")]
    pub protocol: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ParameterLaunch {
    #[prost(string, tag = "1")]
    pub key: String,
    #[prost(string, tag = "2")]
    pub value: String,
}

impl From<&Volume> for VolumeLaunch {
    fn from(volume: &Volume) -> Self {
        VolumeLaunch {
            container_path: volume.container_path.clone(),
            host_path: volume.host_path.clone(),
            mode: VolumeModeCode::from(volume.mode) as i32,
        }
    }
}

impl From<&PortMapping> for PortMappingLaunch {
    fn from(mapping: &PortMapping) -> Self {
        PortMappingLaunch {
            container_port: u32::from(mapping.container_port),
            host_port: u32::from(mapping.host_port),
            protocol: mapping.protocol.to_string(),
        }
    }
}

impl From<&DockerConfig> for DockerLaunch {
    fn from(config: &DockerConfig) -> Self {
        DockerLaunch {
            image: config.image.clone(),
            network: config.network.map(|n| NetworkModeCode::from(n) as i32),
            port_mappings: config
                .port_mappings
                .iter()
                .flatten()
                .map(PortMappingLaunch::from)
                .collect(),
            privileged: config.privileged,
            parameters: config
                .parameters
                .iter()
                .map(|p| ParameterLaunch {
                    key: p.key.clone(),
                    value: p.value.clone(),
                })
                .collect(),
            force_pull_image: config.force_pull_image,
        }
    }
}

impl From<&ContainerSpec> for ContainerLaunch {
    fn from(spec: &ContainerSpec) -> Self {
        let kind = match spec.kind {
            ContainerKind::Docker(_) => KindCode::Docker,
            ContainerKind::Native(_) => KindCode::Native,
        };
        ContainerLaunch {
            kind: kind as i32,
            volumes: spec.volumes.iter().map(VolumeLaunch::from).collect(),
            docker: spec.docker().map(DockerLaunch::from),
            native: spec.native().map(|info| info.to_vec()),
        }
    }
}

pub fn encode(spec: &ContainerSpec) -> Vec<u8> {
    ContainerLaunch::from(spec).encode_to_vec()
}
