pub mod container {
    use serde::{Deserialize, Serialize};
    use std::fmt::Display;
    use std::str::FromStr;
    use thiserror::Error;

    #[derive(Debug, Error, Clone, PartialEq, Eq)]
    pub enum ValidationError {
        #[error("Unsupported port mapping protocol: {0}")]
        UnsupportedProtocol(String),

        #[error("Volume path is not absolute: {0}")]
        RelativePath(String),
    }

    #[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
    pub enum VolumeMode {
        ReadOnly,
        ReadWrite,
    }

    /// Host directory mounted into the container filesystem
    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
    pub struct Volume {
        #[serde(rename = "containerPath")]
        pub container_path: String,
        #[serde(rename = "hostPath")]
        pub host_path: String,
        pub mode: VolumeMode,
    }

    impl Volume {
        /// Both paths must be absolute, the mount table has no working
        /// directory to resolve them against.
        pub fn new(
            container_path: String,
            host_path: String,
            mode: VolumeMode,
        ) -> Result<Volume, ValidationError> {
            if !container_path.starts_with('/') {
                return Err(ValidationError::RelativePath(container_path));
            }
            if !host_path.starts_with('/') {
                return Err(ValidationError::RelativePath(host_path));
            }
            Ok(Volume {
                container_path,
                host_path,
                mode,
            })
        }
    }

    #[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
    #[serde(rename_all = "lowercase")]
    pub enum Protocol {
        Tcp,
        Udp,
    }

    impl FromStr for Protocol {
        type Err = ValidationError;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s.to_ascii_lowercase().as_str() {
                "tcp" => Ok(Protocol::Tcp),
                "udp" => Ok(Protocol::Udp),
                _ => Err(ValidationError::UnsupportedProtocol(s.to_string())),
            }
        }
    }

    impl Display for Protocol {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Protocol::Tcp => write!(f, "tcp"),
                Protocol::Udp => write!(f, "udp"),
            }
        }
    }

    /// Maps a container port onto the host, with the routing port used by
    /// the load balancing layer.
    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
    pub struct PortMapping {
        #[serde(rename = "containerPort")]
        pub container_port: u16,
        #[serde(rename = "hostPort")]
        pub host_port: u16,
        #[serde(rename = "servicePort")]
        pub service_port: u16,
        pub protocol: Protocol,
    }

    impl PortMapping {
        pub fn new(
            container_port: u16,
            host_port: u16,
            service_port: u16,
            protocol: &str,
        ) -> Result<PortMapping, ValidationError> {
            Ok(PortMapping {
                container_port,
                host_port,
                service_port,
                protocol: protocol.parse()?,
            })
        }
    }

    /// Extra flag handed to the container daemon command line, order matters
    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
    pub struct Parameter {
        pub key: String,
        pub value: String,
    }

    #[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
    pub enum NetworkMode {
        None,
        Bridge,
        Host,
        User,
    }

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
    pub struct DockerConfig {
        #[serde(default)]
        pub image: String,
        pub network: Option<NetworkMode>,
        /// An empty mapping list is normalized to `None`; the wire formats
        /// cannot tell the two apart so the model never holds `Some([])`.
        #[serde(rename = "portMappings")]
        pub port_mappings: Option<Vec<PortMapping>>,
        #[serde(default)]
        pub privileged: bool,
        #[serde(default)]
        pub parameters: Vec<Parameter>,
        #[serde(rename = "forcePullImage", default)]
        pub force_pull_image: bool,
    }

    impl DockerConfig {
        pub fn new(
            image: String,
            network: Option<NetworkMode>,
            port_mappings: Option<Vec<PortMapping>>,
            privileged: bool,
            parameters: Vec<Parameter>,
            force_pull_image: bool,
        ) -> DockerConfig {
            DockerConfig {
                image,
                network,
                port_mappings: port_mappings.filter(|m| !m.is_empty()),
                privileged,
                parameters,
                force_pull_image,
            }
        }

        /// Shape produced when only an image name is known, everything else
        /// at its default.
        pub fn from_image(image: String) -> DockerConfig {
            DockerConfig {
                image,
                ..DockerConfig::default()
            }
        }
    }

    /// Which runtime executes the workload. The config lives inside the
    /// variant so a spec can never carry both a docker section and a native
    /// executor payload; a stored record may still have the kind set with no
    /// sub-message, hence the inner `Option`.
    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
    pub enum ContainerKind {
        Docker(Option<DockerConfig>),
        /// Opaque executor info, forwarded untouched to the resource manager
        Native(Option<Vec<u8>>),
    }

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
    pub struct ContainerSpec {
        pub kind: ContainerKind,
        #[serde(default)]
        pub volumes: Vec<Volume>,
    }

    impl ContainerSpec {
        pub fn docker(&self) -> Option<&DockerConfig> {
            match &self.kind {
                ContainerKind::Docker(config) => config.as_ref(),
                ContainerKind::Native(_) => None,
            }
        }

        pub fn native(&self) -> Option<&[u8]> {
            match &self.kind {
                ContainerKind::Native(info) => info.as_deref(),
                ContainerKind::Docker(_) => None,
            }
        }

        /// Docker spec carrying only an image, the shape every legacy
        /// record decodes to.
        pub fn from_image(image: String) -> ContainerSpec {
            ContainerSpec {
                kind: ContainerKind::Docker(Some(DockerConfig::from_image(image))),
                volumes: Vec::new(),
            }
        }
    }
}
