use definition::container::ContainerSpec;
use prost::Message;

/// Deprecated envelope that carried the image inside a generic command info
/// message. Only the image is recovered, the command line itself was never
/// part of the container model. Read-only: records written before the
/// container model stay readable, nothing ever writes this format again.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CommandEnvelope {
    #[prost(string, optional, tag = "1")]
    pub value: Option<String>,
    #[prost(message, optional, tag = "2")]
    pub container: Option<CommandContainer>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CommandContainer {
    #[prost(string, optional, tag = "1")]
    pub image: Option<String>,
}

/// Total: a malformed envelope or an absent image degrades to an empty
/// image instead of failing the load.
pub fn decode_command_envelope(bytes: &[u8]) -> ContainerSpec {
    let image = CommandEnvelope::decode(bytes)
        .ok()
        .and_then(|envelope| envelope.container)
        .and_then(|container| container.image)
        .unwrap_or_default();
    ContainerSpec::from_image(image)
}

/// Oldest schema of all: the stored bytes are the raw image string itself.
pub fn decode_image_blob(bytes: &[u8]) -> ContainerSpec {
    ContainerSpec::from_image(String::from_utf8_lossy(bytes).into_owned())
}
