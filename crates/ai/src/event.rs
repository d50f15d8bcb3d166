//! Events produced by triggers and external input.
use bot_world::ObjectGuid;

/// What fired, with what parameter, about which object, on whose behalf.
///
/// The target object is kept as a small byte blob (usually an encoded
/// [`ObjectGuid`]) rather than a live reference.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Event {
    source: String,
    param: String,
    object: Vec<u8>,
    owner: Option<ObjectGuid>,
}

impl Event {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    pub fn with_param(source: impl Into<String>, param: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            param: param.into(),
            ..Self::default()
        }
    }

    pub fn with_object(mut self, guid: ObjectGuid) -> Self {
        self.object = guid.to_bytes().to_vec();
        self
    }

    pub fn with_packet(mut self, packet: &Packet) -> Self {
        self.object = packet.payload.clone();
        self
    }

    pub fn with_owner(mut self, owner: Option<ObjectGuid>) -> Self {
        self.owner = owner;
        self
    }

    /// The empty event: "nothing fired".
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn param(&self) -> &str {
        &self.param
    }

    pub fn object(&self) -> &[u8] {
        &self.object
    }

    pub fn object_guid(&self) -> Option<ObjectGuid> {
        ObjectGuid::from_bytes(&self.object)
    }

    pub fn owner(&self) -> Option<ObjectGuid> {
        self.owner
    }
}

/// An inbound packet as seen by the packet-driven triggers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Packet {
    pub opcode: u16,
    pub payload: Vec<u8>,
}

impl Packet {
    pub fn new(opcode: u16, payload: Vec<u8>) -> Self {
        Self { opcode, payload }
    }
}
